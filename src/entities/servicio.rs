//! Servicio entity type - catalog of workshop services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};

/// A service offered by the workshop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Servicio {
    pub id: EntityId,

    pub nombre: String,
    pub descripcion: String,
    pub precio: f64,

    /// Estimated duration in minutes
    #[serde(default)]
    pub duracion_estimada_min: u32,

    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,

    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Servicio {
    pub fn new(
        nombre: String,
        descripcion: String,
        precio: f64,
        duracion_estimada_min: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Srv),
            nombre,
            descripcion,
            precio,
            duracion_estimada_min,
            fecha_creacion: now,
            fecha_actualizacion: now,
            entity_revision: 1,
        }
    }
}

impl Entity for Servicio {
    const PREFIX: EntityPrefix = EntityPrefix::Srv;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        self.nombre.clone()
    }

    fn created(&self) -> DateTime<Utc> {
        self.fecha_creacion
    }

    fn revision(&self) -> u32 {
        self.entity_revision
    }

    fn set_revision(&mut self, revision: u32) {
        self.entity_revision = revision;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_servicio_creation() {
        let srv = Servicio::new(
            "Cambio de aceite".to_string(),
            "Aceite sintético y filtro".to_string(),
            850.0,
            45,
        );

        assert!(srv.id.to_string().starts_with("SRV-"));
        assert_eq!(srv.duracion_estimada_min, 45);
    }
}
