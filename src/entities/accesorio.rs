//! Accesorio entity type - accessories inventory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};

/// An accessory in the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accesorio {
    pub id: EntityId,

    pub nombre: String,
    pub descripcion: String,
    pub precio: f64,

    #[serde(default)]
    pub stock: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,

    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,

    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Accesorio {
    pub fn new(nombre: String, descripcion: String, precio: f64, stock: u32) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Acc),
            nombre,
            descripcion,
            precio,
            stock,
            categoria: None,
            fecha_creacion: now,
            fecha_actualizacion: now,
            entity_revision: 1,
        }
    }
}

impl Entity for Accesorio {
    const PREFIX: EntityPrefix = EntityPrefix::Acc;

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
    fn test_accesorio_creation() {
        let acc = Accesorio::new(
            "Tapetes de hule".to_string(),
            "Juego de 4 piezas".to_string(),
            450.0,
            8,
        );

        assert!(acc.id.to_string().starts_with("ACC-"));
        assert_eq!(acc.summary(), "Tapetes de hule");
    }
}
