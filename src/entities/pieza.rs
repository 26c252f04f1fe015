//! Pieza entity type - spare parts inventory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};

/// A spare part in the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pieza {
    pub id: EntityId,

    pub nombre: String,
    pub descripcion: String,
    pub precio: f64,

    #[serde(default)]
    pub stock: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,

    /// Compatible makes/models, free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibilidad: Option<String>,

    #[serde(default)]
    pub garantia_meses: u32,

    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,

    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Pieza {
    pub fn new(nombre: String, descripcion: String, precio: f64, stock: u32) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Pza),
            nombre,
            descripcion,
            precio,
            stock,
            categoria: None,
            compatibilidad: None,
            garantia_meses: 0,
            fecha_creacion: now,
            fecha_actualizacion: now,
            entity_revision: 1,
        }
    }
}

impl Entity for Pieza {
    const PREFIX: EntityPrefix = EntityPrefix::Pza;

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
    fn test_pieza_creation() {
        let pieza = Pieza::new(
            "Filtro de aceite".to_string(),
            "Filtro para motores 1.6L".to_string(),
            250.0,
            12,
        );

        assert!(pieza.id.to_string().starts_with("PZA-"));
        assert_eq!(pieza.stock, 12);
        assert_eq!(pieza.garantia_meses, 0);
    }
}
