//! Cliente entity type - dealership customers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};

/// A customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cliente {
    pub id: EntityId,

    pub nombre: String,
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,

    /// Free-text purchase preferences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferencias: Option<String>,

    #[serde(default)]
    pub puntos_fidelidad: u32,

    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,

    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Cliente {
    pub fn new(nombre: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Cli),
            nombre,
            email,
            telefono: None,
            direccion: None,
            preferencias: None,
            puntos_fidelidad: 0,
            fecha_creacion: now,
            fecha_actualizacion: now,
            entity_revision: 1,
        }
    }
}

impl Entity for Cliente {
    const PREFIX: EntityPrefix = EntityPrefix::Cli;

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
    fn test_cliente_creation() {
        let cliente = Cliente::new("Sofía Páez".to_string(), "sofia@example.com".to_string());

        assert!(cliente.id.to_string().starts_with("CLI-"));
        assert_eq!(cliente.puntos_fidelidad, 0);
        assert!(cliente.telefono.is_none());
    }

    #[test]
    fn test_optional_fields_omitted_from_yaml() {
        let cliente = Cliente::new("Raúl Ortega".to_string(), "raul@example.com".to_string());
        let yaml = serde_yml::to_string(&cliente).unwrap();

        assert!(!yaml.contains("telefono"));
        assert!(!yaml.contains("preferencias"));
    }
}
