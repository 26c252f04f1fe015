//! Empleado entity type - dealership staff

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};

/// A staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empleado {
    pub id: EntityId,

    pub nombre: String,
    pub email: String,

    /// Job title (mecánico, asesor, gerente, ...)
    pub cargo: String,

    pub fecha_contratacion: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub especialidad: Option<String>,

    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,

    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Empleado {
    pub fn new(nombre: String, email: String, cargo: String) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Emp),
            nombre,
            email,
            cargo,
            fecha_contratacion: chrono::Local::now().date_naive(),
            especialidad: None,
            fecha_creacion: now,
            fecha_actualizacion: now,
            entity_revision: 1,
        }
    }
}

impl Entity for Empleado {
    const PREFIX: EntityPrefix = EntityPrefix::Emp;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        format!("{} ({})", self.nombre, self.cargo)
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
