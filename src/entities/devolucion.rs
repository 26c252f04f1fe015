//! Devolucion entity type - product, vehicle and service returns

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::history::History;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::{WorkflowItem, WorkflowStatus};

/// What is being returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoDevolucion {
    Producto,
    Vehiculo,
    Servicio,
}

impl std::fmt::Display for TipoDevolucion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TipoDevolucion::Producto => write!(f, "PRODUCTO"),
            TipoDevolucion::Vehiculo => write!(f, "VEHICULO"),
            TipoDevolucion::Servicio => write!(f, "SERVICIO"),
        }
    }
}

impl std::str::FromStr for TipoDevolucion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PRODUCTO" => Ok(TipoDevolucion::Producto),
            "VEHICULO" | "VEHÍCULO" => Ok(TipoDevolucion::Vehiculo),
            "SERVICIO" => Ok(TipoDevolucion::Servicio),
            _ => Err(format!(
                "invalid return type: {}. Use PRODUCTO, VEHICULO, or SERVICIO",
                s
            )),
        }
    }
}

/// Return workflow status
///
/// PENDIENTE → {APROBADA, RECHAZADA}; APROBADA → {EN_PROCESO};
/// EN_PROCESO → {COMPLETADA}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoDevolucion {
    Pendiente,
    Aprobada,
    Rechazada,
    EnProceso,
    Completada,
}

impl Default for EstadoDevolucion {
    fn default() -> Self {
        EstadoDevolucion::Pendiente
    }
}

impl std::fmt::Display for EstadoDevolucion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstadoDevolucion::Pendiente => write!(f, "PENDIENTE"),
            EstadoDevolucion::Aprobada => write!(f, "APROBADA"),
            EstadoDevolucion::Rechazada => write!(f, "RECHAZADA"),
            EstadoDevolucion::EnProceso => write!(f, "EN_PROCESO"),
            EstadoDevolucion::Completada => write!(f, "COMPLETADA"),
        }
    }
}

impl std::str::FromStr for EstadoDevolucion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDIENTE" => Ok(EstadoDevolucion::Pendiente),
            "APROBADA" => Ok(EstadoDevolucion::Aprobada),
            "RECHAZADA" => Ok(EstadoDevolucion::Rechazada),
            "EN_PROCESO" => Ok(EstadoDevolucion::EnProceso),
            "COMPLETADA" => Ok(EstadoDevolucion::Completada),
            _ => Err(format!(
                "invalid return status: {}. Use PENDIENTE, APROBADA, RECHAZADA, EN_PROCESO, or COMPLETADA",
                s
            )),
        }
    }
}

impl WorkflowStatus for EstadoDevolucion {
    fn initial() -> Self {
        EstadoDevolucion::Pendiente
    }

    fn next_states(self) -> &'static [Self] {
        match self {
            EstadoDevolucion::Pendiente => {
                &[EstadoDevolucion::Aprobada, EstadoDevolucion::Rechazada]
            }
            EstadoDevolucion::Aprobada => &[EstadoDevolucion::EnProceso],
            EstadoDevolucion::EnProceso => &[EstadoDevolucion::Completada],
            EstadoDevolucion::Rechazada | EstadoDevolucion::Completada => &[],
        }
    }

    fn work_start_marker() -> Option<Self> {
        Some(EstadoDevolucion::EnProceso)
    }

    fn all() -> &'static [Self] {
        &[
            EstadoDevolucion::Pendiente,
            EstadoDevolucion::Aprobada,
            EstadoDevolucion::Rechazada,
            EstadoDevolucion::EnProceso,
            EstadoDevolucion::Completada,
        ]
    }
}

/// A return request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Devolucion {
    pub id: EntityId,

    pub cliente: EntityId,
    pub tipo: TipoDevolucion,
    pub motivo: String,

    #[serde(default)]
    pub estado: EstadoDevolucion,

    pub fecha_solicitud: DateTime<Utc>,

    /// Set exactly when the request reaches a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_resolucion: Option<DateTime<Utc>>,

    /// Refunded amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monto: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producto_devuelto: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehiculo_devuelto: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comentario: Option<String>,

    #[serde(default, skip_serializing_if = "History::is_empty")]
    pub historial_estados: History<EstadoDevolucion>,

    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Devolucion {
    pub fn new(cliente: EntityId, tipo: TipoDevolucion, motivo: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Dev),
            cliente,
            tipo,
            motivo,
            estado: EstadoDevolucion::default(),
            fecha_solicitud: Utc::now(),
            fecha_resolucion: None,
            monto: None,
            producto_devuelto: None,
            vehiculo_devuelto: None,
            comentario: None,
            historial_estados: History::new(),
            entity_revision: 1,
        }
    }
}

impl Entity for Devolucion {
    const PREFIX: EntityPrefix = EntityPrefix::Dev;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        self.motivo.clone()
    }

    fn created(&self) -> DateTime<Utc> {
        self.fecha_solicitud
    }

    fn revision(&self) -> u32 {
        self.entity_revision
    }

    fn set_revision(&mut self, revision: u32) {
        self.entity_revision = revision;
    }

    fn references(&self) -> Vec<EntityId> {
        let mut refs = vec![self.cliente.clone()];
        refs.extend(self.producto_devuelto.clone());
        refs.extend(self.vehiculo_devuelto.clone());
        refs
    }
}

impl WorkflowItem for Devolucion {
    type Status = EstadoDevolucion;

    fn estado(&self) -> Self::Status {
        self.estado
    }

    fn set_estado(&mut self, estado: Self::Status) {
        self.estado = estado;
    }

    fn history(&self) -> &History<Self::Status> {
        &self.historial_estados
    }

    fn history_mut(&mut self) -> &mut History<Self::Status> {
        &mut self.historial_estados
    }

    fn fecha_resolucion(&self) -> Option<DateTime<Utc>> {
        self.fecha_resolucion
    }

    fn set_fecha_resolucion(&mut self, at: Option<DateTime<Utc>>) {
        self.fecha_resolucion = at;
    }
}
