//! Reparacion entity type - workshop repair orders
//!
//! Repairs are workflow records: their `estado` only moves through the
//! transition table below, every change lands in `historial_estados`, and
//! `fecha_entrega` doubles as the resolution timestamp.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::history::History;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::{WorkflowItem, WorkflowStatus};

/// Repair workflow status
///
/// PENDIENTE → {EN_PROCESO, CANCELADO}; EN_PROCESO → {COMPLETADO, CANCELADO}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoReparacion {
    Pendiente,
    EnProceso,
    Completado,
    Cancelado,
}

impl Default for EstadoReparacion {
    fn default() -> Self {
        EstadoReparacion::Pendiente
    }
}

impl std::fmt::Display for EstadoReparacion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstadoReparacion::Pendiente => write!(f, "PENDIENTE"),
            EstadoReparacion::EnProceso => write!(f, "EN_PROCESO"),
            EstadoReparacion::Completado => write!(f, "COMPLETADO"),
            EstadoReparacion::Cancelado => write!(f, "CANCELADO"),
        }
    }
}

impl std::str::FromStr for EstadoReparacion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDIENTE" => Ok(EstadoReparacion::Pendiente),
            "EN_PROCESO" => Ok(EstadoReparacion::EnProceso),
            "COMPLETADO" => Ok(EstadoReparacion::Completado),
            "CANCELADO" => Ok(EstadoReparacion::Cancelado),
            _ => Err(format!(
                "invalid repair status: {}. Use PENDIENTE, EN_PROCESO, COMPLETADO, or CANCELADO",
                s
            )),
        }
    }
}

impl WorkflowStatus for EstadoReparacion {
    fn initial() -> Self {
        EstadoReparacion::Pendiente
    }

    fn next_states(self) -> &'static [Self] {
        match self {
            EstadoReparacion::Pendiente => {
                &[EstadoReparacion::EnProceso, EstadoReparacion::Cancelado]
            }
            EstadoReparacion::EnProceso => {
                &[EstadoReparacion::Completado, EstadoReparacion::Cancelado]
            }
            EstadoReparacion::Completado | EstadoReparacion::Cancelado => &[],
        }
    }

    fn work_start_marker() -> Option<Self> {
        Some(EstadoReparacion::EnProceso)
    }

    fn all() -> &'static [Self] {
        &[
            EstadoReparacion::Pendiente,
            EstadoReparacion::EnProceso,
            EstadoReparacion::Completado,
            EstadoReparacion::Cancelado,
        ]
    }
}

/// One service line on a repair order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetalleReparacion {
    pub servicio: EntityId,
    pub costo: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_ejecucion: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

/// A repair order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reparacion {
    pub id: EntityId,

    pub cliente: EntityId,
    pub vehiculo: EntityId,

    pub descripcion_problema: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion_solucion: Option<String>,

    /// Service lines performed on this order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detalles: Vec<DetalleReparacion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tecnico_asignado: Option<EntityId>,

    #[serde(default)]
    pub estado: EstadoReparacion,

    pub fecha_ingreso: DateTime<Utc>,

    /// Set exactly when the order reaches a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_entrega: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costo_total: Option<f64>,

    #[serde(default, skip_serializing_if = "History::is_empty")]
    pub historial_estados: History<EstadoReparacion>,

    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Reparacion {
    pub fn new(cliente: EntityId, vehiculo: EntityId, descripcion_problema: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Rep),
            cliente,
            vehiculo,
            descripcion_problema,
            descripcion_solucion: None,
            detalles: Vec::new(),
            tecnico_asignado: None,
            estado: EstadoReparacion::default(),
            fecha_ingreso: Utc::now(),
            fecha_entrega: None,
            costo_total: None,
            historial_estados: History::new(),
            entity_revision: 1,
        }
    }

    /// Sum of the service line costs
    pub fn costo_calculado(&self) -> f64 {
        self.detalles.iter().map(|d| d.costo).sum()
    }
}

impl Entity for Reparacion {
    const PREFIX: EntityPrefix = EntityPrefix::Rep;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        self.descripcion_problema.clone()
    }

    fn created(&self) -> DateTime<Utc> {
        self.fecha_ingreso
    }

    fn revision(&self) -> u32 {
        self.entity_revision
    }

    fn set_revision(&mut self, revision: u32) {
        self.entity_revision = revision;
    }

    fn references(&self) -> Vec<EntityId> {
        let mut refs = vec![self.cliente.clone(), self.vehiculo.clone()];
        refs.extend(self.detalles.iter().map(|d| d.servicio.clone()));
        refs.extend(self.tecnico_asignado.clone());
        refs
    }
}

impl WorkflowItem for Reparacion {
    type Status = EstadoReparacion;

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
        self.fecha_entrega
    }

    fn set_fecha_resolucion(&mut self, at: Option<DateTime<Utc>>) {
        self.fecha_entrega = at;
    }

    fn on_transition(&mut self, nuevo: Self::Status, _ahora: DateTime<Utc>) {
        // Completed orders freeze their total from the service lines
        if nuevo == EstadoReparacion::Completado {
            self.costo_total = Some(self.costo_calculado());
        }
    }
}
