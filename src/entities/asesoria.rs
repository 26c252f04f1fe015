//! Asesoria entity type - customer advisory sessions
//!
//! Sessions record their real timeline as they move: entering EN_PROCESO
//! stamps `fecha_inicio`, reaching a terminal state stamps `fecha_fin` and
//! freezes `duracion_real_min`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::history::History;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::{WorkflowItem, WorkflowStatus};

/// Advisory workflow status
///
/// PENDIENTE → {PROGRAMADA, CANCELADA}; PROGRAMADA → {EN_PROCESO, CANCELADA};
/// EN_PROCESO → {COMPLETADA, CANCELADA}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoAsesoria {
    Pendiente,
    Programada,
    EnProceso,
    Completada,
    Cancelada,
}

impl Default for EstadoAsesoria {
    fn default() -> Self {
        EstadoAsesoria::Pendiente
    }
}

impl std::fmt::Display for EstadoAsesoria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstadoAsesoria::Pendiente => write!(f, "PENDIENTE"),
            EstadoAsesoria::Programada => write!(f, "PROGRAMADA"),
            EstadoAsesoria::EnProceso => write!(f, "EN_PROCESO"),
            EstadoAsesoria::Completada => write!(f, "COMPLETADA"),
            EstadoAsesoria::Cancelada => write!(f, "CANCELADA"),
        }
    }
}

impl std::str::FromStr for EstadoAsesoria {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDIENTE" => Ok(EstadoAsesoria::Pendiente),
            "PROGRAMADA" => Ok(EstadoAsesoria::Programada),
            "EN_PROCESO" => Ok(EstadoAsesoria::EnProceso),
            "COMPLETADA" => Ok(EstadoAsesoria::Completada),
            "CANCELADA" => Ok(EstadoAsesoria::Cancelada),
            _ => Err(format!(
                "invalid advisory status: {}. Use PENDIENTE, PROGRAMADA, EN_PROCESO, COMPLETADA, or CANCELADA",
                s
            )),
        }
    }
}

impl WorkflowStatus for EstadoAsesoria {
    fn initial() -> Self {
        EstadoAsesoria::Pendiente
    }

    fn next_states(self) -> &'static [Self] {
        match self {
            EstadoAsesoria::Pendiente => {
                &[EstadoAsesoria::Programada, EstadoAsesoria::Cancelada]
            }
            EstadoAsesoria::Programada => {
                &[EstadoAsesoria::EnProceso, EstadoAsesoria::Cancelada]
            }
            EstadoAsesoria::EnProceso => {
                &[EstadoAsesoria::Completada, EstadoAsesoria::Cancelada]
            }
            EstadoAsesoria::Completada | EstadoAsesoria::Cancelada => &[],
        }
    }

    fn work_start_marker() -> Option<Self> {
        Some(EstadoAsesoria::EnProceso)
    }

    fn all() -> &'static [Self] {
        &[
            EstadoAsesoria::Pendiente,
            EstadoAsesoria::Programada,
            EstadoAsesoria::EnProceso,
            EstadoAsesoria::Completada,
            EstadoAsesoria::Cancelada,
        ]
    }
}

/// An advisory session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asesoria {
    pub id: EntityId,

    pub cliente: EntityId,

    /// Session topic (financiamiento, seguros, mantenimiento, ...)
    pub tipo_asesoria: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asesor: Option<EntityId>,

    #[serde(default)]
    pub estado: EstadoAsesoria,

    pub fecha_solicitud: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_programada: Option<DateTime<Utc>>,

    /// Stamped on entering EN_PROCESO
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_inicio: Option<DateTime<Utc>>,

    /// Stamped on reaching a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_fin: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duracion_real_min: Option<i64>,

    pub descripcion: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resultado: Option<String>,

    /// Customer rating, 1 to 5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calificacion: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comentarios: Option<String>,

    #[serde(default, skip_serializing_if = "History::is_empty")]
    pub historial_estados: History<EstadoAsesoria>,

    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Asesoria {
    pub fn new(cliente: EntityId, tipo_asesoria: String, descripcion: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Ase),
            cliente,
            tipo_asesoria,
            asesor: None,
            estado: EstadoAsesoria::default(),
            fecha_solicitud: Utc::now(),
            fecha_programada: None,
            fecha_inicio: None,
            fecha_fin: None,
            duracion_real_min: None,
            descripcion,
            resultado: None,
            calificacion: None,
            comentarios: None,
            historial_estados: History::new(),
            entity_revision: 1,
        }
    }
}

impl Entity for Asesoria {
    const PREFIX: EntityPrefix = EntityPrefix::Ase;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        format!("{}: {}", self.tipo_asesoria, self.descripcion)
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
        refs.extend(self.asesor.clone());
        refs
    }
}

impl WorkflowItem for Asesoria {
    type Status = EstadoAsesoria;

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
        self.fecha_fin
    }

    fn set_fecha_resolucion(&mut self, at: Option<DateTime<Utc>>) {
        self.fecha_fin = at;
    }

    fn on_transition(&mut self, nuevo: Self::Status, ahora: DateTime<Utc>) {
        if nuevo == EstadoAsesoria::EnProceso {
            self.fecha_inicio = Some(ahora);
        }

        // fecha_fin was just set by the engine for terminal states
        if nuevo.is_terminal() {
            if let (Some(inicio), Some(fin)) = (self.fecha_inicio, self.fecha_fin) {
                self.duracion_real_min = Some((fin - inicio).num_minutes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn asesoria() -> Asesoria {
        Asesoria::new(
            EntityId::new(EntityPrefix::Cli),
            "seguros".to_string(),
            "Cobertura amplia para camioneta".to_string(),
        )
    }

    #[test]
    fn test_transition_table() {
        use EstadoAsesoria::*;

        assert_eq!(Pendiente.next_states(), &[Programada, Cancelada]);
        assert_eq!(Programada.next_states(), &[EnProceso, Cancelada]);
        assert_eq!(EnProceso.next_states(), &[Completada, Cancelada]);
        assert!(Completada.is_terminal());
        assert!(Cancelada.is_terminal());
    }

    #[test]
    fn test_start_hook_stamps_fecha_inicio() {
        let mut ase = asesoria();
        let t = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();

        ase.on_transition(EstadoAsesoria::EnProceso, t);
        assert_eq!(ase.fecha_inicio, Some(t));
        assert!(ase.duracion_real_min.is_none());
    }

    #[test]
    fn test_completion_hook_computes_real_duration() {
        let mut ase = asesoria();
        let inicio = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();
        let fin = inicio + Duration::minutes(50);

        ase.on_transition(EstadoAsesoria::EnProceso, inicio);
        ase.set_fecha_resolucion(Some(fin));
        ase.on_transition(EstadoAsesoria::Completada, fin);

        assert_eq!(ase.duracion_real_min, Some(50));
    }

    #[test]
    fn test_cancelled_before_start_has_no_duration() {
        let mut ase = asesoria();
        let t = Utc::now();

        ase.set_fecha_resolucion(Some(t));
        ase.on_transition(EstadoAsesoria::Cancelada, t);

        assert!(ase.duracion_real_min.is_none());
    }
}
