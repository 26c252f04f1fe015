//! Derived workflow fields computed from the audit trail
//!
//! Nothing here is stored twice: the resolved duration is derived on read
//! from the history's first work-start entry and the resolution timestamp.

use chrono::Duration;

use crate::core::entity::Entity;
use crate::core::workflow::{TransitionError, WorkflowItem, WorkflowStatus};

/// When the record is resolved, the elapsed time between the first entry
/// into the work-start state and the resolution timestamp.
///
/// Returns `None` for unresolved records and for workflows whose resolution
/// never passed through the work-start state (a return rejected outright,
/// a session cancelled before starting). A resolution timestamp earlier than
/// the work start is a corrupted record and is reported, never clamped.
pub fn resolved_duration<T: WorkflowItem>(item: &T) -> Result<Option<Duration>, TransitionError> {
    let Some(resolved_at) = item.fecha_resolucion() else {
        return Ok(None);
    };

    let Some(marker) = T::Status::work_start_marker() else {
        return Ok(None);
    };

    let Some(started) = item
        .history()
        .chronological()
        .find(|c| c.estado_nuevo == marker)
    else {
        return Ok(None);
    };

    let elapsed = resolved_at - started.fecha_cambio;
    if elapsed < Duration::zero() {
        return Err(TransitionError::DataIntegrity {
            id: item.id().to_string(),
            message: format!(
                "resolution {} precedes work start {}",
                resolved_at, started.fecha_cambio
            ),
        });
    }

    Ok(Some(elapsed))
}

/// Human-readable rendering of a duration, in the largest useful unit
pub fn format_duration(d: Duration) -> String {
    let minutes = d.num_minutes();
    if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 60 * 24 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        let days = minutes / (60 * 24);
        let rem = minutes % (60 * 24);
        format!("{}d {}h", days, rem / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::core::history::StatusChange;
    use crate::core::identity::{EntityId, EntityPrefix};
    use crate::entities::reparacion::{EstadoReparacion, Reparacion};

    fn reparacion_base() -> Reparacion {
        let cliente = EntityId::new(EntityPrefix::Cli);
        let carro = EntityId::new(EntityPrefix::Car);
        Reparacion::new(cliente, carro, "Frenos".to_string())
    }

    #[test]
    fn test_unresolved_record_has_no_duration() {
        let mut rep = reparacion_base();
        rep.estado = EstadoReparacion::EnProceso;
        rep.historial_estados.record(StatusChange::new(
            EstadoReparacion::Pendiente,
            EstadoReparacion::EnProceso,
            Utc::now(),
            None,
            None,
        ));

        assert_eq!(resolved_duration(&rep).unwrap(), None);
    }

    #[test]
    fn test_duration_spans_work_start_to_resolution() {
        let t1 = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap();

        let mut rep = reparacion_base();
        rep.historial_estados.record(StatusChange::new(
            EstadoReparacion::Pendiente,
            EstadoReparacion::EnProceso,
            t1,
            None,
            None,
        ));
        rep.historial_estados.record(StatusChange::new(
            EstadoReparacion::EnProceso,
            EstadoReparacion::Completado,
            t2,
            None,
            None,
        ));
        rep.estado = EstadoReparacion::Completado;
        rep.fecha_entrega = Some(t2);

        let d = resolved_duration(&rep).unwrap().unwrap();
        assert_eq!(d, Duration::minutes(330));
    }

    #[test]
    fn test_resolution_before_start_is_integrity_error() {
        let t1 = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();

        let mut rep = reparacion_base();
        rep.historial_estados.record(StatusChange::new(
            EstadoReparacion::Pendiente,
            EstadoReparacion::EnProceso,
            t1,
            None,
            None,
        ));
        rep.estado = EstadoReparacion::Cancelado;
        rep.fecha_entrega = Some(t1 - Duration::hours(1));

        let err = resolved_duration(&rep).unwrap_err();
        assert!(matches!(err, TransitionError::DataIntegrity { .. }));
    }

    #[test]
    fn test_resolution_without_work_start_has_no_duration() {
        let mut rep = reparacion_base();
        rep.historial_estados.record(StatusChange::new(
            EstadoReparacion::Pendiente,
            EstadoReparacion::Cancelado,
            Utc::now(),
            None,
            None,
        ));
        rep.estado = EstadoReparacion::Cancelado;
        rep.fecha_entrega = Some(Utc::now());

        assert_eq!(resolved_duration(&rep).unwrap(), None);
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::minutes(45)), "45m");
        assert_eq!(format_duration(Duration::minutes(330)), "5h 30m");
        assert_eq!(format_duration(Duration::days(2) + Duration::hours(3)), "2d 3h");
    }
}
