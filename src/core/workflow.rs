//! Status machine engine for workflow records
//!
//! Repairs, returns and advisory sessions all carry a finite-state `estado`
//! with an append-only audit history. The engine is the single mutation path:
//! it validates the transition against the per-type table, appends exactly one
//! history entry, updates the status and resolution timestamp, and persists
//! the record atomically while holding the record's exclusive lock.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::core::derived;
use crate::core::entity::Entity;
use crate::core::history::{History, StatusChange};
use crate::core::identity::EntityId;
use crate::core::store::{EntityStore, StoreError};
use crate::core::team::TeamRoster;

/// A workflow status type: a closed set of states plus its transition table.
///
/// A state is terminal exactly when it has no outgoing edges.
pub trait WorkflowStatus:
    Copy
    + Eq
    + std::fmt::Debug
    + Display
    + FromStr<Err = String>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Status assigned at creation
    fn initial() -> Self;

    /// Legal next states from this status
    fn next_states(self) -> &'static [Self];

    /// No further transition is defined from a terminal state
    fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }

    /// The state whose first entry marks the start of work, used as the
    /// `startedAt` endpoint for duration computation
    fn work_start_marker() -> Option<Self>;

    /// Every state of this workflow, for help and error messages
    fn all() -> &'static [Self];
}

/// A record driven by a status machine
pub trait WorkflowItem: Entity {
    type Status: WorkflowStatus;

    fn estado(&self) -> Self::Status;
    fn set_estado(&mut self, estado: Self::Status);

    fn history(&self) -> &History<Self::Status>;
    fn history_mut(&mut self) -> &mut History<Self::Status>;

    /// Resolution timestamp; set exactly when the record is terminal
    fn fecha_resolucion(&self) -> Option<DateTime<Utc>>;
    fn set_fecha_resolucion(&mut self, at: Option<DateTime<Utc>>);

    /// Entity-specific bookkeeping after a transition is applied
    /// (start timestamps, computed totals, real durations)
    fn on_transition(&mut self, _nuevo: Self::Status, _ahora: DateTime<Utc>) {}
}

/// Errors from applying a transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("invalid transition {from} → {to} (legal next states: {allowed})")]
    InvalidTransition {
        from: String,
        to: String,
        allowed: String,
    },

    #[error("record {id} is already in terminal state {estado}")]
    AlreadyTerminal { id: String, estado: String },

    #[error("workflow record not found: {0}")]
    NotFound(String),

    #[error("concurrent change on {id}: expected status {expected}, found {found}")]
    ConcurrencyConflict {
        id: String,
        expected: String,
        found: String,
    },

    #[error("data integrity violation on {id}: {message}")]
    DataIntegrity { id: String, message: String },

    #[error("actor '{actor}' is not authorized for {prefix} transitions")]
    Unauthorized { actor: String, prefix: String },

    #[error("failed to lock record {id}: {message}")]
    Lock { id: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn allowed_list<S: WorkflowStatus>(from: S) -> String {
    let next = from.next_states();
    if next.is_empty() {
        "none".to_string()
    } else {
        next.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The status machine engine over an entity store
pub struct WorkflowEngine<'a> {
    store: &'a EntityStore,
    roster: Option<TeamRoster>,
}

impl<'a> WorkflowEngine<'a> {
    pub fn new(store: &'a EntityStore, roster: Option<TeamRoster>) -> Self {
        Self { store, roster }
    }

    /// Apply a transition to the record with the given ID.
    ///
    /// The record is re-read under its exclusive lock, so concurrent callers
    /// are linearized: the second caller validates against the first caller's
    /// committed status.
    pub fn apply_transition<T: WorkflowItem>(
        &self,
        id: &EntityId,
        nuevo: T::Status,
        actor: Option<&str>,
        notas: Option<&str>,
    ) -> Result<T, TransitionError> {
        let mut lock = self.store.lock_item(id)?;
        let _guard = lock.write().map_err(|e| TransitionError::Lock {
            id: id.to_string(),
            message: e.to_string(),
        })?;

        let item = self.load_fresh::<T>(id)?;
        self.apply_locked(item, nuevo, actor, notas)
    }

    /// Apply a transition the caller decided from a snapshot: fails with
    /// [`TransitionError::ConcurrencyConflict`] when the record has moved
    /// away from `expected_from`, after one automatic re-validation against
    /// the fresh status.
    pub fn apply_transition_from<T: WorkflowItem>(
        &self,
        id: &EntityId,
        expected_from: T::Status,
        nuevo: T::Status,
        actor: Option<&str>,
        notas: Option<&str>,
    ) -> Result<T, TransitionError> {
        let mut lock = self.store.lock_item(id)?;
        let _guard = lock.write().map_err(|e| TransitionError::Lock {
            id: id.to_string(),
            message: e.to_string(),
        })?;

        let item = self.load_fresh::<T>(id)?;
        let current = item.estado();

        if current != expected_from {
            // Retry once: the requested target may still be legal from the
            // status another caller left behind.
            if current.next_states().contains(&nuevo) {
                return self.apply_locked(item, nuevo, actor, notas);
            }
            return Err(TransitionError::ConcurrencyConflict {
                id: id.to_string(),
                expected: expected_from.to_string(),
                found: current.to_string(),
            });
        }

        self.apply_locked(item, nuevo, actor, notas)
    }

    fn load_fresh<T: WorkflowItem>(&self, id: &EntityId) -> Result<T, TransitionError> {
        match self.store.load::<T>(id) {
            Ok(item) => Ok(item),
            Err(StoreError::NotFound(id)) => Err(TransitionError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Validation and mutation; caller holds the record lock and `item` was
    /// read under it.
    fn apply_locked<T: WorkflowItem>(
        &self,
        mut item: T,
        nuevo: T::Status,
        actor: Option<&str>,
        notas: Option<&str>,
    ) -> Result<T, TransitionError> {
        let id = item.id().clone();
        let from = item.estado();

        if !item
            .history()
            .is_consistent_with(from, T::Status::initial())
        {
            return Err(TransitionError::DataIntegrity {
                id: id.to_string(),
                message: format!(
                    "current status {} does not match the latest history entry",
                    from
                ),
            });
        }

        if from.is_terminal() {
            return Err(TransitionError::AlreadyTerminal {
                id: id.to_string(),
                estado: from.to_string(),
            });
        }

        if !from.next_states().contains(&nuevo) {
            return Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                to: nuevo.to_string(),
                allowed: allowed_list(from),
            });
        }

        self.authorize::<T>(actor)?;

        let ahora = Utc::now();
        item.history_mut().record(StatusChange::new(
            from,
            nuevo,
            ahora,
            actor.map(str::to_string),
            notas.map(str::to_string),
        ));
        item.set_estado(nuevo);

        if nuevo.is_terminal() {
            item.set_fecha_resolucion(Some(ahora));
        }
        item.on_transition(nuevo, ahora);

        if nuevo.is_terminal() {
            // Never persist a record whose resolution precedes its start
            derived::resolved_duration(&item)?;
        }

        match self.store.save(&mut item) {
            Ok(()) => Ok(item),
            Err(StoreError::RevisionConflict { id, .. }) => {
                Err(TransitionError::ConcurrencyConflict {
                    id,
                    expected: from.to_string(),
                    found: nuevo.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn authorize<T: WorkflowItem>(&self, actor: Option<&str>) -> Result<(), TransitionError> {
        let Some(roster) = &self.roster else {
            // No roster configured: identity is trusted as supplied
            return Ok(());
        };

        let prefix = T::PREFIX;
        let unauthorized = |actor: &str| TransitionError::Unauthorized {
            actor: actor.to_string(),
            prefix: prefix.to_string(),
        };

        let Some(actor) = actor else {
            return Err(unauthorized("(desconocido)"));
        };

        let Some(member) = roster.member_for(actor) else {
            return Err(unauthorized(actor));
        };

        if roster.can_transition(member, prefix) {
            Ok(())
        } else {
            Err(unauthorized(actor))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::Project;
    use crate::core::team::{Role, TeamMember};
    use crate::entities::asesoria::{Asesoria, EstadoAsesoria};
    use crate::entities::cliente::Cliente;
    use crate::entities::devolucion::{Devolucion, EstadoDevolucion, TipoDevolucion};
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, EntityStore, Cliente) {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let store = EntityStore::new(project);
        let cliente = Cliente::new("Luis Vega".to_string(), "luis@example.com".to_string());
        store.create(&cliente).unwrap();
        (tmp, store, cliente)
    }

    fn nueva_devolucion(store: &EntityStore, cliente: &Cliente) -> Devolucion {
        let dev = Devolucion::new(
            cliente.id().clone(),
            TipoDevolucion::Producto,
            "Pieza defectuosa".to_string(),
        );
        store.create(&dev).unwrap();
        dev
    }

    #[test]
    fn test_full_return_lifecycle() {
        let (_tmp, store, cliente) = setup();
        let dev = nueva_devolucion(&store, &cliente);
        let engine = WorkflowEngine::new(&store, None);

        let dev: Devolucion = engine
            .apply_transition(dev.id(), EstadoDevolucion::Aprobada, Some("ana"), None)
            .unwrap();
        assert_eq!(dev.estado, EstadoDevolucion::Aprobada);
        assert!(dev.fecha_resolucion.is_none(), "non-terminal must not resolve");

        let dev: Devolucion = engine
            .apply_transition(dev.id(), EstadoDevolucion::EnProceso, Some("ana"), None)
            .unwrap();
        let dev: Devolucion = engine
            .apply_transition(
                dev.id(),
                EstadoDevolucion::Completada,
                Some("ana"),
                Some("reembolso emitido"),
            )
            .unwrap();

        assert_eq!(dev.estado, EstadoDevolucion::Completada);
        assert!(dev.fecha_resolucion.is_some());
        assert_eq!(dev.historial_estados.len(), 3);

        let order: Vec<_> = dev
            .historial_estados
            .chronological()
            .map(|c| (c.estado_anterior, c.estado_nuevo))
            .collect();
        assert_eq!(
            order,
            vec![
                (EstadoDevolucion::Pendiente, EstadoDevolucion::Aprobada),
                (EstadoDevolucion::Aprobada, EstadoDevolucion::EnProceso),
                (EstadoDevolucion::EnProceso, EstadoDevolucion::Completada),
            ]
        );
    }

    #[test]
    fn test_illegal_transition_leaves_record_untouched() {
        let (_tmp, store, cliente) = setup();
        let dev = nueva_devolucion(&store, &cliente);
        let engine = WorkflowEngine::new(&store, None);

        let err = engine
            .apply_transition::<Devolucion>(
                dev.id(),
                EstadoDevolucion::Completada,
                Some("ana"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
        let msg = err.to_string();
        assert!(msg.contains("APROBADA"), "error lists legal next states: {msg}");
        assert!(msg.contains("RECHAZADA"));

        let on_disk: Devolucion = store.load(dev.id()).unwrap();
        assert_eq!(on_disk.estado, EstadoDevolucion::Pendiente);
        assert!(on_disk.historial_estados.is_empty());
    }

    #[test]
    fn test_tampered_status_is_rejected_as_data_integrity() {
        let (_tmp, store, cliente) = setup();
        let dev = nueva_devolucion(&store, &cliente);
        let engine = WorkflowEngine::new(&store, None);

        // Hand-edit the file so estado disagrees with the (empty) history
        let path = store.path_for(dev.id());
        let tampered = std::fs::read_to_string(&path)
            .unwrap()
            .replace("estado: PENDIENTE", "estado: APROBADA");
        std::fs::write(&path, &tampered).unwrap();

        // EN_PROCESO would be legal from APROBADA, but the record must be
        // refused before the transition table is even consulted
        let err = engine
            .apply_transition::<Devolucion>(
                dev.id(),
                EstadoDevolucion::EnProceso,
                Some("ana"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::DataIntegrity { .. }));

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, tampered, "corrupt record must not be rewritten");
    }

    #[test]
    fn test_terminal_records_reject_further_transitions() {
        let (_tmp, store, cliente) = setup();
        let dev = nueva_devolucion(&store, &cliente);
        let engine = WorkflowEngine::new(&store, None);

        engine
            .apply_transition::<Devolucion>(dev.id(), EstadoDevolucion::Rechazada, Some("ana"), None)
            .unwrap();

        let err = engine
            .apply_transition::<Devolucion>(
                dev.id(),
                EstadoDevolucion::EnProceso,
                Some("ana"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::AlreadyTerminal { .. }));
    }

    #[test]
    fn test_stale_snapshot_conflicts() {
        let (_tmp, store, cliente) = setup();
        let dev = nueva_devolucion(&store, &cliente);
        let engine = WorkflowEngine::new(&store, None);

        // First caller wins from the PENDIENTE snapshot
        engine
            .apply_transition_from::<Devolucion>(
                dev.id(),
                EstadoDevolucion::Pendiente,
                EstadoDevolucion::Aprobada,
                Some("ana"),
                None,
            )
            .unwrap();

        // Second caller still holds the PENDIENTE snapshot and wants the
        // mutually exclusive outcome; re-validation cannot save it
        let err = engine
            .apply_transition_from::<Devolucion>(
                dev.id(),
                EstadoDevolucion::Pendiente,
                EstadoDevolucion::Rechazada,
                Some("ana"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::ConcurrencyConflict { .. }));

        let on_disk: Devolucion = store.load(dev.id()).unwrap();
        assert_eq!(on_disk.estado, EstadoDevolucion::Aprobada);
        assert_eq!(on_disk.historial_estados.len(), 1);
    }

    #[test]
    fn test_stale_snapshot_retries_when_target_still_legal() {
        let (_tmp, store, cliente) = setup();
        let dev = nueva_devolucion(&store, &cliente);
        let engine = WorkflowEngine::new(&store, None);

        engine
            .apply_transition::<Devolucion>(dev.id(), EstadoDevolucion::Aprobada, Some("ana"), None)
            .unwrap();

        // Caller thought the record was still APROBADA→EN_PROCESO pending...
        engine
            .apply_transition::<Devolucion>(dev.id(), EstadoDevolucion::EnProceso, Some("ana"), None)
            .unwrap();

        // ...and asks for COMPLETADA from the stale APROBADA snapshot. The
        // engine re-validates against EN_PROCESO, where COMPLETADA is legal.
        let dev: Devolucion = engine
            .apply_transition_from(
                dev.id(),
                EstadoDevolucion::Aprobada,
                EstadoDevolucion::Completada,
                Some("ana"),
                None,
            )
            .unwrap();
        assert_eq!(dev.estado, EstadoDevolucion::Completada);
    }

    #[test]
    fn test_roster_authorization() {
        let (_tmp, store, cliente) = setup();
        let dev = nueva_devolucion(&store, &cliente);

        let mut roster = TeamRoster::default();
        roster.members.push(TeamMember {
            nombre: "Ana Díaz".to_string(),
            email: "ana@example.com".to_string(),
            usuario: "ana".to_string(),
            roles: vec![Role::Ventas],
            activo: true,
        });
        roster.members.push(TeamMember {
            nombre: "Beto Sol".to_string(),
            email: "beto@example.com".to_string(),
            usuario: "beto".to_string(),
            roles: vec![Role::Taller],
            activo: true,
        });

        let engine = WorkflowEngine::new(&store, Some(roster));

        // Returns need the ventas role
        let err = engine
            .apply_transition::<Devolucion>(
                dev.id(),
                EstadoDevolucion::Aprobada,
                Some("beto"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::Unauthorized { .. }));

        engine
            .apply_transition::<Devolucion>(dev.id(), EstadoDevolucion::Aprobada, Some("ana"), None)
            .unwrap();
    }

    #[test]
    fn test_cancel_from_any_nonterminal_advisory_state() {
        let (_tmp, store, cliente) = setup();
        let engine = WorkflowEngine::new(&store, None);

        for path in [
            vec![],
            vec![EstadoAsesoria::Programada],
            vec![EstadoAsesoria::Programada, EstadoAsesoria::EnProceso],
        ] {
            let ase = Asesoria::new(
                cliente.id().clone(),
                "financiamiento".to_string(),
                "Opciones de crédito".to_string(),
            );
            store.create(&ase).unwrap();

            for paso in &path {
                engine
                    .apply_transition::<Asesoria>(ase.id(), *paso, Some("ana"), None)
                    .unwrap();
            }

            let ase: Asesoria = engine
                .apply_transition(ase.id(), EstadoAsesoria::Cancelada, Some("ana"), None)
                .unwrap();
            assert_eq!(ase.estado, EstadoAsesoria::Cancelada);
            assert!(ase.fecha_resolucion().is_some());
        }
    }
}
