//! Append-only audit trail of status transitions
//!
//! Every status change applied by the workflow engine produces exactly one
//! [`StatusChange`] entry. The history is serialized inside the record's YAML
//! as `historial_estados` (field names follow the original wire contract) and
//! exposes no update or delete operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A single recorded status transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange<S> {
    /// Transition ID (ULID, time-ordered)
    pub id: String,

    pub estado_anterior: S,
    pub estado_nuevo: S,
    pub fecha_cambio: DateTime<Utc>,

    /// Actor attributed to the change, as supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

impl<S> StatusChange<S> {
    pub fn new(
        from: S,
        to: S,
        at: DateTime<Utc>,
        usuario: Option<String>,
        notas: Option<String>,
    ) -> Self {
        Self {
            id: Ulid::new().to_string(),
            estado_anterior: from,
            estado_nuevo: to,
            fecha_cambio: at,
            usuario,
            notas,
        }
    }
}

/// Append-only sequence of status changes, oldest first on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History<S> {
    entries: Vec<StatusChange<S>>,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> History<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition. The engine is the only writer.
    pub fn record(&mut self, change: StatusChange<S>) {
        self.entries.push(change);
    }

    /// Ascending by change time, for duration math
    pub fn chronological(&self) -> impl Iterator<Item = &StatusChange<S>> {
        self.entries.iter()
    }

    /// Descending by change time, for display
    pub fn latest_first(&self) -> impl Iterator<Item = &StatusChange<S>> {
        self.entries.iter().rev()
    }

    /// The most recent transition, if any
    pub fn latest(&self) -> Option<&StatusChange<S>> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Copy + PartialEq> History<S> {
    /// Invariant check: the record's current status must equal the latest
    /// entry's `estado_nuevo`, or the workflow's initial status when the
    /// history is empty.
    pub fn is_consistent_with(&self, current: S, initial: S) -> bool {
        match self.latest() {
            Some(change) => change.estado_nuevo == current,
            None => current == initial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(from: &'static str, to: &'static str) -> StatusChange<&'static str> {
        StatusChange::new(from, to, Utc::now(), Some("ana".to_string()), None)
    }

    #[test]
    fn test_record_appends_in_order() {
        let mut history = History::new();
        history.record(change("PENDIENTE", "APROBADA"));
        history.record(change("APROBADA", "EN_PROCESO"));

        assert_eq!(history.len(), 2);
        let ordered: Vec<_> = history.chronological().map(|c| c.estado_nuevo).collect();
        assert_eq!(ordered, vec!["APROBADA", "EN_PROCESO"]);
        let display: Vec<_> = history.latest_first().map(|c| c.estado_nuevo).collect();
        assert_eq!(display, vec!["EN_PROCESO", "APROBADA"]);
    }

    #[test]
    fn test_consistency_check() {
        let mut history = History::new();
        assert!(history.is_consistent_with("PENDIENTE", "PENDIENTE"));
        assert!(!history.is_consistent_with("APROBADA", "PENDIENTE"));

        history.record(change("PENDIENTE", "APROBADA"));
        assert!(history.is_consistent_with("APROBADA", "PENDIENTE"));
        assert!(!history.is_consistent_with("PENDIENTE", "PENDIENTE"));
    }

    #[test]
    fn test_serialized_as_plain_list() {
        let mut history = History::new();
        history.record(change("PENDIENTE", "APROBADA"));

        let yaml = serde_yml::to_string(&history).unwrap();
        assert!(yaml.contains("estado_anterior: PENDIENTE"));
        assert!(yaml.contains("estado_nuevo: APROBADA"));
        assert!(yaml.contains("usuario: ana"));
    }
}
