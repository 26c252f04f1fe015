//! Read-only JSON read-model over the workflow records
//!
//! Builds `serde_json::Value` documents with the Spanish wire field names so
//! external consumers (scripts, dashboards) see the same contract the records
//! carry on disk, enriched with derived fields the YAML does not store.

use serde_json::{json, Value};

use crate::core::derived;
use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::store::{EntityStore, StoreError};
use crate::core::workflow::{TransitionError, WorkflowItem, WorkflowStatus};
use crate::entities::{Asesoria, Devolucion, Reparacion};

/// The three workflow families exposed by the read-model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Reparacion,
    Devolucion,
    Asesoria,
}

impl WorkflowKind {
    pub fn prefix(self) -> EntityPrefix {
        match self {
            WorkflowKind::Reparacion => EntityPrefix::Rep,
            WorkflowKind::Devolucion => EntityPrefix::Dev,
            WorkflowKind::Asesoria => EntityPrefix::Ase,
        }
    }

    pub fn from_prefix(prefix: EntityPrefix) -> Option<Self> {
        match prefix {
            EntityPrefix::Rep => Some(WorkflowKind::Reparacion),
            EntityPrefix::Dev => Some(WorkflowKind::Devolucion),
            EntityPrefix::Ase => Some(WorkflowKind::Asesoria),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowKind::Reparacion => "reparacion",
            WorkflowKind::Devolucion => "devolucion",
            WorkflowKind::Asesoria => "asesoria",
        }
    }

    pub fn all() -> &'static [WorkflowKind] {
        &[
            WorkflowKind::Reparacion,
            WorkflowKind::Devolucion,
            WorkflowKind::Asesoria,
        ]
    }
}

impl std::str::FromStr for WorkflowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rep" | "reparacion" | "reparación" => Ok(WorkflowKind::Reparacion),
            "dev" | "devolucion" | "devolución" => Ok(WorkflowKind::Devolucion),
            "ase" | "asesoria" | "asesoría" => Ok(WorkflowKind::Asesoria),
            _ => Err(format!(
                "invalid workflow kind: {}. Use rep, dev, or ase",
                s
            )),
        }
    }
}

/// Summary rows for every workflow item, newest first, optionally filtered
/// to a single kind
pub fn workflow_items(
    store: &EntityStore,
    kind: Option<WorkflowKind>,
) -> Result<Vec<Value>, TransitionError> {
    let mut rows = Vec::new();

    for k in WorkflowKind::all() {
        if kind.is_some() && kind != Some(*k) {
            continue;
        }
        match k {
            WorkflowKind::Reparacion => collect_rows::<Reparacion>(store, *k, &mut rows)?,
            WorkflowKind::Devolucion => collect_rows::<Devolucion>(store, *k, &mut rows)?,
            WorkflowKind::Asesoria => collect_rows::<Asesoria>(store, *k, &mut rows)?,
        }
    }

    rows.sort_by(|a, b| {
        let fa = a["fecha_solicitud"].as_str().unwrap_or("");
        let fb = b["fecha_solicitud"].as_str().unwrap_or("");
        fb.cmp(fa)
    });

    Ok(rows)
}

fn collect_rows<T: WorkflowItem>(
    store: &EntityStore,
    kind: WorkflowKind,
    rows: &mut Vec<Value>,
) -> Result<(), TransitionError> {
    for item in store.list::<T>()? {
        rows.push(json!({
            "id": item.id().to_string(),
            "tipo": kind.as_str(),
            "estado": item.estado().to_string(),
            "resumen": item.summary(),
            "fecha_solicitud": item.created(),
            "fecha_resolucion": item.fecha_resolucion(),
            "terminal": item.estado().is_terminal(),
        }));
    }
    Ok(())
}

/// The full document for one workflow item: the record itself plus the
/// audit history (descending), the derived duration, and the legal next
/// states
pub fn workflow_item_detail(store: &EntityStore, id: &EntityId) -> Result<Value, TransitionError> {
    match WorkflowKind::from_prefix(id.prefix()) {
        Some(WorkflowKind::Reparacion) => item_doc::<Reparacion>(store, id),
        Some(WorkflowKind::Devolucion) => item_doc::<Devolucion>(store, id),
        Some(WorkflowKind::Asesoria) => item_doc::<Asesoria>(store, id),
        None => Err(TransitionError::NotFound(id.to_string())),
    }
}

fn item_doc<T: WorkflowItem>(store: &EntityStore, id: &EntityId) -> Result<Value, TransitionError> {
    let item: T = match store.load(id) {
        Ok(item) => item,
        Err(StoreError::NotFound(id)) => return Err(TransitionError::NotFound(id)),
        Err(e) => return Err(e.into()),
    };

    let mut doc = serde_json::to_value(&item).map_err(|e| TransitionError::DataIntegrity {
        id: id.to_string(),
        message: e.to_string(),
    })?;

    let historial: Vec<Value> = item
        .history()
        .latest_first()
        .map(|c| {
            json!({
                "id": c.id,
                "estado_anterior": c.estado_anterior.to_string(),
                "estado_nuevo": c.estado_nuevo.to_string(),
                "fecha_cambio": c.fecha_cambio,
                "usuario": c.usuario,
                "notas": c.notas,
            })
        })
        .collect();

    let duracion = derived::resolved_duration(&item)?.map(|d| d.num_minutes());
    let siguientes: Vec<String> = item
        .estado()
        .next_states()
        .iter()
        .map(|s| s.to_string())
        .collect();

    if let Some(obj) = doc.as_object_mut() {
        obj.insert("historial_estados".to_string(), Value::Array(historial));
        obj.insert("duracion_real_min".to_string(), json!(duracion));
        obj.insert("estados_siguientes".to_string(), json!(siguientes));
        obj.insert("terminal".to_string(), json!(item.estado().is_terminal()));
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::Project;
    use crate::core::workflow::WorkflowEngine;
    use crate::entities::cliente::Cliente;
    use crate::entities::devolucion::{EstadoDevolucion, TipoDevolucion};
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, EntityStore, Devolucion) {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let store = EntityStore::new(project);

        let cliente = Cliente::new("Nora Lima".to_string(), "nora@example.com".to_string());
        store.create(&cliente).unwrap();

        let dev = Devolucion::new(
            cliente.id().clone(),
            TipoDevolucion::Servicio,
            "Servicio incompleto".to_string(),
        );
        store.create(&dev).unwrap();
        (tmp, store, dev)
    }

    #[test]
    fn test_items_listing_carries_wire_fields() {
        let (_tmp, store, dev) = setup();

        let rows = workflow_items(&store, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], dev.id().to_string());
        assert_eq!(rows[0]["tipo"], "devolucion");
        assert_eq!(rows[0]["estado"], "PENDIENTE");
        assert_eq!(rows[0]["terminal"], false);
    }

    #[test]
    fn test_items_filter_by_kind() {
        let (_tmp, store, _dev) = setup();

        let reps = workflow_items(&store, Some(WorkflowKind::Reparacion)).unwrap();
        assert!(reps.is_empty());

        let devs = workflow_items(&store, Some(WorkflowKind::Devolucion)).unwrap();
        assert_eq!(devs.len(), 1);
    }

    #[test]
    fn test_detail_includes_history_and_next_states() {
        let (_tmp, store, dev) = setup();

        let engine = WorkflowEngine::new(&store, None);
        engine
            .apply_transition::<Devolucion>(
                dev.id(),
                EstadoDevolucion::Aprobada,
                Some("ana"),
                Some("cliente con factura"),
            )
            .unwrap();

        let doc = workflow_item_detail(&store, dev.id()).unwrap();
        assert_eq!(doc["estado"], "APROBADA");
        assert_eq!(doc["estados_siguientes"], json!(["EN_PROCESO"]));

        let historial = doc["historial_estados"].as_array().unwrap();
        assert_eq!(historial.len(), 1);
        assert_eq!(historial[0]["estado_nuevo"], "APROBADA");
        assert_eq!(historial[0]["usuario"], "ana");
    }

    #[test]
    fn test_detail_of_missing_record() {
        let (_tmp, store, _dev) = setup();
        let phantom = EntityId::new(EntityPrefix::Rep);

        let err = workflow_item_detail(&store, &phantom).unwrap_err();
        assert!(matches!(err, TransitionError::NotFound(_)));
    }
}
