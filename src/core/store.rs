//! Entity store: YAML records on disk with atomic writes and per-record locks
//!
//! One record per file under the project's entity directories. All mutation of
//! workflow status goes through the workflow engine; the store only provides
//! load/create/save/delete plus the locking and revision checks the engine
//! relies on.
//!
//! Referential integrity is explicit: reference fields must point at existing
//! records on create/save, and a record that is still referenced by another
//! record cannot be deleted.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;

/// Errors produced by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record already exists: {0}")]
    AlreadyExists(String),

    #[error("ID {id} has prefix {actual}, expected {expected}")]
    PrefixMismatch {
        id: String,
        expected: EntityPrefix,
        actual: EntityPrefix,
    },

    #[error("record {id} references missing record {referenced}")]
    MissingReference { id: String, referenced: String },

    #[error("cannot delete {id}: still referenced by {referrers}")]
    StillReferenced { id: String, referrers: String },

    #[error("revision conflict on {id}: expected {expected}, found {found} on disk")]
    RevisionConflict {
        id: String,
        expected: u32,
        found: u32,
    },

    #[error("failed to parse {path}: {message}")]
    Yaml { path: String, message: String },

    #[error("failed to serialize record {id}: {message}")]
    Serialize { id: String, message: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Handle to a record's advisory lock file. Call [`ItemLock::write`] to take
/// the exclusive lock; the guard borrows this handle, so keep it alive for
/// the whole critical section.
pub struct ItemLock {
    lock: fd_lock::RwLock<File>,
}

impl ItemLock {
    /// Block until the exclusive lock is acquired
    pub fn write(&mut self) -> std::io::Result<fd_lock::RwLockWriteGuard<'_, File>> {
        self.lock.write()
    }
}

/// The entity store over a project directory
pub struct EntityStore {
    project: Project,
}

impl EntityStore {
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Path of the record file for an ID
    pub fn path_for(&self, id: &EntityId) -> PathBuf {
        self.project.entity_path(id)
    }

    pub fn exists(&self, id: &EntityId) -> bool {
        self.path_for(id).exists()
    }

    /// Whether a record with this ID exists, regardless of type
    fn reference_exists(&self, id: &EntityId) -> bool {
        self.exists(id)
    }

    /// Load a typed record by ID
    pub fn load<T: Entity>(&self, id: &EntityId) -> Result<T, StoreError> {
        if id.prefix() != T::PREFIX {
            return Err(StoreError::PrefixMismatch {
                id: id.to_string(),
                expected: T::PREFIX,
                actual: id.prefix(),
            });
        }

        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        serde_yml::from_str(&contents).map_err(|e| StoreError::Yaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Create a new record. Fails if the file already exists or a reference
    /// points at a missing record.
    pub fn create<T: Entity>(&self, item: &T) -> Result<(), StoreError> {
        let path = self.path_for(item.id());
        if path.exists() {
            return Err(StoreError::AlreadyExists(item.id().to_string()));
        }

        self.check_references(item)?;
        self.write_record(item, &path)
    }

    /// Save an existing record, enforcing the optimistic revision check:
    /// the in-memory revision must match the on-disk revision, and is bumped
    /// as part of the write.
    pub fn save<T: Entity>(&self, item: &mut T) -> Result<(), StoreError> {
        let path = self.path_for(item.id());
        if !path.exists() {
            return Err(StoreError::NotFound(item.id().to_string()));
        }

        let on_disk = self.disk_revision(&path)?;
        if on_disk != item.revision() {
            return Err(StoreError::RevisionConflict {
                id: item.id().to_string(),
                expected: item.revision(),
                found: on_disk,
            });
        }

        self.check_references(item)?;
        item.set_revision(on_disk + 1);
        self.write_record(item, &path)
    }

    /// Delete a record, refusing when other records still reference it
    pub fn delete(&self, id: &EntityId) -> Result<(), StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let referrers = self.referenced_by(id)?;
        if !referrers.is_empty() {
            return Err(StoreError::StillReferenced {
                id: id.to_string(),
                referrers: referrers.join(", "),
            });
        }

        fs::remove_file(&path).map_err(|e| StoreError::io(&path, e))
    }

    /// Load every record of a type, skipping files that fail to parse
    /// (they are surfaced by `motordesk cache sync` instead)
    pub fn list<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        let mut items = Vec::new();
        for path in self.project.iter_entity_files(T::PREFIX) {
            let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            if let Ok(item) = serde_yml::from_str::<T>(&contents) {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// IDs of every record with the given prefix
    pub fn list_ids(&self, prefix: EntityPrefix) -> Vec<EntityId> {
        self.project
            .iter_entity_files(prefix)
            .filter_map(|p| {
                let name = p.file_name()?.to_string_lossy().to_string();
                let id_str = name.strip_suffix(".mdk.yaml")?;
                EntityId::parse(id_str).ok()
            })
            .collect()
    }

    /// Acquire the lock handle for a record. The lock file lives under
    /// `.motordesk/locks/` so it never collides with record files.
    pub fn lock_item(&self, id: &EntityId) -> Result<ItemLock, StoreError> {
        let dir = self.project.locks_dir();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let path = dir.join(format!("{}.lock", id));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        Ok(ItemLock {
            lock: fd_lock::RwLock::new(file),
        })
    }

    fn check_references<T: Entity>(&self, item: &T) -> Result<(), StoreError> {
        for referenced in item.references() {
            if !self.reference_exists(&referenced) {
                return Err(StoreError::MissingReference {
                    id: item.id().to_string(),
                    referenced: referenced.to_string(),
                });
            }
        }
        Ok(())
    }

    fn disk_revision(&self, path: &Path) -> Result<u32, StoreError> {
        let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let doc: serde_yml::Value =
            serde_yml::from_str(&contents).map_err(|e| StoreError::Yaml {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(doc
            .get("entity_revision")
            .and_then(|v| v.as_u64())
            .unwrap_or(1) as u32)
    }

    /// Stage to a temp file and rename, so a record write is all-or-nothing
    fn write_record<T: Entity>(&self, item: &T, path: &Path) -> Result<(), StoreError> {
        let contents = serde_yml::to_string(item).map_err(|e| StoreError::Serialize {
            id: item.id().to_string(),
            message: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, contents).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
    }

    /// IDs of records holding a reference to `target`, found by scanning
    /// every record document for the target's ID string
    pub fn referenced_by(&self, target: &EntityId) -> Result<Vec<String>, StoreError> {
        let needle = target.to_string();
        let own_file = format!("{}.mdk.yaml", target);
        let mut referrers = Vec::new();

        for path in self.project.iter_all_entity_files() {
            if path
                .file_name()
                .map(|n| n.to_string_lossy() == own_file.as_str())
                .unwrap_or(false)
            {
                continue;
            }

            let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            let Ok(doc) = serde_yml::from_str::<serde_yml::Value>(&contents) else {
                continue;
            };
            if yaml_mentions(&doc, &needle) {
                if let Some(id) = doc.get("id").and_then(|v| v.as_str()) {
                    referrers.push(id.to_string());
                }
            }
        }

        Ok(referrers)
    }
}

fn yaml_mentions(value: &serde_yml::Value, needle: &str) -> bool {
    match value {
        serde_yml::Value::String(s) => s == needle,
        serde_yml::Value::Sequence(seq) => seq.iter().any(|v| yaml_mentions(v, needle)),
        serde_yml::Value::Mapping(map) => map.values().any(|v| yaml_mentions(v, needle)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::carro::{Carro, Combustible, Condicion, Transmision};
    use crate::entities::cliente::Cliente;
    use crate::entities::reparacion::Reparacion;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, EntityStore) {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        (tmp, EntityStore::new(project))
    }

    fn carro() -> Carro {
        Carro::new(
            "Toyota".to_string(),
            "Corolla".to_string(),
            2021,
            18500.0,
            Transmision::Automatica,
            Combustible::Gasolina,
            Condicion::Usado,
        )
    }

    #[test]
    fn test_create_load_roundtrip() {
        let (_tmp, store) = store();
        let car = carro();
        store.create(&car).unwrap();

        let loaded: Carro = store.load(car.id()).unwrap();
        assert_eq!(loaded.marca, "Toyota");
        assert_eq!(loaded.revision(), 1);
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let (_tmp, store) = store();
        let car = carro();
        store.create(&car).unwrap();
        assert!(matches!(
            store.create(&car),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_load_wrong_prefix() {
        let (_tmp, store) = store();
        let car = carro();
        store.create(&car).unwrap();

        let err = store.load::<Reparacion>(car.id()).unwrap_err();
        assert!(matches!(err, StoreError::PrefixMismatch { .. }));
    }

    #[test]
    fn test_save_bumps_revision_and_detects_conflict() {
        let (_tmp, store) = store();
        let car = carro();
        store.create(&car).unwrap();

        let mut first: Carro = store.load(car.id()).unwrap();
        let mut second: Carro = store.load(car.id()).unwrap();

        first.kilometraje = 42_000;
        store.save(&mut first).unwrap();
        assert_eq!(first.revision(), 2);

        second.kilometraje = 50_000;
        let err = store.save(&mut second).unwrap_err();
        assert!(matches!(err, StoreError::RevisionConflict { .. }));
    }

    #[test]
    fn test_create_validates_references() {
        let (_tmp, store) = store();
        let cliente = Cliente::new("Marta Ruiz".to_string(), "marta@example.com".to_string());
        let phantom_car = EntityId::new(EntityPrefix::Car);

        let rep = Reparacion::new(
            cliente.id().clone(),
            phantom_car,
            "No arranca".to_string(),
        );
        let err = store.create(&rep).unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { .. }));
    }

    #[test]
    fn test_delete_refuses_referenced_record() {
        let (_tmp, store) = store();
        let car = carro();
        let cliente = Cliente::new("Marta Ruiz".to_string(), "marta@example.com".to_string());
        store.create(&car).unwrap();
        store.create(&cliente).unwrap();

        let rep = Reparacion::new(
            cliente.id().clone(),
            car.id().clone(),
            "Ruido en el motor".to_string(),
        );
        store.create(&rep).unwrap();

        let err = store.delete(car.id()).unwrap_err();
        assert!(matches!(err, StoreError::StillReferenced { .. }));

        // Removing the referrer makes the delete legal
        store.delete(rep.id()).unwrap();
        store.delete(car.id()).unwrap();
        assert!(!store.exists(car.id()));
    }

    #[test]
    fn test_list_ids() {
        let (_tmp, store) = store();
        let a = carro();
        let b = carro();
        store.create(&a).unwrap();
        store.create(&b).unwrap();

        let ids = store.list_ids(EntityPrefix::Car);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(a.id()));
        assert!(ids.contains(b.id()));
    }
}
