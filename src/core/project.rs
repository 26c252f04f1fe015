//! Project discovery and directory layout

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Represents a Motordesk project (a dealership back office on disk)
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .motordesk/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(".motordesk").is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let motordesk_dir = root.join(".motordesk");
        if motordesk_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(motordesk_dir.join("locks"))
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = motordesk_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Self::create_entity_dirs(&root)?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Motordesk project configuration

# Acting user attributed to new records and status transitions
# author: ""

# Editor for `motordesk <entity> edit` (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, tsv, json, csv, id)
# default_format: auto
"#
    }

    fn create_entity_dirs(root: &Path) -> Result<(), ProjectError> {
        for prefix in EntityPrefix::all() {
            std::fs::create_dir_all(root.join(Self::entity_directory(*prefix)))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }
        Ok(())
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .motordesk configuration directory
    pub fn motordesk_dir(&self) -> PathBuf {
        self.root.join(".motordesk")
    }

    /// Directory holding per-record lock files
    pub fn locks_dir(&self) -> PathBuf {
        self.motordesk_dir().join("locks")
    }

    /// Get the path for a record file
    pub fn entity_path(&self, id: &EntityId) -> PathBuf {
        self.root
            .join(Self::entity_directory(id.prefix()))
            .join(format!("{}.mdk.yaml", id))
    }

    /// Get the directory for a given record prefix
    pub fn entity_directory(prefix: EntityPrefix) -> &'static str {
        match prefix {
            EntityPrefix::Car => "inventario/carros",
            EntityPrefix::Pza => "inventario/piezas",
            EntityPrefix::Acc => "inventario/accesorios",
            EntityPrefix::Cli => "personas/clientes",
            EntityPrefix::Emp => "personas/empleados",
            EntityPrefix::Srv => "servicios",
            EntityPrefix::Rep => "reparaciones",
            EntityPrefix::Dev => "devoluciones",
            EntityPrefix::Ase => "asesorias",
        }
    }

    /// Iterate all record files of a given prefix type
    pub fn iter_entity_files(&self, prefix: EntityPrefix) -> impl Iterator<Item = PathBuf> {
        let dir = self.root.join(Self::entity_directory(prefix));
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(".mdk.yaml"))
            .map(|e| e.path().to_path_buf())
    }

    /// Iterate record files of every prefix
    pub fn iter_all_entity_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        EntityPrefix::all()
            .iter()
            .flat_map(move |p| self.iter_entity_files(*p))
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a Motordesk project (searched from {searched_from:?}). Run 'motordesk init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("Motordesk project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.motordesk_dir().exists());
        assert!(project.motordesk_dir().join("config.yaml").exists());
        assert!(project.locks_dir().is_dir());
        assert!(project.root().join("inventario/carros").is_dir());
        assert!(project.root().join("reparaciones").is_dir());
        assert!(project.root().join("devoluciones").is_dir());
        assert!(project.root().join("asesorias").is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_finds_marker_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_entity_path_uses_prefix_directory() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = EntityId::new(EntityPrefix::Rep);

        let path = project.entity_path(&id);
        assert!(path.to_string_lossy().contains("reparaciones"));
        assert!(path.to_string_lossy().ends_with(".mdk.yaml"));
    }
}
