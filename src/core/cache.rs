//! SQLite-backed record cache for fast listings and dashboards
//!
//! The cache holds one row per record file with the metadata the CLI needs
//! for listings and status counts, detects file changes via mtime and content
//! hash, and syncs incrementally. It is user-local and gitignored; the YAML
//! files remain the source of truth.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use miette::{IntoDiagnostic, Result};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::core::identity::EntityPrefix;
use crate::core::project::Project;

/// Cache file location within a project
const CACHE_FILE: &str = ".motordesk/cache.db";

const SCHEMA_VERSION: i32 = 1;

/// The record cache backed by SQLite
pub struct EntityCache {
    conn: Connection,
    project_root: PathBuf,
}

/// Cached record metadata (fast access without YAML parsing)
#[derive(Debug, Clone)]
pub struct CachedEntity {
    pub id: String,
    pub prefix: String,
    pub summary: String,
    pub estado: Option<String>,
    pub created: DateTime<Utc>,
    pub file_path: PathBuf,
}

/// Statistics from a sync operation
#[derive(Debug, Default)]
pub struct SyncStats {
    pub files_scanned: usize,
    pub entities_added: usize,
    pub entities_updated: usize,
    pub entities_removed: usize,
    pub duration_ms: u64,
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    pub total_entities: usize,
    pub by_prefix: HashMap<String, usize>,
    pub db_size_bytes: u64,
}

/// Filter for listing cached records
#[derive(Debug, Default)]
pub struct EntityFilter {
    pub prefix: Option<EntityPrefix>,
    pub estado: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl EntityCache {
    /// Open or create the cache for a project
    ///
    /// A missing cache is created and populated; a stale one (files changed
    /// on disk) is synced automatically.
    pub fn open(project: &Project) -> Result<Self> {
        let cache_path = project.root().join(CACHE_FILE);

        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }

        let needs_init = !cache_path.exists();
        let conn = Connection::open(&cache_path).into_diagnostic()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .into_diagnostic()?;

        let mut cache = Self {
            conn,
            project_root: project.root().to_path_buf(),
        };

        if needs_init {
            cache.init_schema()?;
            cache.rebuild()?;
        } else {
            cache.check_schema()?;
            cache.auto_sync()?;
        }

        Ok(cache)
    }

    /// Open without auto-sync (for testing)
    pub fn open_without_sync(project: &Project) -> Result<Self> {
        let cache_path = project.root().join(CACHE_FILE);

        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }

        let needs_init = !cache_path.exists();
        let conn = Connection::open(&cache_path).into_diagnostic()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .into_diagnostic()?;

        let mut cache = Self {
            conn,
            project_root: project.root().to_path_buf(),
        };

        if needs_init {
            cache.init_schema()?;
        }

        Ok(cache)
    }

    fn init_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS entities (
                id TEXT PRIMARY KEY,
                prefix TEXT NOT NULL,
                summary TEXT NOT NULL,
                estado TEXT,
                created TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_mtime INTEGER NOT NULL,
                file_hash TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_entities_prefix ON entities(prefix);
            CREATE INDEX IF NOT EXISTS idx_entities_estado ON entities(estado);
            CREATE INDEX IF NOT EXISTS idx_entities_file_path ON entities(file_path);
            "#,
            )
            .into_diagnostic()?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .into_diagnostic()?;

        Ok(())
    }

    fn check_schema(&mut self) -> Result<()> {
        let version: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()
            .unwrap_or(None);

        if version != Some(SCHEMA_VERSION) {
            // Old or unreadable schema: drop and rebuild from the YAML files
            self.conn
                .execute_batch(
                    r#"
                DROP TABLE IF EXISTS entities;
                DROP TABLE IF EXISTS schema_version;
                "#,
                )
                .into_diagnostic()?;
            self.init_schema()?;
            self.rebuild()?;
        }

        Ok(())
    }

    fn auto_sync(&mut self) -> Result<()> {
        let cached_max_mtime: Option<i64> = self
            .conn
            .query_row("SELECT MAX(file_mtime) FROM entities", [], |row| row.get(0))
            .optional()
            .into_diagnostic()?
            .flatten();

        if self.has_newer_files(cached_max_mtime.unwrap_or(0))? {
            self.sync()?;
        }

        Ok(())
    }

    fn has_newer_files(&self, max_cached_mtime: i64) -> Result<bool> {
        let mut actual_count = 0i64;

        for prefix in EntityPrefix::all() {
            let dir = self.project_root.join(Project::entity_directory(*prefix));
            if !dir.exists() {
                continue;
            }

            for entry in WalkDir::new(&dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let path = entry.path();
                if !path.to_string_lossy().ends_with(".mdk.yaml") {
                    continue;
                }
                actual_count += 1;

                if get_file_mtime(path)? > max_cached_mtime {
                    return Ok(true);
                }
            }
        }

        let cached_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
            .into_diagnostic()?;

        Ok(actual_count != cached_count)
    }

    /// Clear and repopulate the cache from every record file
    pub fn rebuild(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();

        self.conn
            .execute("DELETE FROM entities", [])
            .into_diagnostic()?;

        for prefix in EntityPrefix::all() {
            let dir = self.project_root.join(Project::entity_directory(*prefix));
            if dir.exists() {
                self.scan_directory(&dir, &mut stats)?;
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }

    fn scan_directory(&mut self, dir: &Path, stats: &mut SyncStats) -> Result<()> {
        for entry in WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !path.to_string_lossy().ends_with(".mdk.yaml") {
                continue;
            }

            stats.files_scanned += 1;

            if let Err(e) = self.cache_entity_file(path) {
                eprintln!("Warning: failed to cache {}: {}", path.display(), e);
            } else {
                stats.entities_added += 1;
            }
        }

        Ok(())
    }

    fn cache_entity_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).into_diagnostic()?;
        let mtime = get_file_mtime(path)?;
        let hash = compute_hash(&content);
        let rel_path = path
            .strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let value: serde_yml::Value = serde_yml::from_str(&content).into_diagnostic()?;

        let id = value["id"]
            .as_str()
            .ok_or_else(|| miette::miette!("missing 'id' field"))?;
        let prefix = id
            .split('-')
            .next()
            .ok_or_else(|| miette::miette!("invalid record ID format"))?;

        let summary = extract_summary(&value);
        let estado = value["estado"].as_str();
        let created = value["fecha_solicitud"]
            .as_str()
            .or_else(|| value["fecha_ingreso"].as_str())
            .or_else(|| value["fecha_creacion"].as_str())
            .unwrap_or("");

        self.conn
            .execute(
                r#"INSERT OR REPLACE INTO entities
                   (id, prefix, summary, estado, created, file_path, file_mtime, file_hash)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
                params![id, prefix, summary, estado, created, rel_path, mtime, hash],
            )
            .into_diagnostic()?;

        Ok(())
    }

    /// Incremental sync: add new files, refresh changed ones, drop deleted
    pub fn sync(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();

        let mut current_files: HashMap<String, PathBuf> = HashMap::new();
        for prefix in EntityPrefix::all() {
            let dir = self.project_root.join(Project::entity_directory(*prefix));
            if !dir.exists() {
                continue;
            }
            for entry in WalkDir::new(&dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let path = entry.path();
                if path.to_string_lossy().ends_with(".mdk.yaml") {
                    let rel_path = path
                        .strip_prefix(&self.project_root)
                        .unwrap_or(path)
                        .to_string_lossy()
                        .to_string();
                    current_files.insert(rel_path, path.to_path_buf());
                    stats.files_scanned += 1;
                }
            }
        }

        let mut cached_files: HashMap<String, (i64, String)> = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT file_path, file_mtime, file_hash FROM entities")
                .into_diagnostic()?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .into_diagnostic()?;

            for row in rows {
                let (path, mtime, hash) = row.into_diagnostic()?;
                cached_files.insert(path, (mtime, hash));
            }
        }

        for (rel_path, full_path) in &current_files {
            let needs_update = if let Some((cached_mtime, cached_hash)) = cached_files.get(rel_path)
            {
                let current_mtime = get_file_mtime(full_path)?;
                if current_mtime != *cached_mtime {
                    // mtime changed, verify with hash
                    let content = fs::read_to_string(full_path).into_diagnostic()?;
                    compute_hash(&content) != *cached_hash
                } else {
                    false
                }
            } else {
                true
            };

            if needs_update {
                if cached_files.contains_key(rel_path) {
                    stats.entities_updated += 1;
                } else {
                    stats.entities_added += 1;
                }
                self.cache_entity_file(full_path)?;
            }
        }

        for rel_path in cached_files.keys() {
            if !current_files.contains_key(rel_path) {
                self.conn
                    .execute(
                        "DELETE FROM entities WHERE file_path = ?1",
                        params![rel_path],
                    )
                    .into_diagnostic()?;
                stats.entities_removed += 1;
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }

    /// List cached records matching a filter, newest first
    pub fn list_entities(&self, filter: &EntityFilter) -> Vec<CachedEntity> {
        let mut sql = String::from(
            "SELECT id, prefix, summary, estado, created, file_path FROM entities WHERE 1=1",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(ref prefix) = filter.prefix {
            sql.push_str(" AND prefix = ?");
            params_vec.push(Box::new(prefix.as_str().to_string()));
        }

        if let Some(ref estado) = filter.estado {
            sql.push_str(" AND estado = ?");
            params_vec.push(Box::new(estado.clone()));
        }

        if let Some(ref search) = filter.search {
            sql.push_str(" AND (summary LIKE ? OR id LIKE ?)");
            let pattern = format!("%{}%", search);
            params_vec.push(Box::new(pattern.clone()));
            params_vec.push(Box::new(pattern));
        }

        sql.push_str(" ORDER BY created DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = match self.conn.prepare(&sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let rows = match stmt.query_map(params_refs.as_slice(), |row| {
            Ok(CachedEntity {
                id: row.get(0)?,
                prefix: row.get(1)?,
                summary: row.get(2)?,
                estado: row.get(3)?,
                created: parse_datetime(row.get::<_, String>(4)?),
                file_path: PathBuf::from(row.get::<_, String>(5)?),
            })
        }) {
            Ok(r) => r,
            Err(_) => return vec![],
        };

        rows.filter_map(|r| r.ok()).collect()
    }

    /// Status counts for one workflow, for the dashboard
    pub fn counts_by_estado(&self, prefix: EntityPrefix) -> Result<HashMap<String, usize>> {
        let mut counts = HashMap::new();
        let mut stmt = self
            .conn
            .prepare(
                "SELECT estado, COUNT(*) FROM entities WHERE prefix = ?1 AND estado IS NOT NULL GROUP BY estado",
            )
            .into_diagnostic()?;
        let rows = stmt
            .query_map(params![prefix.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })
            .into_diagnostic()?;

        for row in rows {
            let (estado, count) = row.into_diagnostic()?;
            counts.insert(estado, count);
        }

        Ok(counts)
    }

    pub fn statistics(&self) -> Result<CacheStats> {
        let total_entities: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
            .into_diagnostic()?;

        let mut by_prefix = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT prefix, COUNT(*) FROM entities GROUP BY prefix")
                .into_diagnostic()?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
                })
                .into_diagnostic()?;

            for row in rows {
                let (prefix, count) = row.into_diagnostic()?;
                by_prefix.insert(prefix, count);
            }
        }

        let db_path = self.project_root.join(CACHE_FILE);
        let db_size_bytes = fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

        Ok(CacheStats {
            total_entities,
            by_prefix,
            db_size_bytes,
        })
    }

    /// Clear the entire cache
    pub fn clear(&mut self) -> Result<()> {
        self.conn
            .execute("DELETE FROM entities", [])
            .into_diagnostic()?;
        Ok(())
    }
}

/// Pick a human summary line out of a record's YAML
fn extract_summary(value: &serde_yml::Value) -> String {
    // Workflow records lead with their reason, catalog records with a name
    for key in [
        "descripcion_problema",
        "motivo",
        "tema",
        "nombre",
        "descripcion",
    ] {
        if let Some(s) = value[key].as_str() {
            if !s.is_empty() {
                return s.to_string();
            }
        }
    }

    // Cars are labeled marca + modelo
    if let (Some(marca), Some(modelo)) = (value["marca"].as_str(), value["modelo"].as_str()) {
        return format!("{} {}", marca, modelo);
    }

    String::new()
}

/// Get file modification time as Unix timestamp
fn get_file_mtime(path: &Path) -> Result<i64> {
    let metadata = fs::metadata(path).into_diagnostic()?;
    let mtime = metadata
        .modified()
        .into_diagnostic()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok(mtime)
}

fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Entity;
    use crate::core::store::EntityStore;
    use crate::entities::carro::{Carro, Combustible, Condicion, Transmision};
    use crate::entities::cliente::Cliente;
    use crate::entities::devolucion::{Devolucion, TipoDevolucion};
    use tempfile::tempdir;

    fn seeded_store() -> (tempfile::TempDir, EntityStore) {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let store = EntityStore::new(project);

        let carro = Carro::new(
            "Mazda".to_string(),
            "3".to_string(),
            2022,
            21000.0,
            Transmision::Manual,
            Combustible::Gasolina,
            Condicion::Nuevo,
        );
        store.create(&carro).unwrap();

        let cliente = Cliente::new("Rosa Mena".to_string(), "rosa@example.com".to_string());
        store.create(&cliente).unwrap();

        let dev = Devolucion::new(
            cliente.id().clone(),
            TipoDevolucion::Producto,
            "Accesorio equivocado".to_string(),
        );
        store.create(&dev).unwrap();

        (tmp, store)
    }

    #[test]
    fn test_open_populates_from_files() {
        let (_tmp, store) = seeded_store();
        let cache = EntityCache::open(store.project()).unwrap();

        let stats = cache.statistics().unwrap();
        assert_eq!(stats.total_entities, 3);
        assert_eq!(stats.by_prefix.get("CAR"), Some(&1));
        assert_eq!(stats.by_prefix.get("DEV"), Some(&1));
    }

    #[test]
    fn test_sync_picks_up_new_and_deleted_files() {
        let (_tmp, store) = seeded_store();
        let mut cache = EntityCache::open(store.project()).unwrap();

        let cliente = Cliente::new("Iván Ruiz".to_string(), "ivan@example.com".to_string());
        store.create(&cliente).unwrap();

        let stats = cache.sync().unwrap();
        assert_eq!(stats.entities_added, 1);

        store.delete(cliente.id()).unwrap();
        let stats = cache.sync().unwrap();
        assert_eq!(stats.entities_removed, 1);
    }

    #[test]
    fn test_list_entities_filters_by_prefix_and_estado() {
        let (_tmp, store) = seeded_store();
        let cache = EntityCache::open(store.project()).unwrap();

        let devs = cache.list_entities(&EntityFilter {
            prefix: Some(EntityPrefix::Dev),
            ..Default::default()
        });
        assert_eq!(devs.len(), 1);
        assert_eq!(devs[0].estado.as_deref(), Some("PENDIENTE"));

        let none = cache.list_entities(&EntityFilter {
            prefix: Some(EntityPrefix::Dev),
            estado: Some("COMPLETADA".to_string()),
            ..Default::default()
        });
        assert!(none.is_empty());
    }

    #[test]
    fn test_counts_by_estado() {
        let (_tmp, store) = seeded_store();
        let cache = EntityCache::open(store.project()).unwrap();

        let counts = cache.counts_by_estado(EntityPrefix::Dev).unwrap();
        assert_eq!(counts.get("PENDIENTE"), Some(&1));
    }
}
