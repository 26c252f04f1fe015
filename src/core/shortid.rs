//! Short ID aliases for easier record selection
//!
//! Provides numeric aliases like `@1`, `@2` that map to full record IDs.
//! The index is rebuilt whenever records are listed, so the numbers always
//! match the most recent listing.

use std::collections::HashMap;
use std::fs;

use crate::core::identity::EntityId;
use crate::core::project::Project;

const INDEX_FILE: &str = ".motordesk/shortids.json";

/// A mapping of short IDs (@N) to full record IDs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Maps short number to full record ID string
    entries: HashMap<u32, String>,
    /// Reverse lookup, rebuilt on load
    #[serde(skip)]
    reverse: HashMap<String, u32>,
    next_id: u32,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            reverse: HashMap::new(),
            next_id: 1,
        }
    }

    /// Load the index from a project, or create empty if not found
    pub fn load(project: &Project) -> Self {
        let path = project.root().join(INDEX_FILE);
        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(mut index) = serde_json::from_str::<ShortIdIndex>(&content) {
                    index.reverse = index
                        .entries
                        .iter()
                        .map(|(k, v)| (v.clone(), *k))
                        .collect();
                    return index;
                }
            }
        }
        Self::new()
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.root().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Clear and rebuild the index with the IDs of a fresh listing
    pub fn rebuild(&mut self, ids: impl IntoIterator<Item = String>) {
        self.entries.clear();
        self.reverse.clear();
        self.next_id = 1;

        for id in ids {
            self.add(id);
        }
    }

    /// Add a record ID and return its short number
    pub fn add(&mut self, id: String) -> u32 {
        if let Some(&short_id) = self.reverse.get(&id) {
            return short_id;
        }

        let short_id = self.next_id;
        self.next_id += 1;
        self.entries.insert(short_id, id.clone());
        self.reverse.insert(id, short_id);
        short_id
    }

    /// Resolve a reference to a full record ID
    ///
    /// Accepts `@N`, a plain number, or a full/partial record ID (passed
    /// through for fragment matching by the caller).
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let num_str = if let Some(rest) = reference.strip_prefix('@') {
            rest
        } else if reference.chars().all(|c| c.is_ascii_digit()) && !reference.is_empty() {
            reference
        } else {
            return Some(reference.to_string());
        };

        num_str
            .parse::<u32>()
            .ok()
            .and_then(|n| self.entries.get(&n).cloned())
    }

    pub fn get_short_id(&self, id: &str) -> Option<u32> {
        self.reverse.get(id).copied()
    }

    /// Format a record ID with its short alias column
    pub fn format_with_short_id(&self, id: &EntityId) -> String {
        let id_str = id.to_string();
        if let Some(short_id) = self.reverse.get(&id_str) {
            format!("@{:<3} {}", short_id, id_str)
        } else {
            format!("     {}", id_str)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_resolve() {
        let mut index = ShortIdIndex::new();

        assert_eq!(index.add("REP-01ABC".to_string()), 1);
        assert_eq!(index.add("DEV-02DEF".to_string()), 2);

        assert_eq!(index.resolve("@1"), Some("REP-01ABC".to_string()));
        assert_eq!(index.resolve("2"), Some("DEV-02DEF".to_string()));
        assert_eq!(index.resolve("@99"), None);
    }

    #[test]
    fn test_non_numeric_references_pass_through() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("REP-01ABC"), Some("REP-01ABC".to_string()));
        assert_eq!(index.resolve("01ABC"), Some("01ABC".to_string()));
    }

    #[test]
    fn test_rebuild_resets_numbering() {
        let mut index = ShortIdIndex::new();
        index.add("REP-AAA".to_string());
        index.add("REP-BBB".to_string());

        index.rebuild(vec!["DEV-CCC".to_string(), "DEV-DDD".to_string()]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("@1"), Some("DEV-CCC".to_string()));
        assert_eq!(index.resolve("@2"), Some("DEV-DDD".to_string()));
    }

    #[test]
    fn test_same_id_keeps_same_alias() {
        let mut index = ShortIdIndex::new();
        let a = index.add("REP-AAA".to_string());
        let b = index.add("REP-AAA".to_string());
        assert_eq!(a, b);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_persists_across_load() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let mut index = ShortIdIndex::new();
        index.add("ASE-XYZ".to_string());
        index.save(&project).unwrap();

        let loaded = ShortIdIndex::load(&project);
        assert_eq!(loaded.resolve("@1"), Some("ASE-XYZ".to_string()));
        assert_eq!(loaded.get_short_id("ASE-XYZ"), Some(1));
    }
}
