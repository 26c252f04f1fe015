//! Record identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Record type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Vehicle in inventory
    Car,
    /// Spare part
    Pza,
    /// Accessory
    Acc,
    /// Customer
    Cli,
    /// Employee
    Emp,
    /// Catalog service (repair shop offering)
    Srv,
    /// Repair order
    Rep,
    /// Return request
    Dev,
    /// Advisory session
    Ase,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Car => "CAR",
            EntityPrefix::Pza => "PZA",
            EntityPrefix::Acc => "ACC",
            EntityPrefix::Cli => "CLI",
            EntityPrefix::Emp => "EMP",
            EntityPrefix::Srv => "SRV",
            EntityPrefix::Rep => "REP",
            EntityPrefix::Dev => "DEV",
            EntityPrefix::Ase => "ASE",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Car,
            EntityPrefix::Pza,
            EntityPrefix::Acc,
            EntityPrefix::Cli,
            EntityPrefix::Emp,
            EntityPrefix::Srv,
            EntityPrefix::Rep,
            EntityPrefix::Dev,
            EntityPrefix::Ase,
        ]
    }

    /// The workflow prefixes: records that carry a status machine
    pub fn workflows() -> &'static [EntityPrefix] {
        &[EntityPrefix::Rep, EntityPrefix::Dev, EntityPrefix::Ase]
    }

    /// Whether records of this prefix carry a status workflow
    pub fn is_workflow(&self) -> bool {
        Self::workflows().contains(self)
    }

    /// Try to determine the prefix from a filename like "REP-xxx.mdk.yaml"
    pub fn from_filename(filename: &str) -> Option<Self> {
        let upper = filename.to_uppercase();
        for prefix in Self::all() {
            if upper.starts_with(&format!("{}-", prefix.as_str())) {
                return Some(*prefix);
            }
        }
        None
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CAR" => Ok(EntityPrefix::Car),
            "PZA" => Ok(EntityPrefix::Pza),
            "ACC" => Ok(EntityPrefix::Acc),
            "CLI" => Ok(EntityPrefix::Cli),
            "EMP" => Ok(EntityPrefix::Emp),
            "SRV" => Ok(EntityPrefix::Srv),
            "REP" => Ok(EntityPrefix::Rep),
            "DEV" => Ok(EntityPrefix::Dev),
            "ASE" => Ok(EntityPrefix::Ase),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique record identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Create an EntityId from a prefix and existing ULID
    pub fn from_parts(prefix: EntityPrefix, ulid: Ulid) -> Self {
        Self { prefix, ulid }
    }

    /// Get the record prefix
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: CAR, PZA, ACC, CLI, EMP, SRV, REP, DEV, ASE)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in record ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityPrefix::Rep);
        assert!(id.to_string().starts_with("REP-"));
        assert_eq!(id.to_string().len(), 30); // REP- (4) + ULID (26) = 30
    }

    #[test]
    fn test_entity_id_roundtrip() {
        let original = EntityId::new(EntityPrefix::Dev);
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
        assert_eq!(parsed.prefix(), EntityPrefix::Dev);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0UVWXY").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("REP01HQ3K4N5M6P7R8S9T0UVWXY").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("REP-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_all_prefixes_parse() {
        for prefix in EntityPrefix::all() {
            let id = EntityId::new(*prefix);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.prefix(), *prefix);
        }
    }

    #[test]
    fn test_workflow_prefixes() {
        assert!(EntityPrefix::Rep.is_workflow());
        assert!(EntityPrefix::Dev.is_workflow());
        assert!(EntityPrefix::Ase.is_workflow());
        assert!(!EntityPrefix::Car.is_workflow());
        assert!(!EntityPrefix::Cli.is_workflow());
    }
}
