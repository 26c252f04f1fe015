//! Entity trait - common interface for all record types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all Motordesk records
pub trait Entity: Serialize + DeserializeOwned {
    /// The record type prefix (e.g. REP, CAR)
    const PREFIX: EntityPrefix;

    /// Get the record's unique ID
    fn id(&self) -> &EntityId;

    /// One-line human summary for listings
    fn summary(&self) -> String;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Optimistic-concurrency revision counter
    fn revision(&self) -> u32;

    /// Set the revision counter (bumped by the store on save)
    fn set_revision(&mut self, revision: u32);

    /// Outgoing references to other records. Validated on create/save;
    /// a referenced record cannot be deleted.
    fn references(&self) -> Vec<EntityId> {
        Vec::new()
    }
}

pub(crate) fn default_revision() -> u32 {
    1
}
