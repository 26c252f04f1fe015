//! Core module - fundamental types and utilities

pub mod cache;
pub mod config;
pub mod derived;
pub mod entity;
pub mod history;
pub mod identity;
pub mod project;
pub mod shortid;
pub mod store;
pub mod team;
pub mod workflow;

pub use cache::{CacheStats, CachedEntity, EntityCache, EntityFilter, SyncStats};
pub use config::Config;
pub use entity::Entity;
pub use history::{History, StatusChange};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
pub use shortid::ShortIdIndex;
pub use store::{EntityStore, ItemLock, StoreError};
pub use team::{Role, TeamError, TeamMember, TeamRoster};
pub use workflow::{TransitionError, WorkflowEngine, WorkflowItem, WorkflowStatus};
