//! Motordesk: car-dealership back office on plain text files
//!
//! Inventory, people and service workflows live as YAML records in a
//! project directory. Repairs, returns and advisory sessions carry an
//! explicit status machine with an append-only audit trail.

pub mod api;
pub mod cli;
pub mod core;
pub mod entities;
