//! CLI command implementations

pub mod utils;

pub mod accesorio;
pub mod api;
pub mod ase;
pub mod cache;
pub mod carro;
pub mod cliente;
pub mod completions;
pub mod delete;
pub mod dev;
pub mod empleado;
pub mod history;
pub mod init;
pub mod pieza;
pub mod rep;
pub mod servicio;
pub mod status;
pub mod team;
pub mod transition;
