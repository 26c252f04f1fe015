//! Entity type definitions
//!
//! Motordesk manages the following record types:
//!
//! **Inventory:**
//! - [`Carro`] - Vehicles for sale
//! - [`Pieza`] - Spare parts
//! - [`Accesorio`] - Accessories
//!
//! **People:**
//! - [`Cliente`] - Customers
//! - [`Empleado`] - Staff members
//!
//! **Catalog:**
//! - [`Servicio`] - Workshop services
//!
//! **Workflow records** (status machine + audit history):
//! - [`Reparacion`] - Repair orders
//! - [`Devolucion`] - Return requests
//! - [`Asesoria`] - Advisory sessions

pub mod accesorio;
pub mod asesoria;
pub mod carro;
pub mod cliente;
pub mod devolucion;
pub mod empleado;
pub mod pieza;
pub mod reparacion;
pub mod servicio;

pub use accesorio::Accesorio;
pub use asesoria::{Asesoria, EstadoAsesoria};
pub use carro::{Carro, Combustible, Condicion, Transmision};
pub use cliente::Cliente;
pub use devolucion::{Devolucion, EstadoDevolucion, TipoDevolucion};
pub use empleado::Empleado;
pub use pieza::Pieza;
pub use reparacion::{DetalleReparacion, EstadoReparacion, Reparacion};
pub use servicio::Servicio;
