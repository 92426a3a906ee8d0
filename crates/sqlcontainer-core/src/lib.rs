//! SQLContainer Core - shared abstractions for the data access layer
//!
//! This crate provides the types every other sqlcontainer crate depends on:
//!
//! - `Connection` - Trait for the externally supplied physical connection
//! - `ConnectionFactory` - Trait for opening new physical connections
//! - `Value` - A bound SQL parameter or result cell
//! - `SqlContainerError` - The error taxonomy shared by the compiler and the pool

mod connection;
mod error;
mod types;

pub use connection::*;
pub use error::*;
pub use types::*;
