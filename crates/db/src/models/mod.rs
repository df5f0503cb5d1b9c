//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row and, where the entity is created through
//! this core, a `Deserialize` create DTO with validator bounds.

pub mod rating;
pub mod solution;
pub mod ticket;
pub mod user;
