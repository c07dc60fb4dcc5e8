//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus `Deserialize` DTOs for the writes that entity
//! supports (create everywhere, update only where an endpoint patches rows).
//!
//! Status-like columns are stored as TEXT and constrained by CHECKs in the
//! schema; typed accessors on the entity structs convert them to the enums
//! in `wheelway-core`.

pub mod analysis;
pub mod barrier;
pub mod guide;
pub mod image;
pub mod profile;
pub mod scan;
