//! Domain types and pure logic for the wheelway backend.
//!
//! Everything in this crate is side-effect free: no database access, no
//! network I/O. The `db` crate persists these types and the `api` crate
//! serves them.

pub mod annotation;
pub mod barrier;
pub mod error;
pub mod guide;
pub mod profile;
pub mod scan;
pub mod types;
pub mod world_model;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
