//! Polyhedral H↔V conversion by the double description method.
//!
//! Layout
//! - `matrix`: homogeneous coordinate matrices (`[b, -A]` inequalities, `[t, X]` generators).
//! - `dd`: the engine and its configuration.
//! - `adapter`: dense `(matrix, vector)` pairs ↔ coordinate matrices.
//! - `polyhedron`: the stateful facade with per-instance locking.
//! - `redundancy` / `lp`: non-negative combination tests and redundancy removal.
//! - `cdd_format`: cdd-style text I/O. `random`: polytope families.
//! - `context`: reference-counted arithmetic context. `error`: failure taxonomy.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.

pub mod adapter;
pub mod cdd_format;
pub mod context;
pub mod dd;
pub mod error;
pub(crate) mod lp;
pub mod matrix;
pub mod polyhedron;
pub mod random;
pub mod redundancy;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use adapter::{convert, convert_with, Direction};
pub use dd::{AdjacencyTest, DdConfig, RowOrder};
pub use error::{DdError, DdResult, ErrorKind};
pub use matrix::{CoordinateMatrix, RepresentationKind};
pub use polyhedron::Polyhedron;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::adapter::{convert, convert_with, Direction};
    pub use crate::dd::{AdjacencyTest, DdConfig, Engine, RowOrder};
    pub use crate::error::{DdError, DdResult, ErrorKind};
    pub use crate::matrix::{CoordinateMatrix, RepresentationKind};
    pub use crate::polyhedron::Polyhedron;
    pub use crate::random::{ReplayToken, SphereParams};
    pub use nalgebra::{DMatrix, DVector};
}
