//! Double description engine (homogeneous cones, incremental refinement).
//!
//! Purpose
//! - Turn a coordinate matrix into its dual: inequalities into vertices/rays, or
//!   vertices/rays into a minimal inequality system.
//!
//! Why this design (short)
//! - One cone routine serves both directions: the rows are always constraints
//!   `h · y >= 0` and the candidates are always extreme rays of what they cut out.
//! - The lineality space is split off up front, so the live cone is pointed and
//!   adjacency reduces to zero-set comparisons.
//! - Candidates carry zero sets as bitsets; adjacency never recomputes dot products.
//!
//! Assumptions and conventions
//! - `f64` only; every sign decision goes through one relative tolerance (`DdConfig::eps_zero`)
//!   scaled by the max-abs norms of both operands.
//! - Rows are absorbed in the order given by `DdConfig::row_order`; the initial basis is
//!   chosen greedily in the same order. Output rows come in candidate creation order.
//! - An infeasible inequality system yields an empty generator matrix, not an error.
//!
//! Layout
//! - `cfg`: tolerances and options. `basis`: initial simplicial cone and lineality.
//! - `sat`: zero-set bitsets. `order`: processing orders.
//! - `cone`: the refinement step. `engine`: input preparation and read-back.

pub mod cfg;
pub(crate) mod basis;
pub(crate) mod cone;
pub mod engine;
pub(crate) mod order;
pub(crate) mod sat;

#[cfg(test)]
mod tests;

pub use cfg::{AdjacencyTest, DdConfig, RowOrder};
pub use engine::{convert_matrix, Engine};
