//! Engine configuration (tolerances, row order, adjacency test, cutoffs).
//!
//! Policy
//! - One relative tolerance (`eps_zero`) drives every positive/zero/negative
//!   classification; it is scaled by the max-abs norms of both operands.
//! - Defaults are fixed constants; callers override fields on a `DdConfig` value.

/// Relative zero tolerance for `row · candidate`.
pub(crate) const EPS_ZERO: f64 = 1e-7;
/// Relative pivot tolerance for rank decisions (basis selection, algebraic adjacency).
pub(crate) const EPS_RANK: f64 = 1e-9;
/// Multiple of the zero threshold a new candidate may violate an absorbed row by.
pub(crate) const CONSISTENCY_FACTOR: f64 = 1e3;
/// Max-abs distance under which two max-normalized candidates are one ray.
pub(crate) const EPS_DUPLICATE: f64 = 1e-6;
/// Simplex pivot cap for redundancy LPs.
pub(crate) const LP_MAX_ITERATIONS: usize = 10_000;

/// Static order in which input rows are absorbed.
///
/// The initial basis is selected greedily in the same order, so the order also decides
/// which minimal representation is produced for degenerate inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowOrder {
    /// Stable by input index.
    #[default]
    Input,
    /// Highest index first.
    Reverse,
    /// Lexicographically smallest (max-abs normalized) row first; ties by index.
    LexMin,
    /// Lexicographically largest row first; ties by index.
    LexMax,
    /// Seeded shuffle.
    Random { seed: u64 },
}

/// How two candidates are judged adjacent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdjacencyTest {
    /// Common zero set is large enough and no third candidate contains it.
    #[default]
    Combinatorial,
    /// Rank of the rows in the common zero set equals `rank - 2`.
    Algebraic,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DdConfig {
    pub eps_zero: f64,
    pub eps_rank: f64,
    pub consistency_factor: f64,
    /// Fresh candidates closer than this to a surviving one are merged into it.
    pub eps_duplicate: f64,
    pub row_order: RowOrder,
    pub adjacency: AdjacencyTest,
    /// Abort with `LimitExceeded` once more candidates than this are alive.
    pub max_candidates: Option<usize>,
    pub lp_max_iterations: usize,
    /// Re-check the engine output with the redundancy LP.
    pub verify_output: bool,
}

impl Default for DdConfig {
    fn default() -> Self {
        Self {
            eps_zero: EPS_ZERO,
            eps_rank: EPS_RANK,
            consistency_factor: CONSISTENCY_FACTOR,
            eps_duplicate: EPS_DUPLICATE,
            row_order: RowOrder::Input,
            adjacency: AdjacencyTest::Combinatorial,
            max_candidates: None,
            lp_max_iterations: LP_MAX_ITERATIONS,
            verify_output: false,
        }
    }
}

impl DdConfig {
    #[inline]
    pub fn with_row_order(mut self, row_order: RowOrder) -> Self {
        self.row_order = row_order;
        self
    }

    #[inline]
    pub fn with_adjacency(mut self, adjacency: AdjacencyTest) -> Self {
        self.adjacency = adjacency;
        self
    }

    #[inline]
    pub fn with_max_candidates(mut self, limit: usize) -> Self {
        self.max_candidates = Some(limit);
        self
    }

    #[inline]
    pub fn verified(mut self) -> Self {
        self.verify_output = true;
        self
    }
}
