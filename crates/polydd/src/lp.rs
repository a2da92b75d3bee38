//! Dense phase-1 simplex for "is `target` a non-negative combination of `columns`?".
//!
//! Tableau layout: equation rows `[A | I | b]` with `b >= 0` after row sign flips,
//! one artificial per row, and a final objective row minimizing the artificial sum.
//! Pivoting uses Bland's rule (smallest entering index, smallest basic index on ratio
//! ties), which cannot cycle; the iteration cap is kept as a hard stop anyway.

use nalgebra::{DMatrix, DVector};

use crate::error::{DdError, DdResult};

/// Tolerances and cap for one LP.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LpTolerances {
    /// Entries below this magnitude are treated as zero during pivoting.
    pub(crate) pivot: f64,
    /// Largest artificial sum still accepted as feasible.
    pub(crate) feasibility: f64,
    pub(crate) max_iterations: usize,
}

struct Tableau {
    t: DMatrix<f64>,
    basis: Vec<usize>,
    m: usize,
    vars: usize,
}

impl Tableau {
    fn phase1(columns: &[DVector<f64>], target: &DVector<f64>) -> Self {
        let m = target.len();
        let n = columns.len();
        let vars = n + m;
        let mut t = DMatrix::zeros(m + 1, vars + 1);
        for i in 0..m {
            let sign = if target[i] < 0.0 { -1.0 } else { 1.0 };
            for (j, col) in columns.iter().enumerate() {
                t[(i, j)] = sign * col[i];
            }
            t[(i, n + i)] = 1.0;
            t[(i, vars)] = sign * target[i];
        }
        // Price out the artificials: objective row = -(sum of equation rows) on originals.
        for j in (0..n).chain(std::iter::once(vars)) {
            let s: f64 = (0..m).map(|i| t[(i, j)]).sum();
            t[(m, j)] = -s;
        }
        Self {
            t,
            basis: (n..n + m).collect(),
            m,
            vars,
        }
    }

    #[inline]
    fn rhs(&self, i: usize) -> f64 {
        self.t[(i, self.vars)]
    }

    fn entering(&self, tol: f64) -> Option<usize> {
        (0..self.vars).find(|&j| self.t[(self.m, j)] < -tol)
    }

    fn leaving(&self, col: usize, tol: f64) -> Option<usize> {
        let mut best: Option<(f64, usize, usize)> = None;
        for i in 0..self.m {
            let a = self.t[(i, col)];
            if a <= tol {
                continue;
            }
            let ratio = self.rhs(i) / a;
            let better = match best {
                None => true,
                Some((r, _, b)) => ratio < r - tol || (ratio <= r + tol && self.basis[i] < b),
            };
            if better {
                best = Some((ratio, i, self.basis[i]));
            }
        }
        best.map(|(_, i, _)| i)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let p = self.t[(row, col)];
        let pivot_row = self.t.row(row) / p;
        self.t.set_row(row, &pivot_row);
        for i in 0..=self.m {
            if i == row {
                continue;
            }
            let f = self.t[(i, col)];
            if f != 0.0 {
                let updated = self.t.row(i) - &pivot_row * f;
                self.t.set_row(i, &updated);
            }
        }
        self.basis[row] = col;
    }

    /// Current artificial sum (phase-1 objective value).
    #[inline]
    fn infeasibility(&self) -> f64 {
        -self.t[(self.m, self.vars)]
    }
}

/// Whether `target = Σ λ_j columns[j]` has a solution with `λ >= 0`.
///
/// All vectors must share `target.len()`.
pub(crate) fn is_nonneg_combination(
    columns: &[DVector<f64>],
    target: &DVector<f64>,
    tol: &LpTolerances,
) -> DdResult<bool> {
    if let Some(bad) = columns.iter().find(|c| c.len() != target.len()) {
        return Err(DdError::mismatch("LP column length", target.len(), bad.len()));
    }
    let mut tab = Tableau::phase1(columns, target);
    for _ in 0..tol.max_iterations {
        let Some(col) = tab.entering(tol.pivot) else {
            return Ok(tab.infeasibility() <= tol.feasibility);
        };
        let Some(row) = tab.leaving(col, tol.pivot) else {
            return Err(DdError::inconsistent(
                "phase-1 objective is unbounded below zero",
            ));
        };
        tab.pivot(row, col);
    }
    Err(DdError::LpCycling {
        iterations: tol.max_iterations,
    })
}
