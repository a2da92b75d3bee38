//! Redundancy detection and removal.
//!
//! A row is redundant when it is a non-negative combination of the other surviving rows.
//! Rows are tested in input order and removed as they are found, so the survivors
//! describe the same set and none of them is implied by the rest.
//!
//! - Generators: a vertex is redundant when it lies in the convex hull of the other
//!   vertices plus the cone of the rays; a ray when it lies in the cone of the others.
//!   Both reduce to the homogeneous test.
//! - Inequalities: the implicit row `1 >= 0` takes part as a combinator, which makes the
//!   test equivalent to implication for a feasible system.
//! - Linearity rows are never reported and take part with both signs.

use nalgebra::DVector;

use crate::dd::cfg::DdConfig;
use crate::dd::cone::normalize_max;
use crate::error::{DdError, DdResult};
use crate::lp::{is_nonneg_combination, LpTolerances};
use crate::matrix::{CoordinateMatrix, RepresentationKind};

fn tolerances(cfg: &DdConfig) -> LpTolerances {
    LpTolerances {
        pivot: cfg.eps_rank,
        feasibility: cfg.eps_zero,
        max_iterations: cfg.lp_max_iterations,
    }
}

/// Indices of redundant rows, ascending, under the default configuration.
pub fn redundant_rows(m: &CoordinateMatrix) -> DdResult<Vec<usize>> {
    redundant_rows_with(m, &DdConfig::default())
}

pub fn redundant_rows_with(m: &CoordinateMatrix, cfg: &DdConfig) -> DdResult<Vec<usize>> {
    m.validate()?;
    if m.is_empty() {
        return Err(match m.kind() {
            RepresentationKind::Inequality => DdError::EmptyHRepresentation,
            RepresentationKind::Generator => DdError::EmptyVRepresentation,
        });
    }
    let tol = tolerances(cfg);
    let rows: Vec<DVector<f64>> = m
        .rows()
        .map(|r| normalize_max(DVector::from_row_slice(r)))
        .collect();
    let mut alive = vec![true; rows.len()];
    let mut redundant = Vec::new();

    for target in 0..rows.len() {
        if m.is_linearity(target) {
            continue;
        }
        let mut columns: Vec<DVector<f64>> = Vec::with_capacity(rows.len() + 1);
        if m.kind() == RepresentationKind::Inequality {
            let mut one = DVector::zeros(m.col_count());
            one[0] = 1.0;
            columns.push(one);
        }
        for (j, row) in rows.iter().enumerate() {
            if j == target || !alive[j] {
                continue;
            }
            columns.push(row.clone());
            if m.is_linearity(j) {
                columns.push(-row);
            }
        }
        if is_nonneg_combination(&columns, &rows[target], &tol)? {
            tracing::trace!(row = target, "redundant");
            alive[target] = false;
            redundant.push(target);
        }
    }
    tracing::debug!(
        kind = %m.kind(),
        rows = m.row_count(),
        redundant = redundant.len(),
        "redundancy scan"
    );
    Ok(redundant)
}

/// Copy of `m` without its redundant rows; survivors keep their order.
pub fn remove_redundancy(m: &CoordinateMatrix) -> DdResult<CoordinateMatrix> {
    remove_redundancy_with(m, &DdConfig::default())
}

pub fn remove_redundancy_with(m: &CoordinateMatrix, cfg: &DdConfig) -> DdResult<CoordinateMatrix> {
    let redundant = redundant_rows_with(m, cfg)?;
    Ok(m.filter_rows(|r| redundant.binary_search(&r).is_err()))
}
