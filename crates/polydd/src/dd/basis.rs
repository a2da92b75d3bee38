//! Initial basis: greedy row selection, the simplicial starting cone, and the lineality space.
//!
//! Given homogeneous rows `M` (m × n), the cone `{y : M y >= 0}` splits as `L ⊕ P` with
//! `L = null(M)` and `P` pointed inside `row(M)`. Picking `r = rank(M)` independent rows
//! `B` (greedily, in processing order) gives the simplicial cone `{y ∈ row(M) : B y >= 0}`
//! whose extreme rays are the columns of `Bᵀ (B Bᵀ)⁻¹`. Ray `i` is tight on every
//! selected row except row `i`.

use nalgebra::{DMatrix, DVector};

use crate::error::{DdError, DdResult};

#[derive(Clone, Debug)]
pub(crate) struct InitialBasis {
    /// Selected row indices, in selection order.
    pub(crate) rows: Vec<usize>,
    /// `rays[i]` is zero on `rows[j]` for `j != i` and positive on `rows[i]`.
    pub(crate) rays: Vec<DVector<f64>>,
    /// Orthonormal basis of `null(M)`.
    pub(crate) lineality: Vec<DVector<f64>>,
}

impl InitialBasis {
    #[inline]
    pub(crate) fn rank(&self) -> usize {
        self.rows.len()
    }
}

/// Two passes of modified Gram-Schmidt against an orthonormal set.
fn orthogonalize(v: &mut DVector<f64>, basis: &[DVector<f64>]) {
    for _ in 0..2 {
        for q in basis {
            let c = q.dot(v);
            v.axpy(-c, q, 1.0);
        }
    }
}

/// Push the normalized residual of `row` onto `basis` if it is independent.
fn try_extend(basis: &mut Vec<DVector<f64>>, row: &DVector<f64>, eps_rank: f64) -> bool {
    let norm = row.norm();
    if norm == 0.0 {
        return false;
    }
    let mut w = row / norm;
    orthogonalize(&mut w, basis);
    let wn = w.norm();
    if wn > eps_rank {
        basis.push(w / wn);
        true
    } else {
        false
    }
}

/// Rank of a set of rows under the relative pivot tolerance `eps_rank`.
pub(crate) fn rank_of<'a, I>(rows: I, eps_rank: f64) -> usize
where
    I: IntoIterator<Item = &'a DVector<f64>>,
{
    let mut q = Vec::new();
    for row in rows {
        try_extend(&mut q, row, eps_rank);
    }
    q.len()
}

pub(crate) fn select_basis(
    rows: &[DVector<f64>],
    order: &[usize],
    dim: usize,
    eps_rank: f64,
) -> DdResult<InitialBasis> {
    let mut q: Vec<DVector<f64>> = Vec::with_capacity(dim);
    let mut picked = Vec::with_capacity(dim);
    for &r in order {
        if q.len() == dim {
            break;
        }
        if try_extend(&mut q, &rows[r], eps_rank) {
            picked.push(r);
        }
    }
    let rank = picked.len();

    let mut rays = Vec::with_capacity(rank);
    if rank > 0 {
        let b = DMatrix::from_fn(rank, dim, |i, j| rows[picked[i]][j]);
        let gram = &b * b.transpose();
        let inv = match gram.clone().cholesky() {
            Some(chol) => chol.inverse(),
            None => gram
                .try_inverse()
                .ok_or_else(|| DdError::inconsistent("selected basis rows are singular"))?,
        };
        let y = b.transpose() * inv;
        for i in 0..rank {
            rays.push(y.column(i).into_owned());
        }
    }

    // Complete `q` with unit vectors; take the largest residual each time so the
    // lineality basis is found even when no single unit vector is close to it.
    let mut lineality: Vec<DVector<f64>> = Vec::with_capacity(dim - rank);
    while lineality.len() < dim - rank {
        let mut best: Option<(f64, DVector<f64>)> = None;
        for j in 0..dim {
            let mut w = DVector::zeros(dim);
            w[j] = 1.0;
            orthogonalize(&mut w, &q);
            orthogonalize(&mut w, &lineality);
            let wn = w.norm();
            if best.as_ref().map_or(true, |(bn, _)| wn > *bn + eps_rank) {
                best = Some((wn, w));
            }
        }
        match best {
            Some((wn, w)) if wn > eps_rank => lineality.push(w / wn),
            _ => {
                return Err(DdError::inconsistent(
                    "could not complete the lineality space basis",
                ))
            }
        }
    }

    Ok(InitialBasis {
        rows: picked,
        rays,
        lineality,
    })
}
