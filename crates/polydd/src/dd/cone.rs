//! The live cone: candidate generators, their zero sets, and the per-row refinement.
//!
//! Works on homogeneous rows `h` and computes the generators of `{y : h · y >= 0 ∀h}`.
//! The same code serves H→V (rows are inequalities, candidates are generators) and
//! V→H (rows are generators, candidates are inequalities of the polar cone).
//!
//! Invariants
//! - After absorbing a prefix of the processing order, the candidates are exactly the
//!   extreme rays of the pointed part of the cone cut out by that prefix.
//! - `zero` of a candidate lists the absorbed rows it is tight on, judged by the same
//!   threshold as the sign partition. Fresh candidates get theirs from their own values.
//! - No two candidates are the same ray within `eps_duplicate`, and no zero set contains
//!   another; `enumerate` fails with `NumericallyInconsistent` rather than return a cone
//!   that breaks this.
//! - Candidates live in `row(M)`; the lineality space `null(M)` is carried separately
//!   and never cut.

use nalgebra::DVector;

use crate::context::ArithmeticContext;
use crate::error::{DdError, DdResult};

use super::basis::{rank_of, select_basis};
use super::cfg::{AdjacencyTest, DdConfig};
use super::sat::SatSet;

#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub(crate) vec: DVector<f64>,
    pub(crate) zero: SatSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Positive,
    Zero,
    Negative,
}

/// Final cone: extreme rays of the pointed part (creation order) and a lineality basis.
#[derive(Clone, Debug, Default)]
pub(crate) struct ConeGenerators {
    pub(crate) rays: Vec<DVector<f64>>,
    pub(crate) lines: Vec<DVector<f64>>,
}

pub(crate) struct Cone<'a> {
    rows: &'a [DVector<f64>],
    row_scale: Vec<f64>,
    cfg: &'a DdConfig,
    almost_zero: f64,
    rank: usize,
    candidates: Vec<Candidate>,
    lineality: Vec<DVector<f64>>,
    absorbed: Vec<usize>,
}

#[inline]
pub(crate) fn normalize_max(mut v: DVector<f64>) -> DVector<f64> {
    let m = v.amax();
    if m > 0.0 {
        v /= m;
    }
    v
}

impl<'a> Cone<'a> {
    /// Seed the cone from the greedy initial basis of `rows` taken in `order`.
    pub(crate) fn new(
        rows: &'a [DVector<f64>],
        order: &[usize],
        dim: usize,
        cfg: &'a DdConfig,
        ctx: &ArithmeticContext,
    ) -> DdResult<Self> {
        let basis = select_basis(rows, order, dim, cfg.eps_rank)?;
        let rank = basis.rank();
        let mut candidates = Vec::with_capacity(rank);
        for (i, ray) in basis.rays.into_iter().enumerate() {
            let zero = SatSet::from_rows(
                basis
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, &r)| r),
            );
            candidates.push(Candidate {
                vec: normalize_max(ray),
                zero,
            });
        }
        tracing::debug!(rank, lineality = basis.lineality.len(), "initial cone");
        Ok(Self {
            rows,
            row_scale: rows.iter().map(|r| r.amax()).collect(),
            cfg,
            almost_zero: ctx.constants().almost_zero,
            rank,
            candidates,
            lineality: basis.lineality,
            absorbed: basis.rows,
        })
    }

    /// Absorb every row of `order` and return the final generators.
    pub(crate) fn enumerate(
        rows: &'a [DVector<f64>],
        order: &[usize],
        dim: usize,
        cfg: &'a DdConfig,
        ctx: &ArithmeticContext,
    ) -> DdResult<ConeGenerators> {
        let mut cone = Self::new(rows, order, dim, cfg, ctx)?;
        let seeded = SatSet::from_rows(cone.absorbed.iter().copied());
        for &row in order {
            if seeded.contains(row) {
                continue;
            }
            if cone.candidates.is_empty() {
                tracing::debug!(row, "pointed part is empty; skipping remaining rows");
                break;
            }
            cone.absorb(row)?;
        }
        cone.check_extreme()?;
        Ok(cone.into_generators())
    }

    #[cfg(test)]
    pub(crate) fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    fn threshold(&self, row: usize, vec: &DVector<f64>) -> f64 {
        (self.cfg.eps_zero * self.row_scale[row] * vec.amax()).max(self.almost_zero)
    }

    fn side(&self, row: usize, cand: &Candidate, value: f64) -> Side {
        let thr = self.threshold(row, &cand.vec);
        if value > thr {
            Side::Positive
        } else if value < -thr {
            Side::Negative
        } else {
            Side::Zero
        }
    }

    fn check_limit(&self, alive: usize, row: usize) -> DdResult<()> {
        match self.cfg.max_candidates {
            Some(limit) if alive > limit => Err(DdError::LimitExceeded { limit, row }),
            _ => Ok(()),
        }
    }

    /// One double-description step for `row`.
    pub(crate) fn absorb(&mut self, row: usize) -> DdResult<()> {
        let h = &self.rows[row];
        let values: Vec<f64> = self.candidates.iter().map(|c| h.dot(&c.vec)).collect();
        let sides: Vec<Side> = self
            .candidates
            .iter()
            .zip(&values)
            .map(|(c, &v)| self.side(row, c, v))
            .collect();
        let positive: Vec<usize> = (0..sides.len())
            .filter(|&i| sides[i] == Side::Positive)
            .collect();
        let negative: Vec<usize> = (0..sides.len())
            .filter(|&i| sides[i] == Side::Negative)
            .collect();
        let zero = sides.len() - positive.len() - negative.len();
        tracing::debug!(
            row,
            positive = positive.len(),
            zero,
            negative = negative.len(),
            "absorbing row"
        );

        if negative.is_empty() {
            self.mark_zero(row, &sides);
            self.absorbed.push(row);
            return Ok(());
        }
        if positive.is_empty() && zero == 0 {
            tracing::debug!(row, "row cuts away the pointed part");
            self.candidates.clear();
            self.absorbed.push(row);
            return Ok(());
        }

        let kept = positive.len() + zero;
        self.check_limit(kept, row)?;
        let mut fresh: Vec<Candidate> = Vec::new();
        let mut promoted: Vec<usize> = Vec::new();
        for &p in &positive {
            for &q in &negative {
                if !self.adjacent(p, q) {
                    continue;
                }
                let cand = self.combine(row, p, q, values[p], values[q])?;
                let twin = (0..self.candidates.len()).find(|&k| {
                    sides[k] != Side::Negative && self.same_ray(&self.candidates[k].vec, &cand.vec)
                });
                if let Some(k) = twin {
                    // The survivor sits on `row` within tolerance.
                    tracing::trace!(row, p, q, survivor = k, "merged into a surviving candidate");
                    if sides[k] == Side::Positive && !promoted.contains(&k) {
                        promoted.push(k);
                    }
                    continue;
                }
                if let Some(f) = fresh
                    .iter_mut()
                    .find(|f| f.zero == cand.zero || self.same_ray(&f.vec, &cand.vec))
                {
                    f.zero.union_with(&cand.zero);
                    continue;
                }
                fresh.push(cand);
                self.check_limit(kept + fresh.len(), row)?;
            }
        }

        let mut sides = sides;
        for &k in &promoted {
            sides[k] = Side::Zero;
        }
        self.mark_zero(row, &sides);
        let old = std::mem::take(&mut self.candidates);
        let mut next = Vec::with_capacity(kept + fresh.len());
        next.extend(
            old.into_iter()
                .zip(&sides)
                .filter(|(_, s)| **s != Side::Negative)
                .map(|(c, _)| c),
        );
        next.extend(fresh);
        self.candidates = next;
        self.absorbed.push(row);
        Ok(())
    }

    fn mark_zero(&mut self, row: usize, sides: &[Side]) {
        for (cand, side) in self.candidates.iter_mut().zip(sides) {
            if *side == Side::Zero {
                cand.zero.insert(row);
            }
        }
    }

    /// Whether candidates `p` and `q` span a 2-face of the current cone.
    fn adjacent(&self, p: usize, q: usize) -> bool {
        let common = self.candidates[p]
            .zero
            .intersection(&self.candidates[q].zero);
        let required = self.rank.saturating_sub(2);
        if common.count() < required {
            return false;
        }
        let verdict = match self.cfg.adjacency {
            AdjacencyTest::Combinatorial => !self
                .candidates
                .iter()
                .enumerate()
                .any(|(k, c)| k != p && k != q && common.is_subset_of(&c.zero)),
            AdjacencyTest::Algebraic => {
                let rows = self.rows;
                rank_of(common.iter().map(|r| &rows[r]), self.cfg.eps_rank) == required
            }
        };
        tracing::trace!(p, q, common = common.count(), verdict, "adjacency");
        verdict
    }

    #[inline]
    fn same_ray(&self, a: &DVector<f64>, b: &DVector<f64>) -> bool {
        (a - b).amax() <= self.cfg.eps_duplicate
    }

    /// Combine a positive and a negative candidate so the result vanishes on `row`.
    ///
    /// The zero set is read off the combined vector, not inherited from the parents.
    fn combine(&self, row: usize, p: usize, q: usize, vp: f64, vq: f64) -> DdResult<Candidate> {
        let cp = &self.candidates[p];
        let cq = &self.candidates[q];
        // vp > 0 > vq, so both coefficients are positive.
        let vec = normalize_max(&cq.vec * vp - &cp.vec * vq);
        let mut zero = SatSet::new();
        zero.insert(row);

        for &k in &self.absorbed {
            let v = self.rows[k].dot(&vec);
            let thr = self.threshold(k, &vec);
            if v < -self.cfg.consistency_factor * thr {
                return Err(DdError::inconsistent(format!(
                    "combined candidate violates absorbed row {k} by {v:e} while absorbing row {row}"
                )));
            }
            if v.abs() <= thr {
                zero.insert(k);
            }
        }
        Ok(Candidate { vec, zero })
    }

    /// Every candidate must be an extreme ray: tight on at least `rank - 1` rows, and
    /// its zero set not nested in another's.
    fn check_extreme(&self) -> DdResult<()> {
        let need = self.rank.saturating_sub(1);
        for (i, c) in self.candidates.iter().enumerate() {
            if c.zero.count() < need {
                return Err(DdError::inconsistent(format!(
                    "candidate {i} is tight on {} rows, fewer than {need}",
                    c.zero.count()
                )));
            }
            for (j, o) in self.candidates.iter().enumerate().skip(i + 1) {
                if c.zero.is_subset_of(&o.zero) || o.zero.is_subset_of(&c.zero) {
                    return Err(DdError::inconsistent(format!(
                        "candidates {i} and {j} have nested zero sets"
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn into_generators(self) -> ConeGenerators {
        ConeGenerators {
            rays: self.candidates.into_iter().map(|c| c.vec).collect(),
            lines: self.lineality.into_iter().map(normalize_max).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    fn square_rows() -> Vec<DVector<f64>> {
        vec![
            dvector![1.0, 0.0, 0.0],
            dvector![1.0, -1.0, 0.0],
            dvector![1.0, 1.0, 0.0],
            dvector![1.0, 0.0, -1.0],
            dvector![1.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn square_cone_has_four_extreme_rays_in_creation_order() {
        let rows = square_rows();
        let cfg = DdConfig::default();
        let ctx = ArithmeticContext::acquire();
        let gens = Cone::enumerate(&rows, &[0, 1, 2, 3, 4], 3, &cfg, &ctx).unwrap();
        assert!(gens.lines.is_empty());
        let expected = [
            dvector![1.0, 1.0, 1.0],
            dvector![1.0, -1.0, 1.0],
            dvector![1.0, 1.0, -1.0],
            dvector![1.0, -1.0, -1.0],
        ];
        assert_eq!(gens.rays.len(), 4);
        for (got, want) in gens.rays.iter().zip(expected.iter()) {
            assert!((got - want).norm() < 1e-12, "got {got:?}, want {want:?}");
        }
    }

    #[test]
    fn zero_sets_track_absorbed_rows() {
        let rows = square_rows();
        let cfg = DdConfig::default();
        let ctx = ArithmeticContext::acquire();
        let mut cone = Cone::new(&rows, &[0, 1, 2, 3, 4], 3, &cfg, &ctx).unwrap();
        assert_eq!(cone.candidate_count(), 3);
        cone.absorb(2).unwrap();
        assert_eq!(cone.candidate_count(), 3);
        for cand in &cone.candidates {
            for r in cand.zero.iter() {
                assert!(rows[r].dot(&cand.vec).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn algebraic_and_combinatorial_tests_agree_on_a_pyramid() {
        // Square pyramid: apex at z = 1 is tight on four facets (degenerate).
        let rows = vec![
            dvector![1.0, 0.0, 0.0, 0.0],
            dvector![0.0, 0.0, 0.0, 1.0],
            dvector![1.0, -1.0, 0.0, -1.0],
            dvector![1.0, 1.0, 0.0, -1.0],
            dvector![1.0, 0.0, -1.0, -1.0],
            dvector![1.0, 0.0, 1.0, -1.0],
        ];
        let order: Vec<usize> = (0..rows.len()).collect();
        let ctx = ArithmeticContext::acquire();
        let comb = DdConfig::default();
        let alg = DdConfig::default().with_adjacency(AdjacencyTest::Algebraic);
        let a = Cone::enumerate(&rows, &order, 4, &comb, &ctx).unwrap();
        let b = Cone::enumerate(&rows, &order, 4, &alg, &ctx).unwrap();
        assert_eq!(a.rays.len(), 5);
        assert_eq!(b.rays.len(), 5);
        for (x, y) in a.rays.iter().zip(&b.rays) {
            assert!((x - y).norm() < 1e-12);
        }
    }

    #[test]
    fn fresh_zero_sets_come_from_the_combined_vector() {
        // Square pyramid: the apex is tight on all four slanted facets, more than
        // either parent of the step that creates it shares.
        let rows = vec![
            dvector![1.0, 0.0, 0.0, 0.0],
            dvector![0.0, 0.0, 0.0, 1.0],
            dvector![1.0, -1.0, 0.0, -1.0],
            dvector![1.0, 1.0, 0.0, -1.0],
            dvector![1.0, 0.0, -1.0, -1.0],
            dvector![1.0, 0.0, 1.0, -1.0],
        ];
        let order: Vec<usize> = (0..rows.len()).collect();
        let cfg = DdConfig::default();
        let ctx = ArithmeticContext::acquire();
        let mut cone = Cone::new(&rows, &order, 4, &cfg, &ctx).unwrap();
        let seeded = SatSet::from_rows(cone.absorbed.iter().copied());
        for &row in &order {
            if !seeded.contains(row) {
                cone.absorb(row).unwrap();
            }
        }
        for cand in &cone.candidates {
            let tight: Vec<usize> = (0..rows.len())
                .filter(|&r| rows[r].dot(&cand.vec).abs() < 1e-12)
                .collect();
            assert_eq!(cand.zero.iter().collect::<Vec<_>>(), tight);
        }
        cone.check_extreme().unwrap();
    }

    #[test]
    fn near_copy_of_a_candidate_is_inconsistent() {
        let rows = square_rows();
        let cfg = DdConfig::default();
        let ctx = ArithmeticContext::acquire();
        let mut cone = Cone::new(&rows, &[0, 1, 2, 3, 4], 3, &cfg, &ctx).unwrap();
        cone.check_extreme().unwrap();
        let mut twin = cone.candidates[0].clone();
        twin.vec[1] += 1e-9;
        cone.candidates.push(twin);
        let err = cone.check_extreme().unwrap_err();
        assert!(matches!(err, DdError::NumericallyInconsistent { .. }));
    }

    #[test]
    fn limit_aborts_the_step() {
        let rows = square_rows();
        let cfg = DdConfig::default().with_max_candidates(3);
        let ctx = ArithmeticContext::acquire();
        let err = Cone::enumerate(&rows, &[0, 1, 2, 3, 4], 3, &cfg, &ctx).unwrap_err();
        assert!(matches!(err, DdError::LimitExceeded { limit: 3, row: 4 }));
    }
}
