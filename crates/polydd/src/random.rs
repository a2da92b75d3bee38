//! Random and fixed polytope families for tests, benches and the CLI.
//!
//! Purpose
//! - Reproducible inputs in any dimension: every random draw is addressed by a
//!   `ReplayToken { seed, index }`, so a single sample can be regenerated without
//!   replaying the stream.
//!
//! Families
//! - Hypercube `[-1, 1]^d` and cross-polytope `conv(±e_i)`, in either representation.
//! - Points on the unit sphere (V-rep of a simplicial polytope, almost surely).
//! - Tangent halfspaces `u · x <= 1` of the unit sphere, optionally clipped by a box
//!   (H-rep of a polytope containing the origin).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::matrix::{CoordinateMatrix, RepresentationKind};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("invalid generator params: {reason}")]
    InvalidParams { reason: String },
}

impl GeneratorError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    fn rng(self) -> StdRng {
        // SplitMix64 finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

fn check_dim(dim: usize) -> Result<(), GeneratorError> {
    if dim == 0 {
        return Err(GeneratorError::invalid("dimension must be >= 1"));
    }
    if dim > 20 {
        return Err(GeneratorError::invalid(
            "dimension above 20 makes the 2^d families impractical",
        ));
    }
    Ok(())
}

fn from_rows(
    kind: RepresentationKind,
    dim: usize,
    rows: Vec<Vec<f64>>,
) -> Result<CoordinateMatrix, GeneratorError> {
    CoordinateMatrix::from_rows(kind, dim + 1, rows)
        .map_err(|e| GeneratorError::invalid(e.to_string()))
}

/// Sign vectors of `{-1, 1}^dim` in binary order.
fn sign_patterns(dim: usize) -> impl Iterator<Item = Vec<f64>> {
    (0..1u32 << dim).map(move |mask| {
        (0..dim)
            .map(|i| if mask & (1 << i) != 0 { -1.0 } else { 1.0 })
            .collect()
    })
}

/// `[-1, 1]^dim` as `2 dim` facets `1 ∓ x_i >= 0`.
pub fn hypercube_h(dim: usize) -> Result<CoordinateMatrix, GeneratorError> {
    check_dim(dim)?;
    let mut rows = Vec::with_capacity(2 * dim);
    for i in 0..dim {
        for s in [-1.0, 1.0] {
            let mut row = vec![0.0; dim + 1];
            row[0] = 1.0;
            row[i + 1] = s;
            rows.push(row);
        }
    }
    from_rows(RepresentationKind::Inequality, dim, rows)
}

/// `[-1, 1]^dim` as its `2^dim` vertices.
pub fn hypercube_v(dim: usize) -> Result<CoordinateMatrix, GeneratorError> {
    check_dim(dim)?;
    let rows = sign_patterns(dim)
        .map(|s| std::iter::once(1.0).chain(s).collect::<Vec<f64>>())
        .collect();
    from_rows(RepresentationKind::Generator, dim, rows)
}

/// `conv(±e_i)` as its `2 dim` vertices.
pub fn cross_polytope_v(dim: usize) -> Result<CoordinateMatrix, GeneratorError> {
    check_dim(dim)?;
    let mut rows = Vec::with_capacity(2 * dim);
    for i in 0..dim {
        for s in [1.0, -1.0] {
            let mut row = vec![0.0; dim + 1];
            row[0] = 1.0;
            row[i + 1] = s;
            rows.push(row);
        }
    }
    from_rows(RepresentationKind::Generator, dim, rows)
}

/// `conv(±e_i)` as its `2^dim` facets `1 - s · x >= 0`.
pub fn cross_polytope_h(dim: usize) -> Result<CoordinateMatrix, GeneratorError> {
    check_dim(dim)?;
    let rows = sign_patterns(dim)
        .map(|s| std::iter::once(1.0).chain(s.into_iter().map(|x| -x)).collect::<Vec<f64>>())
        .collect();
    from_rows(RepresentationKind::Inequality, dim, rows)
}

/// Parameters for the sphere families.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereParams {
    pub dim: usize,
    pub count: usize,
    /// Half-width of an axis box added to tangent halfspaces; `None` adds no box.
    pub clip_box: Option<f64>,
}

impl SphereParams {
    fn validate(&self) -> Result<(), GeneratorError> {
        check_dim(self.dim)?;
        if self.count == 0 {
            return Err(GeneratorError::invalid("need at least one sample"));
        }
        if let Some(r) = self.clip_box {
            if !(r.is_finite() && r > 0.0) {
                return Err(GeneratorError::invalid("clip box half-width must be > 0"));
            }
        }
        Ok(())
    }
}

/// Uniform direction: rejection-sample the unit ball, then normalize.
fn unit_vector(rng: &mut StdRng, dim: usize) -> Vec<f64> {
    loop {
        let v: Vec<f64> = (0..dim).map(|_| rng.gen_range(-1.0..=1.0)).collect();
        let n2: f64 = v.iter().map(|x| x * x).sum();
        if n2 > 1e-6 && n2 <= 1.0 {
            let n = n2.sqrt();
            return v.into_iter().map(|x| x / n).collect();
        }
    }
}

/// `count` vertices drawn uniformly on the unit sphere.
pub fn sphere_points(
    params: &SphereParams,
    tok: ReplayToken,
) -> Result<CoordinateMatrix, GeneratorError> {
    params.validate()?;
    let mut rng = tok.rng();
    let rows: Vec<Vec<f64>> = (0..params.count)
        .map(|_| {
            std::iter::once(1.0)
                .chain(unit_vector(&mut rng, params.dim))
                .collect::<Vec<f64>>()
        })
        .collect();
    from_rows(RepresentationKind::Generator, params.dim, rows)
}

/// `count` tangent halfspaces `u · x <= 1`, then the optional clip box.
pub fn tangent_halfspaces(
    params: &SphereParams,
    tok: ReplayToken,
) -> Result<CoordinateMatrix, GeneratorError> {
    params.validate()?;
    let mut rng = tok.rng();
    let mut rows: Vec<Vec<f64>> = (0..params.count)
        .map(|_| {
            std::iter::once(1.0)
                .chain(unit_vector(&mut rng, params.dim).into_iter().map(|x| -x))
                .collect()
        })
        .collect();
    if let Some(r) = params.clip_box {
        for i in 0..params.dim {
            for s in [-1.0, 1.0] {
                let mut row = vec![0.0; params.dim + 1];
                row[0] = r;
                row[i + 1] = s;
                rows.push(row);
            }
        }
    }
    from_rows(RepresentationKind::Inequality, params.dim, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_family_sizes() {
        assert_eq!(hypercube_h(3).unwrap().row_count(), 6);
        assert_eq!(hypercube_v(3).unwrap().row_count(), 8);
        assert_eq!(cross_polytope_v(4).unwrap().row_count(), 8);
        assert_eq!(cross_polytope_h(4).unwrap().row_count(), 16);
        assert_eq!(hypercube_v(2).unwrap().row(0), &[1.0, 1.0, 1.0]);
        assert_eq!(cross_polytope_h(2).unwrap().row(0), &[1.0, -1.0, -1.0]);
        assert!(hypercube_h(0).is_err());
    }

    #[test]
    fn replay_tokens_reproduce_samples() {
        let params = SphereParams {
            dim: 3,
            count: 10,
            clip_box: None,
        };
        let a = sphere_points(&params, ReplayToken::new(5, 2)).unwrap();
        let b = sphere_points(&params, ReplayToken::new(5, 2)).unwrap();
        let c = sphere_points(&params, ReplayToken::new(5, 3)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        for row in a.rows() {
            let n: f64 = row[1..].iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((n - 1.0).abs() < 1e-12);
            assert_eq!(row[0], 1.0);
        }
    }

    #[test]
    fn tangent_halfspaces_contain_the_origin_and_clip() {
        let params = SphereParams {
            dim: 2,
            count: 5,
            clip_box: Some(3.0),
        };
        let h = tangent_halfspaces(&params, ReplayToken::new(1, 0)).unwrap();
        assert_eq!(h.row_count(), 5 + 4);
        assert!(h.rows().all(|r| r[0] > 0.0));

        let bad = SphereParams {
            clip_box: Some(-1.0),
            ..params
        };
        assert!(tangent_halfspaces(&bad, ReplayToken::new(1, 0)).is_err());
    }
}
