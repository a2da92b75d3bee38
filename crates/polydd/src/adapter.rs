//! Dense `(matrix, vector)` pairs ↔ homogeneous coordinate matrices.
//!
//! Conventions
//! - H-rep `(A, b)` means `{x : A x <= b}`; rows become `[b_i, -A_i]`.
//! - V-rep `(X, t)` lists one generator per row with `t_i = 1` for a vertex and
//!   `t_i = 0` for a ray; rows become `[t_i, X_i]`.
//! - Reading back applies the inverse convention, so callers always see `A` and `X`
//!   with their natural signs.

use nalgebra::{DMatrix, DVector};

use crate::context::ArithmeticContext;
use crate::dd::{DdConfig, Engine};
use crate::error::{DdError, DdResult};
use crate::matrix::{CoordinateMatrix, RepresentationKind};

/// Conversion direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Inequalities in, generators out.
    HToV,
    /// Generators in, inequalities out.
    VToH,
}

impl Direction {
    /// Kind of the input matrix.
    #[inline]
    pub fn source(self) -> RepresentationKind {
        match self {
            Direction::HToV => RepresentationKind::Inequality,
            Direction::VToH => RepresentationKind::Generator,
        }
    }
}

/// Negate without producing `-0.0`.
#[inline]
fn flip(x: f64) -> f64 {
    -x + 0.0
}

/// Build the homogeneous matrix for `(a, b)` read as `kind`.
pub fn to_coordinate_matrix(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    kind: RepresentationKind,
) -> DdResult<CoordinateMatrix> {
    if a.nrows() != b.len() {
        return Err(DdError::mismatch("rows of matrix vs vector length", a.nrows(), b.len()));
    }
    let cols = a.ncols() + 1;
    let mut m = CoordinateMatrix::new(kind, cols);
    let mut row = vec![0.0; cols];
    for i in 0..a.nrows() {
        row[0] = b[i];
        for j in 0..a.ncols() {
            row[j + 1] = match kind {
                RepresentationKind::Inequality => flip(a[(i, j)]),
                RepresentationKind::Generator => a[(i, j)],
            };
        }
        m.push_row(&row)?;
    }
    Ok(m)
}

/// Split a homogeneous matrix back into `(A, b)` or `(X, t)`.
///
/// A linearity row (equality or line) comes out as two opposed rows, in place.
pub fn from_coordinate_matrix(m: &CoordinateMatrix) -> (DMatrix<f64>, DVector<f64>) {
    let d = m.dimension();
    let sign = match m.kind() {
        RepresentationKind::Inequality => -1.0,
        RepresentationKind::Generator => 1.0,
    };
    let mut out: Vec<(f64, Vec<f64>)> = Vec::with_capacity(m.row_count());
    for (i, row) in m.rows().enumerate() {
        let dense = |s: f64| {
            (
                s * row[0] + 0.0,
                row[1..].iter().map(|x| s * sign * x + 0.0).collect::<Vec<f64>>(),
            )
        };
        out.push(dense(1.0));
        if m.is_linearity(i) {
            out.push(dense(-1.0));
        }
    }
    let a = DMatrix::from_fn(out.len(), d, |i, j| out[i].1[j]);
    let b = DVector::from_iterator(out.len(), out.iter().map(|(head, _)| *head));
    (a, b)
}

/// Convert `(a, b)` in `direction` under the default configuration.
pub fn convert(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    direction: Direction,
) -> DdResult<(DMatrix<f64>, DVector<f64>)> {
    convert_with(a, b, direction, &DdConfig::default())
}

pub fn convert_with(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    direction: Direction,
    cfg: &DdConfig,
) -> DdResult<(DMatrix<f64>, DVector<f64>)> {
    let input = to_coordinate_matrix(a, b, direction.source())?;
    let ctx = ArithmeticContext::acquire();
    let out = Engine::new(cfg, &ctx).run(&input)?;
    Ok(from_coordinate_matrix(&out))
}
