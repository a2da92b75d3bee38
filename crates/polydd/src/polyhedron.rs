//! Polyhedron holding both representations behind a per-instance lock.
//!
//! - A setter converts first and stores only on success, so a failed call leaves the
//!   previous pair untouched.
//! - The representation the caller supplied is stored as given; the other one is the
//!   engine output.
//! - Accessors hand out copies and fail with `NotAvailableForRepresentation` until a
//!   setter has succeeded.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use nalgebra::{DMatrix, DVector};

use crate::adapter::{from_coordinate_matrix, to_coordinate_matrix};
use crate::cdd_format;
use crate::context::ArithmeticContext;
use crate::dd::{DdConfig, Engine};
use crate::error::{DdError, DdResult};
use crate::matrix::{CoordinateMatrix, RepresentationKind};

#[derive(Clone, Debug)]
struct Pair {
    hrep: CoordinateMatrix,
    vrep: CoordinateMatrix,
}

impl Pair {
    fn get(&self, kind: RepresentationKind) -> &CoordinateMatrix {
        match kind {
            RepresentationKind::Inequality => &self.hrep,
            RepresentationKind::Generator => &self.vrep,
        }
    }
}

/// Convex polyhedron with lazily consistent H- and V-representations.
///
/// `Polyhedron` is `Send + Sync`; calls on one instance are serialized, calls on
/// different instances run independently.
#[derive(Debug)]
pub struct Polyhedron {
    cfg: DdConfig,
    ctx: ArithmeticContext,
    state: Mutex<Option<Pair>>,
}

impl Default for Polyhedron {
    fn default() -> Self {
        Self::new()
    }
}

impl Polyhedron {
    pub fn new() -> Self {
        Self::with_config(DdConfig::default())
    }

    pub fn with_config(cfg: DdConfig) -> Self {
        Self {
            cfg,
            ctx: ArithmeticContext::acquire(),
            state: Mutex::new(None),
        }
    }

    #[inline]
    pub fn config(&self) -> &DdConfig {
        &self.cfg
    }

    fn lock(&self) -> MutexGuard<'_, Option<Pair>> {
        // A panic while holding the lock cannot leave a half-written pair: the
        // state is replaced in one assignment.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set from a homogeneous matrix of either kind (linearity rows allowed).
    pub fn set_matrix(&self, input: CoordinateMatrix) -> DdResult<()> {
        let mut state = self.lock();
        let dual = Engine::new(&self.cfg, &self.ctx).run(&input)?;
        let pair = match input.kind() {
            RepresentationKind::Inequality => Pair {
                hrep: input,
                vrep: dual,
            },
            RepresentationKind::Generator => Pair {
                hrep: dual,
                vrep: input,
            },
        };
        *state = Some(pair);
        Ok(())
    }

    /// Set from `{x : A x <= b}`.
    pub fn set_hrep(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> DdResult<()> {
        self.set_matrix(to_coordinate_matrix(a, b, RepresentationKind::Inequality)?)
    }

    /// Set from generators `a` with type flags `t` (1 = vertex, 0 = ray).
    pub fn set_vrep(&self, a: &DMatrix<f64>, t: &DVector<f64>) -> DdResult<()> {
        self.set_matrix(to_coordinate_matrix(a, t, RepresentationKind::Generator)?)
    }

    /// Set from rays only; the origin becomes the apex.
    pub fn set_rays(&self, r: &DMatrix<f64>) -> DdResult<()> {
        self.set_vrep(r, &DVector::zeros(r.nrows()))
    }

    /// Set from vertices only (a polytope).
    pub fn set_vertices(&self, v: &DMatrix<f64>) -> DdResult<()> {
        self.set_vrep(v, &DVector::from_element(v.nrows(), 1.0))
    }

    /// Copy of the stored matrix of `kind`.
    pub fn matrix(&self, kind: RepresentationKind) -> DdResult<CoordinateMatrix> {
        self.lock()
            .as_ref()
            .map(|pair| pair.get(kind).clone())
            .ok_or(DdError::NotAvailableForRepresentation { kind })
    }

    /// Generators `(V, t)`.
    pub fn vrep(&self) -> DdResult<(DMatrix<f64>, DVector<f64>)> {
        Ok(from_coordinate_matrix(
            &self.matrix(RepresentationKind::Generator)?,
        ))
    }

    /// Inequalities `(A, b)` with `A x <= b`.
    pub fn hrep(&self) -> DdResult<(DMatrix<f64>, DVector<f64>)> {
        Ok(from_coordinate_matrix(
            &self.matrix(RepresentationKind::Inequality)?,
        ))
    }

    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    pub fn print_vrep<W: Write>(&self, sink: &mut W) -> DdResult<()> {
        cdd_format::write_matrix(sink, &self.matrix(RepresentationKind::Generator)?)
    }

    pub fn print_hrep<W: Write>(&self, sink: &mut W) -> DdResult<()> {
        cdd_format::write_matrix(sink, &self.matrix(RepresentationKind::Inequality)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use nalgebra::{dmatrix, dvector};

    fn square() -> Polyhedron {
        let p = Polyhedron::new();
        let a = dmatrix![1.0, 0.0; -1.0, 0.0; 0.0, 1.0; 0.0, -1.0];
        p.set_hrep(&a, &dvector![1.0, 1.0, 1.0, 1.0]).unwrap();
        p
    }

    #[test]
    fn accessors_fail_before_any_setter() {
        let p = Polyhedron::new();
        assert!(!p.is_set());
        assert_eq!(p.vrep().unwrap_err().kind(), ErrorKind::NotAvailableForRepresentation);
        assert_eq!(p.hrep().unwrap_err().kind(), ErrorKind::NotAvailableForRepresentation);
        let mut sink = Vec::new();
        assert!(p.print_hrep(&mut sink).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn hrep_is_kept_as_given_and_vrep_is_computed() {
        let p = square();
        let (a, b) = p.hrep().unwrap();
        assert_eq!(a, dmatrix![1.0, 0.0; -1.0, 0.0; 0.0, 1.0; 0.0, -1.0]);
        assert_eq!(b, dvector![1.0, 1.0, 1.0, 1.0]);
        let (v, t) = p.vrep().unwrap();
        assert_eq!(v.nrows(), 4);
        assert_eq!(t, dvector![1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn equalities_survive_the_dense_accessor() {
        // x + y = 1, x >= 0, y >= 0: a segment.
        let h = CoordinateMatrix::from_rows(
            RepresentationKind::Inequality,
            3,
            [[1.0, -1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        )
        .unwrap()
        .with_linearity([0])
        .unwrap();
        let p = Polyhedron::new();
        p.set_matrix(h).unwrap();
        assert_eq!(p.vrep().unwrap().0.nrows(), 2);

        let (a, b) = p.hrep().unwrap();
        assert_eq!(a.nrows(), 4);
        let again = Polyhedron::new();
        again.set_hrep(&a, &b).unwrap();
        let (v, t) = again.vrep().unwrap();
        assert_eq!(v.nrows(), 2);
        assert_eq!(t, dvector![1.0, 1.0]);
    }

    #[test]
    fn accessors_are_idempotent() {
        let p = square();
        assert_eq!(p.hrep().unwrap(), p.hrep().unwrap());
        assert_eq!(p.vrep().unwrap(), p.vrep().unwrap());
    }

    #[test]
    fn failed_setter_preserves_previous_state() {
        let p = square();
        let before = p.vrep().unwrap();
        let err = p
            .set_vrep(&DMatrix::zeros(0, 2), &DVector::zeros(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyVRepresentation);
        let err = p.set_hrep(&DMatrix::zeros(2, 2), &DVector::zeros(3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert_eq!(p.vrep().unwrap(), before);
    }

    #[test]
    fn convenience_setters_tag_rows() {
        let p = Polyhedron::new();
        p.set_rays(&dmatrix![1.0]).unwrap();
        let (a, b) = p.hrep().unwrap();
        // -x <= 0, i.e. x >= 0.
        assert_eq!(a, dmatrix![-1.0]);
        assert_eq!(b, dvector![0.0]);

        p.set_vertices(&dmatrix![0.0, 0.0; 1.0, 0.0; 0.0, 1.0]).unwrap();
        let (a, _) = p.hrep().unwrap();
        assert_eq!(a.nrows(), 3);
    }

    #[test]
    fn printing_uses_cdd_layout() {
        let p = square();
        let mut sink = Vec::new();
        p.print_vrep(&mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert!(text.starts_with("V-representation\nbegin\n 4 3 real\n"));
        assert!(text.trim_end().ends_with("end"));

        let mut sink = Vec::new();
        p.print_hrep(&mut sink).unwrap();
        assert!(String::from_utf8(sink).unwrap().starts_with("H-representation"));
    }

    #[test]
    fn polyhedron_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Polyhedron>();
    }
}
