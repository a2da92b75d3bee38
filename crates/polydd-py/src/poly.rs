//! Polyhedron bindings (kept separate so `lib.rs` stays tiny).

use crate::common::{dense_from_py, dense_to_py, map_dd_err};
use polydd::{Direction, Polyhedron};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

type Dense = (Vec<Vec<f64>>, Vec<f64>);

/// Stateful H/V pair; each setter converts eagerly.
#[pyclass(name = "Polyhedron")]
pub struct PyPolyhedron {
    inner: Polyhedron,
}

#[pymethods]
impl PyPolyhedron {
    #[new]
    fn new() -> Self {
        Self {
            inner: Polyhedron::new(),
        }
    }

    /// Set `A x <= b` and compute the generators.
    fn set_hrep(&self, py: Python<'_>, a: Vec<Vec<f64>>, b: Vec<f64>) -> PyResult<()> {
        let (a, b) = dense_from_py(a, b)?;
        py.allow_threads(|| self.inner.set_hrep(&a, &b))
            .map_err(map_dd_err)
    }

    /// Set generator rows with type flags `t` (1 vertex, 0 ray) and compute the inequalities.
    fn set_vrep(&self, py: Python<'_>, x: Vec<Vec<f64>>, t: Vec<f64>) -> PyResult<()> {
        let (x, t) = dense_from_py(x, t)?;
        py.allow_threads(|| self.inner.set_vrep(&x, &t))
            .map_err(map_dd_err)
    }

    fn hrep(&self) -> PyResult<Dense> {
        self.inner.hrep().map(dense_to_py).map_err(map_dd_err)
    }

    fn vrep(&self) -> PyResult<Dense> {
        self.inner.vrep().map(dense_to_py).map_err(map_dd_err)
    }

    fn is_set(&self) -> bool {
        self.inner.is_set()
    }
}

/// One-shot conversion; `direction` is `"h-to-v"` or `"v-to-h"`.
#[pyfunction]
pub fn convert(
    py: Python<'_>,
    direction: &str,
    a: Vec<Vec<f64>>,
    head: Vec<f64>,
) -> PyResult<Dense> {
    let direction = match direction {
        "h-to-v" => Direction::HToV,
        "v-to-h" => Direction::VToH,
        other => {
            return Err(PyValueError::new_err(format!(
                "direction must be \"h-to-v\" or \"v-to-h\", got {other:?}"
            )))
        }
    };
    let (a, head) = dense_from_py(a, head)?;
    py.allow_threads(|| polydd::convert(&a, &head, direction))
        .map(dense_to_py)
        .map_err(map_dd_err)
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_class::<PyPolyhedron>()?;
    m.add_function(wrap_pyfunction!(convert, m)?)?;
    Ok(())
}
