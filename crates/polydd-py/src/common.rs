use nalgebra::{DMatrix, DVector};
use polydd::DdError;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

/// Row lists from Python into a dense `(matrix, vector)` pair.
pub fn dense_from_py(rows: Vec<Vec<f64>>, head: Vec<f64>) -> PyResult<(DMatrix<f64>, DVector<f64>)> {
    if rows.len() != head.len() {
        return Err(PyValueError::new_err(format!(
            "{} rows but {} right-hand entries",
            rows.len(),
            head.len()
        )));
    }
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(i) = rows.iter().position(|r| r.len() != ncols) {
        return Err(PyValueError::new_err(format!(
            "row {i} has {} entries, expected {ncols}",
            rows[i].len()
        )));
    }
    let a = DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]);
    Ok((a, DVector::from_vec(head)))
}

pub fn dense_to_py(pair: (DMatrix<f64>, DVector<f64>)) -> (Vec<Vec<f64>>, Vec<f64>) {
    let (a, head) = pair;
    let rows = a
        .row_iter()
        .map(|r| r.iter().copied().collect())
        .collect();
    (rows, head.iter().copied().collect())
}

/// Input problems become `ValueError`; numeric and resource failures `RuntimeError`.
pub fn map_dd_err(err: DdError) -> PyErr {
    let msg = format!("{}: {err}", err.kind().name());
    match err {
        DdError::LpCycling { .. }
        | DdError::NumericallyInconsistent { .. }
        | DdError::LimitExceeded { .. } => PyRuntimeError::new_err(msg),
        _ => PyValueError::new_err(msg),
    }
}
