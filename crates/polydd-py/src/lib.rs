//! PyO3 bindings for `polydd`.
//!
//! Notes
//! - Keep bindings thin: matrices cross the boundary as lists of rows plus the
//!   `b`/`t` column; NumPy conversion happens in the Python wrapper.
//! - Conversions release the GIL.

mod common;
mod poly;

use pyo3::prelude::*;

#[pymodule]
fn polydd_native(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("__version__", polydd::VERSION)?;
    poly::register(m)
}
