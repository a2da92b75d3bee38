//! Homogeneous coordinate matrices: the unit the engine consumes and produces.
//!
//! Conventions
//! - Inequality rows are `[b_i, -A_i]`, so a point `x` is feasible iff `row · [1, x] >= 0`.
//! - Generator rows are `[t_i, X_i]` with `t = 1` for vertices and `t = 0` for rays.
//! - Column 0 is the homogenizing column; every matrix has at least one spatial column
//!   once validated.
//! - Row order is significant and preserved.

use std::fmt;

use crate::error::{DdError, DdResult};

/// Which side of the duality a matrix describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    /// H-representation: rows are inequalities.
    Inequality,
    /// V-representation: rows are vertices and rays.
    Generator,
}

impl RepresentationKind {
    #[inline]
    pub fn dual(self) -> Self {
        match self {
            RepresentationKind::Inequality => RepresentationKind::Generator,
            RepresentationKind::Generator => RepresentationKind::Inequality,
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepresentationKind::Inequality => f.write_str("H-representation"),
            RepresentationKind::Generator => f.write_str("V-representation"),
        }
    }
}

/// Row-major matrix of homogeneous rows tagged with a representation kind.
///
/// Invariants:
/// - All rows have `col_count()` entries.
/// - `linearity` is sorted, unique and in range. For inequalities a linearity row is an
///   equality; for generators it is a line.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateMatrix {
    kind: RepresentationKind,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    linearity: Vec<usize>,
}

impl CoordinateMatrix {
    /// Empty matrix (zero rows) with `cols` columns.
    pub fn new(kind: RepresentationKind, cols: usize) -> Self {
        Self {
            kind,
            rows: 0,
            cols,
            data: Vec::new(),
            linearity: Vec::new(),
        }
    }

    pub fn from_rows<I, R>(kind: RepresentationKind, cols: usize, rows: I) -> DdResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        let mut out = Self::new(kind, cols);
        for row in rows {
            out.push_row(row.as_ref())?;
        }
        Ok(out)
    }

    pub fn push_row(&mut self, row: &[f64]) -> DdResult<()> {
        if row.len() != self.cols {
            return Err(DdError::mismatch(
                format!("width of row {}", self.rows),
                self.cols,
                row.len(),
            ));
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    /// Mark rows as equalities (inequality kind) or lines (generator kind).
    pub fn with_linearity<I: IntoIterator<Item = usize>>(mut self, rows: I) -> DdResult<Self> {
        for row in rows {
            if row >= self.rows {
                return Err(DdError::mismatch("linearity row index bound", self.rows, row));
            }
            if let Err(pos) = self.linearity.binary_search(&row) {
                self.linearity.insert(pos, row);
            }
        }
        Ok(self)
    }

    #[inline]
    pub fn kind(&self) -> RepresentationKind {
        self.kind
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Ambient dimension `d` (columns minus the homogenizing column).
    #[inline]
    pub fn dimension(&self) -> usize {
        self.cols.saturating_sub(1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.rows, "row {row} out of range ({} rows)", self.rows);
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |r| self.row(r))
    }

    #[inline]
    pub fn linearity(&self) -> &[usize] {
        &self.linearity
    }

    #[inline]
    pub fn is_linearity(&self, row: usize) -> bool {
        self.linearity.binary_search(&row).is_ok()
    }

    /// Copy of the rows whose index satisfies `keep`, preserving order and linearity marks.
    pub fn filter_rows<F: FnMut(usize) -> bool>(&self, mut keep: F) -> Self {
        let mut out = Self::new(self.kind, self.cols);
        for r in 0..self.rows {
            if keep(r) {
                if self.is_linearity(r) {
                    out.linearity.push(out.rows);
                }
                out.data.extend_from_slice(self.row(r));
                out.rows += 1;
            }
        }
        out
    }

    /// Structural checks run before any conversion.
    ///
    /// - At least two columns (homogenizing column plus one spatial column).
    /// - Every entry finite.
    pub fn validate(&self) -> DdResult<()> {
        if self.cols < 2 {
            return Err(DdError::EmptyRepresentation { cols: self.cols });
        }
        if self.data.len() != self.rows * self.cols {
            return Err(DdError::mismatch(
                "matrix storage length",
                self.rows * self.cols,
                self.data.len(),
            ));
        }
        for (r, row) in self.rows().enumerate() {
            if let Some((c, &value)) = row.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(DdError::NoRealNumberSupport { row: r, col: c, value });
            }
        }
        if let Some(&last) = self.linearity.last() {
            if last >= self.rows {
                return Err(DdError::mismatch("linearity row index bound", self.rows, last));
            }
        }
        Ok(())
    }
}
