//! cdd-style text matrices (`.ine` / `.ext`).
//!
//! Layout
//! ```text
//! * comment lines start with '*'
//! H-representation            (or V-representation; H is assumed when absent)
//! linearity 2 1 3             (optional; count then 1-based row indices)
//! begin
//!  3 3 real                   (rows, columns, number type: real | integer | rational)
//!  1 -1 0
//!  ...
//! end
//! ```
//! Entries may be written as `p/q`. A `linearity` line is also accepted after `end`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{DdError, DdResult};
use crate::matrix::{CoordinateMatrix, RepresentationKind};

#[inline]
fn write_failed(e: io::Error) -> DdError {
    DdError::FileNotOpen {
        reason: e.to_string(),
    }
}

/// Write `m` to `sink`. Write errors surface as `FileNotOpen`.
pub fn write_matrix<W: Write>(sink: &mut W, m: &CoordinateMatrix) -> DdResult<()> {
    writeln!(sink, "{}", m.kind()).map_err(write_failed)?;
    if !m.linearity().is_empty() {
        write!(sink, "linearity {}", m.linearity().len()).map_err(write_failed)?;
        for r in m.linearity() {
            write!(sink, " {}", r + 1).map_err(write_failed)?;
        }
        writeln!(sink).map_err(write_failed)?;
    }
    writeln!(sink, "begin").map_err(write_failed)?;
    writeln!(sink, " {} {} real", m.row_count(), m.col_count()).map_err(write_failed)?;
    for row in m.rows() {
        for x in row {
            // `+ 0.0` folds -0 into 0.
            write!(sink, " {}", x + 0.0).map_err(write_failed)?;
        }
        writeln!(sink).map_err(write_failed)?;
    }
    writeln!(sink, "end").map_err(write_failed)?;
    sink.flush().map_err(write_failed)
}

/// Render `m` to a string.
pub fn to_string(m: &CoordinateMatrix) -> DdResult<String> {
    let mut buf = Vec::new();
    write_matrix(&mut buf, m)?;
    String::from_utf8(buf).map_err(|e| DdError::FileNotOpen {
        reason: e.to_string(),
    })
}

pub fn write_path(path: &Path, m: &CoordinateMatrix) -> DdResult<()> {
    let mut file = io::BufWriter::new(fs::File::create(path).map_err(|e| DdError::FileNotOpen {
        reason: format!("{}: {e}", path.display()),
    })?);
    write_matrix(&mut file, m)
}

pub fn read_path(path: &Path) -> DdResult<CoordinateMatrix> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DdError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DdError::FileNotOpen {
            reason: format!("{}: {e}", path.display()),
        },
    })?;
    parse_matrix(&text)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NumberType {
    Real,
    Integer,
    Rational,
}

fn parse_entry(token: &str, ty: NumberType, line: usize) -> DdResult<f64> {
    let bad = |why: &str| DdError::format(format!("line {line}"), format!("entry `{token}`: {why}"));
    let value = match token.split_once('/') {
        Some((p, q)) => {
            if ty != NumberType::Rational {
                return Err(bad("fraction in a non-rational matrix"));
            }
            let p: f64 = p.parse().map_err(|_| bad("bad numerator"))?;
            let q: f64 = q.parse().map_err(|_| bad("bad denominator"))?;
            if q == 0.0 {
                return Err(bad("zero denominator"));
            }
            p / q
        }
        None => {
            let v: f64 = token.parse().map_err(|_| bad("not a number"))?;
            if ty == NumberType::Integer && v.fract() != 0.0 {
                return Err(bad("non-integer in an integer matrix"));
            }
            v
        }
    };
    Ok(value)
}

fn parse_linearity(tokens: &[&str], line: usize) -> DdResult<Vec<usize>> {
    let bad = |why: &str| DdError::format(format!("line {line}"), format!("linearity: {why}"));
    let Some((count, rest)) = tokens.split_first() else {
        return Err(bad("missing count"));
    };
    let count: usize = count.parse().map_err(|_| bad("bad count"))?;
    if rest.len() != count {
        return Err(bad("count does not match the listed rows"));
    }
    rest.iter()
        .map(|t| match t.parse::<usize>() {
            Ok(i) if i >= 1 => Ok(i - 1),
            _ => Err(bad("row indices are 1-based integers")),
        })
        .collect()
}

/// Parse one matrix in the layout documented at module level.
pub fn parse_matrix(text: &str) -> DdResult<CoordinateMatrix> {
    let mut kind = RepresentationKind::Inequality;
    let mut linearity: Vec<usize> = Vec::new();
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('*'));

    // Header up to `begin`.
    let mut saw_begin = false;
    for (no, line) in lines.by_ref() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens[0] {
            "H-representation" => kind = RepresentationKind::Inequality,
            "V-representation" => kind = RepresentationKind::Generator,
            "linearity" => linearity = parse_linearity(&tokens[1..], no)?,
            "begin" => {
                saw_begin = true;
                break;
            }
            _ => {}
        }
    }
    if !saw_begin {
        return Err(DdError::format("header", "missing `begin`"));
    }

    let Some((size_no, size_line)) = lines.next() else {
        return Err(DdError::format("header", "missing size line after `begin`"));
    };
    let size: Vec<&str> = size_line.split_whitespace().collect();
    let bad_size = || DdError::format(format!("line {size_no}"), "expected `rows cols type`");
    if size.len() != 3 {
        return Err(bad_size());
    }
    let rows: usize = size[0].parse().map_err(|_| bad_size())?;
    let cols: usize = size[1].parse().map_err(|_| bad_size())?;
    let ty = match size[2] {
        "real" => NumberType::Real,
        "integer" => NumberType::Integer,
        "rational" => NumberType::Rational,
        other => {
            return Err(DdError::format(
                format!("line {size_no}"),
                format!("unknown number type `{other}`"),
            ))
        }
    };

    let expected = rows.checked_mul(cols).ok_or_else(|| {
        DdError::format(
            format!("line {size_no}"),
            format!("size {rows} x {cols} overflows"),
        )
    })?;
    let mut values: Vec<f64> = Vec::new();
    let mut saw_end = false;
    for (no, line) in lines.by_ref() {
        if line.starts_with("end") {
            saw_end = true;
            break;
        }
        for token in line.split_whitespace() {
            values.push(parse_entry(token, ty, no)?);
        }
    }
    if !saw_end {
        return Err(DdError::format("body", "missing `end`"));
    }
    if values.len() != expected {
        return Err(DdError::format(
            "body",
            format!("expected {expected} entries, found {}", values.len()),
        ));
    }

    for (no, line) in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens[0] == "linearity" {
            linearity = parse_linearity(&tokens[1..], no)?;
        }
    }

    let m = CoordinateMatrix::from_rows(kind, cols, values.chunks(cols.max(1)).take(rows))?
        .with_linearity(linearity)
        .map_err(|_| DdError::format("linearity", "row index out of range"))?;
    m.validate()?;
    Ok(m)
}
