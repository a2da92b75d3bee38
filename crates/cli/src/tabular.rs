//! Matrix files for the CLI: cdd text (`.ine`, `.ext`, anything else) or tables
//! (`.csv`, `.parquet`).
//!
//! Table layout
//! - First column `b` (H-rep, `A x <= b`) or `t` (V-rep, 1 = vertex, 0 = ray).
//! - Remaining columns are the coefficients `A` or coordinates `X`, in order; their
//!   names are not interpreted. Written tables name them `x1..xd`.

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::{DMatrix, DVector};
use polars::prelude::*;
use polydd::adapter::{from_coordinate_matrix, to_coordinate_matrix};
use polydd::{cdd_format, CoordinateMatrix, RepresentationKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Cdd,
    Csv,
    Parquet,
}

impl Format {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Format::Csv,
            Some("parquet") => Format::Parquet,
            _ => Format::Cdd,
        }
    }
}

pub fn read_matrix(path: &Path) -> Result<CoordinateMatrix> {
    match Format::of(path) {
        Format::Cdd => cdd_format::read_path(path)
            .with_context(|| format!("reading cdd matrix {}", path.display())),
        Format::Csv => {
            let df = LazyCsvReader::new(path)
                .with_infer_schema_length(Some(100))
                .finish()?
                .collect()
                .with_context(|| format!("reading {}", path.display()))?;
            from_frame(&df)
        }
        Format::Parquet => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let df = ParquetReader::new(file).finish()?;
            from_frame(&df)
        }
    }
}

pub fn write_matrix(path: &Path, m: &CoordinateMatrix) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    match Format::of(path) {
        Format::Cdd => cdd_format::write_path(path, m)
            .with_context(|| format!("writing cdd matrix {}", path.display())),
        Format::Csv => {
            let mut df = to_frame(m)?;
            let mut file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
            Ok(())
        }
        Format::Parquet => {
            let mut df = to_frame(m)?;
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            ParquetWriter::new(file).finish(&mut df)?;
            Ok(())
        }
    }
}

fn column_values(s: &Series) -> Result<Vec<f64>> {
    let cast = s.cast(&DataType::Float64)?;
    cast.f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| anyhow!("column `{}` has a null at row {i}", s.name())))
        .collect()
}

fn from_frame(df: &DataFrame) -> Result<CoordinateMatrix> {
    let columns = df.get_columns();
    let Some((first, rest)) = columns.split_first() else {
        bail!("table has no columns");
    };
    let kind = match first.name().to_string().as_str() {
        "b" => RepresentationKind::Inequality,
        "t" => RepresentationKind::Generator,
        other => bail!("first column must be `b` or `t`, found `{other}`"),
    };
    let head = DVector::from_vec(column_values(first)?);
    let mut a = DMatrix::zeros(head.len(), rest.len());
    for (j, s) in rest.iter().enumerate() {
        for (i, v) in column_values(s)?.into_iter().enumerate() {
            a[(i, j)] = v;
        }
    }
    Ok(to_coordinate_matrix(&a, &head, kind)?)
}

fn to_frame(m: &CoordinateMatrix) -> Result<DataFrame> {
    if !m.linearity().is_empty() {
        bail!("tables cannot carry linearity rows; use a cdd file");
    }
    let (a, head) = from_coordinate_matrix(m);
    let head_name = match m.kind() {
        RepresentationKind::Inequality => "b",
        RepresentationKind::Generator => "t",
    };
    let mut series = vec![Series::new(head_name.into(), head.as_slice())];
    for j in 0..a.ncols() {
        let name = format!("x{}", j + 1);
        let col: Vec<f64> = a.column(j).iter().copied().collect();
        series.push(Series::new(name.as_str().into(), col));
    }
    Ok(DataFrame::new(series)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn square_h() -> CoordinateMatrix {
        CoordinateMatrix::from_rows(
            RepresentationKind::Inequality,
            3,
            [
                [1.0, -1.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 0.0, -1.0],
                [1.0, 0.0, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::of(Path::new("a/b.csv")), Format::Csv);
        assert_eq!(Format::of(Path::new("b.parquet")), Format::Parquet);
        assert_eq!(Format::of(Path::new("b.ine")), Format::Cdd);
        assert_eq!(Format::of(Path::new("noext")), Format::Cdd);
    }

    #[test]
    fn csv_round_trip_keeps_signs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sq.csv");
        write_matrix(&path, &square_h()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("b,x1,x2"));
        let back = read_matrix(&path).unwrap();
        assert_eq!(back, square_h());
    }

    #[test]
    fn cdd_round_trip_in_nested_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/sq.ine");
        write_matrix(&path, &square_h()).unwrap();
        assert_eq!(read_matrix(&path).unwrap(), square_h());
    }

    #[test]
    fn bad_first_column_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "q,x1\n1,2\n").unwrap();
        let err = read_matrix(&path).unwrap_err();
        assert!(err.to_string().contains("`b` or `t`"));
    }
}
