//! Engine: one coordinate matrix in, its dual out.
//!
//! Steps
//! - Validate the input and expand linearity rows into opposed pairs.
//! - Add the fixed rows that make the homogeneous cone describe the polyhedron
//!   (`t >= 0` for inequalities, the origin apex for ray-only generator sets).
//! - Enumerate the cone, then read the candidates back as generators or inequalities.
//!
//! The cone lives only for the duration of `run`; nothing survives a failed call.

use nalgebra::DVector;

use crate::context::ArithmeticContext;
use crate::error::{DdError, DdResult};
use crate::matrix::{CoordinateMatrix, RepresentationKind};
use crate::redundancy;

use super::cfg::DdConfig;
use super::cone::{normalize_max, Cone, ConeGenerators};
use super::order::processing_order;

/// Homogeneous rows handed to the cone.
///
/// `fixed` rows come first and are absorbed before any caller row.
/// `groups[r]` lists the prepared rows built from caller row `r`.
#[derive(Clone, Debug)]
struct Prepared {
    rows: Vec<DVector<f64>>,
    fixed: usize,
    groups: Vec<Vec<usize>>,
}

impl Prepared {
    fn with_fixed(fixed_rows: Vec<DVector<f64>>) -> Self {
        Self {
            fixed: fixed_rows.len(),
            rows: fixed_rows,
            groups: Vec::new(),
        }
    }

    /// Append the prepared copies of one caller row.
    fn push_group(&mut self, copies: impl IntoIterator<Item = DVector<f64>>) {
        let mut group = Vec::new();
        for v in copies {
            group.push(self.rows.len());
            self.rows.push(v);
        }
        self.groups.push(group);
    }

    /// Fixed rows, then each caller row's copies in the caller-row order.
    fn order(&self, caller_order: &[usize]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.fixed).collect();
        for &r in caller_order {
            order.extend_from_slice(&self.groups[r]);
        }
        order
    }
}

#[inline]
fn unit(dim: usize, axis: usize) -> DVector<f64> {
    let mut v = DVector::zeros(dim);
    v[axis] = 1.0;
    v
}

fn caller_rows(input: &CoordinateMatrix) -> Vec<DVector<f64>> {
    input.rows().map(DVector::from_row_slice).collect()
}

fn prepare_inequalities(input: &CoordinateMatrix) -> Prepared {
    let cols = input.col_count();
    let mut prep = Prepared::with_fixed(vec![unit(cols, 0)]);
    for (r, row) in input.rows().enumerate() {
        let v = DVector::from_row_slice(row);
        if input.is_linearity(r) {
            let neg = -&v;
            prep.push_group([v, neg]);
        } else {
            prep.push_group([v]);
        }
    }
    prep
}

fn prepare_generators(input: &CoordinateMatrix) -> DdResult<Prepared> {
    if input.is_empty() {
        return Err(DdError::EmptyVRepresentation);
    }
    let cols = input.col_count();
    for (r, row) in input.rows().enumerate() {
        if row[0] < 0.0 {
            return Err(DdError::format(
                format!("generator row {r}"),
                format!("type flag {} is negative", row[0]),
            ));
        }
        if input.is_linearity(r) && row[0] != 0.0 {
            return Err(DdError::CannotHandleLinearity {
                row: r,
                reason: "a line must have type flag 0",
            });
        }
    }
    let has_vertex = input.rows().any(|row| row[0] > 0.0);
    let mut prep = if has_vertex {
        Prepared::with_fixed(Vec::new())
    } else {
        tracing::warn!(
            rows = input.row_count(),
            "generator set has no vertex; using the origin as apex"
        );
        Prepared::with_fixed(vec![unit(cols, 0)])
    };
    for (r, row) in input.rows().enumerate() {
        let v = DVector::from_row_slice(row);
        if input.is_linearity(r) {
            let neg = -&v;
            prep.push_group([v, neg]);
        } else {
            prep.push_group([v]);
        }
    }
    Ok(prep)
}

/// Conversion driver bound to one configuration and one context handle.
pub struct Engine<'a> {
    cfg: &'a DdConfig,
    ctx: &'a ArithmeticContext,
}

impl<'a> Engine<'a> {
    pub fn new(cfg: &'a DdConfig, ctx: &'a ArithmeticContext) -> Self {
        Self { cfg, ctx }
    }

    /// Convert `input` into the dual representation.
    ///
    /// - Inequalities → generators of `{x : b - A x >= 0}`; an infeasible system
    ///   yields zero rows.
    /// - Generators → a minimal inequality system; the trivial `1 >= 0` row is omitted.
    pub fn run(&self, input: &CoordinateMatrix) -> DdResult<CoordinateMatrix> {
        input.validate()?;
        let prep = match input.kind() {
            RepresentationKind::Inequality => prepare_inequalities(input),
            RepresentationKind::Generator => prepare_generators(input)?,
        };
        let caller_order = processing_order(&caller_rows(input), self.cfg.row_order);
        let order = prep.order(&caller_order);
        let gens = Cone::enumerate(&prep.rows, &order, input.col_count(), self.cfg, self.ctx)?;

        let out = match input.kind() {
            RepresentationKind::Inequality => self.read_generators(gens, input.col_count())?,
            RepresentationKind::Generator => self.read_inequalities(gens, input.col_count())?,
        };
        tracing::info!(
            from = %input.kind(),
            input_rows = input.row_count(),
            output_rows = out.row_count(),
            "conversion finished"
        );
        if self.cfg.verify_output && !out.is_empty() {
            self.verify(&out)?;
        }
        Ok(out)
    }

    #[inline]
    fn is_zero(&self, x: f64, scale: f64) -> bool {
        x.abs() <= (self.cfg.eps_zero * scale).max(self.ctx.constants().almost_zero)
    }

    fn read_generators(&self, gens: ConeGenerators, cols: usize) -> DdResult<CoordinateMatrix> {
        let mut vertices = 0usize;
        let mut out = CoordinateMatrix::new(RepresentationKind::Generator, cols);
        for ray in gens.rays {
            let scale = ray.amax();
            if self.is_zero(ray[0], scale) {
                let mut r = ray;
                r[0] = 0.0;
                out.push_row(normalize_max(r).as_slice())?;
            } else {
                let mut v = &ray / ray[0];
                v[0] = 1.0;
                out.push_row(v.as_slice())?;
                vertices += 1;
            }
        }
        if vertices == 0 {
            tracing::debug!("homogeneous cone has no point with t > 0; polyhedron is empty");
            return Ok(CoordinateMatrix::new(RepresentationKind::Generator, cols));
        }
        for line in gens.lines {
            let mut l = line;
            l[0] = 0.0;
            let neg = -&l;
            out.push_row(l.as_slice())?;
            out.push_row(neg.as_slice())?;
        }
        Ok(out)
    }

    fn read_inequalities(&self, gens: ConeGenerators, cols: usize) -> DdResult<CoordinateMatrix> {
        // `1 >= 0` as seen inside the pointed part: e0 minus its lineality components.
        let mut trivial = unit(cols, 0);
        for line in &gens.lines {
            let unit_line = line.normalize();
            let c = unit_line.dot(&trivial);
            trivial.axpy(-c, &unit_line, 1.0);
        }
        let trivial_norm = trivial.norm();

        let mut out = CoordinateMatrix::new(RepresentationKind::Inequality, cols);
        for ray in gens.rays {
            if trivial_norm > 0.0 {
                let along = ray.dot(&trivial) / (trivial_norm * trivial_norm);
                let residual = (&ray - &trivial * along).amax();
                if along > 0.0 && self.is_zero(residual, ray.amax()) {
                    tracing::debug!("dropping trivial inequality 1 >= 0");
                    continue;
                }
            }
            out.push_row(ray.as_slice())?;
        }
        for line in gens.lines {
            let neg = -&line;
            out.push_row(line.as_slice())?;
            out.push_row(neg.as_slice())?;
        }
        Ok(out)
    }

    fn verify(&self, out: &CoordinateMatrix) -> DdResult<()> {
        let redundant = redundancy::redundant_rows_with(out, self.cfg)?;
        if let Some(&row) = redundant.first() {
            return Err(DdError::inconsistent(format!(
                "output row {row} is redundant ({} redundant rows in {})",
                redundant.len(),
                out.kind()
            )));
        }
        Ok(())
    }
}

/// Run one conversion under a call-scoped context handle.
pub fn convert_matrix(input: &CoordinateMatrix, cfg: &DdConfig) -> DdResult<CoordinateMatrix> {
    let ctx = ArithmeticContext::acquire();
    Engine::new(cfg, &ctx).run(input)
}
