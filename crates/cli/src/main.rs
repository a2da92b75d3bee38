mod provenance;
mod tabular;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use polydd::random::{
    cross_polytope_h, cross_polytope_v, hypercube_h, hypercube_v, sphere_points,
    tangent_halfspaces, ReplayToken, SphereParams,
};
use polydd::{AdjacencyTest, CoordinateMatrix, DdConfig, Polyhedron, RepresentationKind, RowOrder};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;

use provenance::Payload;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Polyhedral H/V conversion runner")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
enum DirectionArg {
    HToV,
    VToH,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
enum OrderArg {
    Input,
    Reverse,
    LexMin,
    LexMax,
    Random,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
enum AdjacencyArg {
    Combinatorial,
    Algebraic,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
enum Family {
    Cube,
    Cross,
    Sphere,
    Tangent,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
enum RepArg {
    H,
    V,
}

#[derive(Subcommand)]
enum Action {
    /// Convert a matrix file into its dual representation
    Convert {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Expected direction; checked against the input file's kind
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
        #[arg(long, value_enum, default_value_t = OrderArg::Input)]
        order: OrderArg,
        /// Seed for `--order random`
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = AdjacencyArg::Combinatorial)]
        adjacency: AdjacencyArg,
        /// Relative zero tolerance
        #[arg(long)]
        eps: Option<f64>,
        /// Abort once more candidates than this are alive
        #[arg(long)]
        max_candidates: Option<usize>,
        /// Re-check the output for redundant rows
        #[arg(long)]
        verify: bool,
        /// Also print the result in cdd layout to stdout
        #[arg(long)]
        print: bool,
    },
    /// Write a generated polytope
    Sample {
        #[arg(long, value_enum)]
        family: Family,
        #[arg(long, value_enum, default_value_t = RepArg::H)]
        rep: RepArg,
        #[arg(long)]
        dim: usize,
        /// Sample count for the sphere families
        #[arg(long, default_value_t = 16)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Serialize)]
struct ConvertParams {
    direction: DirectionArg,
    order: OrderArg,
    seed: u64,
    adjacency: AdjacencyArg,
    eps_zero: f64,
    max_candidates: Option<usize>,
    verify: bool,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Convert {
            input,
            out,
            direction,
            order,
            seed,
            adjacency,
            eps,
            max_candidates,
            verify,
            print,
        } => {
            let mut cfg = DdConfig::default();
            cfg.row_order = match order {
                OrderArg::Input => RowOrder::Input,
                OrderArg::Reverse => RowOrder::Reverse,
                OrderArg::LexMin => RowOrder::LexMin,
                OrderArg::LexMax => RowOrder::LexMax,
                OrderArg::Random => RowOrder::Random { seed },
            };
            cfg.adjacency = match adjacency {
                AdjacencyArg::Combinatorial => AdjacencyTest::Combinatorial,
                AdjacencyArg::Algebraic => AdjacencyTest::Algebraic,
            };
            if let Some(eps) = eps {
                if !(eps.is_finite() && eps > 0.0) {
                    bail!("--eps must be a positive number");
                }
                cfg.eps_zero = eps;
            }
            cfg.max_candidates = max_candidates;
            cfg.verify_output = verify;
            convert(&input, &out, direction, cfg, seed, print)
        }
        Action::Sample {
            family,
            rep,
            dim,
            count,
            seed,
            out,
        } => sample(family, rep, dim, count, seed, &out),
        Action::Report => report(),
    }
}

fn convert(
    input: &Path,
    out: &Path,
    expected: Option<DirectionArg>,
    cfg: DdConfig,
    seed: u64,
    print: bool,
) -> Result<()> {
    let m = tabular::read_matrix(input)?;
    let direction = match m.kind() {
        RepresentationKind::Inequality => DirectionArg::HToV,
        RepresentationKind::Generator => DirectionArg::VToH,
    };
    if let Some(expected) = expected {
        if std::mem::discriminant(&expected) != std::mem::discriminant(&direction) {
            bail!(
                "{} holds a {}, which converts {direction:?}, not {expected:?}",
                input.display(),
                m.kind()
            );
        }
    }
    tracing::info!(input = %input.display(), rows = m.row_count(), ?direction, "convert");

    let input_rows = m.row_count();
    let poly = Polyhedron::with_config(cfg);
    poly.set_matrix(m)
        .with_context(|| format!("converting {}", input.display()))?;
    let dual = poly.matrix(match direction {
        DirectionArg::HToV => RepresentationKind::Generator,
        DirectionArg::VToH => RepresentationKind::Inequality,
    })?;
    tabular::write_matrix(out, &dual)?;
    if print {
        let mut stdout = std::io::stdout().lock();
        match direction {
            DirectionArg::HToV => poly.print_vrep(&mut stdout)?,
            DirectionArg::VToH => poly.print_hrep(&mut stdout)?,
        }
    }

    let params = ConvertParams {
        direction,
        order: order_name(cfg.row_order),
        seed,
        adjacency: match cfg.adjacency {
            AdjacencyTest::Combinatorial => AdjacencyArg::Combinatorial,
            AdjacencyTest::Algebraic => AdjacencyArg::Algebraic,
        },
        eps_zero: cfg.eps_zero,
        max_candidates: cfg.max_candidates,
        verify: cfg.verify_output,
    };
    let payload = Payload::new(serde_json::to_value(&params)?)
        .with_inputs([input.display().to_string()])
        .with_counts(json!({
            "input_rows": input_rows,
            "output_rows": dual.row_count(),
            "vertices": count_vertices(&dual),
        }));
    let sidecar = provenance::write_sidecar(out, payload)?;
    tracing::info!(out = %out.display(), rows = dual.row_count(), sidecar = %sidecar.display(), "wrote");
    Ok(())
}

fn order_name(order: RowOrder) -> OrderArg {
    match order {
        RowOrder::Input => OrderArg::Input,
        RowOrder::Reverse => OrderArg::Reverse,
        RowOrder::LexMin => OrderArg::LexMin,
        RowOrder::LexMax => OrderArg::LexMax,
        RowOrder::Random { .. } => OrderArg::Random,
    }
}

/// Vertex rows of a generator matrix; `None` for inequalities.
fn count_vertices(m: &CoordinateMatrix) -> Option<usize> {
    (m.kind() == RepresentationKind::Generator).then(|| m.rows().filter(|r| r[0] != 0.0).count())
}

fn sample(family: Family, rep: RepArg, dim: usize, count: usize, seed: u64, out: &Path) -> Result<()> {
    let params = SphereParams {
        dim,
        count,
        clip_box: Some(2.0),
    };
    let tok = ReplayToken::new(seed, 0);
    let m = match (family, rep) {
        (Family::Cube, RepArg::H) => hypercube_h(dim)?,
        (Family::Cube, RepArg::V) => hypercube_v(dim)?,
        (Family::Cross, RepArg::H) => cross_polytope_h(dim)?,
        (Family::Cross, RepArg::V) => cross_polytope_v(dim)?,
        (Family::Sphere, RepArg::V) => sphere_points(&params, tok)?,
        (Family::Tangent, RepArg::H) => tangent_halfspaces(&params, tok)?,
        (Family::Sphere, RepArg::H) | (Family::Tangent, RepArg::V) => {
            bail!("{family:?} samples only exist as {}", match family {
                Family::Sphere => "--rep v",
                _ => "--rep h",
            })
        }
    };
    tracing::info!(?family, ?rep, dim, rows = m.row_count(), "sample");
    tabular::write_matrix(out, &m)?;
    let payload = Payload::new(json!({
        "family": family,
        "rep": rep,
        "dim": dim,
        "count": count,
        "seed": seed,
    }))
    .with_counts(json!({ "output_rows": m.row_count() }));
    provenance::write_sidecar(out, payload)?;
    Ok(())
}

fn report() -> Result<()> {
    let mut obj = provenance::header();
    obj["params"] = json!({ "defaults": format!("{:?}", DdConfig::default()) });
    obj["outputs"] = json!([]);
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
