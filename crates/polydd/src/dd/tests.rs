use super::*;
use crate::context::ArithmeticContext;
use crate::error::{DdError, ErrorKind};
use crate::matrix::{CoordinateMatrix, RepresentationKind};

fn ineqs(cols: usize, rows: &[&[f64]]) -> CoordinateMatrix {
    CoordinateMatrix::from_rows(RepresentationKind::Inequality, cols, rows).unwrap()
}

fn gens(cols: usize, rows: &[&[f64]]) -> CoordinateMatrix {
    CoordinateMatrix::from_rows(RepresentationKind::Generator, cols, rows).unwrap()
}

fn run(m: &CoordinateMatrix, cfg: DdConfig) -> Result<CoordinateMatrix, DdError> {
    let ctx = ArithmeticContext::acquire();
    Engine::new(&cfg, &ctx).run(m)
}

fn assert_rows(m: &CoordinateMatrix, expected: &[&[f64]]) {
    assert_eq!(m.row_count(), expected.len(), "rows: {:?}", m.rows().collect::<Vec<_>>());
    for (got, want) in m.rows().zip(expected) {
        let close = got.iter().zip(want.iter()).all(|(a, b)| (a - b).abs() < 1e-9);
        assert!(close, "got {got:?}, want {want:?}");
    }
}

fn assert_same_set(m: &CoordinateMatrix, expected: &[&[f64]]) {
    assert_eq!(m.row_count(), expected.len());
    for want in expected {
        let found = m
            .rows()
            .any(|got| got.iter().zip(want.iter()).all(|(a, b)| (a - b).abs() < 1e-9));
        assert!(found, "missing {want:?} in {:?}", m.rows().collect::<Vec<_>>());
    }
}

fn square_h() -> CoordinateMatrix {
    // -1 <= x <= 1, -1 <= y <= 1 as [b, -A].
    ineqs(
        3,
        &[
            &[1.0, -1.0, 0.0],
            &[1.0, 1.0, 0.0],
            &[1.0, 0.0, -1.0],
            &[1.0, 0.0, 1.0],
        ],
    )
}

#[test]
fn unit_square_h_to_v_in_creation_order() {
    let v = run(&square_h(), DdConfig::default().verified()).unwrap();
    assert_eq!(v.kind(), RepresentationKind::Generator);
    assert_rows(
        &v,
        &[
            &[1.0, 1.0, 1.0],
            &[1.0, -1.0, 1.0],
            &[1.0, 1.0, -1.0],
            &[1.0, -1.0, -1.0],
        ],
    );
}

#[test]
fn unit_square_v_to_h() {
    let v = gens(
        3,
        &[
            &[1.0, 1.0, 1.0],
            &[1.0, -1.0, 1.0],
            &[1.0, 1.0, -1.0],
            &[1.0, -1.0, -1.0],
        ],
    );
    let h = run(&v, DdConfig::default().verified()).unwrap();
    assert_eq!(h.kind(), RepresentationKind::Inequality);
    assert_rows(
        &h,
        &[
            &[1.0, -1.0, 0.0],
            &[1.0, 0.0, -1.0],
            &[1.0, 0.0, 1.0],
            &[1.0, 1.0, 0.0],
        ],
    );
}

#[test]
fn single_ray_in_one_dimension_gives_x_nonnegative() {
    let v = gens(2, &[&[0.0, 1.0]]);
    let h = run(&v, DdConfig::default()).unwrap();
    assert_rows(&h, &[&[0.0, 1.0]]);
}

#[test]
fn inconsistent_system_yields_empty_generators() {
    // x <= -1 and x >= 1.
    let h = ineqs(2, &[&[-1.0, -1.0], &[-1.0, 1.0]]);
    let v = run(&h, DdConfig::default()).unwrap();
    assert!(v.is_empty());
    assert_eq!(v.col_count(), 2);
}

#[test]
fn infeasible_with_free_direction_is_still_empty() {
    // x <= -1, x >= 1, y free: the homogeneous cone keeps a line with t = 0 only.
    let h = ineqs(3, &[&[-1.0, -1.0, 0.0], &[-1.0, 1.0, 0.0]]);
    assert!(run(&h, DdConfig::default()).unwrap().is_empty());
}

#[test]
fn empty_inequality_system_is_the_whole_space() {
    let h = CoordinateMatrix::new(RepresentationKind::Inequality, 3);
    let v = run(&h, DdConfig::default()).unwrap();
    assert_rows(
        &v,
        &[
            &[1.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, -1.0, 0.0],
            &[0.0, 0.0, 1.0],
            &[0.0, 0.0, -1.0],
        ],
    );
}

#[test]
fn zero_dimensional_input_is_rejected() {
    let h = CoordinateMatrix::new(RepresentationKind::Inequality, 1);
    assert_eq!(
        run(&h, DdConfig::default()).unwrap_err().kind(),
        ErrorKind::EmptyRepresentation
    );
}

#[test]
fn empty_generator_set_is_rejected() {
    let v = CoordinateMatrix::new(RepresentationKind::Generator, 3);
    assert_eq!(
        run(&v, DdConfig::default()).unwrap_err(),
        DdError::EmptyVRepresentation
    );
}

#[test]
fn equality_rows_cut_a_segment() {
    // x + y = 1, x >= 0, y >= 0.
    let h = ineqs(3, &[&[1.0, -1.0, -1.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]])
        .with_linearity([0])
        .unwrap();
    let v = run(&h, DdConfig::default().verified()).unwrap();
    assert_rows(&v, &[&[1.0, 0.0, 1.0], &[1.0, 1.0, 0.0]]);
}

#[test]
fn strip_keeps_its_lineality_as_opposed_rays() {
    let h = ineqs(3, &[&[1.0, -1.0, 0.0], &[1.0, 1.0, 0.0]]);
    let v = run(&h, DdConfig::default().verified()).unwrap();
    assert_rows(
        &v,
        &[
            &[1.0, 1.0, 0.0],
            &[1.0, -1.0, 0.0],
            &[0.0, 0.0, 1.0],
            &[0.0, 0.0, -1.0],
        ],
    );
}

#[test]
fn ray_only_generators_get_the_origin_as_apex() {
    let v = gens(3, &[&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]]);
    let h = run(&v, DdConfig::default()).unwrap();
    assert_rows(&h, &[&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]]);
}

#[test]
fn line_generators_are_expanded() {
    // Origin + line along x + ray along y: the half-plane y >= 0.
    let v = gens(3, &[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]])
        .with_linearity([1])
        .unwrap();
    let h = run(&v, DdConfig::default()).unwrap();
    assert_rows(&h, &[&[0.0, 0.0, 1.0]]);
}

#[test]
fn generator_input_errors() {
    let through_vertex = gens(2, &[&[1.0, 1.0]]).with_linearity([0]).unwrap();
    let err = run(&through_vertex, DdConfig::default()).unwrap_err();
    assert!(matches!(err, DdError::CannotHandleLinearity { row: 0, .. }));

    let negative_flag = gens(2, &[&[1.0, 0.0], &[-1.0, 2.0]]);
    assert_eq!(
        run(&negative_flag, DdConfig::default()).unwrap_err().kind(),
        ErrorKind::ImproperInputFormat
    );
}

#[test]
fn every_order_finds_the_same_square() {
    let orders = [
        RowOrder::Input,
        RowOrder::Reverse,
        RowOrder::LexMin,
        RowOrder::LexMax,
        RowOrder::Random { seed: 3 },
        RowOrder::Random { seed: 11 },
    ];
    for order in orders {
        for adjacency in [AdjacencyTest::Combinatorial, AdjacencyTest::Algebraic] {
            let cfg = DdConfig::default()
                .with_row_order(order)
                .with_adjacency(adjacency)
                .verified();
            let v = run(&square_h(), cfg).unwrap();
            assert_same_set(
                &v,
                &[
                    &[1.0, 1.0, 1.0],
                    &[1.0, -1.0, 1.0],
                    &[1.0, 1.0, -1.0],
                    &[1.0, -1.0, -1.0],
                ],
            );
        }
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    // Duplicated facet makes the input degenerate.
    for r in square_h().rows() {
        rows.push(r.to_vec());
    }
    rows.push(vec![2.0, -2.0, 0.0]);
    let h = CoordinateMatrix::from_rows(RepresentationKind::Inequality, 3, &rows).unwrap();
    let cfg = DdConfig::default().with_row_order(RowOrder::LexMax);
    let a = run(&h, cfg).unwrap();
    let b = run(&h, cfg).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.row_count(), 4);
}

#[test]
fn candidate_limit_surfaces_as_its_own_kind() {
    let err = run(&square_h(), DdConfig::default().with_max_candidates(3)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LimitExceeded);
}
