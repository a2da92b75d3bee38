//! Convert a cube to vertices and back, printing both in cdd layout.
//!
//! Usage:
//!   cargo run -p polydd --example cube_round_trip -- 3

use nalgebra::{DMatrix, DVector};
use polydd::{Direction, Polyhedron};

fn main() {
    let dim: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    // -1 <= x_i <= 1
    let mut a = DMatrix::zeros(2 * dim, dim);
    for i in 0..dim {
        a[(2 * i, i)] = 1.0;
        a[(2 * i + 1, i)] = -1.0;
    }
    let b = DVector::from_element(2 * dim, 1.0);

    let p = Polyhedron::new();
    if let Err(e) = p.set_hrep(&a, &b) {
        eprintln!("conversion failed: {e}");
        std::process::exit(1);
    }
    let mut out = std::io::stdout();
    p.print_vrep(&mut out).unwrap();

    let (v, t) = p.vrep().unwrap();
    let (a2, b2) = polydd::convert(&v, &t, Direction::VToH).unwrap();
    println!("round trip: {} facets in, {} facets out", a.nrows(), a2.nrows());
    println!("max |b| = {}", b2.amax());
}
