//! Static row processing orders.

use std::cmp::Ordering;

use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::cfg::RowOrder;

/// Lexicographic comparison of two rows after max-abs normalization.
fn lex_cmp(a: &DVector<f64>, b: &DVector<f64>) -> Ordering {
    let sa = scale_of(a);
    let sb = scale_of(b);
    for (x, y) in a.iter().zip(b.iter()) {
        match (x / sa).partial_cmp(&(y / sb)).unwrap_or(Ordering::Equal) {
            Ordering::Equal => continue,
            o => return o,
        }
    }
    Ordering::Equal
}

#[inline]
fn scale_of(v: &DVector<f64>) -> f64 {
    let m = v.amax();
    if m > 0.0 {
        m
    } else {
        1.0
    }
}

/// Positions `0..rows.len()` in processing order. Sorting is stable, so ties keep
/// input order.
pub(crate) fn processing_order(rows: &[DVector<f64>], order: RowOrder) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..rows.len()).collect();
    match order {
        RowOrder::Input => {}
        RowOrder::Reverse => idx.reverse(),
        RowOrder::LexMin => idx.sort_by(|&i, &j| lex_cmp(&rows[i], &rows[j])),
        RowOrder::LexMax => idx.sort_by(|&i, &j| lex_cmp(&rows[j], &rows[i])),
        RowOrder::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            idx.shuffle(&mut rng);
        }
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    fn rows() -> Vec<DVector<f64>> {
        vec![
            dvector![1.0, 0.0, -1.0],
            dvector![1.0, -1.0, 0.0],
            dvector![2.0, -2.0, 0.0],
            dvector![1.0, 1.0, 0.0],
        ]
    }

    #[test]
    fn input_and_reverse() {
        assert_eq!(processing_order(&rows(), RowOrder::Input), vec![0, 1, 2, 3]);
        assert_eq!(processing_order(&rows(), RowOrder::Reverse), vec![3, 2, 1, 0]);
    }

    #[test]
    fn lex_orders_are_scale_invariant_and_stable() {
        // Rows 1 and 2 are equal after normalization and keep input order.
        assert_eq!(processing_order(&rows(), RowOrder::LexMin), vec![1, 2, 0, 3]);
        assert_eq!(processing_order(&rows(), RowOrder::LexMax), vec![3, 0, 1, 2]);
    }

    #[test]
    fn random_order_is_a_seeded_permutation() {
        let a = processing_order(&rows(), RowOrder::Random { seed: 7 });
        let b = processing_order(&rows(), RowOrder::Random { seed: 7 });
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }
}
