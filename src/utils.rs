//! Utility functions for the smartcab crate

use rand::{SeedableRng, rngs::StdRng};

/// Build a random source from an optional seed.
///
/// Without a seed the generator is seeded from the thread-local RNG, so runs
/// are not reproducible.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use smartcab::utils::seeded_rng;
///
/// let a: f64 = seeded_rng(Some(42)).random();
/// let b: f64 = seeded_rng(Some(42)).random();
/// assert_eq!(a, b);
/// ```
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(value) => StdRng::seed_from_u64(value),
        None => StdRng::seed_from_u64(rand::random::<u64>()),
    }
}

/// Arithmetic mean, or `None` for an empty input.
///
/// # Examples
///
/// ```
/// use smartcab::utils::mean;
///
/// assert_eq!(mean(vec![1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(Vec::<f64>::new()), None);
/// ```
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Fraction of `hits` in `total`, or 0 when `total` is zero.
pub fn rate(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = seeded_rng(Some(7));
        let mut b = seeded_rng(Some(7));
        for _ in 0..10 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn test_mean_of_single_value() {
        assert_eq!(mean([4.5]), Some(4.5));
    }

    #[test]
    fn test_rate_handles_zero_total() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(3, 4), 0.75);
    }
}
