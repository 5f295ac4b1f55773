//! Non-linear HRV metrics: Poincaré plot descriptors and entropies.
//!
//! SD1/SD2 come from the standard deviations of the successive-difference and
//! NN series (ddof = 1):
//!
//! ```text
//! SD1 = √(½ · var(ΔNN))
//! SD2 = √(2 · var(NN) − ½ · var(ΔNN))
//! ```
//!
//! ApEn and SampEn use embedding dimension 2 and tolerance `0.2 · SDNN`.
use std::f64::consts::PI;

use super::{finite, ratio, std_dev};

/// Embedding dimension for ApEn / SampEn.
pub const EMBEDDING: usize = 2;
/// Tolerance for ApEn / SampEn as a multiple of SDNN.
pub const TOLERANCE: f64 = 0.2;

pub const NONLINEAR_COLUMNS: [&str; 9] = [
    "HRV_SD1",
    "HRV_SD2",
    "HRV_SD1SD2",
    "HRV_S",
    "HRV_CSI",
    "HRV_CVI",
    "HRV_CSI_Modified",
    "HRV_ApEn",
    "HRV_SampEn",
];

/// Non-linear metrics, aligned with [`NONLINEAR_COLUMNS`].
pub fn hrv_nonlinear(rri: &[f64]) -> [Option<f64>; 9] {
    let diffs: Vec<f64> = rri.windows(2).map(|w| w[1] - w[0]).collect();
    let sdnn = std_dev(rri);
    let sdsd = std_dev(&diffs);

    let sd1 = sdsd.and_then(|s| finite((0.5 * s * s).sqrt()));
    let sd2 = match (sdnn, sdsd) {
        (Some(a), Some(b)) => {
            let v = 2.0 * a * a - 0.5 * b * b;
            (v >= 0.0).then(|| v.sqrt())
        }
        _ => None,
    };
    let product = sd1.zip(sd2).map(|(a, b)| a * b);
    let r = sdnn.map(|s| TOLERANCE * s);

    [
        sd1,
        sd2,
        ratio(sd1, sd2),
        product.and_then(|p| finite(PI * p)),
        ratio(sd2, sd1),
        product.filter(|&p| p > 0.0).and_then(|p| finite((16.0 * p).log10())),
        ratio(sd2.map(|s| 4.0 * s * s), sd1),
        r.and_then(|r| approximate_entropy(rri, EMBEDDING, r)),
        r.and_then(|r| sample_entropy(rri, EMBEDDING, r)),
    ]
}

fn chebyshev_within(x: &[f64], i: usize, j: usize, m: usize, r: f64) -> bool {
    (0..m).all(|k| (x[i + k] - x[j + k]).abs() <= r)
}

/// Approximate entropy (Pincus), self-matches included.
pub fn approximate_entropy(x: &[f64], m: usize, r: f64) -> Option<f64> {
    if x.len() <= m + 1 {
        return None;
    }
    let phi = |m: usize| -> f64 {
        let n = x.len() - m + 1;
        let total: f64 = (0..n)
            .map(|i| {
                let c = (0..n).filter(|&j| chebyshev_within(x, i, j, m, r)).count();
                (c as f64 / n as f64).ln()
            })
            .sum();
        total / n as f64
    };
    finite(phi(m) - phi(m + 1))
}

/// Sample entropy: `-ln(A / B)` over template pairs, self-matches excluded.
///
/// Both template lengths are compared over the same `N − m` starting points.
/// `None` when no pair matches at either length.
pub fn sample_entropy(x: &[f64], m: usize, r: f64) -> Option<f64> {
    if x.len() < m + 2 {
        return None;
    }
    let n = x.len() - m;
    let (mut a, mut b) = (0usize, 0usize);
    for i in 0..n {
        for j in i + 1..n {
            if chebyshev_within(x, i, j, m, r) {
                b += 1;
                if (x[i + m] - x[j + m]).abs() <= r {
                    a += 1;
                }
            }
        }
    }
    if a == 0 || b == 0 {
        return None;
    }
    finite(-(a as f64 / b as f64).ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(values: &[Option<f64>; 9], name: &str) -> Option<f64> {
        let i = NONLINEAR_COLUMNS.iter().position(|c| *c == name).unwrap();
        values[i]
    }

    #[test]
    fn poincare_of_alternating_series() {
        // Beat-to-beat alternation on a slow ramp: short-term variability dominates.
        let rri: Vec<f64> = (0..50).map(|i| 800.0 + 50.0 * (i % 2) as f64 + i as f64).collect();
        let v = hrv_nonlinear(&rri);
        let sd1 = get(&v, "HRV_SD1").unwrap();
        let sd2 = get(&v, "HRV_SD2").unwrap();
        assert!(sd1 > sd2, "SD1={sd1} SD2={sd2}");
        approx::assert_abs_diff_eq!(get(&v, "HRV_S").unwrap(), PI * sd1 * sd2, epsilon = 1e-9);
    }

    #[test]
    fn too_short_is_undefined() {
        assert!(hrv_nonlinear(&[800.0, 810.0]).iter().all(Option::is_none));
    }

    #[test]
    fn regular_series_has_zero_sample_entropy() {
        // Every template matches, so A == B.
        assert_eq!(sample_entropy(&[1000.0; 30], 2, 0.0), Some(0.0));
    }

    #[test]
    fn noise_is_more_complex_than_periodic() {
        let periodic: Vec<f64> = (0..200).map(|i| [800.0, 820.0, 840.0, 820.0][i % 4]).collect();
        let mut state = 12345u64;
        let noisy: Vec<f64> = (0..200)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                800.0 + (state >> 33) as f64 / (1u64 << 31) as f64 * 40.0
            })
            .collect();
        let r = 8.0;
        let ap = approximate_entropy(&periodic, 2, r).unwrap();
        let an = approximate_entropy(&noisy, 2, r).unwrap();
        assert!(an > ap, "noisy ApEn {an} <= periodic {ap}");
    }
}
