//! Legendre polynomials and the root families used by the LG, LGR and LGL node sets.
//!
//! All evaluation goes through the three-term recurrence
//! `(k+1) P_{k+1} = (2k+1) x P_k - k P_{k-1}` and the derivative recurrence
//! `P'_{k+1} = P'_{k-1} + (2k+1) P_k`, which stays finite at the endpoints.
//! Roots are polished by Newton iteration started from Chebyshev-type guesses.
use crate::numerical::errors::{CollocationError, CollocationResult};
use log::debug;
use std::f64::consts::PI;

/// relative Newton step at which a root is accepted, `|dx| <= 4ε (1 + |x|)`
const NEWTON_TOL: f64 = 4.0 * f64::EPSILON;
const NEWTON_MAX_ITER: usize = 100;
/// residual `|f(x)|` accepted after the iteration cap when the step criterion
/// stalls on rounding noise
const RESIDUAL_TOL: f64 = 1e-12;

/// Values of `P_n`, `P_{n-1}` and their first derivatives at one point
#[derive(Debug, Clone, Copy)]
pub struct LegendreValues {
    pub p: f64,
    pub dp: f64,
    pub p_prev: f64,
    pub dp_prev: f64,
}

pub fn legendre(n: usize, x: f64) -> LegendreValues {
    if n == 0 {
        return LegendreValues {
            p: 1.0,
            dp: 0.0,
            p_prev: 0.0,
            dp_prev: 0.0,
        };
    }
    let (mut p_prev, mut p) = (1.0, x);
    let (mut dp_prev, mut dp) = (0.0, 1.0);
    for k in 1..n {
        let kf = k as f64;
        let p_next = ((2.0 * kf + 1.0) * x * p - kf * p_prev) / (kf + 1.0);
        let dp_next = dp_prev + (2.0 * kf + 1.0) * p;
        p_prev = p;
        p = p_next;
        dp_prev = dp;
        dp = dp_next;
    }
    LegendreValues {
        p,
        dp,
        p_prev,
        dp_prev,
    }
}

/// `[P_0(x), P_1(x), ..., P_n(x)]`
pub fn legendre_all(n: usize, x: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(n + 1);
    out.push(1.0);
    if n == 0 {
        return out;
    }
    out.push(x);
    for k in 1..n {
        let kf = k as f64;
        let next = ((2.0 * kf + 1.0) * x * out[k] - kf * out[k - 1]) / (kf + 1.0);
        out.push(next);
    }
    out
}

/// `∫_{-1}^{x} P_k(s) ds` for `k = 0..n`
pub fn legendre_integrals(n: usize, x: f64) -> Vec<f64> {
    let p = legendre_all(n + 1, x);
    (0..=n)
        .map(|k| {
            if k == 0 {
                x + 1.0
            } else {
                (p[k + 1] - p[k - 1]) / (2.0 * k as f64 + 1.0)
            }
        })
        .collect()
}

fn newton<F>(mut x: f64, degree: usize, index: usize, f: F) -> CollocationResult<f64>
where
    F: Fn(f64) -> (f64, f64),
{
    for _ in 0..NEWTON_MAX_ITER {
        let (value, slope) = f(x);
        if value == 0.0 {
            return Ok(x);
        }
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        let dx = value / slope;
        x -= dx;
        if dx.abs() <= NEWTON_TOL * (1.0 + x.abs()) {
            return Ok(x);
        }
    }
    let (residual, _) = f(x);
    if residual.abs() < RESIDUAL_TOL {
        debug!(
            "Newton step criterion stalled for degree {} root {}, residual {:e}",
            degree, index, residual
        );
        Ok(x)
    } else {
        Err(CollocationError::RootFindingFailed { degree, index })
    }
}

/// Roots of `P_n`, ascending
pub fn gauss_roots(n: usize) -> CollocationResult<Vec<f64>> {
    (0..n)
        .map(|i| {
            let guess = -(PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            newton(guess, n, i, |x| {
                let v = legendre(n, x);
                (v.p, v.dp)
            })
        })
        .collect()
}

/// Roots of `P'_n` strictly inside (-1, 1), ascending
pub fn lobatto_interior_roots(n: usize) -> CollocationResult<Vec<f64>> {
    let nf = n as f64;
    (1..n)
        .map(|i| {
            let guess = -(PI * i as f64 / nf).cos();
            newton(guess, n, i, |x| {
                let v = legendre(n, x);
                // P''_n from the Legendre differential equation
                let ddp = (2.0 * x * v.dp - nf * (nf + 1.0) * v.p) / (1.0 - x * x);
                (v.dp, ddp)
            })
        })
        .collect()
}

/// Roots of `P_{m-1} + P_m` other than -1, ascending
pub fn radau_interior_roots(m: usize) -> CollocationResult<Vec<f64>> {
    let denom = 2.0 * m as f64 - 1.0;
    (1..m)
        .map(|i| {
            let guess = -(2.0 * PI * i as f64 / denom).cos();
            newton(guess, m, i, |x| {
                let v = legendre(m, x);
                (v.p + v.p_prev, v.dp + v.dp_prev)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_legendre_low_degrees() {
        let x = 0.3;
        let v = legendre(2, x);
        assert_relative_eq!(v.p, 1.5 * x * x - 0.5, epsilon = 1e-15);
        assert_relative_eq!(v.dp, 3.0 * x, epsilon = 1e-15);
        assert_relative_eq!(v.p_prev, x, epsilon = 1e-15);
        let v3 = legendre(3, x);
        assert_relative_eq!(v3.p, 0.5 * (5.0 * x.powi(3) - 3.0 * x), epsilon = 1e-15);
        assert_relative_eq!(v3.dp, 0.5 * (15.0 * x * x - 3.0), epsilon = 1e-15);
    }

    #[test]
    fn test_legendre_endpoints() {
        for n in 0..10 {
            let v = legendre(n, 1.0);
            assert_relative_eq!(v.p, 1.0, epsilon = 1e-13);
            let nf = n as f64;
            assert_relative_eq!(v.dp, nf * (nf + 1.0) / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_legendre_all_matches_single() {
        let all = legendre_all(6, -0.7);
        for (k, value) in all.iter().enumerate() {
            assert_relative_eq!(*value, legendre(k, -0.7).p, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_legendre_integrals() {
        // ∫_{-1}^{x} s ds = (x² - 1)/2
        let x = 0.4;
        let ints = legendre_integrals(2, x);
        assert_relative_eq!(ints[0], x + 1.0, epsilon = 1e-15);
        assert_relative_eq!(ints[1], (x * x - 1.0) / 2.0, epsilon = 1e-15);
        // P_2 = (3s² - 1)/2 integrates to (x³ - x)/2
        assert_relative_eq!(ints[2], (x.powi(3) - x) / 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_gauss_roots_known() {
        let r = gauss_roots(2).unwrap();
        assert_relative_eq!(r[0], -1.0 / 3f64.sqrt(), epsilon = 1e-15);
        assert_relative_eq!(r[1], 1.0 / 3f64.sqrt(), epsilon = 1e-15);
        let r3 = gauss_roots(3).unwrap();
        assert_relative_eq!(r3[1], 0.0, epsilon = 1e-15);
        assert_relative_eq!(r3[2], (3.0f64 / 5.0).sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_roots_are_roots() {
        for n in 2..25 {
            for x in gauss_roots(n).unwrap() {
                assert!(legendre(n, x).p.abs() < 1e-12);
            }
            for x in lobatto_interior_roots(n).unwrap() {
                assert!(legendre(n, x).dp.abs() < 1e-10);
            }
            for x in radau_interior_roots(n).unwrap() {
                let v = legendre(n, x);
                assert!((v.p + v.p_prev).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_newton_acceptance() {
        // step criterion |dx| <= 4ε (1 + |x|)
        let r = newton(2.0, 2, 0, |x| (x * x - 2.0, 2.0 * x)).unwrap();
        assert!((r - 2f64.sqrt()).abs() <= NEWTON_TOL * (1.0 + r.abs()));
        // no usable slope: the iterate stands if its residual is below 1e-12
        assert_eq!(newton(0.3, 1, 0, |_| (1e-13, 0.0)).unwrap(), 0.3);
        assert!(matches!(
            newton(0.3, 5, 2, |_| (1e-9, 0.0)),
            Err(CollocationError::RootFindingFailed { degree: 5, index: 2 })
        ));
    }

    #[test]
    fn test_roots_ascending_and_distinct() {
        for n in 2..30 {
            let r = radau_interior_roots(n).unwrap();
            assert_eq!(r.len(), n - 1);
            assert!(r[0] > -1.0);
            assert!(r.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
