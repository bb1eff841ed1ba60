//! Portable power/ln/exp fallback.
//!
//! Calling the host math library is fine, and is what every built-in in
//! [`super::builtins`] and the `**` operator in [`super::interpreter`]
//! actually do — `f64::powf`/`ln`/`exp`/`sqrt` are IEEE-754-correct and there
//! is no reason to reimplement them for a hosted Rust crate. This module
//! exists to supply one portable fallback: integer-exponent power by
//! repeated squaring, used for exact results on non-negative integer
//! exponents where `powf` would otherwise round through a floating-point
//! log/exp pair.

/// Raises `base` to `exponent`. Non-negative integer exponents use repeated
/// squaring for an exact (modulo IEEE rounding of the multiplications
/// themselves) result; anything else defers to the host's `powf`.
pub fn pow(base: f64, exponent: f64) -> f64 {
    if exponent >= 0.0 && exponent.fract() == 0.0 && exponent < i32::MAX as f64 {
        pow_nonneg_integer(base, exponent as u32)
    } else {
        base.powf(exponent)
    }
}

fn pow_nonneg_integer(base: f64, mut exponent: u32) -> f64 {
    let mut result = 1.0;
    let mut acc = base;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result *= acc;
        }
        acc *= acc;
        exponent >>= 1;
    }
    result
}

/// Portable natural log via Mercator-series range reduction. Kept for
/// completeness and tested against `f64::ln`, but [`super::builtins`] calls
/// `f64::ln` directly since substituting the host's math library is fine.
pub fn ln_series(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::NAN;
    }
    let (mantissa, exponent) = range_reduce(x);
    // mercator series for ln(1 + u), u = mantissa - 1, |u| < 1
    let u = mantissa - 1.0;
    let mut term = u;
    let mut sum = 0.0;
    let mut n = 1i32;
    loop {
        sum += term / n as f64;
        term *= -u;
        n += 1;
        if term.abs() / n as f64 < 1e-15 || n > 30 {
            break;
        }
    }
    sum + exponent as f64 * std::f64::consts::LN_2
}

/// Reduces `x` into `mantissa * 2^exponent` with `mantissa` in `[1, 2)`.
fn range_reduce(mut x: f64) -> (f64, i32) {
    let mut exponent = 0;
    while x >= 2.0 {
        x /= 2.0;
        exponent += 1;
    }
    while x < 1.0 {
        x *= 2.0;
        exponent -= 1;
    }
    (x, exponent)
}

/// Portable `e^x` via the Taylor series to a relative-error threshold of
/// 1e-15 or 30 terms. Tested against `f64::exp`; [`super::builtins`] calls
/// `f64::exp` directly in practice.
pub fn exp_series(x: f64) -> f64 {
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut n = 1i32;
    loop {
        term *= x / n as f64;
        sum += term;
        n += 1;
        if term.abs() / sum.abs().max(1e-300) < 1e-15 || n > 30 {
            break;
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_power_matches_repeated_multiplication() {
        assert_eq!(pow(2.0, 10.0), 1024.0);
        assert_eq!(pow(3.0, 0.0), 1.0);
    }

    #[test]
    fn fractional_power_defers_to_powf() {
        assert!((pow(4.0, 0.5) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn ln_series_matches_host_within_tolerance() {
        for x in [0.5, 1.0, 2.0, 10.0, 100.0, 1e6] {
            assert!((ln_series(x) - x.ln()).abs() < 1e-9, "ln({x})");
        }
    }

    #[test]
    fn exp_series_matches_host_within_tolerance() {
        for x in [-5.0, -1.0, 0.0, 1.0, 5.0] {
            assert!((exp_series(x) - x.exp()).abs() < 1e-9, "exp({x})");
        }
    }
}
