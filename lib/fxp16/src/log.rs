//! Logarithms: `log2`, `log`, `log10`, `log1p`.
//!
//! Grounded on `fxp32_log2_q15`/`fxp32_logN_q15` in `fxp16.c`: normalize
//! `x = m * 2^p` (mantissa `m` in `[1, 2)`, via the same MSB scan as
//! [`crate::fixed::ilogb`]), then extract the fractional bits of
//! `log2(m)` one at a time by repeated squaring against the `2.0`
//! threshold. `log`/`log10` are `log2(x)` rescaled by `ln(2)`/`log10(2)`.

use crate::fixed::{add, ashift, flt2fp, ilogb, int2fp, mult, sat16, Fxp16, Fxp32};
use crate::{set_dom, DomainError, FxpResult};

const LOG2_ITERATIONS: u32 = 15;
const ONE_Q15: Fxp32 = 1 << 15;
const TWO_Q15: Fxp32 = 1 << 16;

/// `log2(x)` in `frac_bits` Qn. `x <= 0` is a domain error, returning
/// `i16::MIN`.
pub fn log2(x: Fxp16, frac_bits: u32) -> Fxp16 {
    if x <= 0 {
        set_dom();
        return i16::MIN;
    }
    let p = ilogb(x, frac_bits) as i32;

    // Bring x into a Q15 mantissa m in [1.0, 2.0): m = x / 2^(frac_bits+p).
    let shift_to_mantissa = 15 - (frac_bits as i32 + p);
    let mut m = ashift(x as i32, shift_to_mantissa);

    let mut frac_q15: Fxp32 = 0;
    let mut bit_weight: Fxp32 = ONE_Q15 >> 1;
    for _ in 0..LOG2_ITERATIONS {
        let squared = ((m as i64 * m as i64) / ONE_Q15 as i64) as i32;
        if squared >= TWO_Q15 {
            frac_q15 += bit_weight;
            m = squared / 2;
        } else {
            m = squared;
        }
        bit_weight >>= 1;
    }

    let log2_total_q15 = p * ONE_Q15 + frac_q15;
    let shift_to_output = frac_bits as i32 - 15;
    sat16(ashift(log2_total_q15, shift_to_output))
}

/// Tagged-result alternative to [`log2`]: `Err(DomainError)` instead of
/// setting the implicit [`crate::dom_error`] flag.
pub fn try_log2(x: Fxp16, frac_bits: u32) -> FxpResult<Fxp16> {
    if x <= 0 {
        return Err(DomainError);
    }
    Ok(log2(x, frac_bits))
}

/// Natural logarithm, `log2(x) * ln(2)`.
pub fn log(x: Fxp16, frac_bits: u32) -> Fxp16 {
    if x <= 0 {
        set_dom();
        return i16::MIN;
    }
    let l2 = log2(x, frac_bits);
    mult(l2, flt2fp(core::f32::consts::LN_2, frac_bits), frac_bits)
}

/// Tagged-result alternative to [`log`].
pub fn try_log(x: Fxp16, frac_bits: u32) -> FxpResult<Fxp16> {
    if x <= 0 {
        return Err(DomainError);
    }
    Ok(log(x, frac_bits))
}

/// Base-10 logarithm, `log2(x) * log10(2)`.
pub fn log10(x: Fxp16, frac_bits: u32) -> Fxp16 {
    if x <= 0 {
        set_dom();
        return i16::MIN;
    }
    let l2 = log2(x, frac_bits);
    mult(l2, flt2fp(core::f32::consts::LOG10_2, frac_bits), frac_bits)
}

/// Tagged-result alternative to [`log10`].
pub fn try_log10(x: Fxp16, frac_bits: u32) -> FxpResult<Fxp16> {
    if x <= 0 {
        return Err(DomainError);
    }
    Ok(log10(x, frac_bits))
}

/// `log(1 + x)`, useful near `x == 0` where `log` alone loses precision
/// to the rounding in `1 + x`.
pub fn log1p(x: Fxp16, frac_bits: u32) -> Fxp16 {
    let one_plus_x = add(int2fp(1, frac_bits), x);
    log(one_plus_x, frac_bits)
}

/// Tagged-result alternative to [`log1p`]: domain error iff `1 + x <= 0`.
pub fn try_log1p(x: Fxp16, frac_bits: u32) -> FxpResult<Fxp16> {
    let one_plus_x = add(int2fp(1, frac_bits), x);
    try_log(one_plus_x, frac_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: i16, b: i16, tol: i16) -> bool {
        (a as i32 - b as i32).abs() <= tol as i32
    }

    #[test]
    fn log2_of_one_is_zero() {
        assert_eq!(log2(int2fp(1, 8), 8), 0);
    }

    #[test]
    fn log2_of_eight_is_three() {
        let x = int2fp(8, 8);
        assert!(close(log2(x, 8), int2fp(3, 8), 2));
    }

    #[test]
    fn log2_is_monotonic_increasing() {
        let a = log2(int2fp(2, 8), 8);
        let b = log2(int2fp(4, 8), 8);
        let c = log2(int2fp(7, 8), 8);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn log_of_e_is_close_to_one() {
        let e = flt2fp(core::f32::consts::E, 8);
        assert!(close(log(e, 8), int2fp(1, 8), 2));
    }

    #[test]
    fn log_nonpositive_is_domain_error() {
        crate::clear_dom();
        assert_eq!(log2(0, 8), i16::MIN);
        assert!(crate::dom_error());
        crate::clear_dom();
        assert_eq!(log(-1, 8), i16::MIN);
        assert!(crate::dom_error());
    }

    #[test]
    fn log1p_near_zero_is_close_to_x() {
        let x = flt2fp(0.01, 12);
        let got = log1p(x, 12);
        assert!(close(got, x, 4));
    }

    #[test]
    fn try_log2_reports_domain_error_as_err_not_sentinel() {
        assert_eq!(try_log2(0, 8), Err(crate::DomainError));
        assert_eq!(try_log2(int2fp(1, 8), 8), Ok(0));
    }

    #[test]
    fn try_log_and_try_log10_agree_with_their_infallible_counterparts() {
        let e = flt2fp(core::f32::consts::E, 8);
        assert_eq!(try_log(e, 8), Ok(log(e, 8)));
        assert_eq!(try_log10(e, 8), Ok(log10(e, 8)));
        assert!(try_log(-1, 8).is_err());
        assert!(try_log10(-1, 8).is_err());
    }
}
