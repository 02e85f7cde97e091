//! Integer square root (restoring algorithm) and cube root (Newton's
//! method), grounded on `fxp16_sqrt`/`fxp16_cbrt` in `fxp16.c`.

use crate::fixed::{copysign, div, fabs, mult, sub, Fxp16};
use crate::{set_dom, DomainError, FxpResult};

/// Newton iteration count for [`cbrt`], matching the source's
/// `FXP16_CBRT_ITERATIONS`.
const CBRT_ITERATIONS: u32 = 17;

/// Square root via the classic binary restoring algorithm: `x` is
/// widened and shifted left by `frac_bits` so that the integer square
/// root of the shifted operand is directly the Qn result, with no
/// separate re-scale step needed afterward.
///
/// `x < 0` is a domain error; returns 0 and sets [`crate::dom_error`].
pub fn sqrt(x: Fxp16, frac_bits: u32) -> Fxp16 {
    if x < 0 {
        set_dom();
        return 0;
    }
    if x == 0 {
        return 0;
    }
    let op = (x as u32) << frac_bits;
    let mut res: u32 = 0;
    let mut bit: u32 = 1 << 30;
    while bit > op {
        bit >>= 2;
    }
    let mut op = op;
    while bit != 0 {
        if op >= res + bit {
            op -= res + bit;
            res = (res >> 1) + bit;
        } else {
            res >>= 1;
        }
        bit >>= 2;
    }
    if res > i16::MAX as u32 {
        i16::MAX
    } else {
        res as i16
    }
}

/// Tagged-result alternative to [`sqrt`]: `Err(DomainError)` for `x < 0`
/// instead of setting the implicit [`crate::dom_error`] flag and
/// returning 0.
pub fn try_sqrt(x: Fxp16, frac_bits: u32) -> FxpResult<Fxp16> {
    if x < 0 {
        return Err(DomainError);
    }
    Ok(sqrt(x, frac_bits))
}

/// Cube root by Newton's method on `f(y) = y^3 - x`, started from `x`
/// itself and refined over [`CBRT_ITERATIONS`] steps; the sign is
/// carried separately since every division inside the loop operates on
/// the magnitude only.
pub fn cbrt(x: Fxp16, frac_bits: u32) -> Fxp16 {
    if x == 0 {
        return 0;
    }
    let ax = fabs(x);
    let three = crate::fixed::int2fp(3, frac_bits);
    let mut y = if ax == 0 { 1 } else { ax.max(1) };
    for _ in 0..CBRT_ITERATIONS {
        let y2 = mult(y, y, frac_bits);
        let y3 = mult(y2, y, frac_bits);
        let numerator = sub(y3, ax);
        let denom = mult(three, y2, frac_bits);
        if denom == 0 {
            break;
        }
        let delta = div(numerator, denom, frac_bits);
        y = sub(y, delta);
        if y <= 0 {
            y = 1;
        }
    }
    copysign(y, x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::flt2fp;

    #[test]
    fn sqrt_of_quarter_is_exactly_half_in_q15() {
        let quarter = flt2fp(0.25, 15);
        assert_eq!(sqrt(quarter, 15), flt2fp(0.5, 15));
    }

    #[test]
    fn sqrt_of_two_is_within_one_lsb_in_q8() {
        let two = flt2fp(2.0, 8);
        let got = sqrt(two, 8);
        let want = flt2fp(core::f32::consts::SQRT_2, 8);
        assert!((got - want).abs() <= 1);
    }

    #[test]
    fn sqrt_negative_is_domain_error() {
        crate::clear_dom();
        assert_eq!(sqrt(flt2fp(-1.0, 8), 8), 0);
        assert!(crate::dom_error());
    }

    #[test]
    fn try_sqrt_reports_domain_error_as_err_not_sentinel() {
        assert_eq!(try_sqrt(flt2fp(-1.0, 8), 8), Err(crate::DomainError));
        assert_eq!(try_sqrt(flt2fp(4.0, 8), 8), Ok(sqrt(flt2fp(4.0, 8), 8)));
    }

    #[test]
    fn cbrt_of_eight_is_close_to_two() {
        let eight = flt2fp(8.0, 8);
        let got = cbrt(eight, 8);
        let want = flt2fp(2.0, 8);
        assert!((got - want).abs() <= 2);
    }

    #[test]
    fn cbrt_is_odd() {
        let x = flt2fp(3.0, 8);
        assert_eq!(cbrt(-x, 8), -cbrt(x, 8));
    }
}
