//! Scalar conversions, saturating arithmetic and rounding helpers.
//!
//! Grounded on the `fxp16_*`/`fxp32_*` scalar functions in
//! `fxp16.c` (flt2fp, fp2flt, add/sub/mult/div, ceil/round/fmod/lround,
//! and the `fxp32_sat_shl`/`fxp32_shr_r`/`fxp32_mul_q15` family used
//! throughout the rest of the crate as 32-bit-intermediate helpers).

use crate::{set_dom, DomainError, FxpResult};

/// A 16-bit fixed-point value; the fractional-bit count `n` (a runtime
/// parameter, not encoded in the type) is supplied to every operation,
/// matching the source's convention of passing `frac_bits` explicitly.
pub type Fxp16 = i16;

/// The 32-bit intermediate type used to avoid overflow inside products,
/// sums and CORDIC accumulators before the final saturating narrow.
pub type Fxp32 = i32;

/// Clamp `v` into `[i16::MIN as i32, i16::MAX as i32]`.
#[inline]
pub fn sat32(v: i64) -> Fxp32 {
    if v > i32::MAX as i64 {
        i32::MAX
    } else if v < i32::MIN as i64 {
        i32::MIN
    } else {
        v as i32
    }
}

/// Saturating narrow from the 32-bit intermediate down to `Fxp16`.
#[inline]
pub fn sat16(v: Fxp32) -> Fxp16 {
    if v > i16::MAX as i32 {
        i16::MAX
    } else if v < i16::MIN as i32 {
        i16::MIN
    } else {
        v as i16
    }
}

/// Saturating left shift: `v << shift`, clamped to `i32` range rather
/// than wrapping. `shift` of 0 or negative is a no-op passthrough.
pub fn sat_shl(v: Fxp32, shift: u32) -> Fxp32 {
    if shift == 0 {
        return v;
    }
    sat32((v as i64) << shift)
}

/// Arithmetic right shift with round-to-nearest on the non-negative
/// side and plain truncation on the negative side — the source's
/// `fpxx_arshift_m` rounding convention, deliberately asymmetric: a
/// negative input is never rounded up toward zero.
pub fn shr_round(v: Fxp32, shift: u32) -> Fxp32 {
    if shift == 0 {
        return v;
    }
    if v >= 0 {
        let half = 1i64 << (shift - 1);
        ((v as i64 + half) >> shift) as i32
    } else {
        v >> shift
    }
}

/// Dispatches a signed shift amount: positive shifts right with
/// rounding, negative shifts left (saturating), zero is a no-op.
/// Mirrors the source's `fpxx_ashift_m`.
pub fn ashift(v: Fxp32, shift: i32) -> Fxp32 {
    if shift > 0 {
        shr_round(v, shift as u32)
    } else if shift < 0 {
        sat_shl(v, (-shift) as u32)
    } else {
        v
    }
}

/// Convert a floating-point value into Qn fixed point, saturating.
///
/// Rounds to nearest via a manual `+/- 0.5` bias rather than
/// `f32::round`, which needs `libm` and isn't available in `core`.
pub fn flt2fp(x: f32, frac_bits: u32) -> Fxp16 {
    let scaled = x * (1i64 << frac_bits) as f32;
    let rounded = if scaled >= 0.0 {
        (scaled + 0.5) as i64
    } else {
        (scaled - 0.5) as i64
    };
    sat16(sat32(rounded))
}

/// Convert a Qn fixed-point value back to floating point.
pub fn fp2flt(x: Fxp16, frac_bits: u32) -> f32 {
    x as f32 / (1i64 << frac_bits) as f32
}

/// Convert an integer into Qn fixed point, saturating.
pub fn int2fp(x: i16, frac_bits: u32) -> Fxp16 {
    sat16(sat_shl(x as i32, frac_bits))
}

/// Re-scale a Qm value to Qn, saturating and rounding as it goes.
pub fn fp2fp(x: Fxp16, from_bits: u32, to_bits: u32) -> Fxp16 {
    let shift = to_bits as i32 - from_bits as i32;
    sat16(ashift(x as i32, shift))
}

/// Saturating add.
pub fn add(a: Fxp16, b: Fxp16) -> Fxp16 {
    sat16(a as i32 + b as i32)
}

/// Saturating subtract.
pub fn sub(a: Fxp16, b: Fxp16) -> Fxp16 {
    sat16(a as i32 - b as i32)
}

/// Saturating 32-bit add, used by the CORDIC/hyperbolic accumulators
/// which work in the wider intermediate the whole way through.
pub fn add_sat32(a: Fxp32, b: Fxp32) -> Fxp32 {
    sat32(a as i64 + b as i64)
}

/// Saturating multiply: `a * b` re-scaled back down to Qn with
/// round-to-nearest, same rounding rule as [`shr_round`].
pub fn mult(a: Fxp16, b: Fxp16, frac_bits: u32) -> Fxp16 {
    let wide = a as i64 * b as i64;
    sat16(shr_round(sat32(wide), frac_bits))
}

/// Multiply two Q1.15 values, rounding and saturating in 32-bit space.
/// The one CORDIC/hyperbolic building block every gain/rotation step
/// in [`crate::cordic`] and [`crate::hyp`] is built from.
pub fn mul_q15(a: Fxp32, b: Fxp32) -> Fxp32 {
    let wide = a as i64 * b as i64;
    sat32(shr_round(sat32(wide), 15) as i64)
}

/// Saturating divide. `b == 0` saturates to `Fxp16::MAX`/`MIN` by the
/// sign of `a` (`0/0` saturates positive) without raising a domain
/// error — the source never treats integer division by zero as EDOM,
/// only the transcendental functions do.
pub fn div(a: Fxp16, b: Fxp16, frac_bits: u32) -> Fxp16 {
    if b == 0 {
        return if a < 0 { i16::MIN } else { i16::MAX };
    }
    let numerator = (a as i64) << frac_bits;
    sat16(sat32(numerator / b as i64))
}

/// Q1.15 divide with round-to-nearest, used by the hyperbolic pipeline.
/// `den == 0` saturates by the sign of `num`.
pub fn div_q15(num: Fxp32, den: Fxp32) -> Fxp32 {
    if den == 0 {
        return if num < 0 { i32::MIN } else { i32::MAX };
    }
    let wide = (num as i64) << 15;
    let half = (den.unsigned_abs() as i64) / 2;
    let biased = if (wide < 0) != (den < 0) {
        wide - half
    } else {
        wide + half
    };
    sat32(biased / den as i64)
}

/// `a * b + c`, computed in the wide intermediate before the one final
/// saturating narrow.
pub fn fma(a: Fxp16, b: Fxp16, c: Fxp16, frac_bits: u32) -> Fxp16 {
    let wide = a as i64 * b as i64;
    let rounded = shr_round(sat32(wide), frac_bits) as i64;
    sat16(sat32(rounded + c as i64))
}

pub fn fabs(x: Fxp16) -> Fxp16 {
    if x == i16::MIN {
        i16::MAX
    } else {
        x.abs()
    }
}

/// Mask off everything below the binary point, matching the source's
/// "clear fractional bits" `abs` helper used in display/printing code.
pub fn abs_frac_mask(x: Fxp16, frac_bits: u32) -> Fxp16 {
    let mask = !((1i16 << frac_bits).wrapping_sub(1));
    fabs(x) & mask
}

pub fn copysign(magnitude: Fxp16, sign: Fxp16) -> Fxp16 {
    let mag = fabs(magnitude);
    if sign < 0 {
        sat16(-(mag as i32))
    } else {
        mag
    }
}

/// Mask for the fractional bits below the binary point, computed in
/// `i32` since `1i16 << 15` (the common Q1.15 case) does not fit back
/// into `i16` on the way to a `- 1`.
fn frac_mask(frac_bits: u32) -> i32 {
    (1i32 << frac_bits) - 1
}

pub fn ceil(x: Fxp16, frac_bits: u32) -> Fxp16 {
    let mask = frac_mask(frac_bits);
    let xi = x as i32;
    if xi & mask == 0 {
        x
    } else if xi > 0 {
        sat16(xi + (mask + 1) - (xi & mask))
    } else {
        sat16(xi & !mask)
    }
}

pub fn floor(x: Fxp16, frac_bits: u32) -> Fxp16 {
    sat16((x as i32) & !frac_mask(frac_bits))
}

pub fn trunc(x: Fxp16, frac_bits: u32) -> Fxp16 {
    let mask = frac_mask(frac_bits);
    if x < 0 {
        sat16(-((-(x as i32)) & !mask))
    } else {
        sat16((x as i32) & !mask)
    }
}

/// Round-to-nearest, ties away from zero, in Qn fixed point.
pub fn round(x: Fxp16, frac_bits: u32) -> Fxp16 {
    if frac_bits == 0 {
        return x;
    }
    let half = 1i32 << (frac_bits - 1);
    let mask = frac_mask(frac_bits);
    if x >= 0 {
        sat16((x as i32 + half) & !mask)
    } else {
        let neg = -(x as i32);
        sat16(-((neg + half) & !mask))
    }
}

/// Modulo, sign of the result follows `a` (C `fmod` semantics), computed
/// by truncating `a / b` and subtracting back out.
pub fn fmod(a: Fxp16, b: Fxp16, frac_bits: u32) -> Fxp16 {
    if b == 0 {
        set_dom();
        return 0;
    }
    let q = trunc(div(a, b, frac_bits), frac_bits);
    sub(a, mult(q, b, frac_bits))
}

/// Tagged-result alternative to [`fmod`]: `Err(DomainError)` for `b == 0`
/// instead of setting the implicit [`crate::dom_error`] flag and
/// returning 0.
pub fn try_fmod(a: Fxp16, b: Fxp16, frac_bits: u32) -> FxpResult<Fxp16> {
    if b == 0 {
        return Err(DomainError);
    }
    Ok(fmod(a, b, frac_bits))
}

/// Round to the nearest integer and return it widened to `i32`, ties
/// away from zero, matching the source's `fxp16_lround`.
pub fn lround(x: Fxp16, frac_bits: u32) -> i32 {
    if frac_bits == 0 {
        return x as i32;
    }
    let half = 1i32 << (frac_bits - 1);
    if x >= 0 {
        (x as i32 + half) >> frac_bits
    } else {
        -((-(x as i32) + half) >> frac_bits)
    }
}

/// Base-2 exponent of the most significant set bit, i.e. `floor(log2(|x|))`.
/// `x == 0` is a domain error and returns `i16::MIN`, the sentinel chosen
/// for this Rust port in place of the source's platform `INT_MIN`
/// (see `SPEC_FULL.md` §9).
pub fn ilogb(x: Fxp16, frac_bits: u32) -> i16 {
    if x == 0 {
        set_dom();
        return i16::MIN;
    }
    let mag = (x as i32).unsigned_abs();
    let msb = 31 - mag.leading_zeros();
    msb as i16 - frac_bits as i16
}

/// Tagged-result alternative to [`ilogb`]: `Err(DomainError)` for `x == 0`
/// instead of setting the implicit [`crate::dom_error`] flag and
/// returning `i16::MIN`.
pub fn try_ilogb(x: Fxp16, frac_bits: u32) -> FxpResult<i16> {
    if x == 0 {
        return Err(DomainError);
    }
    Ok(ilogb(x, frac_bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flt2fp_fp2flt_round_trip_within_one_lsb() {
        let x = flt2fp(0.5, 15);
        assert_eq!(x, 0x4000);
        assert!((fp2flt(x, 15) - 0.5).abs() < 0.001);
    }

    #[test]
    fn add_saturates_at_i16_max() {
        assert_eq!(add(i16::MAX, 1), i16::MAX);
        assert_eq!(sub(i16::MIN, 1), i16::MIN);
    }

    #[test]
    fn mult_rounds_to_nearest() {
        let half = flt2fp(0.5, 15);
        let quarter = mult(half, half, 15);
        assert_eq!(quarter, flt2fp(0.25, 15));
    }

    #[test]
    fn div_by_zero_saturates_by_sign_without_dom() {
        clear_dom_for_test();
        assert_eq!(div(flt2fp(1.0, 8), 0, 8), i16::MAX);
        assert_eq!(div(flt2fp(-1.0, 8), 0, 8), i16::MIN);
        assert!(!crate::dom_error());
    }

    #[test]
    fn ceil_floor_round_trunc_agree_on_exact_values() {
        let one = flt2fp(1.0, 8);
        assert_eq!(ceil(one, 8), one);
        assert_eq!(floor(one, 8), one);
        assert_eq!(round(one, 8), one);
        assert_eq!(trunc(one, 8), one);
    }

    #[test]
    fn round_half_away_from_zero() {
        let x = flt2fp(1.5, 1);
        assert_eq!(round(x, 1), flt2fp(2.0, 1));
        let y = flt2fp(-1.5, 1);
        assert_eq!(round(y, 1), flt2fp(-2.0, 1));
    }

    #[test]
    fn ilogb_zero_is_domain_error_with_min_sentinel() {
        clear_dom_for_test();
        assert_eq!(ilogb(0, 8), i16::MIN);
        assert!(crate::dom_error());
    }

    #[test]
    fn ilogb_matches_msb_position() {
        clear_dom_for_test();
        // 8.0 in Q8 is 0x0800 == 1<<11; ilogb should read back 3 (2^3 == 8).
        let x = flt2fp(8.0, 8);
        assert_eq!(ilogb(x, 8), 3);
    }

    #[test]
    fn try_ilogb_reports_domain_error_as_err_not_sentinel() {
        assert_eq!(try_ilogb(0, 8), Err(crate::DomainError));
        let x = flt2fp(8.0, 8);
        assert_eq!(try_ilogb(x, 8), Ok(3));
    }

    #[test]
    fn try_fmod_reports_domain_error_as_err_not_sentinel() {
        let x = flt2fp(5.0, 8);
        assert_eq!(try_fmod(x, 0, 8), Err(crate::DomainError));
        assert_eq!(try_fmod(x, flt2fp(2.0, 8), 8), Ok(fmod(x, flt2fp(2.0, 8), 8)));
    }

    fn clear_dom_for_test() {
        crate::clear_dom();
    }
}
