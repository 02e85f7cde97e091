//! Circular CORDIC: sin/cos/tan/atan2/atan/asin/acos.
//!
//! Angles are represented in the source's "π-normalized Q1.15" format:
//! a value `v` means `v / 32768 * π` radians, so the representable
//! range `[i16::MIN, i16::MAX]` covers `[-π, π)`. Grounded on the
//! `cordic_sin_cos`/`fxp16_atan2` family in `fxp16.c`, including the
//! exact `atan_table_q15_pi` entries and the `CORDIC_K_Q15` gain
//! precompensation constant.

use crate::fixed::{div, int2fp, sat16, Fxp16, Fxp32};
use crate::{set_dom, DomainError, FxpResult};

/// CORDIC iteration count used by every circular operation below.
const ITERATIONS: usize = 14;

/// Gain-precompensated initial `x` for rotation mode, so the final
/// `(x, y)` pair is already the cos/sin answer with no extra multiply.
const K_Q15: Fxp32 = 0x4DBA;

/// `atan(2^-i) / π` in Q1.15, `i` from 0 to 13.
const ATAN_TABLE_Q15_PI: [Fxp32; ITERATIONS] = [
    0x2000, 0x12E4, 0x09FB, 0x0511, 0x028B, 0x0146, 0x00A3, 0x0051, 0x0029, 0x0014, 0x000A,
    0x0005, 0x0003, 0x0001,
];

const PI_Q15: Fxp32 = 32768;
const HALF_PI_Q15: Fxp32 = 16384;
const ONE_Q15: Fxp32 = 32768;

/// Rotation-mode CORDIC: given an angle, return `(sin, cos)`, both in
/// Q1.15. Folds angles outside `(-π/2, π/2]` back into range and
/// recovers the true value from the trig identities
/// `sin(θ) = -sin(θ∓π)`, `cos(θ) = -cos(θ∓π)`.
pub fn sin_cos(angle: Fxp16) -> (Fxp16, Fxp16) {
    let mut z = angle as Fxp32;
    let mut negate = false;
    if z > HALF_PI_Q15 {
        z -= PI_Q15;
        negate = true;
    } else if z < -HALF_PI_Q15 {
        z += PI_Q15;
        negate = true;
    }

    let mut x = K_Q15;
    let mut y: Fxp32 = 0;
    for (i, atan_i) in ATAN_TABLE_Q15_PI.iter().enumerate() {
        let d: Fxp32 = if z >= 0 { 1 } else { -1 };
        let x_new = x - d * (y >> i);
        let y_new = y + d * (x >> i);
        z -= d * atan_i;
        x = x_new;
        y = y_new;
    }

    if negate {
        x = -x;
        y = -y;
    }
    (sat16(y), sat16(x))
}

pub fn sin(angle: Fxp16) -> Fxp16 {
    sin_cos(angle).0
}

pub fn cos(angle: Fxp16) -> Fxp16 {
    sin_cos(angle).1
}

/// `tan(angle)`; the exact `±π/2` endpoints are a domain error and
/// return the saturated sentinel of matching sign rather than diverge.
pub fn tan(angle: Fxp16) -> Fxp16 {
    if angle as Fxp32 == HALF_PI_Q15 {
        set_dom();
        return i16::MAX;
    }
    if angle as Fxp32 == -HALF_PI_Q15 {
        set_dom();
        return i16::MIN;
    }
    let (s, c) = sin_cos(angle);
    div(s, c, 15)
}

/// Tagged-result alternative to [`tan`]: `Err(DomainError)` at the exact
/// `±π/2` endpoints instead of setting the implicit [`crate::dom_error`]
/// flag and returning a saturated sentinel.
pub fn try_tan(angle: Fxp16) -> FxpResult<Fxp16> {
    if angle as Fxp32 == HALF_PI_Q15 || angle as Fxp32 == -HALF_PI_Q15 {
        return Err(DomainError);
    }
    Ok(tan(angle))
}

/// Vectoring-mode CORDIC: angle of the vector `(x, y)`, scale-invariant
/// since only the ratio of inputs (and the sign taken at each step)
/// drives convergence. `x`/`y` may be in any common Qn format; the
/// result is always a Q1.15 π-normalized angle.
pub fn atan2(y: Fxp16, x: Fxp16) -> Fxp16 {
    if x == 0 && y == 0 {
        return 0;
    }
    if y == 0 {
        return if x > 0 { 0 } else { i16::MAX };
    }
    if x == 0 {
        return if y > 0 { HALF_PI_Q15 as Fxp16 } else { -HALF_PI_Q15 as Fxp16 };
    }

    let neg_x = x < 0;
    let mut xx: Fxp32 = (x as Fxp32).abs();
    let mut yy: Fxp32 = y as Fxp32;
    let mut z: Fxp32 = 0;
    for (i, atan_i) in ATAN_TABLE_Q15_PI.iter().enumerate() {
        let d: Fxp32 = if yy >= 0 { -1 } else { 1 };
        let x_new = xx - d * (yy >> i);
        let y_new = yy + d * (xx >> i);
        z -= d * atan_i;
        xx = x_new;
        yy = y_new;
    }

    let angle = if neg_x {
        if y > 0 {
            PI_Q15 - z
        } else {
            -PI_Q15 - z
        }
    } else {
        z
    };
    sat16(angle)
}

/// `atan(m)` for a ratio `m` expressed in `frac_bits`, computed as
/// `atan2(m, 1)` — correct regardless of `frac_bits` since [`atan2`] is
/// scale-invariant on its two inputs.
pub fn atan(m: Fxp16, frac_bits: u32) -> Fxp16 {
    atan2(m, int2fp(1, frac_bits))
}

fn q15_sqrt_one_minus_x2(x: Fxp16) -> Fxp16 {
    let x2 = crate::fixed::mul_q15(x as Fxp32, x as Fxp32);
    let remainder = ONE_Q15 - x2;
    // Q1.15 tops out at i16::MAX (0.999969...), just shy of 1.0, so
    // `remainder` is never negative in practice; clamp anyway since
    // it costs nothing and keeps `sqrt` from ever seeing a negative Q15.
    let clamped = if remainder < 0 {
        0
    } else if remainder > i16::MAX as Fxp32 {
        i16::MAX as Fxp32
    } else {
        remainder
    };
    crate::sqrt::sqrt(clamped as Fxp16, 15)
}

/// `asin(x)` for `x` in Q1.15.
pub fn asin(x: Fxp16) -> Fxp16 {
    let cos_component = q15_sqrt_one_minus_x2(x);
    atan2(x, cos_component)
}

/// `acos(x)` for `x` in Q1.15, always in `[0, π]` since the CORDIC
/// `y` fed to [`atan2`] is the non-negative square root.
pub fn acos(x: Fxp16) -> Fxp16 {
    let sin_component = q15_sqrt_one_minus_x2(x);
    atan2(sin_component, x)
}
