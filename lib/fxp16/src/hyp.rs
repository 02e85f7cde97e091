//! Hyperbolic CORDIC: cosh/sinh/tanh/exp, grounded on
//! `cordic_cosh_sinh_q15` in `fxp16.c`, including its `ln2`
//! range-reduction step (hyperbolic CORDIC only converges for small
//! arguments) and the `is_repeat_i` re-run of iterations 4 and 13
//! required for the algorithm to converge at all.

use crate::fixed::{add, add_sat32, ashift, div, fp2fp, int2fp, lround, mul_q15, sat16, sub, Fxp16, Fxp32};

/// Hyperbolic CORDIC iterations run for `i = 1..=16`; `atanh(2^-0)` is
/// undefined so there is no `i = 0` step, unlike the circular table.
const ATANH_TABLE_Q15: [Fxp32; 17] = [
    0, 18000, 8369, 4118, 2051, 1024, 512, 256, 128, 64, 32, 16, 8, 4, 2, 1, 1,
];

/// Indices that must be repeated once more for the series to converge.
fn is_repeat_index(i: usize) -> bool {
    i == 4 || i == 13
}

const ONE_Q15: Fxp32 = 32768;

/// Overall CORDIC hyperbolic gain correction, applied once after the
/// iteration loop (unlike the circular engine, which pre-bakes the
/// gain into the initial `x`).
const K_HYP_Q15: Fxp32 = 39567;

fn cordic_cosh_sinh_small_q15(r: Fxp16) -> (Fxp32, Fxp32) {
    let mut x: Fxp32 = ONE_Q15;
    let mut y: Fxp32 = 0;
    let mut z: Fxp32 = r as Fxp32;
    let mut i = 1usize;
    while i <= 16 {
        step(&mut x, &mut y, &mut z, i);
        if is_repeat_index(i) {
            step(&mut x, &mut y, &mut z, i);
        }
        i += 1;
    }
    (mul_q15(x, K_HYP_Q15), mul_q15(y, K_HYP_Q15))
}

fn step(x: &mut Fxp32, y: &mut Fxp32, z: &mut Fxp32, i: usize) {
    let d: Fxp32 = if *z >= 0 { 1 } else { -1 };
    let x_new = *x + d * (*y >> i);
    let y_new = *y + d * (*x >> i);
    *z -= d * ATANH_TABLE_Q15[i];
    *x = x_new;
    *y = y_new;
}

/// Decompose `x = n*ln2 + r` with `|r| <= ln2/2`, so the CORDIC core
/// above always sees an argument inside its convergence domain.
fn range_reduce_ln2(x: Fxp16, frac_bits: u32) -> (i32, Fxp16) {
    let ln2 = crate::fixed::flt2fp(core::f32::consts::LN_2, frac_bits);
    if ln2 == 0 {
        return (0, x);
    }
    let ratio = div(x, ln2, frac_bits);
    let n = lround(ratio, frac_bits);
    let n_ln2 = sat16(crate::fixed::sat32(n as i64 * ln2 as i64));
    (n, sub(x, n_ln2))
}

/// `(cosh(x), sinh(x))` in `frac_bits` Qn. Values whose magnitude needs
/// `|n| >= 16` halvings of `ln2` to range-reduce are far past anything
/// representable in 16 bits regardless of `frac_bits`, so they
/// saturate directly rather than feed an overflowing recomposition.
pub fn cosh_sinh(x: Fxp16, frac_bits: u32) -> (Fxp16, Fxp16) {
    if x == 0 {
        return (int2fp(1, frac_bits), 0);
    }
    let (n, r) = range_reduce_ln2(x, frac_bits);
    if n.unsigned_abs() >= 16 {
        let sinh_sat = if x < 0 { i16::MIN } else { i16::MAX };
        return (i16::MAX, sinh_sat);
    }
    let r_q15 = fp2fp(r, frac_bits, 15);
    let (cosh_r, sinh_r) = cordic_cosh_sinh_small_q15(r_q15);
    let e_r = add_sat32(cosh_r, sinh_r);
    let e_neg_r = add_sat32(cosh_r, -sinh_r);

    let shift_up = n + frac_bits as i32 - 15;
    let shift_down = frac_bits as i32 - 15 - n;
    let term1 = ashift(e_r, shift_up);
    let term2 = ashift(e_neg_r, shift_down);

    let sum = add_sat32(term1, term2);
    let diff = add_sat32(term1, -term2);
    let cosh_x = sat16(crate::fixed::shr_round(sum, 1));
    let sinh_x = sat16(crate::fixed::shr_round(diff, 1));
    (cosh_x, sinh_x)
}

pub fn cosh(x: Fxp16, frac_bits: u32) -> Fxp16 {
    cosh_sinh(x, frac_bits).0
}

pub fn sinh(x: Fxp16, frac_bits: u32) -> Fxp16 {
    cosh_sinh(x, frac_bits).1
}

pub fn tanh(x: Fxp16, frac_bits: u32) -> Fxp16 {
    let (c, s) = cosh_sinh(x, frac_bits);
    div(s, c, frac_bits)
}

/// `e^x`, via the identity `e^x = cosh(x) + sinh(x)`.
pub fn exp(x: Fxp16, frac_bits: u32) -> Fxp16 {
    let (c, s) = cosh_sinh(x, frac_bits);
    add(c, s)
}
