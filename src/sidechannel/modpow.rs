//! Constant-structure modular exponentiation via a Montgomery ladder.
//!
//! For each bit of the exponent (MSB to LSB) both `r0*r1` and the two
//! squarings are always computed, regardless of the bit's value, and
//! the next `(r0, r1)` pair is chosen with a constant-time byte select
//! rather than a branch.
//!
//! LIMITATION: the modular reductions below use `num-bigint`'s
//! variable-length division, which is not itself constant-time for
//! differently-shaped operands. A production Montgomery-form
//! implementation would carry fixed-width limbs throughout. This
//! mirrors the same honesty as the masked-access caveat elsewhere in
//! this module: the ladder's *structure* is branchless and uniform, but true
//! constant-time big-integer arithmetic needs fixed-width
//! representations this crate does not yet carry.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Signed, Zero};

use crate::error::{Error, Result};

/// Compute `base^exp mod modulus` with a Montgomery ladder.
///
/// Fails with [`Error::InvalidModulus`] when `modulus <= 0` and
/// [`Error::NegativeExponent`] when `exp < 0`.
pub fn constant_time_modpow(base: &BigInt, exp: &BigInt, modulus: &BigInt) -> Result<BigUint> {
    if modulus.sign() != Sign::Plus {
        return Err(Error::InvalidModulus);
    }
    if exp.is_negative() {
        return Err(Error::NegativeExponent);
    }

    let modulus_u = modulus.to_biguint().expect("checked positive above");
    if modulus_u.is_one() {
        return Ok(BigUint::zero());
    }

    let base_u = reduce_to_unsigned(base, modulus);
    let exp_u = exp.to_biguint().expect("checked non-negative above");

    let byte_len = ((modulus_u.bits() as usize) + 7) / 8;
    let byte_len = byte_len.max(1);

    let mut r0 = BigUint::one() % &modulus_u;
    let mut r1 = &base_u % &modulus_u;

    let bit_len = exp_u.bits();
    for i in (0..bit_len).rev() {
        let bit = u8::from(exp_u.bit(i));

        let r0_sq = (&r0 * &r0) % &modulus_u;
        let r0_r1 = (&r0 * &r1) % &modulus_u;
        let r1_sq = (&r1 * &r1) % &modulus_u;

        let mask = mask_for_bit(bit);
        r0 = ct_select(mask, &r0_r1, &r0_sq, byte_len);
        r1 = ct_select(mask, &r1_sq, &r0_r1, byte_len);
    }

    Ok(r0)
}

fn reduce_to_unsigned(value: &BigInt, modulus: &BigInt) -> BigUint {
    let remainder = value % modulus;
    let non_negative = if remainder.is_negative() {
        remainder + modulus
    } else {
        remainder
    };
    non_negative.to_biguint().expect("reduced to [0, modulus)")
}

/// `0xFF` repeated if `bit == 1`, `0x00` repeated otherwise.
fn mask_for_bit(bit: u8) -> u8 {
    0u8.wrapping_sub(bit)
}

/// Select `if_set` when `mask == 0xFF`, `if_unset` when `mask == 0x00`,
/// operating byte-by-byte over both candidates padded to `byte_len`.
fn ct_select(mask: u8, if_set: &BigUint, if_unset: &BigUint, byte_len: usize) -> BigUint {
    let a = to_be_bytes_padded(if_set, byte_len);
    let b = to_be_bytes_padded(if_unset, byte_len);
    let out: Vec<u8> = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x & mask) | (y & !mask))
        .collect();
    BigUint::from_bytes_be(&out)
}

fn to_be_bytes_padded(n: &BigUint, len: usize) -> Vec<u8> {
    let bytes = n.to_bytes_be();
    if bytes.len() >= len {
        return bytes;
    }
    let mut padded = vec![0u8; len - bytes.len()];
    padded.extend_from_slice(&bytes);
    padded
}
