//! Byte-string and big-integer helpers shared by the protocol routines.

use digest::{Digest, Output};
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::errors::SrpError;

/// Encode `x` big-endian, left-padded with zero bytes to `length`.
///
/// Values already `length` bytes or longer are returned in their minimal
/// encoding; SRP values are reduced modulo N before they reach this point,
/// so that case only occurs when the caller asks for a shorter pad.
#[must_use]
pub fn to_padded_bytes(x: &BigUint, length: usize) -> Vec<u8> {
    let bytes = x.to_bytes_be();
    if bytes.len() >= length {
        return bytes;
    }
    let mut padded = vec![0u8; length - bytes.len()];
    padded.extend_from_slice(&bytes);
    padded
}

/// H(chunk_0 | chunk_1 | ...) over the raw bytes of every chunk.
#[must_use]
pub fn hash<D: Digest>(chunks: &[&[u8]]) -> Output<D> {
    let mut d = D::new();
    for chunk in chunks {
        d.update(chunk);
    }
    d.finalize()
}

/// H(PAD(chunk_0) | PAD(chunk_1) | ...) with every chunk left-padded to
/// `length` bytes before concatenation.
#[must_use]
pub fn hash_padded<D: Digest>(length: usize, chunks: &[&BigUint]) -> Output<D> {
    let mut d = D::new();
    for chunk in chunks {
        d.update(to_padded_bytes(chunk, length));
    }
    d.finalize()
}

/// `base^exp mod modulus` with argument validation.
///
/// Negative inputs are unrepresentable in [`BigUint`]; a zero modulus is
/// rejected instead of panicking inside the bignum library.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> Result<BigUint, SrpError> {
    if *modulus == BigUint::default() {
        return Err(SrpError::IllegalArgument {
            name: "modulus",
            reason: "must be positive",
        });
    }
    Ok(base.modpow(exp, modulus))
}

/// Uniform random non-negative integer expressible in `n_bytes` bytes,
/// drawn from the OS CSPRNG.
#[must_use]
pub fn generate_random_biguint(n_bytes: usize) -> BigUint {
    let mut buf = vec![0u8; n_bytes];
    OsRng.fill_bytes(&mut buf);
    let value = BigUint::from_bytes_be(&buf);
    buf.zeroize();
    value
}

/// `n` ASCII hex characters from CSPRNG bytes.
#[must_use]
pub fn generate_random_hex_string(n: usize) -> String {
    let mut buf = vec![0u8; n.div_ceil(2)];
    OsRng.fill_bytes(&mut buf);
    let mut s: String = buf.iter().map(|b| format!("{b:02x}")).collect();
    s.truncate(n);
    s
}

/// Uppercase hex encoding of the minimal big-endian bytes of `x`.
#[must_use]
pub fn biguint_to_hex(x: &BigUint) -> String {
    x.to_bytes_be().iter().map(|b| format!("{b:02X}")).collect()
}

/// Parse a hex string (case-insensitive, optional `0x` prefix).
pub fn biguint_from_hex(hex: &str) -> Result<BigUint, SrpError> {
    let hex = hex.trim();
    let hex = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")).unwrap_or(hex);
    if hex.is_empty() {
        return Err(SrpError::IllegalArgument {
            name: "hex",
            reason: "must not be empty",
        });
    }
    BigUint::parse_bytes(hex.as_bytes(), 16).ok_or(SrpError::IllegalArgument {
        name: "hex",
        reason: "contains non-hex characters",
    })
}
