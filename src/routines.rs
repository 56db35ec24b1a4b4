//! Stateless SRP-6a routines bound to one parameter set.
//!
//! Every method is a pure function of its arguments and the parameters;
//! the session state machines in [`crate::client`] and [`crate::server`]
//! sequence these calls and hold the intermediate values.

use digest::{Digest, Output};
use num_bigint::BigUint;
use zeroize::Zeroize;

use crate::params::SrpParameters;
use crate::utils::{generate_random_biguint, hash, hash_padded, to_padded_bytes};

// Ephemeral privates are drawn at 512 bits, comfortably above the 256-bit
// floor required for the scrambler to bind both sides.
const EPHEMERAL_BYTES: usize = 64;
const MIN_SALT_BYTES: usize = 16;

/// Stateless service exposing the SRP-6a formulas for one `(N, g, H)`.
#[derive(Debug, Clone)]
pub struct SrpRoutines<D: Digest> {
    params: SrpParameters<D>,
}

impl<D: Digest> SrpRoutines<D> {
    /// Bind routines to a parameter set.
    #[must_use]
    pub fn new(params: SrpParameters<D>) -> Self {
        Self { params }
    }

    /// The underlying parameters.
    #[must_use]
    pub fn params(&self) -> &SrpParameters<D> {
        &self.params
    }

    /// `k = H(PAD(N) | PAD(g))`
    #[must_use]
    pub fn compute_k(&self) -> BigUint {
        let digest =
            hash_padded::<D>(self.params.n_bytes(), &[self.params.n(), self.params.g()]);
        BigUint::from_bytes_be(&digest)
    }

    /// `H(I | ":" | P)` over the UTF-8 bytes of both credentials
    #[must_use]
    pub fn compute_identity_hash(&self, identity: &str, password: &str) -> Output<D> {
        hash::<D>(&[identity.as_bytes(), b":", password.as_bytes()])
    }

    /// `x = H(s | H(I | ":" | P))`; the salt is hashed raw (unpadded)
    #[must_use]
    pub fn compute_x(&self, salt: &BigUint, identity_hash: &[u8]) -> BigUint {
        let salt_bytes = salt.to_bytes_be();
        let digest = hash::<D>(&[salt_bytes.as_slice(), identity_hash]);
        BigUint::from_bytes_be(&digest)
    }

    /// `v = g^x mod N`
    #[must_use]
    pub fn compute_verifier(&self, x: &BigUint) -> BigUint {
        self.params.g().modpow(x, self.params.n())
    }

    /// `A = g^a mod N`
    #[must_use]
    pub fn compute_client_public(&self, a: &BigUint) -> BigUint {
        self.params.g().modpow(a, self.params.n())
    }

    /// `B = (k*v + g^b) mod N`
    #[must_use]
    pub fn compute_server_public(&self, b: &BigUint, v: &BigUint) -> BigUint {
        let n = self.params.n();
        let interm = (self.compute_k() * v) % n;
        (interm + self.params.g().modpow(b, n)) % n
    }

    /// `u = H(PAD(A) | PAD(B))`
    #[must_use]
    pub fn compute_u(&self, a_pub: &BigUint, b_pub: &BigUint) -> BigUint {
        let digest = hash_padded::<D>(self.params.n_bytes(), &[a_pub, b_pub]);
        BigUint::from_bytes_be(&digest)
    }

    /// A public value is acceptable iff it is not divisible by N.
    #[must_use]
    pub fn is_valid_public_value(&self, value: &BigUint) -> bool {
        value % self.params.n() != BigUint::default()
    }

    /// `S = (B - k*g^x) ^ (a + u*x) mod N`
    #[must_use]
    pub fn compute_client_premaster(
        &self,
        b_pub: &BigUint,
        x: &BigUint,
        a: &BigUint,
        u: &BigUint,
    ) -> BigUint {
        let n = self.params.n();
        let interm = (self.compute_k() * self.params.g().modpow(x, n)) % n;
        // Because we do operations modulo N we can get (k*v + g^b) < k*g^x
        let base = if b_pub > &interm {
            (b_pub - &interm) % n
        } else {
            (n + b_pub - &interm) % n
        };
        // The exponent is used unreduced: the group order is N-1, not N.
        let exp = a + u * x;
        base.modpow(&exp, n)
    }

    /// `S = (A * v^u) ^ b mod N`
    #[must_use]
    pub fn compute_server_premaster(
        &self,
        a_pub: &BigUint,
        v: &BigUint,
        u: &BigUint,
        b: &BigUint,
    ) -> BigUint {
        let n = self.params.n();
        let base = (a_pub * v.modpow(u, n)) % n;
        base.modpow(b, n)
    }

    /// `M1 = H(PAD(A) | PAD(B) | PAD(S))`
    #[must_use]
    pub fn compute_m1(&self, a_pub: &BigUint, b_pub: &BigUint, premaster: &BigUint) -> Output<D> {
        hash_padded::<D>(self.params.n_bytes(), &[a_pub, b_pub, premaster])
    }

    /// `M2 = H(PAD(A) | M1 | PAD(S))`
    #[must_use]
    pub fn compute_m2(&self, a_pub: &BigUint, m1: &[u8], premaster: &BigUint) -> Output<D> {
        let len = self.params.n_bytes();
        let mut d = D::new();
        d.update(to_padded_bytes(a_pub, len));
        d.update(m1);
        d.update(to_padded_bytes(premaster, len));
        d.finalize()
    }

    /// `K = H(PAD(S))`
    #[must_use]
    pub fn compute_session_key(&self, premaster: &BigUint) -> Output<D> {
        hash_padded::<D>(self.params.n_bytes(), &[premaster])
    }

    /// Random ephemeral private in `[1, N-1]` with 512 bits of CSPRNG
    /// entropy. Redraws on the (negligible) degenerate values.
    #[must_use]
    pub fn generate_private_value(&self) -> BigUint {
        loop {
            let value = generate_random_biguint(EPHEMERAL_BYTES);
            if value != BigUint::default() && &value < self.params.n() {
                return value;
            }
        }
    }

    /// Random salt of the digest output length, but never shorter than
    /// 16 bytes.
    #[must_use]
    pub fn generate_salt(&self) -> BigUint {
        self.generate_salt_with_len(self.params.output_size().max(MIN_SALT_BYTES))
    }

    /// Random salt of exactly `byte_len` bytes of CSPRNG output.
    #[must_use]
    pub fn generate_salt_with_len(&self, byte_len: usize) -> BigUint {
        generate_random_biguint(byte_len)
    }

    /// Scrub a digest buffer once its value has been folded into a bigint.
    pub(crate) fn wipe_digest(mut digest: Output<D>) {
        digest.as_mut_slice().zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::G_1024;
    use hex_literal::hex;
    use sha1::Sha1;
    use sha2::Sha512;

    fn routines_1024() -> SrpRoutines<Sha1> {
        SrpRoutines::new(SrpParameters::new(G_1024.clone()))
    }

    #[test]
    fn k_for_default_parameters() {
        let routines = SrpRoutines::<Sha512>::new(SrpParameters::default());
        assert_eq!(
            routines.compute_k().to_bytes_be(),
            hex!(
                "EE881E03 028FE895 8639BEC5 2094EB61 27081E7E A8E7D0F2 618AC8A2
                 A8DF48D6 6F44EC14 659A5682 2279817D 1FA484B5 A13F1495 C1D77C11
                 2ED42497 1721A43C"
            )
        );
    }

    #[test]
    fn public_value_validity() {
        let routines = routines_1024();
        let n = routines.params().n().clone();
        assert!(!routines.is_valid_public_value(&BigUint::default()));
        assert!(!routines.is_valid_public_value(&n));
        assert!(!routines.is_valid_public_value(&(&n * 2u8)));
        assert!(routines.is_valid_public_value(&BigUint::from(1u8)));
        assert!(routines.is_valid_public_value(&(&n - 1u8)));
        assert!(routines.is_valid_public_value(&(&n + 1u8)));
    }

    #[test]
    fn private_values_are_in_range_and_fresh() {
        let routines = routines_1024();
        let a = routines.generate_private_value();
        let b = routines.generate_private_value();
        assert!(a != BigUint::default() && &a < routines.params().n());
        assert!(b != BigUint::default() && &b < routines.params().n());
        // 512 bits of entropy never collide
        assert_ne!(a, b);
    }

    #[test]
    fn salt_lengths() {
        let routines = routines_1024();
        // SHA-1 output is 20 bytes, above the 16-byte floor
        assert!(routines.generate_salt().bits() <= 160);
        assert!(routines.generate_salt_with_len(4).bits() <= 32);

        let routines = SrpRoutines::<Sha512>::new(SrpParameters::default());
        assert!(routines.generate_salt().bits() <= 512);
    }

    #[test]
    fn premasters_agree_for_honest_peers() {
        let routines = routines_1024();
        let identity_hash = routines.compute_identity_hash("alice", "password123");
        let salt = routines.generate_salt();
        let x = routines.compute_x(&salt, &identity_hash);
        let v = routines.compute_verifier(&x);

        let a = routines.generate_private_value();
        let b = routines.generate_private_value();
        let a_pub = routines.compute_client_public(&a);
        let b_pub = routines.compute_server_public(&b, &v);
        let u = routines.compute_u(&a_pub, &b_pub);

        let client_s = routines.compute_client_premaster(&b_pub, &x, &a, &u);
        let server_s = routines.compute_server_premaster(&a_pub, &v, &u, &b);
        assert_eq!(client_s, server_s);
    }
}
