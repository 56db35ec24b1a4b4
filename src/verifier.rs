//! Registration-time salt and verifier creation.
//!
//! The server stores `(salt, verifier)` per identity in place of the
//! password; the password itself never reaches it. Send the record over a
//! protected channel during registration to keep a man-in-the-middle from
//! learning the verifier.

use digest::Digest;
use num_bigint::BigUint;

use crate::errors::SrpError;
use crate::routines::SrpRoutines;

/// The `(s, v)` record produced at registration time.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SrpVerifierSet {
    /// Random salt `s`.
    pub salt: BigUint,
    /// Password verifier `v = g^x mod N`.
    pub verifier: BigUint,
}

/// Generate a fresh salt and the verifier for `(identity, password)`.
///
/// `salt_len` overrides the salt length in bytes; the default is the hash
/// output length with a floor of 16 bytes.
pub fn generate_verifier<D: Digest>(
    routines: &SrpRoutines<D>,
    identity: &str,
    password: &str,
    salt_len: Option<usize>,
) -> Result<SrpVerifierSet, SrpError> {
    let salt = match salt_len {
        Some(len) => routines.generate_salt_with_len(len),
        None => routines.generate_salt(),
    };
    generate_verifier_with_salt(routines, identity, password, &salt)
}

/// Derive the verifier for `(identity, password)` under a caller-provided
/// salt, e.g. when re-deriving for a known-answer check.
pub fn generate_verifier_with_salt<D: Digest>(
    routines: &SrpRoutines<D>,
    identity: &str,
    password: &str,
    salt: &BigUint,
) -> Result<SrpVerifierSet, SrpError> {
    if identity.trim().is_empty() {
        return Err(SrpError::IllegalArgument {
            name: "identity",
            reason: "must not be empty",
        });
    }
    if password.is_empty() {
        return Err(SrpError::IllegalArgument {
            name: "password",
            reason: "must not be empty",
        });
    }

    let identity_hash = routines.compute_identity_hash(identity, password);
    let x = routines.compute_x(salt, &identity_hash);
    SrpRoutines::<D>::wipe_digest(identity_hash);
    let verifier = routines.compute_verifier(&x);

    Ok(SrpVerifierSet {
        salt: salt.clone(),
        verifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::G_2048;
    use crate::params::SrpParameters;
    use sha2::Sha512;

    fn routines() -> SrpRoutines<Sha512> {
        SrpRoutines::new(SrpParameters::new(G_2048.clone()))
    }

    #[test]
    fn rejects_empty_and_whitespace_identity() {
        let routines = routines();
        for identity in ["", "   "] {
            let err = generate_verifier(&routines, identity, "pw", None).unwrap_err();
            assert!(err.to_string().contains("empty"));
        }
    }

    #[test]
    fn rejects_empty_password() {
        let routines = routines();
        assert!(generate_verifier(&routines, "alice", "", None).is_err());
    }

    #[test]
    fn default_salt_is_hash_sized() {
        let routines = routines();
        let set = generate_verifier(&routines, "alice", "password123", None).unwrap();
        assert!(set.salt.bits() <= 512);
        assert!(routines.is_valid_public_value(&set.verifier));
    }

    #[test]
    fn same_salt_same_verifier() {
        let routines = routines();
        let salt = routines.generate_salt();
        let a = generate_verifier_with_salt(&routines, "alice", "password123", &salt).unwrap();
        let b = generate_verifier_with_salt(&routines, "alice", "password123", &salt).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_passwords_different_verifiers() {
        let routines = routines();
        let salt = routines.generate_salt();
        let a = generate_verifier_with_salt(&routines, "alice", "password123", &salt).unwrap();
        let b = generate_verifier_with_salt(&routines, "alice", "password124", &salt).unwrap();
        assert_ne!(a.verifier, b.verifier);
    }
}
