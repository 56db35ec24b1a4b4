//! SRP client side of the handshake.
//!
//! # Usage
//! Each login attempt walks a fresh session through three one-shot steps.
//! Start from the shared routines and the credentials the user typed:
//!
//! ```ignore
//! let client = SrpClient::new(&routines);
//! let credentials = client.step1("alice", "password123")?;
//! ```
//!
//! Send the identity to the server and receive `salt` and `B`. `step2`
//! draws the ephemeral private value, computes the public value `A`, the
//! premaster secret and the client evidence `M1`:
//!
//! ```ignore
//! let verifier = credentials.step2(&salt, &b_pub)?;
//! conn.send_evidence(verifier.a_pub(), verifier.proof());
//! ```
//!
//! Finally check the server's evidence `M2` from the reply. `step3` fails
//! if the server did not prove knowledge of the same premaster, which
//! means authentication failed or someone is impersonating the server:
//!
//! ```ignore
//! let session = verifier.step3(&m2)?;
//! ```
//!
//! Encrypted application messages can be exchanged from the moment `M1`
//! exists, through the methods on [`SrpClientVerifier`] and
//! [`SrpClientSession`].

use core::fmt;

use digest::{Digest, Output};
use num_bigint::BigUint;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::cipher::{EncryptedMessage, SessionCipher};
use crate::errors::SrpError;
use crate::routines::SrpRoutines;

/// A fresh client session. Holds nothing but the routines.
pub struct SrpClient<'a, D: Digest> {
    routines: &'a SrpRoutines<D>,
}

/// Client state after `step1`: credentials accepted, waiting for the
/// server's salt and public value.
pub struct SrpClientCredentials<'a, D: Digest> {
    routines: &'a SrpRoutines<D>,
    identity: String,
    password: Zeroizing<String>,
}

impl<'a, D: Digest> fmt::Debug for SrpClientCredentials<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the password stays out of logs
        f.debug_struct("SrpClientCredentials")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Client state after `step2`: evidence `M1` is ready to send and the
/// premaster secret is established on this side.
pub struct SrpClientVerifier<'a, D: Digest> {
    routines: &'a SrpRoutines<D>,
    salt: BigUint,
    a_pub: BigUint,
    m1: Output<D>,
    premaster: BigUint,
    cipher: SessionCipher<D>,
}

impl<'a, D: Digest> fmt::Debug for SrpClientVerifier<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // premaster, m1, and the cipher keys stay out of logs
        f.debug_struct("SrpClientVerifier")
            .field("a_pub", &self.a_pub)
            .finish()
    }
}

/// Terminal client state: the server proved knowledge of the same
/// premaster secret.
pub struct SrpClientSession<D: Digest> {
    premaster: BigUint,
    session_key: Output<D>,
    cipher: SessionCipher<D>,
}

impl<D: Digest> fmt::Debug for SrpClientSession<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // premaster, session key, and cipher keys stay out of logs
        f.debug_struct("SrpClientSession").finish()
    }
}

impl<'a, D: Digest> SrpClient<'a, D> {
    /// Create a new client session.
    #[must_use]
    pub fn new(routines: &'a SrpRoutines<D>) -> Self {
        Self { routines }
    }

    /// Accept the user's credentials.
    ///
    /// The identity must be non-empty after trimming and the password must
    /// be non-empty; the password is held zeroized-on-drop until `step2`
    /// consumes it.
    pub fn step1(
        self,
        identity: &str,
        password: &str,
    ) -> Result<SrpClientCredentials<'a, D>, SrpError> {
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
        Ok(SrpClientCredentials {
            routines: self.routines,
            identity: identity.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }
}

impl<'a, D: Digest> SrpClientCredentials<'a, D> {
    /// Process the server's `salt` and public value `B`.
    ///
    /// Draws the ephemeral private `a`, computes `A = g^a mod N`, the
    /// scrambler `u`, the premaster secret and the evidence `M1`.
    pub fn step2(
        self,
        salt: &BigUint,
        b_pub: &BigUint,
    ) -> Result<SrpClientVerifier<'a, D>, SrpError> {
        let routines = self.routines;
        if !routines.is_valid_public_value(b_pub) {
            return Err(SrpError::BadServerPublicValue);
        }

        let identity_hash = routines.compute_identity_hash(&self.identity, &self.password);
        let x = routines.compute_x(salt, &identity_hash);
        SrpRoutines::<D>::wipe_digest(identity_hash);

        let a = routines.generate_private_value();
        let a_pub = routines.compute_client_public(&a);
        if !routines.is_valid_public_value(&a_pub) {
            return Err(SrpError::BadClientPublicValue);
        }

        let u = routines.compute_u(&a_pub, b_pub);
        if u == BigUint::default() {
            return Err(SrpError::BadScrambler);
        }

        let premaster = routines.compute_client_premaster(b_pub, &x, &a, &u);
        let m1 = routines.compute_m1(&a_pub, b_pub, &premaster);
        let cipher = SessionCipher::new(&premaster);

        Ok(SrpClientVerifier {
            routines,
            salt: salt.clone(),
            a_pub,
            m1,
            premaster,
            cipher,
        })
    }
}

impl<'a, D: Digest> SrpClientVerifier<'a, D> {
    /// Public ephemeral value `A` for sending to the server.
    #[must_use]
    pub fn a_pub(&self) -> &BigUint {
        &self.a_pub
    }

    /// Evidence `M1` for sending to the server.
    #[must_use]
    pub fn proof(&self) -> &[u8] {
        self.m1.as_slice()
    }

    /// The salt this session authenticated against.
    #[must_use]
    pub fn salt(&self) -> &BigUint {
        &self.salt
    }

    /// The premaster secret `S` computed on this side.
    #[must_use]
    pub fn premaster(&self) -> &BigUint {
        &self.premaster
    }

    /// Verify the server evidence `M2` and finish the handshake.
    pub fn step3(self, m2: &[u8]) -> Result<SrpClientSession<D>, SrpError> {
        if m2.is_empty() {
            return Err(SrpError::IllegalArgument {
                name: "m2",
                reason: "must not be empty",
            });
        }
        let expected = self
            .routines
            .compute_m2(&self.a_pub, &self.m1, &self.premaster);
        if expected.ct_eq(m2).unwrap_u8() != 1 {
            return Err(SrpError::BadServerEvidence);
        }
        let session_key = self.routines.compute_session_key(&self.premaster);
        Ok(SrpClientSession {
            premaster: self.premaster,
            session_key,
            cipher: self.cipher,
        })
    }

    /// Encrypt an application message for the server.
    #[must_use]
    pub fn encrypt(&self, data: &[u8]) -> EncryptedMessage {
        self.cipher.encrypt(data)
    }

    /// Encrypt a string (UTF-8 encoded) for the server.
    #[must_use]
    pub fn encrypt_str(&self, data: &str) -> EncryptedMessage {
        self.cipher.encrypt(data.as_bytes())
    }

    /// Decrypt an application message from the server.
    pub fn decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, SrpError> {
        self.cipher.decrypt(iv, ciphertext)
    }

    /// Decrypt and UTF-8 decode an application message from the server.
    pub fn decrypt_to_string(&self, iv: &[u8], ciphertext: &[u8]) -> Result<String, SrpError> {
        self.cipher.decrypt_to_string(iv, ciphertext)
    }
}

impl<D: Digest> SrpClientSession<D> {
    /// The premaster secret `S` shared with the server.
    #[must_use]
    pub fn premaster(&self) -> &BigUint {
        &self.premaster
    }

    /// The session key `K = H(PAD(S))` for callers keying external ciphers.
    #[must_use]
    pub fn session_key(&self) -> &[u8] {
        self.session_key.as_slice()
    }

    /// Encrypt an application message for the server.
    #[must_use]
    pub fn encrypt(&self, data: &[u8]) -> EncryptedMessage {
        self.cipher.encrypt(data)
    }

    /// Encrypt a string (UTF-8 encoded) for the server.
    #[must_use]
    pub fn encrypt_str(&self, data: &str) -> EncryptedMessage {
        self.cipher.encrypt(data.as_bytes())
    }

    /// Decrypt an application message from the server.
    pub fn decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, SrpError> {
        self.cipher.decrypt(iv, ciphertext)
    }

    /// Decrypt and UTF-8 decode an application message from the server.
    pub fn decrypt_to_string(&self, iv: &[u8], ciphertext: &[u8]) -> Result<String, SrpError> {
        self.cipher.decrypt_to_string(iv, ciphertext)
    }
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
    fn step1_rejects_empty_identity() {
        let routines = routines();
        let err = SrpClient::new(&routines).step1("", "pw").unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(matches!(err, SrpError::IllegalArgument { name: "identity", .. }));
    }

    #[test]
    fn step1_rejects_whitespace_identity() {
        let routines = routines();
        assert!(SrpClient::new(&routines).step1("  \t ", "pw").is_err());
    }

    #[test]
    fn step1_rejects_empty_password() {
        let routines = routines();
        let err = SrpClient::new(&routines).step1("alice", "").unwrap_err();
        assert!(matches!(err, SrpError::IllegalArgument { name: "password", .. }));
    }

    #[test]
    fn step2_rejects_degenerate_b() {
        let routines = routines();
        let credentials = SrpClient::new(&routines).step1("alice", "pw").unwrap();
        let salt = routines.generate_salt();
        let err = credentials.step2(&salt, &BigUint::default()).unwrap_err();
        assert_eq!(err, SrpError::BadServerPublicValue);
    }
}
