//! SRP server side of the handshake.
//!
//! # Usage
//! When a login request for some identity arrives, look up the stored
//! `(salt, verifier)` record and open a handshake. `step1` draws the
//! ephemeral private `b` and computes the public value `B`:
//!
//! ```ignore
//! let server = SrpServer::new(&routines);
//! let mut handshake = server.step1(identity, &salt, &verifier)?;
//! conn.send_challenge(&salt, handshake.b_pub());
//! ```
//!
//! When the client's `A` and evidence `M1` arrive, `step2` verifies the
//! evidence and answers with `M2`. A wrong password surfaces here as
//! [`SrpError::BadClientEvidence`]:
//!
//! ```ignore
//! let m2 = handshake.step2(&a_pub, &m1)?;
//! conn.send_evidence(&m2);
//! ```
//!
//! One handshake may verify several candidate `A` values (a client retries
//! with fresh ephemerals after its own failures); each success creates an
//! independent session keyed by that `A`, and the encryption methods take
//! `A` as the session handle:
//!
//! ```ignore
//! let msg = handshake.encrypt(&a_pub, b"ack")?;
//! let plain = handshake.decrypt(&a_pub, &msg.iv, &msg.ciphertext)?;
//! ```

use core::fmt;
use std::collections::HashMap;

use digest::{Digest, Output};
use log::warn;
use num_bigint::BigUint;
use subtle::ConstantTimeEq;

use crate::cipher::{EncryptedMessage, SessionCipher};
use crate::errors::SrpError;
use crate::routines::SrpRoutines;

// B = (k*v + g^b) mod N is zero with probability ~2^-bits(N) per draw;
// bail out rather than loop forever on a broken RNG.
const MAX_B_REDRAWS: usize = 8;

/// A fresh server session. Holds nothing but the routines.
pub struct SrpServer<'a, D: Digest> {
    routines: &'a SrpRoutines<D>,
}

/// Server state after `step1`: challenge issued for one identity, waiting
/// for client evidence. Verified per-`A` sessions accumulate inside.
pub struct SrpServerHandshake<'a, D: Digest> {
    routines: &'a SrpRoutines<D>,
    identity: String,
    salt: BigUint,
    verifier: BigUint,
    b: BigUint,
    b_pub: BigUint,
    // verified sessions keyed by the minimal big-endian bytes of A
    sessions: HashMap<Vec<u8>, SrpServerSession<D>>,
}

impl<'a, D: Digest> fmt::Debug for SrpServerHandshake<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // verifier, b, and b_pub stay out of logs
        f.debug_struct("SrpServerHandshake")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Terminal server state for one verified `A`: evidence `M2` and the
/// premaster secret.
pub struct SrpServerSession<D: Digest> {
    m2: Output<D>,
    premaster: BigUint,
    session_key: Output<D>,
    cipher: SessionCipher<D>,
}

impl<'a, D: Digest> SrpServer<'a, D> {
    /// Create a new server session.
    #[must_use]
    pub fn new(routines: &'a SrpRoutines<D>) -> Self {
        Self { routines }
    }

    /// Open a handshake for `identity` from its stored registration record.
    ///
    /// Draws the ephemeral private `b` and computes `B = (k*v + g^b) mod N`,
    /// redrawing `b` in the negligible case that `B` is divisible by N.
    pub fn step1(
        self,
        identity: &str,
        salt: &BigUint,
        verifier: &BigUint,
    ) -> Result<SrpServerHandshake<'a, D>, SrpError> {
        if identity.trim().is_empty() {
            return Err(SrpError::IllegalArgument {
                name: "identity",
                reason: "must not be empty",
            });
        }
        if !self.routines.is_valid_public_value(verifier) {
            return Err(SrpError::IllegalArgument {
                name: "verifier",
                reason: "must not be divisible by N",
            });
        }

        for attempt in 0..MAX_B_REDRAWS {
            let b = self.routines.generate_private_value();
            let b_pub = self.routines.compute_server_public(&b, verifier);
            if self.routines.is_valid_public_value(&b_pub) {
                return Ok(SrpServerHandshake {
                    routines: self.routines,
                    identity: identity.to_owned(),
                    salt: salt.clone(),
                    verifier: verifier.clone(),
                    b,
                    b_pub,
                    sessions: HashMap::new(),
                });
            }
            warn!("degenerate server public value, redrawing b (attempt {attempt})");
        }
        Err(SrpError::BadServerPublicValue)
    }
}

impl<'a, D: Digest> SrpServerHandshake<'a, D> {
    /// Public ephemeral value `B` for sending to the client.
    #[must_use]
    pub fn b_pub(&self) -> &BigUint {
        &self.b_pub
    }

    /// The identity this handshake authenticates.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The salt sent alongside `B`.
    #[must_use]
    pub fn salt(&self) -> &BigUint {
        &self.salt
    }

    /// Verify the client evidence `M1` for the public value `A` and
    /// produce the server evidence `M2`.
    ///
    /// On success the per-`A` session is retained and serves the
    /// encryption methods; a failed verification leaves previously
    /// verified sessions untouched.
    pub fn step2(&mut self, a_pub: &BigUint, m1: &[u8]) -> Result<Output<D>, SrpError> {
        if m1.is_empty() {
            return Err(SrpError::IllegalArgument {
                name: "m1",
                reason: "must not be empty",
            });
        }
        if !self.routines.is_valid_public_value(a_pub) {
            return Err(SrpError::BadClientPublicValue);
        }

        let u = self.routines.compute_u(a_pub, &self.b_pub);
        if u == BigUint::default() {
            return Err(SrpError::BadScrambler);
        }

        let premaster = self
            .routines
            .compute_server_premaster(a_pub, &self.verifier, &u, &self.b);

        let expected_m1 = self.routines.compute_m1(a_pub, &self.b_pub, &premaster);
        if expected_m1.ct_eq(m1).unwrap_u8() != 1 {
            return Err(SrpError::BadClientEvidence);
        }

        let m2 = self.routines.compute_m2(a_pub, &expected_m1, &premaster);
        let session_key = self.routines.compute_session_key(&premaster);
        let cipher = SessionCipher::new(&premaster);
        self.sessions.insert(
            a_pub.to_bytes_be(),
            SrpServerSession {
                m2: m2.clone(),
                premaster,
                session_key,
                cipher,
            },
        );
        Ok(m2)
    }

    /// The verified session for `A`, if any.
    #[must_use]
    pub fn session(&self, a_pub: &BigUint) -> Option<&SrpServerSession<D>> {
        self.sessions.get(&a_pub.to_bytes_be())
    }

    /// Encrypt an application message for the client behind `A`.
    pub fn encrypt(&self, a_pub: &BigUint, data: &[u8]) -> Result<EncryptedMessage, SrpError> {
        Ok(self.lookup(a_pub)?.encrypt(data))
    }

    /// Encrypt a string (UTF-8 encoded) for the client behind `A`.
    pub fn encrypt_str(&self, a_pub: &BigUint, data: &str) -> Result<EncryptedMessage, SrpError> {
        self.encrypt(a_pub, data.as_bytes())
    }

    /// Decrypt an application message from the client behind `A`.
    pub fn decrypt(
        &self,
        a_pub: &BigUint,
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, SrpError> {
        self.lookup(a_pub)?.decrypt(iv, ciphertext)
    }

    /// Decrypt and UTF-8 decode an application message from the client
    /// behind `A`.
    pub fn decrypt_to_string(
        &self,
        a_pub: &BigUint,
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<String, SrpError> {
        self.lookup(a_pub)?.decrypt_to_string(iv, ciphertext)
    }

    fn lookup(&self, a_pub: &BigUint) -> Result<&SrpServerSession<D>, SrpError> {
        self.session(a_pub).ok_or(SrpError::IllegalArgument {
            name: "a_pub",
            reason: "has no verified session",
        })
    }
}

impl<D: Digest> SrpServerSession<D> {
    /// Evidence `M2` proving this side holds the premaster.
    #[must_use]
    pub fn proof(&self) -> &[u8] {
        self.m2.as_slice()
    }

    /// The premaster secret `S` shared with the client.
    #[must_use]
    pub fn premaster(&self) -> &BigUint {
        &self.premaster
    }

    /// The session key `K = H(PAD(S))` for callers keying external ciphers.
    #[must_use]
    pub fn session_key(&self) -> &[u8] {
        self.session_key.as_slice()
    }

    /// Encrypt an application message for this session's client.
    #[must_use]
    pub fn encrypt(&self, data: &[u8]) -> EncryptedMessage {
        self.cipher.encrypt(data)
    }

    /// Decrypt an application message from this session's client.
    pub fn decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, SrpError> {
        self.cipher.decrypt(iv, ciphertext)
    }

    /// Decrypt and UTF-8 decode an application message from this
    /// session's client.
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
        let salt = routines.generate_salt();
        let err = SrpServer::new(&routines)
            .step1("", &salt, &BigUint::from(2u8))
            .unwrap_err();
        assert!(matches!(err, SrpError::IllegalArgument { name: "identity", .. }));
    }

    #[test]
    fn step1_rejects_degenerate_verifier() {
        let routines = routines();
        let salt = routines.generate_salt();
        let err = SrpServer::new(&routines)
            .step1("alice", &salt, &BigUint::default())
            .unwrap_err();
        assert!(matches!(err, SrpError::IllegalArgument { name: "verifier", .. }));
    }

    #[test]
    fn encrypt_requires_a_verified_session() {
        let routines = routines();
        let salt = routines.generate_salt();
        let handshake = SrpServer::new(&routines)
            .step1("alice", &salt, &BigUint::from(2u8))
            .unwrap();
        let err = handshake.encrypt(&BigUint::from(3u8), b"data").unwrap_err();
        assert!(matches!(err, SrpError::IllegalArgument { name: "a_pub", .. }));
    }
}
