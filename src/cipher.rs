//! Post-handshake message encryption keyed by the shared premaster secret.
//!
//! This is a fallback construction for contexts where a proper AEAD is
//! unavailable, not an AES-GCM equivalent. The keystream for a message is
//! fully determined by the encryption key and the 16-byte IV, repeating
//! with period `lcm(hash_len, 16)` within a single message. Freshness of
//! the IV is what separates two ciphertexts under the same session key:
//! reusing an IV reveals the XOR of the two plaintexts. The tag is a keyed
//! hash truncated to 128 bits.

use core::fmt;
use core::marker::PhantomData;

use digest::Digest;
use log::warn;
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::errors::SrpError;

/// IV length in bytes; fixed by the wire format.
pub const IV_LENGTH: usize = 16;
/// Authentication tag length in bytes; fixed by the wire format.
pub const TAG_LENGTH: usize = 16;

const ENC_KEY_INFO: &[u8] = b"encryption";
const MAC_KEY_INFO: &[u8] = b"authentication";

/// One encrypted message: a fresh IV and `ciphertext || tag`.
#[derive(Clone, Eq, PartialEq)]
pub struct EncryptedMessage {
    /// Fresh CSPRNG bytes, one per message.
    pub iv: [u8; IV_LENGTH],
    /// XOR-encrypted payload with the 16-byte tag concatenated at the end.
    pub ciphertext: Vec<u8>,
}

impl fmt::Debug for EncryptedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the payload stays out of logs
        f.debug_struct("EncryptedMessage")
            .field("len", &self.ciphertext.len())
            .finish()
    }
}

/// Message cipher derived from a handshake's premaster secret.
///
/// Holds the derived keys only; IVs are drawn fresh per [`encrypt`] call
/// and messages are not sequenced.
///
/// [`encrypt`]: SessionCipher::encrypt
#[derive(Clone)]
pub struct SessionCipher<D: Digest> {
    enc_key: Vec<u8>,
    mac_key: Vec<u8>,
    d: PhantomData<D>,
}

impl<D: Digest> SessionCipher<D> {
    /// Derive the encryption and authentication keys from the premaster.
    ///
    /// The premaster is serialized as its minimal big-endian bytes
    /// (unpadded); both peers must do the same to interoperate.
    #[must_use]
    pub fn new(premaster: &BigUint) -> Self {
        let secret = premaster.to_bytes_be();
        let mut d = D::new();
        d.update(&secret);
        d.update(ENC_KEY_INFO);
        let enc_key = d.finalize().to_vec();

        let mut d = D::new();
        d.update(&secret);
        d.update(MAC_KEY_INFO);
        let mac_key = d.finalize().to_vec();

        Self {
            enc_key,
            mac_key,
            d: PhantomData,
        }
    }

    /// Encrypt `plaintext` under a fresh random IV.
    #[must_use]
    pub fn encrypt(&self, plaintext: &[u8]) -> EncryptedMessage {
        let mut iv = [0u8; IV_LENGTH];
        OsRng.fill_bytes(&mut iv);
        let ciphertext = self.seal(&iv, plaintext);
        EncryptedMessage { iv, ciphertext }
    }

    /// Verify the tag of `ciphertext_with_tag` and recover the plaintext.
    pub fn decrypt(&self, iv: &[u8], ciphertext_with_tag: &[u8]) -> Result<Vec<u8>, SrpError> {
        if iv.len() != IV_LENGTH {
            return Err(SrpError::IllegalArgument {
                name: "iv",
                reason: "must be exactly 16 bytes",
            });
        }
        if ciphertext_with_tag.len() < TAG_LENGTH {
            return Err(SrpError::ShortCiphertext {
                len: ciphertext_with_tag.len(),
            });
        }
        let split = ciphertext_with_tag.len() - TAG_LENGTH;
        let (ciphertext, received_tag) = ciphertext_with_tag.split_at(split);

        let expected = self.tag(iv, ciphertext);
        // all 16 bytes are compared regardless of where a mismatch occurs
        if expected.as_slice().ct_eq(received_tag).unwrap_u8() != 1 {
            warn!("message authentication tag mismatch, possible tampering");
            return Err(SrpError::AuthTagMismatch);
        }

        let mut plaintext = ciphertext.to_vec();
        self.apply_keystream(iv, &mut plaintext);
        Ok(plaintext)
    }

    /// [`decrypt`](Self::decrypt) then UTF-8 decode.
    pub fn decrypt_to_string(
        &self,
        iv: &[u8],
        ciphertext_with_tag: &[u8],
    ) -> Result<String, SrpError> {
        String::from_utf8(self.decrypt(iv, ciphertext_with_tag)?).map_err(|_| {
            SrpError::IllegalArgument {
                name: "plaintext",
                reason: "is not valid UTF-8",
            }
        })
    }

    fn seal(&self, iv: &[u8; IV_LENGTH], plaintext: &[u8]) -> Vec<u8> {
        let mut out = plaintext.to_vec();
        self.apply_keystream(iv, &mut out);
        let tag = self.tag(iv, &out);
        out.extend_from_slice(&tag);
        out
    }

    // keystream byte i is enc_key[i mod hash_len] XOR iv[i mod 16]
    fn apply_keystream(&self, iv: &[u8], buf: &mut [u8]) {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte ^= self.enc_key[i % self.enc_key.len()] ^ iv[i % IV_LENGTH];
        }
    }

    // first 16 bytes of H(mac_key | iv | ciphertext)
    fn tag(&self, iv: &[u8], ciphertext: &[u8]) -> [u8; TAG_LENGTH] {
        let mut d = D::new();
        d.update(&self.mac_key);
        d.update(iv);
        d.update(ciphertext);
        let digest = d.finalize();
        let mut tag = [0u8; TAG_LENGTH];
        tag.copy_from_slice(&digest[..TAG_LENGTH]);
        tag
    }
}

impl<D: Digest> fmt::Debug for SessionCipher<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCipher")
            .field("key_len", &self.enc_key.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Sha512;

    fn cipher() -> SessionCipher<Sha512> {
        SessionCipher::new(&BigUint::from_bytes_be(b"not a real premaster"))
    }

    #[test]
    fn round_trip() {
        let c = cipher();
        let msg = c.encrypt(b"attack at dawn");
        assert_eq!(msg.ciphertext.len(), 14 + TAG_LENGTH);
        assert_eq!(c.decrypt(&msg.iv, &msg.ciphertext).unwrap(), b"attack at dawn");
    }

    #[test]
    fn empty_plaintext_is_tag_only() {
        let c = cipher();
        let msg = c.encrypt(b"");
        assert_eq!(msg.ciphertext.len(), TAG_LENGTH);
        assert_eq!(c.decrypt(&msg.iv, &msg.ciphertext).unwrap(), b"");
    }

    #[test]
    fn keystream_is_deterministic_in_key_and_iv() {
        let c = cipher();
        let msg = c.encrypt(b"some plaintext bytes");
        let mut again = msg.ciphertext[..msg.ciphertext.len() - TAG_LENGTH].to_vec();
        c.apply_keystream(&msg.iv, &mut again);
        assert_eq!(again, b"some plaintext bytes");
    }

    #[test]
    fn short_ciphertext_is_rejected() {
        let c = cipher();
        assert_eq!(
            c.decrypt(&[0u8; IV_LENGTH], &[0u8; TAG_LENGTH - 1]),
            Err(SrpError::ShortCiphertext { len: 15 })
        );
    }

    #[test]
    fn wrong_iv_length_is_rejected() {
        let c = cipher();
        let msg = c.encrypt(b"x");
        assert!(matches!(
            c.decrypt(&msg.iv[..15], &msg.ciphertext),
            Err(SrpError::IllegalArgument { name: "iv", .. })
        ));
    }

    #[test]
    fn different_premasters_do_not_interoperate() {
        let c1 = cipher();
        let c2 = SessionCipher::<Sha512>::new(&BigUint::from_bytes_be(b"another premaster"));
        let msg = c1.encrypt(b"hello");
        assert_eq!(c2.decrypt(&msg.iv, &msg.ciphertext), Err(SrpError::AuthTagMismatch));
    }
}
