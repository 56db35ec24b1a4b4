//! Error types.

use core::{error, fmt};

/// Errors raised by the SRP-6a handshake and the session encryption layer.
///
/// Protocol errors are terminal for the session that raised them; a fresh
/// session must be established. The two cipher errors ([`ShortCiphertext`]
/// and [`AuthTagMismatch`]) do not invalidate the underlying session.
///
/// [`ShortCiphertext`]: SrpError::ShortCiphertext
/// [`AuthTagMismatch`]: SrpError::AuthTagMismatch
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SrpError {
    /// An input failed validation before any protocol work was done.
    IllegalArgument {
        /// Argument name
        name: &'static str,
        /// What was wrong with it
        reason: &'static str,
    },
    /// The client public value satisfies `A mod N == 0`.
    BadClientPublicValue,
    /// The server public value satisfies `B mod N == 0`.
    BadServerPublicValue,
    /// The scrambler `u = H(PAD(A) | PAD(B))` hashed to zero.
    BadScrambler,
    /// The client evidence `M1` does not match the server's recomputation.
    BadClientEvidence,
    /// The server evidence `M2` does not match the client's recomputation.
    /// Possible server impersonation.
    BadServerEvidence,
    /// `decrypt` was called with fewer bytes than an authentication tag.
    ShortCiphertext {
        /// Length of the rejected input
        len: usize,
    },
    /// The ciphertext authentication tag failed verification.
    AuthTagMismatch,
}

impl fmt::Display for SrpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalArgument { name, reason } => {
                write!(f, "illegal_argument: '{name}' {reason}")
            }
            Self::BadClientPublicValue => {
                write!(f, "illegal_parameter: client public value is divisible by N")
            }
            Self::BadServerPublicValue => {
                write!(f, "illegal_parameter: server public value is divisible by N")
            }
            Self::BadScrambler => {
                write!(f, "illegal_parameter: scrambler 'u' is zero")
            }
            Self::BadClientEvidence => {
                write!(f, "bad_record_mac: incorrect 'client' evidence")
            }
            Self::BadServerEvidence => {
                write!(f, "bad_record_mac: incorrect 'server' evidence")
            }
            Self::ShortCiphertext { len } => {
                write!(f, "short_ciphertext: {len} bytes, need at least 16")
            }
            Self::AuthTagMismatch => {
                write!(f, "auth_tag_mismatch: ciphertext failed authentication")
            }
        }
    }
}

impl error::Error for SrpError {}

#[cfg(test)]
mod tests {
    use super::SrpError;

    #[test]
    fn empty_argument_message_mentions_emptiness() {
        let err = SrpError::IllegalArgument {
            name: "identity",
            reason: "must not be empty",
        };
        assert!(err.to_string().to_lowercase().contains("empty"));
    }

    #[test]
    fn evidence_errors_name_the_peer() {
        assert!(SrpError::BadClientEvidence.to_string().contains("client"));
        assert!(SrpError::BadServerEvidence.to_string().contains("server"));
    }
}
