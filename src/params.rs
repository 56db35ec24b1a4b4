//! Protocol parameters: the prime group and the hash function.

use core::fmt;
use core::marker::PhantomData;

use digest::Digest;
use sha2::Sha512;

use crate::groups::{SrpGroup, G_2048};
use num_bigint::BigUint;

/// Immutable `(N, g, H)` configuration shared by both ends of a handshake.
///
/// The hash function is selected through the `D` type parameter; any
/// [`Digest`] implementation works. Both peers must agree on the group and
/// the hash or the handshake fails at evidence verification.
#[derive(Clone)]
pub struct SrpParameters<D: Digest> {
    group: SrpGroup,
    d: PhantomData<D>,
}

impl<D: Digest> SrpParameters<D> {
    /// Bind parameters to a group. Use the [`crate::groups`] statics.
    #[must_use]
    pub fn new(group: SrpGroup) -> Self {
        Self {
            group,
            d: PhantomData,
        }
    }

    /// The safe prime N.
    #[must_use]
    pub fn n(&self) -> &BigUint {
        &self.group.n
    }

    /// The generator g.
    #[must_use]
    pub fn g(&self) -> &BigUint {
        &self.group.g
    }

    /// `⌈bitlen(N)/8⌉`, the target length of every `PAD` operation.
    #[must_use]
    pub fn n_bytes(&self) -> usize {
        self.group.n_bytes()
    }

    /// Digest length of the selected hash in bytes.
    #[must_use]
    pub fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

impl Default for SrpParameters<Sha512> {
    /// The default parameter set: 2048-bit RFC 5054 group, SHA-512.
    fn default() -> Self {
        Self::new(G_2048.clone())
    }
}

impl<D: Digest> fmt::Debug for SrpParameters<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SrpParameters")
            .field("n_bits", &self.group.n.bits())
            .field("g", &self.group.g)
            .field("hash_len", &self.output_size())
            .finish()
    }
}
