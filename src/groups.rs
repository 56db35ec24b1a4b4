//! Groups from [RFC 5054](https://tools.ietf.org/html/rfc5054)
//!
//! It is strongly recommended to use them instead of custom generated
//! groups. Additionally, it is not recommended to use `G_1024` and `G_1536`,
//! they are provided only for compatibility with the legacy software.

use num_bigint::BigUint;
use once_cell::sync::Lazy;

/// Group used for SRP computations.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SrpGroup {
    /// A large safe prime (N = 2q+1, where q is prime)
    pub n: BigUint,
    /// A generator modulo N
    pub g: BigUint,
}

impl SrpGroup {
    fn from_be_bytes(n: &[u8], g: u8) -> Self {
        Self {
            n: BigUint::from_bytes_be(n),
            g: BigUint::from(g),
        }
    }

    /// Byte length of the minimal big-endian encoding of N; all `PAD`
    /// operations pad to this length.
    #[must_use]
    pub fn n_bytes(&self) -> usize {
        self.n.bits().div_ceil(8) as usize
    }
}

/// 1024-bit group with g = 2.
pub static G_1024: Lazy<SrpGroup> =
    Lazy::new(|| SrpGroup::from_be_bytes(include_bytes!("groups/1024.bin"), 2));

/// 1536-bit group with g = 2.
pub static G_1536: Lazy<SrpGroup> =
    Lazy::new(|| SrpGroup::from_be_bytes(include_bytes!("groups/1536.bin"), 2));

/// 2048-bit group with g = 2.
pub static G_2048: Lazy<SrpGroup> =
    Lazy::new(|| SrpGroup::from_be_bytes(include_bytes!("groups/2048.bin"), 2));

/// 3072-bit group with g = 5.
pub static G_3072: Lazy<SrpGroup> =
    Lazy::new(|| SrpGroup::from_be_bytes(include_bytes!("groups/3072.bin"), 5));

/// 4096-bit group with g = 5.
pub static G_4096: Lazy<SrpGroup> =
    Lazy::new(|| SrpGroup::from_be_bytes(include_bytes!("groups/4096.bin"), 5));

/// 6144-bit group with g = 5.
pub static G_6144: Lazy<SrpGroup> =
    Lazy::new(|| SrpGroup::from_be_bytes(include_bytes!("groups/6144.bin"), 5));

/// 8192-bit group with g = 19.
pub static G_8192: Lazy<SrpGroup> =
    Lazy::new(|| SrpGroup::from_be_bytes(include_bytes!("groups/8192.bin"), 19));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_widths() {
        for (group, bits) in [
            (&G_1024, 1024u64),
            (&G_1536, 1536),
            (&G_2048, 2048),
            (&G_3072, 3072),
            (&G_4096, 4096),
            (&G_6144, 6144),
            (&G_8192, 8192),
        ] {
            assert_eq!(group.n.bits(), bits);
            assert_eq!(group.n_bytes(), (bits / 8) as usize);
        }
    }

    #[test]
    fn primes_are_odd_and_distinct() {
        let groups = [
            &G_1024, &G_1536, &G_2048, &G_3072, &G_4096, &G_6144, &G_8192,
        ];
        for g in groups {
            assert_eq!(&g.n % 2u8, BigUint::from(1u8));
        }
        for (i, a) in groups.iter().enumerate() {
            for b in &groups[i + 1..] {
                assert_ne!(a.n, b.n);
            }
        }
    }
}
