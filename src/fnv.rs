//! 32-bit Fowler-Noll-Vo (FNV-1) hashing.
//!
//! FNV-1 is a byte-at-a-time multiply-then-xor hash. It is not collision
//! resistant, but for small fixed-size keys such as 2D coordinates it mixes
//! well and is cheap enough to beat seeded hashers. [`Fnv1Hasher`] plugs into
//! the standard [`Hash`](core::hash::Hash)/[`Hasher`] machinery, so any
//! `#[derive(Hash)]` key type hashes its raw byte representation exactly as
//! the classic C formulation does.
//!
//! See <https://en.wikipedia.org/wiki/Fowler–Noll–Vo_hash_function>.

use core::hash::BuildHasher;
use core::hash::Hasher;

/// FNV 32-bit offset basis.
pub const FNV_32_BASIS: u32 = 0x811C_9DC5;

/// FNV 32-bit prime.
pub const FNV_32_PRIME: u32 = 0x0100_0193;

/// A [`Hasher`] computing the 32-bit FNV-1 hash of the written bytes.
///
/// [`finish`](Hasher::finish) zero-extends the 32-bit state to `u64`; the
/// table wrappers fold hashes back down to 32 bits, which for FNV-1 is the
/// identity.
#[derive(Debug, Clone)]
pub struct Fnv1Hasher {
    state: u32,
}

impl Fnv1Hasher {
    /// Creates a hasher seeded with the FNV offset basis.
    pub fn new() -> Self {
        Fnv1Hasher {
            state: FNV_32_BASIS,
        }
    }
}

impl Default for Fnv1Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1Hasher {
    fn finish(&self) -> u64 {
        u64::from(self.state)
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = self.state.wrapping_mul(FNV_32_PRIME) ^ u32::from(byte);
        }
    }
}

/// A [`BuildHasher`] producing [`Fnv1Hasher`]s.
///
/// Stateless and unseeded: the same key always hashes to the same value, in
/// every process. Useful where reproducible layouts matter more than
/// resistance to crafted keys.
///
/// ```rust
/// # use rh_hash::HashMap;
/// # use rh_hash::fnv::Fnv1BuildHasher;
/// let mut map: HashMap<(i64, i64), u32, _> = HashMap::with_hasher(Fnv1BuildHasher);
/// map.insert((3, -4), 25)?;
/// assert_eq!(map.get(&(3, -4)), Some(&25));
/// # Ok::<(), rh_hash::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1BuildHasher;

impl BuildHasher for Fnv1BuildHasher {
    type Hasher = Fnv1Hasher;

    fn build_hasher(&self) -> Self::Hasher {
        Fnv1Hasher::new()
    }
}

#[cfg(test)]
mod tests {
    use core::hash::Hash;

    use super::*;

    #[test]
    fn empty_input_hashes_to_the_basis() {
        let hasher = Fnv1Hasher::new();
        assert_eq!(hasher.finish(), u64::from(FNV_32_BASIS));
    }

    #[test]
    fn known_answer() {
        // FNV-1 32 of "a" per the reference vectors.
        let mut hasher = Fnv1Hasher::new();
        hasher.write(b"a");
        assert_eq!(hasher.finish(), 0x050C_5D7E);
    }

    #[test]
    fn hashing_is_deterministic_across_builders() {
        let point = (17i64, -3i64);

        let mut a = Fnv1BuildHasher.build_hasher();
        point.hash(&mut a);
        let mut b = Fnv1BuildHasher.build_hasher();
        point.hash(&mut b);

        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn nearby_points_hash_apart() {
        let mut seen = alloc::vec::Vec::new();
        for x in -4i64..4 {
            for y in -4i64..4 {
                let mut hasher = Fnv1Hasher::new();
                (x, y).hash(&mut hasher);
                seen.push(hasher.finish());
            }
        }
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 64);
    }
}
