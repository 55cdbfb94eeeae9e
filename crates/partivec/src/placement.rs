//! Deterministic partition selection for new vector IDs.
//!
//! IDs inserted without an explicit partition are routed by a 64-bit FNV-1a
//! hash of their UTF-8 bytes, reduced modulo the partition count. The hash
//! has no per-process seed, so the same ID and partition ordering always
//! produce the same placement, across runs and platforms.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// 64-bit FNV-1a over `bytes`.
#[must_use]
pub const fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Index of the partition a new `id` is routed to.
///
/// Returns `None` when `partition_count` is zero.
#[must_use]
pub fn partition_index(id: &str, partition_count: usize) -> Option<usize> {
    if partition_count == 0 {
        return None;
    }
    let slot = fnv1a_64(id.as_bytes()) % partition_count as u64;
    Some(slot as usize)
}
