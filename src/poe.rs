//! Proof-of-entry: a sequential proof-of-work bound to a sender address.
//!
//! `poe = SHA-256(nonce || address)` must start with at least `difficulty` zero bytes. The
//! 4-byte wire nonce is hashed as an 8-byte big-endian IEEE-754 double so that proofs match
//! the ones produced by existing nodes.

use crate::address::Address;
use crate::util;

/// Number of leading zero bytes required by default (about 256 attempts).
pub const CURRENT_DIFFICULTY: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfEntry {
    pub poe: [u8; 32],
    pub nonce: u32,
}

fn hash_proof_of_entry(nonce: u32, address: &Address) -> [u8; 32] {
    let nonce_bytes = f64::from(nonce).to_be_bytes();
    util::sha256(&[&nonce_bytes, address.as_bytes()])
}

fn leading_zero_bytes(poe: &[u8; 32]) -> usize {
    poe.iter().take_while(|b| **b == 0).count()
}

pub fn meets_difficulty(poe: &[u8; 32], difficulty: usize) -> bool {
    leading_zero_bytes(poe) >= difficulty
}

/// Searches nonces from zero upwards for the first proof meeting `difficulty`.
///
/// Returns `None` only once the whole 32-bit nonce space has been tried.
pub fn solve(address: &Address, difficulty: usize) -> Option<ProofOfEntry> {
    for nonce in 0..=u32::MAX {
        let poe = hash_proof_of_entry(nonce, address);
        if meets_difficulty(&poe, difficulty) {
            return Some(ProofOfEntry { poe, nonce });
        }
    }
    None
}

/// Verifies a proof against an address at [CURRENT_DIFFICULTY].
pub fn verify(poe: &[u8; 32], address: &Address, nonce: u32) -> bool {
    verify_with_difficulty(poe, address, nonce, CURRENT_DIFFICULTY)
}

/// The proof must be the hash of `(nonce, address)` and independently meet the difficulty.
pub fn verify_with_difficulty(
    poe: &[u8; 32],
    address: &Address,
    nonce: u32,
    difficulty: usize,
) -> bool {
    hash_proof_of_entry(nonce, address) == *poe && meets_difficulty(poe, difficulty)
}
