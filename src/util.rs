use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ring::digest::{Context, SHA256};
use tai64::Tai64;

/// BLAKE2b-256 of `input`, used for identities derived from keys and socket addresses.
pub fn hash(input: &[u8]) -> [u8; 32] {
    let digest = Blake2b::<U32>::digest(input);
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&digest);
    buf
}

/// SHA-256 over the concatenation of `parts`.
pub fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut context = Context::new(&SHA256);
    for part in parts.iter() {
        context.update(part);
    }
    let digest = context.finish();
    let mut buf = [0u8; 32];
    buf.copy_from_slice(digest.as_ref());
    buf
}

/// Current wall-clock time in unix seconds.
pub fn unix_now() -> u64 {
    let secs = Tai64::now().to_unix();
    if secs < 0 {
        0
    } else {
        secs as u64
    }
}
