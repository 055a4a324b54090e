//! Random token generation.

use rand::rngs::OsRng;
use rand::Rng;

/// Characters random tokens are drawn from (64 symbols).
pub const RANDOM_ALPHABET: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+_1234567890";

/// Generate a string of exactly `n` characters from [`RANDOM_ALPHABET`],
/// using the operating system CSPRNG.
pub fn random_string(n: usize) -> String {
    let mut rng = OsRng;
    (0..n)
        .map(|_| RANDOM_ALPHABET[rng.gen_range(0..RANDOM_ALPHABET.len())] as char)
        .collect()
}
