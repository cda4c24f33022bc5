//! Random identifier generation.
//!
//! Short alphanumeric ids for primary keys, longer ones for credentials
//! (invitation tokens, session tokens). All draw from the same 62-char
//! alphabet using the thread-local CSPRNG.

const ALPHABET: &[u8] = b"1234567890abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a random id of the given length.
#[must_use]
pub fn generate(len: usize) -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// 6-char id for entity primary keys.
#[must_use]
pub fn entity_id() -> String {
    generate(6)
}

/// 10-char id for invitation rows.
#[must_use]
pub fn invitation_id() -> String {
    generate(10)
}

/// 20-char unguessable invitation token.
#[must_use]
pub fn invitation_token() -> String {
    generate(20)
}

/// 21-char opaque session token.
#[must_use]
pub fn session_token() -> String {
    generate(21)
}
