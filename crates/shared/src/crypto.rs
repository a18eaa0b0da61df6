//! Random token generation for invitation links.

use rand::Rng;

/// Length of generated invitation tokens.
pub const INVITATION_TOKEN_LENGTH: usize = 32;

/// Token alphabet. URL-safe, without confusing characters (0, O, 1, l, I).
const TOKEN_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";

/// Generates a random token of the given length from the invitation alphabet.
pub fn generate_token(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_CHARSET.len());
            TOKEN_CHARSET[idx] as char
        })
        .collect()
}

/// Generates an invitation token.
pub fn generate_invitation_token() -> String {
    generate_token(INVITATION_TOKEN_LENGTH)
}

/// Returns true if `token` could have been produced by [`generate_invitation_token`].
///
/// Used to reject obviously malformed tokens before touching the database.
pub fn is_well_formed_token(token: &str) -> bool {
    token.len() == INVITATION_TOKEN_LENGTH && token.bytes().all(|b| TOKEN_CHARSET.contains(&b))
}
