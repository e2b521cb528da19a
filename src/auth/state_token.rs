//! OAuth2 `state` parameter generation
//!
//! The state token ties a redirect callback to the authorization request that
//! produced it, which protects the code exchange against CSRF.

use rand::Rng;

/// Length of a generated state token
const STATE_TOKEN_LENGTH: usize = 32;

/// Characters allowed in a state token (unreserved URI characters)
const STATE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random, URL-safe state token
///
/// `thread_rng` is a CSPRNG, so tokens are not guessable.
pub fn generate_state_token() -> String {
    let mut rng = rand::thread_rng();
    (0..STATE_TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..STATE_CHARSET.len());
            STATE_CHARSET[idx] as char
        })
        .collect()
}
