// ============================
// crates/auth-lib/src/auth/token_generator.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
/** Secure token generation for confirmation and reset flows
Selectors and token secrets are minted here from OS entropy. Callers must
mint a selector and its token with two independent calls, never derive one
from the other. */
use rand::{rngs::OsRng, RngCore};

/// Default output length. At this length the encoded string carries at
/// least as much randomness as a UUID (18 bytes = 144 bits).
pub const DEFAULT_TOKEN_LENGTH: usize = 24;

/** Generate a cryptographically secure random token
# Returns
A base64 URL-safe encoded string without padding, `DEFAULT_TOKEN_LENGTH`
characters long */
pub fn new_random_token() -> String {
    new_random_token_with_length(DEFAULT_TOKEN_LENGTH)
}

/** Generate a cryptographically secure random token with bounded length
The requested length is rounded down to the nearest multiple of 4 before
deriving the byte count (`len/4 * 3`), so the encoded output never needs
padding.
# Arguments
* `max_length` - The maximum length of the output string
# Returns
A base64 URL-safe encoded string without padding */
pub fn new_random_token_with_length(max_length: usize) -> String {
    let bytes = (max_length / 4) * 3;
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/** Hash a token secret for at-rest storage
Delegates to the password-hash primitive; the plaintext secret is never
persisted, and lookups go through the public selector instead of the token
so no secret ever appears in a query predicate. */
pub fn hash_token(secret: &str) -> anyhow::Result<String> {
    super::password::hash_password(secret)
}
