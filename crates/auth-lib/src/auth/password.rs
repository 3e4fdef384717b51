// ============================
// crates/auth-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! The hash is a one-way black box for the rest of the crate: slow by
//! design, salted, and only ever compared through [`verify_password`].
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Scrypt,
};
use zeroize::Zeroize;

/// Hash a password using scrypt
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt.hash_password(plain.as_bytes(), &salt)?.to_string();
    Ok(hash)
}

/// Verify a password against a hash
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash a password and zeroize the plaintext buffer
pub fn hash_password_secure(plain: &mut String) -> anyhow::Result<String> {
    let hash = hash_password(plain);
    plain.zeroize();
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse").unwrap();

        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "wrong horse"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same input").unwrap();
        let second = hash_password("same input").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[test]
    fn secure_variant_wipes_the_plaintext() {
        let mut plain = "ephemeral".to_string();
        let hash = hash_password_secure(&mut plain).unwrap();

        assert!(plain.is_empty());
        assert!(verify_password(&hash, "ephemeral"));
    }
}
