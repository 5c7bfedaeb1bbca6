//! Password hashing module
//!
//! bcrypt hashing and verification. The cost factor is embedded in each
//! hash, so verification works for hashes produced at any cost.

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a password with bcrypt.
///
/// Returns the hash in the modular crypt format (`$2b$...`), salt included.
pub fn hash_password(password: &str) -> Result<String> {
    hash(password, DEFAULT_COST).context("Password hashing failed")
}

/// Verify a password against a stored bcrypt hash.
///
/// Returns `true` if the password matches. An unparseable hash is an error.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool> {
    verify(password, hashed).context("Password verification failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_produces_bcrypt_hash() {
        let hashed = hash_password("test_password_123").expect("Failed to hash password");
        assert!(hashed.starts_with("$2"), "Hash should be in bcrypt format");
    }

    #[test]
    fn test_hash_password_produces_different_hashes() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let hashed = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hashed).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hashed = hash_password("correct_password").unwrap();
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "not_a_bcrypt_hash").is_err());
    }

    #[test]
    fn test_hash_password_unicode() {
        let password = "密码测试🔐";
        let hashed = hash_password(password).unwrap();
        assert!(verify_password(password, &hashed).unwrap());
    }
}
