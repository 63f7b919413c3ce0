//! Password value object - one-way credential hashing.
//!
//! Argon2id with a fresh random salt per hash. Verification never errors:
//! a digest that cannot be parsed simply does not match.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plaintext password.
    ///
    /// CPU bound; call from a blocking context.
    ///
    /// # Errors
    /// Returns an internal error if the hasher fails.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Wrap an existing digest (from the database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the digest for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the digest.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plaintext password against this digest.
    ///
    /// Returns false on mismatch and on a malformed digest.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Self::argon2()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::debug!("Stored password digest is malformed: {}", e);
                false
            }
        }
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain).unwrap();

        assert_ne!(password.as_str(), plain);
        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "secret1";
        let hash = Password::new(plain).unwrap().into_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::new(plain).unwrap();
        let pass2 = Password::new(plain).unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_malformed_digest_never_matches() {
        let garbage = Password::from_hash("not-a-phc-string".to_string());
        assert!(!garbage.verify("anything"));

        let empty = Password::from_hash(String::new());
        assert!(!empty.verify(""));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let password = Password::new("hunter22").unwrap();
        let rendered = format!("{:?}", password);
        assert!(!rendered.contains(password.as_str()));
    }
}
