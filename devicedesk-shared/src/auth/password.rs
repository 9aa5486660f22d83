/// Credential hashing using Argon2id
///
/// This module provides the [`CredentialHasher`] seam the registries depend
/// on (`hash(plain) -> digest`, `verify(plain, digest) -> bool`) plus its
/// production implementation backed by Argon2id. Keeping the seam narrow
/// lets tests substitute a fake without a real hashing algorithm.
///
/// # Security
///
/// - **Algorithm**: Argon2id
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash, PHC string format
///
/// # Example
///
/// ```
/// use devicedesk_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_password("super_secret_password_123")?;
/// assert!(verify_password("super_secret_password_123", &digest)?);
/// assert!(!verify_password("wrong_password", &digest)?);
/// # Ok(())
/// # }
/// ```
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for credential hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password digest format
    #[error("Invalid password digest format: {0}")]
    InvalidDigest(String),
}

/// Narrow hashing capability the registries are written against
///
/// The production implementation is [`Argon2Hasher`]; unit tests substitute
/// fakes so they never pay Argon2's memory-hard cost.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a plaintext password into a storable digest
    fn hash(&self, plain: &str) -> Result<String, PasswordError>;

    /// Verifies a plaintext password against a stored digest
    fn verify(&self, plain: &str, digest: &str) -> Result<bool, PasswordError>;
}

/// Argon2id-backed [`CredentialHasher`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        hash_password(plain)
    }

    fn verify(&self, plain: &str, digest: &str) -> Result<bool, PasswordError> {
        verify_password(plain, digest)
    }
}

/// Hashes a password using Argon2id with secure parameters
///
/// The salt is 16 random bytes from the OS RNG; the output is a PHC string
/// that embeds the algorithm, parameters, salt, and hash:
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored digest
///
/// Comparison is constant-time. Returns `Ok(false)` on a wrong password and
/// an error only when the digest itself cannot be parsed.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(digest)
        .map_err(|e| PasswordError::InvalidDigest(format!("Failed to parse digest: {}", e)))?;

    // Parameters are embedded in the digest.
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!(
            "Verification failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_phc_format() {
        let digest = hash_password("test_password_123").expect("Hash should succeed");

        assert!(digest.starts_with("$argon2id$"));
        assert!(digest.contains("v=19"));
        assert!(digest.contains("m=65536"));
        assert!(digest.contains("t=3"));
        assert!(digest.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let digest1 = hash_password("same_password").expect("Hash 1 should succeed");
        let digest2 = hash_password("same_password").expect("Hash 2 should succeed");

        assert_ne!(digest1, digest2);
    }

    #[test]
    fn test_verify_password_roundtrip() {
        let digest = hash_password("correct_password").expect("Hash should succeed");

        assert!(verify_password("correct_password", &digest).expect("Verify should succeed"));
        assert!(!verify_password("wrong_password", &digest).expect("Verify should succeed"));
        assert!(!verify_password("", &digest).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_invalid_digest() {
        assert!(verify_password("password", "not_a_digest").is_err());
        assert!(verify_password("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_hasher_trait_roundtrip() {
        let hasher = Argon2Hasher;
        let digest = hasher.hash("with spaces and 密码").expect("Hash should succeed");

        assert!(hasher
            .verify("with spaces and 密码", &digest)
            .expect("Verify should succeed"));
        assert!(!hasher
            .verify("different", &digest)
            .expect("Verify should succeed"));
    }
}
