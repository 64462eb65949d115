//! Argon2id password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// [`PasswordHasher`] producing Argon2id PHC strings.
///
/// Verification reads the cost parameters from the stored hash, so hashes
/// created with older parameters keep verifying after a cost change.
///
/// # Examples
/// ```
/// use accounts::domain::ports::PasswordHasher;
/// use accounts::outbound::password::Argon2PasswordHasher;
///
/// let hasher = Argon2PasswordHasher::with_costs(8, 1, 1).expect("valid costs");
/// let hash = hasher.hash("s3cret!").expect("hash");
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(hasher.verify("s3cret!", &hash).expect("verify"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Build a hasher with explicit memory (KiB), time and parallelism costs.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError::Hash`] when Argon2 rejects the costs.
    pub fn with_costs(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hash(err.to_string())),
        }
    }
}
