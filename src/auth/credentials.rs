use argon2::{Argon2, PasswordHash, PasswordVerifier};
use crate::errors::AppError;

/// Decides whether a submitted admin password is acceptable.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, password: &str) -> bool;
}

/// Plain comparison against one configured shared secret.
pub struct SharedSecretVerifier {
    secret: String,
}

impl SharedSecretVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

impl CredentialVerifier for SharedSecretVerifier {
    fn verify(&self, password: &str) -> bool {
        !self.secret.is_empty() && password == self.secret
    }
}

/// Checks the password against an Argon2 PHC string, e.g. `$argon2id$v=19$...`.
pub struct Argon2Verifier {
    phc: String,
}

impl Argon2Verifier {
    pub fn new(phc: impl Into<String>) -> Result<Self, AppError> {
        let phc = phc.into();
        PasswordHash::new(&phc)
            .map_err(|err| AppError::InternalServerError(format!("Invalid admin password hash: {}", err)))?;
        Ok(Self { phc })
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn verify(&self, password: &str) -> bool {
        match PasswordHash::new(&self.phc) {
            Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString};

    #[test]
    fn shared_secret_matches_exactly() {
        let verifier = SharedSecretVerifier::new("admin123");
        assert!(verifier.verify("admin123"));
        assert!(!verifier.verify("admin1234"));
        assert!(!verifier.verify(""));
    }

    #[test]
    fn empty_secret_never_matches() {
        assert!(!SharedSecretVerifier::new("").verify(""));
    }

    #[test]
    fn argon2_hash_verifies() {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = Argon2::default()
            .hash_password(b"s3cret", &salt)
            .unwrap()
            .to_string();

        let verifier = Argon2Verifier::new(hash).unwrap();
        assert!(verifier.verify("s3cret"));
        assert!(!verifier.verify("admin123"));
    }

    #[test]
    fn malformed_hash_is_rejected_up_front() {
        assert!(Argon2Verifier::new("not-a-phc-string").is_err());
    }
}
