pub mod credentials;
pub mod session;

pub use credentials::{Argon2Verifier, CredentialVerifier, SharedSecretVerifier};
pub use session::{AdminSession, RequireAdmin, SessionManager};
