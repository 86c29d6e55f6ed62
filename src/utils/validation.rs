use serde::Deserialize;
use validator::{Validate, ValidationError};
use crate::errors::AppError;

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_stored_name")]
    pub file_name: String,
}

/// Stored blobs live flat in the uploads directory, so a name must never reach outside it.
pub fn validate_stored_name(name: &str) -> Result<(), ValidationError> {
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(ValidationError::new("invalid_file_name"));
    }
    Ok(())
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass() {
        assert!(validate_stored_name("4f9a0c1e2b3d4f5a6b7c8d9e0f1a2b3c").is_ok());
        assert!(validate_stored_name("report.pdf").is_ok());
    }

    #[test]
    fn traversal_is_rejected() {
        for bad in ["..", ".", "../data.json", "a/b", "a\\b"] {
            assert!(validate_stored_name(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn empty_file_name_fails_payload_validation() {
        let req = DeleteFileRequest { file_name: String::new() };
        assert!(matches!(validate_payload(&req), Err(AppError::BadRequest(_))));

        let req = DeleteFileRequest { file_name: "../../etc/passwd".to_string() };
        assert!(validate_payload(&req).is_err());
    }
}
