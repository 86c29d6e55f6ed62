use async_trait::async_trait;
use crate::errors::AppError;
use crate::models::meeting::{FileReference, Meeting, MeetingUpdate};

pub mod json_file;
pub mod postgres;

pub use json_file::JsonFileRepository;
pub use postgres::PgMeetingRepository;

/// How many fresh codes `create` tries before giving up on collisions.
pub const MAX_ID_ATTEMPTS: usize = 8;

#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Stores a blank meeting under a fresh, unused code.
    async fn create(&self) -> Result<Meeting, AppError>;
    async fn get(&self, id: &str) -> Result<Meeting, AppError>;
    async fn update(&self, id: &str, update: MeetingUpdate) -> Result<Meeting, AppError>;
    /// Removes the meeting and hands back the removed record.
    async fn delete(&self, id: &str) -> Result<Meeting, AppError>;
    /// Newest first.
    async fn list_all(&self) -> Result<Vec<Meeting>, AppError>;
    async fn append_file(&self, id: &str, file: FileReference) -> Result<(), AppError>;
    /// Removes references stored under `stored_name`, returning how many matched.
    async fn remove_files(&self, id: &str, stored_name: &str) -> Result<usize, AppError>;
}

pub(crate) fn meeting_not_found(id: &str) -> AppError {
    log::debug!("Meeting {} not found", id);
    AppError::NotFound("Meeting not found".to_string())
}
