use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use crate::errors::AppError;
use crate::models::meeting::{FileReference, Meeting, MeetingUpdate};
use crate::utils::id::generate_meeting_id;
use super::{meeting_not_found, MeetingRepository, MAX_ID_ATTEMPTS};

/// On-disk layout: `{ "meetings": { "<id>": { ...meeting... } } }`.
#[derive(Serialize, Deserialize, Default, Debug)]
struct DataFile {
    #[serde(default)]
    meetings: BTreeMap<String, Meeting>,
}

/// Keeps every meeting in a single JSON document that is read and rewritten whole
/// on each mutation. Writers in this process are serialized; other processes
/// writing the same file are not.
pub struct JsonFileRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Using JSON file store at {}", path.display());
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_data(&self) -> Result<DataFile, AppError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(DataFile::default()),
            Err(err) => return Err(err.into()),
        };

        let mut data: DataFile = match serde_json::from_slice(&raw) {
            Ok(data) => data,
            Err(err) => {
                warn!("{} is not valid meeting data ({}); starting empty", self.path.display(), err);
                DataFile::default()
            }
        };

        // Older files keyed meetings without storing the id inside the record.
        for (id, meeting) in data.meetings.iter_mut() {
            if meeting.id != *id {
                meeting.id = id.clone();
            }
        }
        Ok(data)
    }

    async fn save_data(&self, data: &DataFile) -> Result<(), AppError> {
        let body = serde_json::to_vec_pretty(data)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body).await.map_err(|err| {
            error!("Failed to write {}: {}", tmp.display(), err);
            AppError::from(err)
        })?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read-modify-write under the in-process lock.
    async fn mutate<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut DataFile) -> Result<T, AppError> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut data = self.read_data().await?;
        let out = f(&mut data)?;
        self.save_data(&data).await?;
        Ok(out)
    }
}

#[async_trait]
impl MeetingRepository for JsonFileRepository {
    async fn create(&self) -> Result<Meeting, AppError> {
        self.mutate(|data| {
            for _ in 0..MAX_ID_ATTEMPTS {
                let id = generate_meeting_id();
                if data.meetings.contains_key(&id) {
                    debug!("Meeting id {} already taken, retrying", id);
                    continue;
                }
                let meeting = Meeting::blank(id.clone());
                data.meetings.insert(id, meeting.clone());
                return Ok(meeting);
            }
            Err(AppError::InternalServerError("Could not allocate a meeting id".to_string()))
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Meeting, AppError> {
        let mut data = self.read_data().await?;
        data.meetings.remove(id).ok_or_else(|| meeting_not_found(id))
    }

    async fn update(&self, id: &str, update: MeetingUpdate) -> Result<Meeting, AppError> {
        self.mutate(|data| {
            let meeting = data.meetings.get_mut(id).ok_or_else(|| meeting_not_found(id))?;
            meeting.apply(update);
            Ok(meeting.clone())
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<Meeting, AppError> {
        self.mutate(|data| data.meetings.remove(id).ok_or_else(|| meeting_not_found(id)))
            .await
    }

    async fn list_all(&self) -> Result<Vec<Meeting>, AppError> {
        let data = self.read_data().await?;
        let mut meetings: Vec<Meeting> = data.meetings.into_values().collect();
        meetings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(meetings)
    }

    async fn append_file(&self, id: &str, file: FileReference) -> Result<(), AppError> {
        self.mutate(|data| {
            let meeting = data.meetings.get_mut(id).ok_or_else(|| meeting_not_found(id))?;
            meeting.files.push(file);
            Ok(())
        })
        .await
    }

    async fn remove_files(&self, id: &str, stored_name: &str) -> Result<usize, AppError> {
        self.mutate(|data| {
            let meeting = data.meetings.get_mut(id).ok_or_else(|| meeting_not_found(id))?;
            Ok(meeting.remove_files(stored_name))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::meeting::DEFAULT_TITLE;
    use crate::utils::id::is_meeting_id;

    fn temp_repo() -> (JsonFileRepository, PathBuf) {
        let dir = std::env::temp_dir().join(format!("meeting-store-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        (JsonFileRepository::new(dir.join("data.json")), dir)
    }

    fn file(stored: &str) -> FileReference {
        FileReference::new(format!("{stored}.pdf"), "minutes".to_string(), stored.to_string())
    }

    #[tokio::test]
    async fn create_then_get_returns_blank_record() {
        let (repo, dir) = temp_repo();
        let created = repo.create().await.unwrap();
        assert!(is_meeting_id(&created.id));

        let fetched = repo.get(&created.id).await.unwrap();
        assert_eq!(fetched.title, DEFAULT_TITLE);
        assert!(fetched.files.is_empty());
        assert_eq!(fetched, created);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn update_missing_meeting_creates_nothing() {
        let (repo, dir) = temp_repo();
        let res = repo.update("zzzzzz", MeetingUpdate::default()).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
        assert!(repo.list_all().await.unwrap().is_empty());
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn append_only_touches_target_meeting() {
        let (repo, dir) = temp_repo();
        let a = repo.create().await.unwrap();
        let b = repo.create().await.unwrap();

        repo.append_file(&a.id, file("blob1")).await.unwrap();

        assert_eq!(repo.get(&a.id).await.unwrap().files.len(), 1);
        assert!(repo.get(&b.id).await.unwrap().files.is_empty());
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn remove_files_leaves_prefix_siblings() {
        let (repo, dir) = temp_repo();
        let m = repo.create().await.unwrap();
        repo.append_file(&m.id, file("abc")).await.unwrap();
        repo.append_file(&m.id, file("abcd")).await.unwrap();

        assert_eq!(repo.remove_files(&m.id, "abc").await.unwrap(), 1);
        let left = repo.get(&m.id).await.unwrap().files;
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].real_path, "abcd");
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn list_is_newest_first_and_delete_removes() {
        let (repo, dir) = temp_repo();
        let first = repo.create().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.create().await.unwrap();

        let ids: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        repo.delete(&first.id).await.unwrap();
        assert!(matches!(repo.get(&first.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(repo.delete(&first.id).await, Err(AppError::NotFound(_))));
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn legacy_and_corrupt_files_are_tolerated() {
        let (repo, dir) = temp_repo();
        std::fs::write(
            repo.path(),
            r#"{"meetings":{"ab12cd":{"title":"Họp","time":"","members":"","location":"","files":[]}}}"#,
        )
        .unwrap();
        let legacy = repo.get("ab12cd").await.unwrap();
        assert_eq!(legacy.id, "ab12cd");
        assert_eq!(legacy.title, "Họp");

        std::fs::write(repo.path(), "{ not json").unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
        std::fs::remove_dir_all(dir).ok();
    }
}
