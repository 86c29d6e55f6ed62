use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

pub const DEFAULT_TITLE: &str = "Cuộc họp mới";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub members: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub files: Vec<FileReference>,
    #[serde(default = "epoch")]
    pub created_at: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Meeting {
    /// Blank record handed out by `create-meeting`, populated later by updates and uploads.
    pub fn blank(id: String) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            time: String::new(),
            members: String::new(),
            location: String::new(),
            files: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: MeetingUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(time) = update.time {
            self.time = time;
        }
        if let Some(members) = update.members {
            self.members = members;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
    }

    /// Drops every reference stored under `stored_name`, returning how many went.
    pub fn remove_files(&mut self, stored_name: &str) -> usize {
        let before = self.files.len();
        self.files.retain(|file| file.real_path != stored_name);
        before - self.files.len()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub category: String,
    pub real_path: String,
}

impl FileReference {
    pub fn new(name: String, category: String, stored_name: String) -> Self {
        Self {
            name,
            path: format!("/view-pdf/{}", stored_name),
            category,
            real_path: stored_name,
        }
    }
}

/// The fields an admin may change through `update-info`.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MeetingUpdate {
    pub title: Option<String>,
    pub time: Option<String>,
    pub members: Option<String>,
    pub location: Option<String>,
}
