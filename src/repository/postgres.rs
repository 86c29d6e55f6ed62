use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sqlx::types::Json;
use sqlx::PgPool;
use crate::errors::AppError;
use crate::models::meeting::{FileReference, Meeting, MeetingUpdate};
use crate::utils::id::generate_meeting_id;
use super::{meeting_not_found, MeetingRepository, MAX_ID_ATTEMPTS};

#[derive(sqlx::FromRow, Debug)]
struct MeetingRow {
    id: String,
    title: String,
    time: String,
    members: String,
    location: String,
    files: Json<Vec<FileReference>>,
    created_at: DateTime<Utc>,
}

impl From<MeetingRow> for Meeting {
    fn from(row: MeetingRow) -> Self {
        Meeting {
            id: row.id,
            title: row.title,
            time: row.time,
            members: row.members,
            location: row.location,
            files: row.files.0,
            created_at: row.created_at,
        }
    }
}

const SELECT_MEETING: &str =
    "SELECT id, title, time, members, location, files, created_at FROM meetings";

/// Meetings as rows with the file list kept in a JSONB column, so appends and
/// removals are single-statement updates on one row.
pub struct PgMeetingRepository {
    pool: PgPool,
}

impl PgMeetingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeetingRepository for PgMeetingRepository {
    async fn create(&self) -> Result<Meeting, AppError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let meeting = Meeting::blank(generate_meeting_id());
            let result = sqlx::query(
                "INSERT INTO meetings (id, title, time, members, location, files, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (id) DO NOTHING",
            )
            .bind(&meeting.id)
            .bind(&meeting.title)
            .bind(&meeting.time)
            .bind(&meeting.members)
            .bind(&meeting.location)
            .bind(Json(&meeting.files))
            .bind(meeting.created_at)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                return Ok(meeting);
            }
            debug!("Meeting id {} already taken, retrying", meeting.id);
        }
        Err(AppError::InternalServerError("Could not allocate a meeting id".to_string()))
    }

    async fn get(&self, id: &str) -> Result<Meeting, AppError> {
        let row = sqlx::query_as::<_, MeetingRow>(&format!("{} WHERE id = $1", SELECT_MEETING))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Meeting::from).ok_or_else(|| meeting_not_found(id))
    }

    async fn update(&self, id: &str, update: MeetingUpdate) -> Result<Meeting, AppError> {
        let row = sqlx::query_as::<_, MeetingRow>(
            "UPDATE meetings SET \
                title = COALESCE($2, title), \
                time = COALESCE($3, time), \
                members = COALESCE($4, members), \
                location = COALESCE($5, location) \
             WHERE id = $1 \
             RETURNING id, title, time, members, location, files, created_at",
        )
        .bind(id)
        .bind(update.title)
        .bind(update.time)
        .bind(update.members)
        .bind(update.location)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Meeting::from).ok_or_else(|| meeting_not_found(id))
    }

    async fn delete(&self, id: &str) -> Result<Meeting, AppError> {
        let row = sqlx::query_as::<_, MeetingRow>(
            "DELETE FROM meetings WHERE id = $1 \
             RETURNING id, title, time, members, location, files, created_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Meeting::from).ok_or_else(|| meeting_not_found(id))
    }

    async fn list_all(&self) -> Result<Vec<Meeting>, AppError> {
        let rows = sqlx::query_as::<_, MeetingRow>(&format!("{} ORDER BY created_at DESC", SELECT_MEETING))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Meeting::from).collect())
    }

    async fn append_file(&self, id: &str, file: FileReference) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE meetings SET files = files || $2 WHERE id = $1")
            .bind(id)
            .bind(Json(vec![file]))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(meeting_not_found(id));
        }
        Ok(())
    }

    async fn remove_files(&self, id: &str, stored_name: &str) -> Result<usize, AppError> {
        let removed: Option<i32> = sqlx::query_scalar(
            "WITH target AS ( \
                SELECT id, files FROM meetings WHERE id = $1 FOR UPDATE \
             ), kept AS ( \
                SELECT COALESCE(jsonb_agg(f.value), '[]'::jsonb) AS files, \
                       (SELECT jsonb_array_length(files) FROM target) - COUNT(f.value)::int AS removed \
                FROM target, jsonb_array_elements(target.files) AS f(value) \
                WHERE f.value->>'realPath' IS DISTINCT FROM $2 \
             ) \
             UPDATE meetings SET files = kept.files \
             FROM kept \
             WHERE meetings.id = $1 \
             RETURNING kept.removed",
        )
        .bind(id)
        .bind(stored_name)
        .fetch_optional(&self.pool)
        .await?;

        match removed {
            Some(count) => Ok(count.max(0) as usize),
            None => Err(meeting_not_found(id)),
        }
    }
}
