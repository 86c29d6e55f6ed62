use actix_web::{web, HttpResponse};
use serde::Serialize;
use log::{info, warn};
use crate::auth::RequireAdmin;
use crate::errors::AppError;
use crate::handlers::auth::SuccessResponse;
use crate::models::meeting::MeetingUpdate;
use crate::repository::MeetingRepository;
use crate::storage::UploadStore;

#[derive(Serialize)]
struct CreateMeetingResponse {
    success: bool,
    id: String,
}

pub async fn create_meeting(
    _admin: RequireAdmin,
    repo: web::Data<dyn MeetingRepository>,
) -> Result<HttpResponse, AppError> {
    let meeting = repo.create().await?;
    info!("Created meeting {}", meeting.id);

    Ok(HttpResponse::Ok().json(CreateMeetingResponse {
        success: true,
        id: meeting.id,
    }))
}

pub async fn get_meeting(
    repo: web::Data<dyn MeetingRepository>,
    meeting_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let meeting = repo.get(&meeting_id).await?;
    Ok(HttpResponse::Ok().json(meeting))
}

pub async fn list_meetings(
    _admin: RequireAdmin,
    repo: web::Data<dyn MeetingRepository>,
) -> Result<HttpResponse, AppError> {
    let meetings = repo.list_all().await?;
    Ok(HttpResponse::Ok().json(meetings))
}

pub async fn update_info(
    _admin: RequireAdmin,
    repo: web::Data<dyn MeetingRepository>,
    meeting_id: web::Path<String>,
    updates: web::Json<MeetingUpdate>,
) -> Result<HttpResponse, AppError> {
    repo.update(&meeting_id, updates.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

pub async fn delete_meeting(
    _admin: RequireAdmin,
    repo: web::Data<dyn MeetingRepository>,
    store: web::Data<UploadStore>,
    meeting_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let meeting = repo.delete(&meeting_id).await?;

    for file in &meeting.files {
        if let Err(err) = store.remove(&file.real_path).await {
            warn!("Could not remove upload {} of meeting {}: {}", file.real_path, meeting.id, err);
        }
    }
    info!("Deleted meeting {} ({} files)", meeting.id, meeting.files.len());

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
