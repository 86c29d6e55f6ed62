use actix_files::NamedFile;
use actix_multipart::{Field, Multipart};
use actix_web::http::header::{self, ContentDisposition, DispositionType, HeaderValue};
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::TryStreamExt as _;
use log::{info, warn};
use crate::auth::RequireAdmin;
use crate::config::Config;
use crate::errors::AppError;
use crate::handlers::auth::SuccessResponse;
use crate::models::meeting::FileReference;
use crate::repository::MeetingRepository;
use crate::storage::{StoredBlob, UploadStore};
use crate::utils::validation::{validate_payload, DeleteFileRequest};

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;
const FALLBACK_UPLOAD_NAME: &str = "upload.pdf";

struct UploadForm {
    blob: Option<StoredBlob>,
    original_name: Option<String>,
    display_name: Option<String>,
    category: Option<String>,
}

pub async fn upload_file(
    _admin: RequireAdmin,
    cfg: web::Data<Config>,
    repo: web::Data<dyn MeetingRepository>,
    store: web::Data<UploadStore>,
    meeting_id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    // Unknown meetings are rejected before the body is read.
    repo.get(&meeting_id).await?;

    let mut form = UploadForm {
        blob: None,
        original_name: None,
        display_name: None,
        category: None,
    };
    if let Err(err) = read_upload_form(payload, &store, cfg.max_upload_bytes, &mut form).await {
        discard(&store, form.blob.as_ref()).await;
        return Err(err);
    }

    let blob = form
        .blob
        .ok_or_else(|| AppError::BadRequest("No file part".to_string()))?;

    let name = form
        .display_name
        .filter(|n| !n.trim().is_empty())
        .or(form.original_name)
        .unwrap_or_else(|| FALLBACK_UPLOAD_NAME.to_string());
    let file = FileReference::new(name, form.category.unwrap_or_default(), blob.stored_name.clone());

    if let Err(err) = repo.append_file(&meeting_id, file).await {
        discard(&store, Some(&blob)).await;
        return Err(err);
    }
    info!("Attached {} ({} bytes) to meeting {}", blob.stored_name, blob.size, meeting_id.as_str());

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

async fn read_upload_form(
    mut payload: Multipart,
    store: &UploadStore,
    max_bytes: usize,
    form: &mut UploadForm,
) -> Result<(), AppError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|err| AppError::BadRequest(format!("Invalid multipart: {}", err)))?
    {
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        match field_name.as_str() {
            "file" if form.blob.is_none() => {
                form.original_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(|s| s.to_string());
                form.blob = Some(store.store(&mut field, max_bytes).await?);
            }
            "displayName" => form.display_name = Some(read_text(&mut field).await?),
            "category" => form.category = Some(read_text(&mut field).await?),
            _ => drain(&mut field).await?,
        }
    }
    Ok(())
}

async fn read_text(field: &mut Field) -> Result<String, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|err| AppError::BadRequest(format!("Invalid multipart: {}", err)))?
    {
        data.extend_from_slice(&chunk);
        if data.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::BadRequest("Form field too large".to_string()));
        }
    }
    Ok(String::from_utf8_lossy(&data).into_owned())
}

async fn drain(field: &mut Field) -> Result<(), AppError> {
    while field
        .try_next()
        .await
        .map_err(|err| AppError::BadRequest(format!("Invalid multipart: {}", err)))?
        .is_some()
    {}
    Ok(())
}

async fn discard(store: &UploadStore, blob: Option<&StoredBlob>) {
    if let Some(blob) = blob {
        if let Err(err) = store.remove(&blob.stored_name).await {
            warn!("Could not discard upload {}: {}", blob.stored_name, err);
        }
    }
}

pub async fn delete_file(
    _admin: RequireAdmin,
    repo: web::Data<dyn MeetingRepository>,
    store: web::Data<UploadStore>,
    meeting_id: web::Path<String>,
    body: web::Json<DeleteFileRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&body.0)?;

    let removed = repo.remove_files(&meeting_id, &body.file_name).await?;
    if let Err(err) = store.remove(&body.file_name).await {
        warn!("Could not remove upload {}: {}", body.file_name, err);
    }
    info!("Removed {} reference(s) to {} from meeting {}", removed, body.file_name, meeting_id.as_str());

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

pub async fn view_pdf(
    req: HttpRequest,
    store: web::Data<UploadStore>,
    filename: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let not_found = || {
        HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body("Document not found!")
    };

    let Some(path) = store.path_for(&filename) else {
        return Ok(not_found());
    };
    let named = match NamedFile::open_async(&path).await {
        Ok(named) => named,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(not_found()),
        Err(err) => return Err(err.into()),
    };

    let mut resp = named
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![],
        })
        .into_response(&req);
    resp.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    Ok(resp)
}
