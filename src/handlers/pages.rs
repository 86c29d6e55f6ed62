use actix_files::NamedFile;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use std::path::Path;
use crate::auth::AdminSession;
use crate::config::Config;
use crate::errors::AppError;

pub const ADMIN_PAGE: &str = "admin.html";

async fn serve_page(req: &HttpRequest, public_dir: &str, page: &str) -> Result<HttpResponse, AppError> {
    let path = Path::new(public_dir).join(page);
    match NamedFile::open_async(&path).await {
        Ok(file) => Ok(file.into_response(req)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound(format!("{} not found", page)))
        }
        Err(err) => Err(err.into()),
    }
}

/// Share links (`/meeting/<code>`) all land on the viewer page, which reads the code itself.
pub async fn meeting_page(
    req: HttpRequest,
    cfg: web::Data<Config>,
    _meeting_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    serve_page(&req, &cfg.public_dir, "index.html").await
}

pub async fn admin_page(
    req: HttpRequest,
    cfg: web::Data<Config>,
    session: AdminSession,
) -> Result<HttpResponse, AppError> {
    if !session.is_admin {
        return Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, "/login.html"))
            .finish());
    }
    serve_page(&req, &cfg.public_dir, ADMIN_PAGE).await
}
