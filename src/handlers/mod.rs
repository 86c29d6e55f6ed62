use actix_files::Files;
use actix_web::web;
use std::path::Path;
use crate::errors::AppError;

pub mod auth;
pub mod file;
pub mod meeting;
pub mod pages;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::get().to(auth::logout))
            .route("/create-meeting", web::post().to(meeting::create_meeting))
            .route("/data/{id}", web::get().to(meeting::get_meeting))
            .route("/meetings", web::get().to(meeting::list_meetings))
            .route("/update-info/{id}", web::post().to(meeting::update_info))
            .route("/meeting/{id}", web::delete().to(meeting::delete_meeting))
            .route("/upload/{id}", web::post().to(file::upload_file))
            .route("/delete-file/{id}", web::post().to(file::delete_file)),
    )
    .route("/view-pdf/{filename}", web::get().to(file::view_pdf))
    .route("/meeting/{id}", web::get().to(pages::meeting_page))
    .route("/admin.html", web::get().to(pages::admin_page));
}

/// Public front-end files. Session-gated pages are only reachable through their routes.
pub fn static_files(public_dir: &str) -> Files {
    Files::new("/", public_dir)
        .index_file("index.html")
        .path_filter(|path, _| !is_gated_page(path))
}

fn is_gated_page(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.eq_ignore_ascii_case(pages::ADMIN_PAGE))
        .unwrap_or(false)
}
