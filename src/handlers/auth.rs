use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use log::{info, warn};
use crate::auth::{CredentialVerifier, SessionManager};
use crate::errors::AppError;

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

pub async fn login(
    req: web::Json<LoginRequest>,
    verifier: web::Data<dyn CredentialVerifier>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    if !verifier.verify(&req.password) {
        warn!("Rejected admin login attempt");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let cookie = sessions.issue()?;
    info!("Admin session started");
    Ok(HttpResponse::Ok().cookie(cookie).json(SuccessResponse::ok()))
}

pub async fn logout(sessions: web::Data<SessionManager>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(sessions.clear())
        .json(SuccessResponse::ok())
}
