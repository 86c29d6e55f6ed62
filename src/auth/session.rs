use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use log::debug;
use crate::errors::AppError;
use crate::utils::jwt;

pub const SESSION_COOKIE: &str = "meeting_admin";

/// Issues and reads the admin session cookie. The cookie carries a signed token
/// with a fixed expiry; nothing is kept server-side.
pub struct SessionManager {
    secret: Vec<u8>,
    ttl_secs: i64,
    secure: bool,
}

impl SessionManager {
    pub fn new(secret: &str, ttl_secs: i64, secure: bool) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl_secs,
            secure,
        }
    }

    pub fn issue(&self) -> Result<Cookie<'static>, AppError> {
        let token = jwt::generate_token(&self.secret, self.ttl_secs)?;

        Ok(Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(CookieDuration::seconds(self.ttl_secs))
            .finish())
    }

    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .finish();
        cookie.make_removal();
        cookie
    }

    pub fn lookup(&self, req: &HttpRequest) -> AdminSession {
        let is_admin = req
            .cookie(SESSION_COOKIE)
            .map(|cookie| match jwt::validate_token(cookie.value(), &self.secret) {
                Ok(claims) => claims.sub == jwt::ADMIN_SUBJECT,
                Err(err) => {
                    debug!("Rejected session cookie: {}", err);
                    false
                }
            })
            .unwrap_or(false);

        AdminSession { is_admin }
    }
}

/// Per-request view of the caller's privileges.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession {
    pub is_admin: bool,
}

impl FromRequest for AdminSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<SessionManager>>() {
            Some(sessions) => Ok(sessions.lookup(req)),
            None => Err(AppError::InternalServerError("Session manager not configured".to_string())),
        };
        ready(result)
    }
}

/// Extractor for handlers that only admins may reach.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequest for RequireAdmin {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let result = match AdminSession::from_request(req, payload).into_inner() {
            Ok(session) if session.is_admin => Ok(RequireAdmin),
            Ok(_) => Err(AppError::Forbidden("Unauthorized".to_string())),
            Err(err) => Err(err),
        };
        ready(result)
    }
}
