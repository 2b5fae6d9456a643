use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// The authenticated requester, resolved once per request. Interview
/// endpoints dispatch on this instead of re-running role middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthParty {
    Candidate(Uuid),
    Recruiter(Uuid),
}

impl AuthParty {
    pub fn id(&self) -> Uuid {
        match self {
            AuthParty::Candidate(id) | AuthParty::Recruiter(id) => *id,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            AuthParty::Candidate(_) => "candidate",
            AuthParty::Recruiter(_) => "recruiter",
        }
    }

    pub fn require_candidate(&self) -> Result<Uuid> {
        match self {
            AuthParty::Candidate(id) => Ok(*id),
            AuthParty::Recruiter(_) => Err(Error::Forbidden(
                "This endpoint is only available to candidates".to_string(),
            )),
        }
    }

    pub fn require_recruiter(&self) -> Result<Uuid> {
        match self {
            AuthParty::Recruiter(id) => Ok(*id),
            AuthParty::Candidate(_) => Err(Error::Forbidden(
                "This endpoint is only available to recruiters".to_string(),
            )),
        }
    }
}

/// Maps validated claims onto a tagged party. `sub` carries the account id,
/// `role` must be `candidate` or `recruiter`.
pub fn resolve_party(claims: &Claims) -> Option<AuthParty> {
    let id = claims.sub.parse::<Uuid>().ok()?;
    match claims.role.as_deref() {
        Some(role) if role.eq_ignore_ascii_case("candidate") => Some(AuthParty::Candidate(id)),
        Some(role) if role.eq_ignore_ascii_case("recruiter") => Some(AuthParty::Recruiter(id)),
        _ => None,
    }
}

pub async fn authenticate(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "unsupported_scheme"})),
        )
            .into_response();
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => match resolve_party(&data.claims) {
            Some(party) => {
                req.extensions_mut().insert(party);
                next.run(req).await
            }
            None => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"success": false, "message": "unknown_role"})),
            )
                .into_response(),
        },
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "invalid_token"})),
        )
            .into_response(),
    }
}
