use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::dto::{JwtResponse, LoginRequest};
use crate::auth::middleware::CurrentUser;
use crate::auth::password::{verify_password, DUMMY_HASH};
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/hello", get(hello))
}

/// Checks the submitted credentials against the store and mints a token on
/// success. Unknown email and wrong password share one generic 401 message.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<JwtResponse>, ApiError> {
    let Json(payload) = payload?;

    let user = match state.users.find_by_email(&payload.username).await? {
        Some(user) => user,
        None => {
            // Burn a verification against a throwaway hash so an unknown
            // email takes as long as a wrong password.
            let _ = verify_password(&payload.password, DUMMY_HASH);
            warn!(email = %payload.username, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %user.email, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = state.jwt.issue(&user.email)?;
    info!(email = %user.email, "user logged in");
    Ok(Json(JwtResponse { access_token }))
}

/// Protected probe endpoint; greets the authenticated principal. The policy
/// middleware guarantees the extension is present here.
pub async fn hello(Extension(user): Extension<CurrentUser>) -> String {
    format!("Hello, {}! This is a protected endpoint.", user.email)
}
