use crate::core::{AppError, AppState};
use crate::entities::{User, UserRole};
use axum::extract::State;
use axum::{Error, body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// struct che codifica il contenuto del token jwt
// il token viene emesso dal servizio di autenticazione esterno
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i32,
    pub username: String,
    pub role: UserRole,
}

#[instrument(skip(secret), fields(username = %username, id = %id))]
pub fn encode_jwt(
    username: String,
    id: i32,
    role: UserRole,
    secret: &str,
) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(24);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        username,
        id,
        role,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| {
        debug!("JWT token decoded successfully for user: {}", data.claims.username);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Verifica il bearer token e inserisce lo `User` corrente nelle Extension.
/// L'identità arriva tutta dal token: nessuna lettura su database.
#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Empty header is not allowed")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden(
                "Please add the JWT token to the header",
            ));
        }
    };

    let mut header = auth_header.split_whitespace();
    let token = match (header.next(), header.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            warn!("Malformed authorization header");
            return Err(AppError::unauthorized("Expected a Bearer token"));
        }
    };

    let token_data = decode_jwt(token, &state.jwt_secret).map_err(|_| {
        AppError::unauthorized("Unable to decode token")
    })?;

    let current_user = User {
        user_id: token_data.claims.id,
        username: token_data.claims.username,
        role: token_data.claims.role,
    };
    info!("User authenticated: {}", current_user.username);

    req.extensions_mut().insert(current_user);
    // voledo si può recuperare lo user da extension
    Ok(next.run(req).await)
}

/// Middleware per le rotte /admin: va montato dopo authentication_middleware
#[instrument(skip(req, next))]
pub async fn admin_middleware(req: Request, next: Next) -> Result<Response<Body>, AppError> {
    let current_user = req.extensions().get::<User>().ok_or_else(|| {
        warn!("User not found in request extensions");
        AppError::unauthorized("User not authenticated")
    })?;
    require_admin(current_user)?;
    Ok(next.run(req).await)
}

/// Helper function per verificare che l'utente abbia il ruolo admin
///
/// # Returns
/// * `Ok(())` se il ruolo è permesso
/// * `Err(AppError)` se l'utente non è admin
pub fn require_admin(user: &User) -> Result<(), AppError> {
    if !user.is_admin() {
        warn!(
            "User {} has insufficient role {:?}, admin required",
            user.user_id, user.role
        );
        return Err(AppError::forbidden("Insufficient role")
            .with_details("This action requires the admin role"));
    }
    debug!("Role check passed for user {}", user.user_id);
    Ok(())
}
