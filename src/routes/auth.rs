use crate::{
    auth::{
        hash_password, verify_password, AuthResponse, LoginRequest, RefreshRequest,
        RefreshResponse, RegisterRequest, TokenService, REFRESH_COOKIE,
    },
    error::AppError,
    models::{Role, UserRecord},
};
use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Builds the http-only, secure cookie carrying the refresh token.
fn refresh_cookie(token: &str, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token.to_owned())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .finish()
}

/// Maps the unique-constraint violation on `users.email` to the same 400 the
/// pre-insert check produces. The check-then-insert is racy; a concurrent
/// duplicate registration loses at the constraint instead.
fn duplicate_email_error(error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::BadRequest("Email already registered".into())
        }
        _ => error.into(),
    }
}

/// Register a new user
///
/// Creates a new user account with the default `user` role and returns an
/// access/refresh token pair. The refresh token is also set as an http-only
/// cookie.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    // Check if email already exists
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&register_data.email)
        .fetch_optional(&**pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    // Hash password
    let password_hash = hash_password(&register_data.password)?;

    // Insert new user
    let user: UserRecord = sqlx::query_as(
        "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, name, email, password_hash, role, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&register_data.name)
    .bind(&register_data.email)
    .bind(&password_hash)
    .bind(Role::User)
    .fetch_one(&**pool)
    .await
    .map_err(duplicate_email_error)?;

    let access_token = tokens.issue_access_token(user.id, user.role)?;
    let issued_refresh_token = tokens.issue_refresh_token(user.id, user.role)?;
    let cookie = refresh_cookie(&issued_refresh_token, tokens.refresh_ttl());

    Ok(HttpResponse::Created().cookie(cookie).json(AuthResponse {
        message: "User registered successfully".into(),
        access_token,
        refresh_token: issued_refresh_token,
        user: user.into(),
    }))
}

/// Login user
///
/// Authenticates a user and returns an access/refresh token pair. A missing
/// account and a wrong password produce the same response, so the API does
/// not reveal which field was wrong.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    // Get user from database
    let user: Option<UserRecord> = sqlx::query_as(
        "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = $1",
    )
    .bind(&login_data.email)
    .fetch_optional(&**pool)
    .await?;

    let user = match user {
        Some(user) if verify_password(&login_data.password, &user.password_hash) => user,
        _ => return Err(AppError::BadRequest("Invalid Credentials".into())),
    };

    let access_token = tokens.issue_access_token(user.id, user.role)?;
    let issued_refresh_token = tokens.issue_refresh_token(user.id, user.role)?;
    let cookie = refresh_cookie(&issued_refresh_token, tokens.refresh_ttl());

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        message: "Login successful".into(),
        access_token,
        refresh_token: issued_refresh_token,
        user: user.into(),
    }))
}

/// Exchange a refresh token for a new access token
///
/// The refresh token is read from the `refresh_token` cookie, falling back
/// to the request body; the cookie wins when both are present. The refresh
/// token itself is not rotated or invalidated, so it remains reusable until
/// its own expiry (there is no server-side revocation store).
#[post("/refresh-token")]
pub async fn refresh_token(
    tokens: web::Data<TokenService>,
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
) -> Result<impl Responder, AppError> {
    let from_cookie = req.cookie(REFRESH_COOKIE).map(|c| c.value().to_string());
    let presented = from_cookie.or_else(|| body.and_then(|b| b.into_inner().refresh_token));

    let token = presented.ok_or_else(|| AppError::Forbidden("Refresh token required".into()))?;

    let claims = tokens
        .verify_refresh_token(&token)
        .map_err(|_| AppError::Forbidden("Invalid refresh token".into()))?;

    // The role travels inside the refresh token's claims, so no store lookup
    // is needed here.
    let access_token = tokens.issue_access_token(claims.sub, claims.role)?;

    Ok(HttpResponse::Ok().json(RefreshResponse { access_token }))
}
