use crate::{
    auth::{hash_password, AuthenticatedUser},
    error::AppError,
    models::{UpdateProfileRequest, UpdateRoleRequest, User, UserRecord},
};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Updates a user's role. Admin only.
///
/// The role value is validated at deserialization: an unrecognized role never
/// reaches this handler.
pub async fn update_role(
    pool: web::Data<PgPool>,
    request: web::Json<UpdateRoleRequest>,
) -> Result<impl Responder, AppError> {
    let updated: Option<User> = sqlx::query_as(
        "UPDATE users SET role = $1 WHERE id = $2 RETURNING id, name, email, role",
    )
    .bind(request.new_role)
    .bind(request.user_id)
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(user) => Ok(HttpResponse::Ok().json(json!({
            "message": "User role updated successfully",
            "user": user
        }))),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Lists all users, password hashes excluded. Admin only.
pub async fn list_users(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let users: Vec<User> =
        sqlx::query_as("SELECT id, name, email, role FROM users ORDER BY created_at DESC")
            .fetch_all(&**pool)
            .await?;

    Ok(HttpResponse::Ok().json(users))
}

/// Retrieves a user by ID. Admin only.
pub async fn get_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user: Option<User> =
        sqlx::query_as("SELECT id, name, email, role FROM users WHERE id = $1")
            .bind(user_id.into_inner())
            .fetch_optional(&**pool)
            .await?;

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Deletes a user by ID. Admin only.
pub async fn delete_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id.into_inner())
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}

/// Updates the authenticated user's own profile. Any role.
///
/// Only the provided fields are applied; a new password is re-hashed before
/// storage.
pub async fn update_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    request: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    request.validate()?;

    let existing: Option<UserRecord> = sqlx::query_as(
        "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = $1",
    )
    .bind(user.0.id)
    .fetch_optional(&**pool)
    .await?;

    let existing = existing.ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let update = request.into_inner();

    let password_hash = match &update.password {
        Some(password) => hash_password(password)?,
        None => existing.password_hash,
    };

    let updated: User = sqlx::query_as(
        "UPDATE users SET name = $1, email = $2, password_hash = $3 WHERE id = $4 \
         RETURNING id, name, email, role",
    )
    .bind(update.name.unwrap_or(existing.name))
    .bind(update.email.unwrap_or(existing.email))
    .bind(&password_hash)
    .bind(existing.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(updated))
}
