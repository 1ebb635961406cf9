use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            CheckUserQuery, CheckUserResponse, LoginRequest, LoginResponse, SignupRequest,
            SignupResponse, StatsResponse, VerifyResponse,
        },
        password::{hash_password, verify_password},
        repo_types::{PublicUser, User},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/verify/:email", get(verify_email))
        .route("/check-user", get(check_user))
        .route("/users", get(list_users))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/stats", get(admin_stats))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let username = payload.username.trim();
    let email = payload.email.trim();
    let password = payload.password.trim();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        warn!("signup with missing fields");
        return Err(ApiError::Validation("All fields are required".into()));
    }

    if User::find_by_username_or_email(&state.db, username, email)
        .await?
        .is_some()
    {
        warn!(username, "signup conflict");
        return Err(ApiError::Conflict(
            "User already exists with this email or username".into(),
        ));
    }

    let hash = hash_password(password)?;

    // The unique indexes close the check-then-insert race: a concurrent
    // duplicate comes back from create() as Conflict, not Internal.
    let user = User::create(&state.db, username, email, &hash).await?;

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".into(),
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = payload.username.trim();
    let password = payload.password.trim();

    if username.is_empty() || password.is_empty() {
        warn!("login with missing fields");
        return Err(ApiError::Validation(
            "Username and password are required".into(),
        ));
    }

    // Absent user and wrong password take the same exit so the response
    // does not reveal whether the username exists.
    let user = match User::find_by_username(&state.db, username).await? {
        Some(u) => u,
        None => {
            warn!(username, "login unknown username");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(username, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        username: user.username,
    }))
}

#[instrument(skip(state))]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(VerifyResponse {
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }))
}

/// Trimmed search term, or None when it is missing or blank. The trimmed
/// form is what gets queried, since signup stores trimmed values.
fn normalize_search(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[instrument(skip(state, params))]
pub async fn check_user(
    State(state): State<AppState>,
    Query(params): Query<CheckUserQuery>,
) -> Result<Json<CheckUserResponse>, ApiError> {
    let search = normalize_search(params.search.as_deref())
        .ok_or_else(|| ApiError::Validation("Search term required".into()))?;

    let response = match User::find_by_username_or_email(&state.db, search, search).await? {
        Some(user) => {
            let field = if user.email == search {
                "this email"
            } else {
                "this username"
            };
            CheckUserResponse {
                exists: true,
                message: format!("User exists with {field}"),
            }
        }
        None => CheckUserResponse {
            exists: false,
            message: "Username and email are available".into(),
        },
    };
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = PublicUser::list_all(&state.db).await?;
    info!(count = users.len(), "listed users");
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let total_users = PublicUser::count(&state.db).await?;
    let latest_users = PublicUser::list_latest(&state.db, 5).await?;
    Ok(Json(StatsResponse {
        total_users,
        latest_users,
    }))
}
