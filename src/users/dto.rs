use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::PublicUser;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful signup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user_id: Uuid,
}

/// Response returned after a successful login. No token is issued.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub username: String,
}

/// Query string for the existence check.
#[derive(Debug, Deserialize)]
pub struct CheckUserQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckUserResponse {
    pub exists: bool,
    pub message: String,
}

/// Safe user data returned by the verify lookup, hash excluded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Diagnostics summary for the admin stats endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: i64,
    pub latest_users: Vec<PublicUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_response_uses_camel_case_user_id() {
        let response = SignupResponse {
            message: "User created successfully".into(),
            user_id: Uuid::new_v4(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(!json.contains("user_id"));
    }

    #[test]
    fn verify_response_serializes_rfc3339_created_at() {
        let response = VerifyResponse {
            username: "alice".into(),
            email: "a@x.com".into(),
            created_at: time::macros::datetime!(2026-01-02 03:04:05 UTC),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"createdAt\":\"2026-01-02T03:04:05Z\""));
    }

    #[test]
    fn stats_response_uses_camel_case_fields() {
        let response = StatsResponse {
            total_users: 0,
            latest_users: vec![],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"totalUsers\":0"));
        assert!(json.contains("\"latestUsers\":[]"));
    }
}
