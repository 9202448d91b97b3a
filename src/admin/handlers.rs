use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::lifecycle::StatusReport;
use crate::refresh::RefreshResponse;

/// Optional body of a refresh command.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserGroups {
    pub user: String,
    pub groups: Vec<String>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<StatusReport> {
    Json(state.service.status())
}

pub async fn list_identifiers(State(state): State<AdminState>) -> Json<Vec<String>> {
    Json(state.service.registry().identifiers())
}

pub async fn post_refresh(
    State(state): State<AdminState>,
    Path(identifier): Path<String>,
    body: Bytes,
) -> (StatusCode, Json<RefreshResponse>) {
    let request: RefreshRequest = if body.is_empty() {
        RefreshRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(RefreshResponse::failure(format!("Invalid request body: {}", e))),
                )
            }
        }
    };

    let registry = state.service.registry().clone();

    // Reloads do file I/O and may queue behind a running one.
    let response = tokio::task::spawn_blocking(move || registry.dispatch(&identifier, &request.args))
        .await
        .unwrap_or_else(|e| RefreshResponse::failure(format!("Refresh task failed: {}", e)));

    let status = if response.is_success() {
        StatusCode::OK
    } else if response.is_unknown_identifier() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response))
}

pub async fn get_groups(
    State(state): State<AdminState>,
    Path(user): Path<String>,
) -> Json<UserGroups> {
    let mut groups: Vec<String> = state.service.groups().get_groups(&user).into_iter().collect();
    groups.sort();
    Json(UserGroups { user, groups })
}
