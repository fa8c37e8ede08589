//! Profile API Handler

use axum::{
    Json,
    extract::{Path, State},
};
use lookout_core::domain::profile::Profile;

use super::AppState;
use super::error::ApiResult;

/// GET /scrape/{username}
/// Resolve a username to its public profile
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Profile>> {
    tracing::debug!("Profile lookup for {:?}", username);

    let profile = state.profiles.resolve(&username).await?;

    Ok(Json(profile))
}
