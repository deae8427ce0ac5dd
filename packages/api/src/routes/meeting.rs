use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, error};

use crate::{error::ApiError, middleware::auth::AuthenticatedMember, state::AppState};
use shared::models::meeting::requests::{
    CreateMeetingRequest, MeetingSearchParams, UpdateMeetingRequest,
};
use shared::models::meeting::responses::{MeetingDetailResponse, MeetingIdResponse};
use shared::models::meeting::search::NearbyMeeting;
use shared::models::slice::Slice;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/meetings", get(search_meetings).post(create_meeting))
        .route(
            "/api/meetings/{meeting_id}",
            get(get_meeting_detail).put(update_meeting),
        )
        .route("/api/meetings/{meeting_id}/enter", post(enter_meeting))
}

async fn search_meetings(
    State(state): State<AppState>,
    Query(params): Query<MeetingSearchParams>,
) -> Result<Json<Slice<NearbyMeeting>>, ApiError> {
    let slice = state
        .meeting_service
        .search_meetings(&params)
        .await
        .map_err(|e| {
            error!("Meeting search failed for {:?}: {}", params, e);
            ApiError::from(e)
        })?;
    debug!(
        "Meeting search returned {} item(s), has_next = {}",
        slice.items.len(),
        slice.has_next
    );
    Ok(Json(slice))
}

async fn create_meeting(
    State(state): State<AppState>,
    member: AuthenticatedMember,
    Json(request): Json<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<MeetingIdResponse>), ApiError> {
    let created = state
        .meeting_service
        .create_meeting(request, &member.email)
        .await
        .map_err(|e| {
            error!("Failed to create meeting for {}: {}", member.email, e);
            ApiError::from(e)
        })?;
    debug!("Meeting created: {}", created.meeting_id);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_meeting_detail(
    State(state): State<AppState>,
    member: AuthenticatedMember,
    Path(meeting_id): Path<i64>,
) -> Result<Json<MeetingDetailResponse>, ApiError> {
    state
        .meeting_service
        .get_meeting_detail(meeting_id, &member.email)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to load meeting {}: {}", meeting_id, e);
            ApiError::from(e)
        })
}

async fn update_meeting(
    State(state): State<AppState>,
    member: AuthenticatedMember,
    Path(meeting_id): Path<i64>,
    Json(request): Json<UpdateMeetingRequest>,
) -> Result<Json<MeetingIdResponse>, ApiError> {
    state
        .meeting_service
        .update_meeting(request, &member.email, meeting_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!(
                "Failed to update meeting {} for {}: {}",
                meeting_id, member.email, e
            );
            ApiError::from(e)
        })
}

async fn enter_meeting(
    State(state): State<AppState>,
    member: AuthenticatedMember,
    Path(meeting_id): Path<i64>,
) -> Result<Json<MeetingIdResponse>, ApiError> {
    state
        .meeting_service
        .enter_meeting(&member.email, meeting_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!(
                "Failed to enter meeting {} for {}: {}",
                meeting_id, member.email, e
            );
            ApiError::from(e)
        })
}
