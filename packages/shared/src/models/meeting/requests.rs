use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::MeetingChanges;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub meeting_name: String,
    pub meeting_date: NaiveDate,
    pub meeting_start_time: DateTime<Utc>,
    pub meeting_end_time: DateTime<Utc>,
    pub location_address: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub total_count: i16,
    pub budget: i32,
    pub contents: String,
    #[serde(default)]
    pub skill_ids: Vec<i64>,
    #[serde(default)]
    pub career_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetingRequest {
    pub meeting_name: String,
    pub meeting_date: NaiveDate,
    pub meeting_start_time: DateTime<Utc>,
    pub meeting_end_time: DateTime<Utc>,
    pub location_address: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub total_count: i16,
    pub budget: i32,
    pub contents: String,
    #[serde(default)]
    pub skill_ids: Vec<i64>,
    #[serde(default)]
    pub career_ids: Vec<i64>,
}

impl From<CreateMeetingRequest> for MeetingChanges {
    fn from(request: CreateMeetingRequest) -> Self {
        MeetingChanges {
            name: request.meeting_name,
            meeting_date: request.meeting_date,
            start_time: request.meeting_start_time,
            end_time: request.meeting_end_time,
            location_address: request.location_address,
            location_lat: request.location_lat,
            location_lng: request.location_lng,
            total_count: request.total_count,
            budget: request.budget,
            contents: request.contents,
            skill_ids: request.skill_ids,
            career_ids: request.career_ids,
        }
    }
}

impl From<UpdateMeetingRequest> for MeetingChanges {
    fn from(request: UpdateMeetingRequest) -> Self {
        MeetingChanges {
            name: request.meeting_name,
            meeting_date: request.meeting_date,
            start_time: request.meeting_start_time,
            end_time: request.meeting_end_time,
            location_address: request.location_address,
            location_lat: request.location_lat,
            location_lng: request.location_lng,
            total_count: request.total_count,
            budget: request.budget,
            contents: request.contents,
            skill_ids: request.skill_ids,
            career_ids: request.career_ids,
        }
    }
}

/// Query string of the meeting search endpoint.
///
/// `skillId` and `careerId` are comma separated id lists, e.g. `skillId=1,4`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSearchParams {
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub skill_id: Option<String>,
    pub career_id: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl MeetingSearchParams {
    pub const DEFAULT_PAGE_SIZE: i64 = 16;

    pub fn skill_ids(&self) -> Result<Vec<i64>, String> {
        parse_id_list(self.skill_id.as_deref(), "skillId")
    }

    pub fn career_ids(&self) -> Result<Vec<i64>, String> {
        parse_id_list(self.career_id.as_deref(), "careerId")
    }
}

fn parse_id_list(raw: Option<&str>, field: &str) -> Result<Vec<i64>, String> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| format!("{} must be a comma separated list of ids", field))
        })
        .collect()
}
