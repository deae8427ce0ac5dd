use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Meeting, MeetingStatus, MeetingTags};
use crate::models::member::Member;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingIdResponse {
    pub meeting_id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDetailResponse {
    pub meeting_id: i64,
    pub meeting_name: String,
    pub creator_name: String,
    pub creator_email: String,
    pub skill_name_list: Vec<String>,
    pub career_name_list: Vec<String>,
    pub meeting_date: NaiveDate,
    pub meeting_start_time: DateTime<Utc>,
    pub meeting_end_time: DateTime<Utc>,
    pub location_address: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub registered_count: i16,
    pub total_count: i16,
    pub budget: i32,
    pub contents: String,
    pub status: MeetingStatus,
    pub is_join: bool,
}

impl MeetingDetailResponse {
    pub fn new(meeting: Meeting, creator: &Member, tags: MeetingTags, is_join: bool) -> Self {
        MeetingDetailResponse {
            meeting_id: meeting.id,
            meeting_name: meeting.name,
            creator_name: creator.username.clone(),
            creator_email: creator.email.clone(),
            skill_name_list: tags.skills.into_iter().map(|skill| skill.name).collect(),
            career_name_list: tags.careers.into_iter().map(|career| career.name).collect(),
            meeting_date: meeting.meeting_date,
            meeting_start_time: meeting.start_time,
            meeting_end_time: meeting.end_time,
            location_address: meeting.location_address,
            location_lat: meeting.location_lat,
            location_lng: meeting.location_lng,
            registered_count: meeting.registered_count,
            total_count: meeting.total_count,
            budget: meeting.budget,
            contents: meeting.contents,
            status: meeting.status,
            is_join,
        }
    }
}
