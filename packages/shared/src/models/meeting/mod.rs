pub mod requests;
pub mod responses;
pub mod search;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Earth radius for spherical distances, in meters. Same as MySQL's `ST_Distance_Sphere`.
pub const EARTH_RADIUS_METERS: f64 = 6_370_986.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "meeting_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingStatus {
    Open,
    Closed,
    Cancelled,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
    pub meeting_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location_address: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub registered_count: i16,
    pub total_count: i16,
    pub budget: i32,
    pub contents: String,
    pub status: MeetingStatus,
}

impl Meeting {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.location_lat, self.location_lng)
    }

    pub fn is_full(&self) -> bool {
        self.registered_count >= self.total_count
    }
}

/// Values for a meeting row that the store has not assigned an id to yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeeting {
    pub name: String,
    pub creator_id: i64,
    pub meeting_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location_address: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub total_count: i16,
    pub budget: i32,
    pub contents: String,
    pub skill_ids: Vec<i64>,
    pub career_ids: Vec<i64>,
}

/// Mutable columns of an existing meeting.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingChanges {
    pub name: String,
    pub meeting_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location_address: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub total_count: i16,
    pub budget: i32,
    pub contents: String,
    pub skill_ids: Vec<i64>,
    pub career_ids: Vec<i64>,
}

impl MeetingChanges {
    pub fn into_new_meeting(self, creator_id: i64) -> NewMeeting {
        NewMeeting {
            name: self.name,
            creator_id,
            meeting_date: self.meeting_date,
            start_time: self.start_time,
            end_time: self.end_time,
            location_address: self.location_address,
            location_lat: self.location_lat,
            location_lng: self.location_lng,
            total_count: self.total_count,
            budget: self.budget,
            contents: self.contents,
            skill_ids: self.skill_ids,
            career_ids: self.career_ids,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Skill {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Career {
    pub id: i64,
    pub name: String,
}

/// Skill and career tags attached to one meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingTags {
    pub skills: Vec<Skill>,
    pub careers: Vec<Career>,
}

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        GeoPoint { lat, lng }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err("Latitude must be between -90 and 90".to_string());
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err("Longitude must be between -180 and 180".to_string());
        }
        Ok(())
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_METERS * a.min(1.0).sqrt().asin()
    }
}
