use std::sync::Arc;
use tracing::{debug, info};

use crate::models::meeting::requests::{
    CreateMeetingRequest, MeetingSearchParams, UpdateMeetingRequest,
};
use crate::models::meeting::responses::{MeetingDetailResponse, MeetingIdResponse};
use crate::models::meeting::search::{MeetingSearchQuery, NearbyMeeting};
use crate::models::meeting::{GeoPoint, MeetingChanges};
use crate::models::member::Member;
use crate::models::slice::Slice;
use crate::repositories::errors::member_repository_errors::MemberRepositoryError;
use crate::repositories::meeting_repository::MeetingRepository;
use crate::repositories::member_repository::MemberRepository;
use crate::services::errors::meeting_service_errors::MeetingServiceError;

pub const MAX_PAGE_SIZE: i64 = 100;

pub struct MeetingService {
    meetings: Arc<dyn MeetingRepository + Send + Sync>,
    members: Arc<dyn MemberRepository + Send + Sync>,
}

fn validate_changes(changes: &MeetingChanges) -> Result<(), MeetingServiceError> {
    if changes.name.trim().is_empty() {
        return Err(MeetingServiceError::ValidationError(
            "Meeting name cannot be empty".to_string(),
        ));
    }
    if changes.location_address.trim().is_empty() {
        return Err(MeetingServiceError::ValidationError(
            "Location address cannot be empty".to_string(),
        ));
    }
    GeoPoint::new(changes.location_lat, changes.location_lng)
        .validate()
        .map_err(MeetingServiceError::ValidationError)?;
    if changes.total_count < 1 {
        return Err(MeetingServiceError::ValidationError(
            "Total count must be at least 1".to_string(),
        ));
    }
    if changes.budget < 0 {
        return Err(MeetingServiceError::ValidationError(
            "Budget cannot be negative".to_string(),
        ));
    }
    if changes.start_time >= changes.end_time {
        return Err(MeetingServiceError::ValidationError(
            "Meeting must start before it ends".to_string(),
        ));
    }
    Ok(())
}

impl MeetingService {
    pub fn new(
        meetings: Arc<dyn MeetingRepository + Send + Sync>,
        members: Arc<dyn MemberRepository + Send + Sync>,
    ) -> Self {
        MeetingService { meetings, members }
    }

    async fn member(&self, email: &str) -> Result<Member, MeetingServiceError> {
        self.members
            .get_member_by_email(email)
            .await
            .map_err(|e| match e {
                MemberRepositoryError::NotFound => MeetingServiceError::MemberNotFound,
                _ => MeetingServiceError::RepositoryError(e.to_string()),
            })
    }

    /// Query-string entry point: parses the id lists and applies paging defaults.
    pub async fn search_meetings(
        &self,
        params: &MeetingSearchParams,
    ) -> Result<Slice<NearbyMeeting>, MeetingServiceError> {
        let skill_ids = params
            .skill_ids()
            .map_err(MeetingServiceError::ValidationError)?;
        let career_ids = params
            .career_ids()
            .map_err(MeetingServiceError::ValidationError)?;
        let center = match (params.location_lat, params.location_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        };

        self.search(
            center,
            &skill_ids,
            &career_ids,
            params.page.unwrap_or(0),
            params.size.unwrap_or(MeetingSearchParams::DEFAULT_PAGE_SIZE),
        )
        .await
    }

    /// Meetings nearest to `center` first, restricted to the given tags.
    ///
    /// An empty id list places no constraint on that tag kind.
    pub async fn search(
        &self,
        center: Option<GeoPoint>,
        skill_ids: &[i64],
        career_ids: &[i64],
        page: i64,
        page_size: i64,
    ) -> Result<Slice<NearbyMeeting>, MeetingServiceError> {
        if page < 0 {
            return Err(MeetingServiceError::ValidationError(
                "Page index cannot be negative".to_string(),
            ));
        }
        if page_size <= 0 || page_size > MAX_PAGE_SIZE {
            return Err(MeetingServiceError::ValidationError(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if page.checked_mul(page_size).is_none() {
            return Err(MeetingServiceError::ValidationError(
                "Page index is too large".to_string(),
            ));
        }
        let center = center.ok_or_else(|| {
            MeetingServiceError::ValidationError(
                "Search center latitude and longitude are required".to_string(),
            )
        })?;
        center
            .validate()
            .map_err(MeetingServiceError::ValidationError)?;

        let query = MeetingSearchQuery::new(center, skill_ids, career_ids, page, page_size);
        let rows = self.meetings.search_meetings(&query).await?;
        debug!(
            "Meeting search at ({}, {}) page {} returned {} row(s)",
            center.lat,
            center.lng,
            page,
            rows.len()
        );
        Ok(Slice::from_overfetch(rows, page, page_size))
    }

    pub async fn create_meeting(
        &self,
        request: CreateMeetingRequest,
        creator_email: &str,
    ) -> Result<MeetingIdResponse, MeetingServiceError> {
        let creator = self.member(creator_email).await?;
        let changes = MeetingChanges::from(request);
        validate_changes(&changes)?;

        let meeting = self
            .meetings
            .create_meeting(&changes.into_new_meeting(creator.id))
            .await?;

        info!("Meeting {} created by member {}", meeting.id, creator.id);
        Ok(MeetingIdResponse {
            meeting_id: meeting.id,
        })
    }

    /// Only the creator may update. Capacity cannot drop below the current head count.
    pub async fn update_meeting(
        &self,
        request: UpdateMeetingRequest,
        member_email: &str,
        meeting_id: i64,
    ) -> Result<MeetingIdResponse, MeetingServiceError> {
        let member = self.member(member_email).await?;
        let meeting = self.meetings.get_meeting_by_id(meeting_id).await?;
        if meeting.creator_id != member.id {
            return Err(MeetingServiceError::Forbidden);
        }

        let changes = MeetingChanges::from(request);
        validate_changes(&changes)?;
        if changes.total_count < meeting.registered_count {
            return Err(MeetingServiceError::ValidationError(format!(
                "Total count cannot be below the {} registered member(s)",
                meeting.registered_count
            )));
        }

        let updated = self.meetings.update_meeting(meeting_id, &changes).await?;
        info!("Meeting {} updated by member {}", updated.id, member.id);
        Ok(MeetingIdResponse {
            meeting_id: updated.id,
        })
    }

    pub async fn get_meeting_detail(
        &self,
        meeting_id: i64,
        viewer_email: &str,
    ) -> Result<MeetingDetailResponse, MeetingServiceError> {
        let viewer = self.member(viewer_email).await?;
        let meeting = self.meetings.get_meeting_by_id(meeting_id).await?;
        let creator = self
            .members
            .get_member_by_id(meeting.creator_id)
            .await
            .map_err(|e| MeetingServiceError::RepositoryError(e.to_string()))?;
        let tags = self.meetings.get_meeting_tags(meeting_id).await?;
        let is_join = self.meetings.is_member_joined(meeting_id, viewer.id).await?;

        Ok(MeetingDetailResponse::new(meeting, &creator, tags, is_join))
    }

    pub async fn enter_meeting(
        &self,
        member_email: &str,
        meeting_id: i64,
    ) -> Result<MeetingIdResponse, MeetingServiceError> {
        let member = self.member(member_email).await?;
        let meeting = self.meetings.enter_meeting(meeting_id, member.id).await?;

        info!(
            "Member {} entered meeting {} ({}/{})",
            member.id, meeting.id, meeting.registered_count, meeting.total_count
        );
        Ok(MeetingIdResponse {
            meeting_id: meeting.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::meeting::MeetingStatus;
    use crate::models::member::NewMember;
    use crate::repositories::errors::meeting_repository_errors::MeetingRepositoryError;
    use crate::repositories::meeting_repository::MockMeetingRepository;
    use crate::testing::{sample_new_meeting, InMemoryStore};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use test_case::test_case;

    const CENTER: (f64, f64) = (37.50, 127.03);

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: MeetingService,
        creator: Member,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let creator = store
            .create_member(&NewMember::new("host@b.com", "host", None))
            .await
            .unwrap();
        store
            .create_member(&NewMember::new("guest@b.com", "guest", None))
            .await
            .unwrap();
        let service = MeetingService::new(store.clone(), store.clone());
        Fixture {
            store,
            service,
            creator,
        }
    }

    fn create_request(name: &str, skill_ids: Vec<i64>) -> CreateMeetingRequest {
        let start = Utc.with_ymd_and_hms(2026, 11, 7, 10, 0, 0).unwrap();
        CreateMeetingRequest {
            meeting_name: name.to_string(),
            meeting_date: NaiveDate::from_ymd_opt(2026, 11, 7).unwrap(),
            meeting_start_time: start,
            meeting_end_time: start + Duration::hours(2),
            location_address: "Seoul Gangnam-gu".to_string(),
            location_lat: 37.4979,
            location_lng: 127.0276,
            total_count: 2,
            budget: 10_000,
            contents: "Reading group".to_string(),
            skill_ids,
            career_ids: vec![],
        }
    }

    fn update_request(total_count: i16) -> UpdateMeetingRequest {
        let create = create_request("Renamed", vec![]);
        UpdateMeetingRequest {
            meeting_name: create.meeting_name,
            meeting_date: create.meeting_date,
            meeting_start_time: create.meeting_start_time,
            meeting_end_time: create.meeting_end_time,
            location_address: create.location_address,
            location_lat: create.location_lat,
            location_lng: create.location_lng,
            total_count,
            budget: create.budget,
            contents: create.contents,
            skill_ids: vec![],
            career_ids: vec![],
        }
    }

    fn center() -> Option<GeoPoint> {
        Some(GeoPoint::new(CENTER.0, CENTER.1))
    }

    #[tokio::test]
    async fn test_twenty_meetings_paginate_sixteen_then_four() {
        let f = fixture().await;
        // Stepping east 100m per meeting keeps the distances distinct.
        for i in 0..20 {
            let lng = CENTER.1 + 0.0011 * f64::from(20 - i);
            f.store
                .create_meeting(&sample_new_meeting(f.creator.id, "m", CENTER.0, lng))
                .await
                .unwrap();
        }

        let first = f.service.search(center(), &[], &[], 0, 16).await.unwrap();
        assert_eq!(first.items.len(), 16);
        assert!(first.has_next);

        let second = f.service.search(center(), &[], &[], 1, 16).await.unwrap();
        assert_eq!(second.items.len(), 4);
        assert!(!second.has_next);

        let ids: Vec<i64> = first
            .items
            .iter()
            .chain(second.items.iter())
            .map(|hit| hit.meeting.id)
            .collect();
        assert_eq!(ids, (1..=20).rev().collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_equal_distances_are_ordered_by_id() {
        let f = fixture().await;
        for _ in 0..3 {
            f.store
                .create_meeting(&sample_new_meeting(f.creator.id, "m", 37.51, 127.03))
                .await
                .unwrap();
        }

        let slice = f.service.search(center(), &[], &[], 0, 16).await.unwrap();
        let ids: Vec<i64> = slice.items.iter().map(|hit| hit.meeting.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_skill_filter_restricts_results() {
        let f = fixture().await;
        let rust = f.store.add_skill("Rust");
        let java = f.store.add_skill("Java");
        let mut tagged = sample_new_meeting(f.creator.id, "rust", 37.6, 127.0);
        tagged.skill_ids = vec![rust, java];
        f.store.create_meeting(&tagged).await.unwrap();
        f.store
            .create_meeting(&sample_new_meeting(f.creator.id, "untagged", 37.5, 127.03))
            .await
            .unwrap();

        let filtered = f.service.search(center(), &[rust], &[], 0, 16).await.unwrap();
        assert_eq!(filtered.items.len(), 1);
        assert_eq!(filtered.items[0].meeting.name, "rust");

        let unfiltered = f.service.search(center(), &[], &[], 0, 16).await.unwrap();
        assert_eq!(unfiltered.items.len(), 2);
    }

    #[tokio::test]
    async fn test_career_filter_restricts_results() {
        let f = fixture().await;
        let junior = f.store.add_career("junior");
        let senior = f.store.add_career("senior");
        let mut juniors = sample_new_meeting(f.creator.id, "juniors", 37.6, 127.0);
        juniors.career_ids = vec![junior];
        f.store.create_meeting(&juniors).await.unwrap();
        let mut seniors = sample_new_meeting(f.creator.id, "seniors", 37.5, 127.03);
        seniors.career_ids = vec![senior];
        f.store.create_meeting(&seniors).await.unwrap();
        f.store
            .create_meeting(&sample_new_meeting(f.creator.id, "untagged", 37.5, 127.04))
            .await
            .unwrap();

        let filtered = f.service.search(center(), &[], &[junior], 0, 16).await.unwrap();
        let names: Vec<&str> = filtered.items.iter().map(|hit| hit.meeting.name.as_str()).collect();
        assert_eq!(names, vec!["juniors"]);

        let either = f
            .service
            .search(center(), &[], &[junior, senior], 0, 16)
            .await
            .unwrap();
        let names: Vec<&str> = either.items.iter().map(|hit| hit.meeting.name.as_str()).collect();
        assert_eq!(names, vec!["seniors", "juniors"]);
    }

    #[tokio::test]
    async fn test_skill_and_career_filters_are_conjoined() {
        let f = fixture().await;
        let rust = f.store.add_skill("Rust");
        let go = f.store.add_skill("Go");
        let junior = f.store.add_career("junior");
        let senior = f.store.add_career("senior");

        let mut both = sample_new_meeting(f.creator.id, "both", 37.6, 127.0);
        both.skill_ids = vec![rust, go];
        both.career_ids = vec![junior, senior];
        f.store.create_meeting(&both).await.unwrap();
        let mut skill_only = sample_new_meeting(f.creator.id, "skill only", 37.5, 127.03);
        skill_only.skill_ids = vec![rust];
        skill_only.career_ids = vec![senior];
        f.store.create_meeting(&skill_only).await.unwrap();
        let mut career_only = sample_new_meeting(f.creator.id, "career only", 37.5, 127.031);
        career_only.skill_ids = vec![go];
        career_only.career_ids = vec![junior];
        f.store.create_meeting(&career_only).await.unwrap();

        let slice = f
            .service
            .search(center(), &[rust, go], &[junior], 0, 16)
            .await
            .unwrap();

        // "both" carries two matching skills and two careers yet appears once.
        let names: Vec<&str> = slice.items.iter().map(|hit| hit.meeting.name.as_str()).collect();
        assert_eq!(names, vec!["career only", "both"]);
        assert!(!slice.has_next);
    }

    #[test_case(-1, 16 ; "negative page")]
    #[test_case(0, 0 ; "zero size")]
    #[test_case(0, -3 ; "negative size")]
    #[test_case(0, 101 ; "size above cap")]
    #[test_case(i64::MAX, 100 ; "offset overflow")]
    #[tokio::test]
    async fn test_invalid_paging_is_rejected(page: i64, size: i64) {
        let mut repository = MockMeetingRepository::new();
        repository.expect_search_meetings().never();
        let service = MeetingService::new(Arc::new(repository), Arc::new(InMemoryStore::new()));

        let result = service.search(center(), &[], &[], page, size).await;
        assert!(matches!(result, Err(MeetingServiceError::ValidationError(_))));
    }

    #[test_case(None ; "missing center")]
    #[test_case(Some(GeoPoint::new(91.0, 0.0)) ; "latitude out of range")]
    #[test_case(Some(GeoPoint::new(0.0, f64::INFINITY)) ; "infinite longitude")]
    #[tokio::test]
    async fn test_invalid_center_is_rejected(center: Option<GeoPoint>) {
        let mut repository = MockMeetingRepository::new();
        repository.expect_search_meetings().never();
        let service = MeetingService::new(Arc::new(repository), Arc::new(InMemoryStore::new()));

        let result = service.search(center, &[], &[], 0, 16).await;
        assert!(matches!(result, Err(MeetingServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_search_params_apply_defaults_and_parse_ids() {
        let mut repository = MockMeetingRepository::new();
        repository
            .expect_search_meetings()
            .withf(|query| {
                query.skill_ids == vec![1, 4]
                    && query.career_ids.is_empty()
                    && query.offset == 0
                    && query.limit == 17
            })
            .times(1)
            .returning(|_| Ok(vec![]));
        let service = MeetingService::new(Arc::new(repository), Arc::new(InMemoryStore::new()));

        let params = MeetingSearchParams {
            location_lat: Some(CENTER.0),
            location_lng: Some(CENTER.1),
            skill_id: Some("4,1".to_string()),
            career_id: None,
            page: None,
            size: None,
        };
        let slice = service.search_meetings(&params).await.unwrap();
        assert_eq!(slice.size, 16);
        assert!(!slice.has_next);
    }

    #[tokio::test]
    async fn test_search_store_failure_is_repository_error() {
        let mut repository = MockMeetingRepository::new();
        repository
            .expect_search_meetings()
            .returning(|_| Err(MeetingRepositoryError::Database("down".to_string())));
        let service = MeetingService::new(Arc::new(repository), Arc::new(InMemoryStore::new()));

        let result = service.search(center(), &[], &[], 0, 16).await;
        assert!(matches!(result, Err(MeetingServiceError::RepositoryError(_))));
    }

    #[tokio::test]
    async fn test_create_meeting_keeps_only_known_tags() {
        let f = fixture().await;
        let rust = f.store.add_skill("Rust");

        let created = f
            .service
            .create_meeting(create_request("Rust study", vec![rust, 999]), "host@b.com")
            .await
            .unwrap();

        let detail = f
            .service
            .get_meeting_detail(created.meeting_id, "host@b.com")
            .await
            .unwrap();
        assert_eq!(detail.skill_name_list, vec!["Rust".to_string()]);
        assert_eq!(detail.creator_name, "host");
        assert_eq!(detail.registered_count, 0);
        assert_eq!(detail.status, MeetingStatus::Open);
    }

    #[tokio::test]
    async fn test_create_meeting_validation() {
        let f = fixture().await;

        let mut reversed = create_request("Backwards", vec![]);
        reversed.meeting_end_time = reversed.meeting_start_time;
        let mut empty_capacity = create_request("Nobody", vec![]);
        empty_capacity.total_count = 0;
        let mut off_map = create_request("Nowhere", vec![]);
        off_map.location_lat = 120.0;

        for request in [reversed, empty_capacity, off_map, create_request(" ", vec![])] {
            let result = f.service.create_meeting(request, "host@b.com").await;
            assert!(matches!(result, Err(MeetingServiceError::ValidationError(_))));
        }
        assert_eq!(f.store.meeting_count(), 0);
    }

    #[tokio::test]
    async fn test_create_meeting_for_unknown_member() {
        let f = fixture().await;
        let result = f
            .service
            .create_meeting(create_request("Rust study", vec![]), "ghost@b.com")
            .await;
        assert!(matches!(result, Err(MeetingServiceError::MemberNotFound)));
    }

    #[tokio::test]
    async fn test_only_creator_can_update() {
        let f = fixture().await;
        let created = f
            .service
            .create_meeting(create_request("Rust study", vec![]), "host@b.com")
            .await
            .unwrap();

        let result = f
            .service
            .update_meeting(update_request(4), "guest@b.com", created.meeting_id)
            .await;
        assert!(matches!(result, Err(MeetingServiceError::Forbidden)));

        f.service
            .update_meeting(update_request(4), "host@b.com", created.meeting_id)
            .await
            .unwrap();
        let meeting = f.store.get_meeting_by_id(created.meeting_id).await.unwrap();
        assert_eq!(meeting.name, "Renamed");
        assert_eq!(meeting.total_count, 4);
    }

    #[tokio::test]
    async fn test_update_missing_meeting_is_not_found() {
        let f = fixture().await;
        let result = f
            .service
            .update_meeting(update_request(4), "host@b.com", 42)
            .await;
        assert!(matches!(result, Err(MeetingServiceError::MeetingNotFound)));
    }

    #[tokio::test]
    async fn test_update_cannot_shrink_below_registered() {
        let f = fixture().await;
        let created = f
            .service
            .create_meeting(create_request("Rust study", vec![]), "host@b.com")
            .await
            .unwrap();
        f.service
            .enter_meeting("guest@b.com", created.meeting_id)
            .await
            .unwrap();
        f.service
            .enter_meeting("host@b.com", created.meeting_id)
            .await
            .unwrap();

        let result = f
            .service
            .update_meeting(update_request(1), "host@b.com", created.meeting_id)
            .await;
        assert!(matches!(result, Err(MeetingServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_enter_meeting_flow() {
        let f = fixture().await;
        let created = f
            .service
            .create_meeting(create_request("Rust study", vec![]), "host@b.com")
            .await
            .unwrap();
        let id = created.meeting_id;

        let before = f.service.get_meeting_detail(id, "guest@b.com").await.unwrap();
        assert!(!before.is_join);

        f.service.enter_meeting("guest@b.com", id).await.unwrap();
        let after = f.service.get_meeting_detail(id, "guest@b.com").await.unwrap();
        assert!(after.is_join);
        assert_eq!(after.registered_count, 1);

        let again = f.service.enter_meeting("guest@b.com", id).await;
        assert!(matches!(again, Err(MeetingServiceError::AlreadyJoined)));
    }

    #[tokio::test]
    async fn test_enter_full_closed_and_missing_meetings() {
        let f = fixture().await;
        let third = f
            .store
            .create_member(&NewMember::new("third@b.com", "third", None))
            .await
            .unwrap();
        let id = f
            .service
            .create_meeting(create_request("Pair programming", vec![]), "host@b.com")
            .await
            .unwrap()
            .meeting_id;
        f.service.enter_meeting("host@b.com", id).await.unwrap();
        f.service.enter_meeting("guest@b.com", id).await.unwrap();

        let full = f.service.enter_meeting(&third.email, id).await;
        assert!(matches!(full, Err(MeetingServiceError::CapacityExceeded)));

        let closed_id = f
            .service
            .create_meeting(create_request("Closed", vec![]), "host@b.com")
            .await
            .unwrap()
            .meeting_id;
        f.store.set_meeting_status(closed_id, MeetingStatus::Closed);
        let closed = f.service.enter_meeting(&third.email, closed_id).await;
        assert!(matches!(closed, Err(MeetingServiceError::NotOpen)));

        let missing = f.service.enter_meeting(&third.email, 999).await;
        assert!(matches!(missing, Err(MeetingServiceError::MeetingNotFound)));
    }

    #[derive(Debug, Clone)]
    struct Seed {
        lat: f64,
        lng: f64,
        skills: Vec<i64>,
        careers: Vec<i64>,
    }

    impl Seed {
        fn matches(&self, skill_filter: &[i64], career_filter: &[i64]) -> bool {
            (skill_filter.is_empty() || self.skills.iter().any(|s| skill_filter.contains(s)))
                && (career_filter.is_empty()
                    || self.careers.iter().any(|c| career_filter.contains(c)))
        }
    }

    fn seeded_search(
        seeds: &[Seed],
        skill_filter: &[i64],
        career_filter: &[i64],
        page: i64,
        size: i64,
    ) -> Slice<NearbyMeeting> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let f = fixture().await;
            for name in ["a", "b", "c", "d"] {
                f.store.add_skill(name);
            }
            for name in ["junior", "senior", "lead"] {
                f.store.add_career(name);
            }
            for seed in seeds {
                let mut meeting = sample_new_meeting(f.creator.id, "m", seed.lat, seed.lng);
                meeting.skill_ids = seed.skills.clone();
                meeting.career_ids = seed.careers.clone();
                f.store.create_meeting(&meeting).await.unwrap();
            }
            f.service
                .search(center(), skill_filter, career_filter, page, size)
                .await
                .unwrap()
        })
    }

    fn seed_strategy() -> impl Strategy<Value = Seed> {
        (
            37.0f64..38.0,
            126.5f64..127.5,
            proptest::collection::vec(1i64..=4, 0..3),
            proptest::collection::vec(1i64..=3, 0..3),
        )
            .prop_map(|(lat, lng, skills, careers)| Seed {
                lat,
                lng,
                skills,
                careers,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_search_results_are_ordered_filtered_and_sliced(
            seeds in proptest::collection::vec(seed_strategy(), 0..30),
            skill_filter in proptest::collection::vec(1i64..=4, 0..2),
            career_filter in proptest::collection::vec(1i64..=3, 0..2),
            page in 0i64..4,
            size in 1i64..8,
        ) {
            let slice = seeded_search(&seeds, &skill_filter, &career_filter, page, size);

            let matching = seeds
                .iter()
                .filter(|seed| seed.matches(&skill_filter, &career_filter))
                .count() as i64;
            prop_assert_eq!(slice.has_next, matching >= (page + 1) * size + 1);
            prop_assert!(slice.items.len() as i64 <= size);

            let ids: HashSet<i64> = slice.items.iter().map(|hit| hit.meeting.id).collect();
            prop_assert_eq!(ids.len(), slice.items.len());

            for pair in slice.items.windows(2) {
                prop_assert!(pair[0].distance_meters <= pair[1].distance_meters);
            }
            for hit in &slice.items {
                let seed = &seeds[(hit.meeting.id - 1) as usize];
                prop_assert!(seed.matches(&skill_filter, &career_filter));
            }
        }
    }
}
