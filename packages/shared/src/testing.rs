//! In-memory stand-ins for the Postgres repositories, the Redis cache and the
//! system clock. Used by unit tests here and by the api crate's router tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::auth::clock::Clock;
use crate::models::meeting::search::{MeetingSearchQuery, NearbyMeeting};
use crate::models::meeting::{
    Career, Meeting, MeetingChanges, MeetingStatus, MeetingTags, NewMeeting, Skill,
};
use crate::models::member::{Member, NewMember};
use crate::repositories::errors::meeting_repository_errors::MeetingRepositoryError;
use crate::repositories::errors::member_repository_errors::MemberRepositoryError;
use crate::repositories::errors::session_cache_errors::SessionCacheError;
use crate::repositories::meeting_repository::MeetingRepository;
use crate::repositories::member_repository::MemberRepository;
use crate::repositories::session_cache::SessionCache;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock that only moves when told to.
pub struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    /// 2026-11-01T09:00:00Z
    pub fn fixed() -> Self {
        let now = Utc
            .with_ymd_and_hms(2026, 11, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        TestClock {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

#[derive(Default)]
struct StoreState {
    members: Vec<Member>,
    meetings: Vec<Meeting>,
    skills: Vec<Skill>,
    careers: Vec<Career>,
    meeting_skills: HashMap<i64, Vec<i64>>,
    meeting_careers: HashMap<i64, Vec<i64>>,
    meeting_members: HashSet<(i64, i64)>,
}

impl StoreState {
    fn existing_skills(&self, ids: &[i64]) -> Vec<i64> {
        let mut kept: Vec<i64> = ids
            .iter()
            .copied()
            .filter(|id| self.skills.iter().any(|s| s.id == *id))
            .collect();
        kept.sort_unstable();
        kept.dedup();
        kept
    }

    fn existing_careers(&self, ids: &[i64]) -> Vec<i64> {
        let mut kept: Vec<i64> = ids
            .iter()
            .copied()
            .filter(|id| self.careers.iter().any(|c| c.id == *id))
            .collect();
        kept.sort_unstable();
        kept.dedup();
        kept
    }
}

/// Members, meetings and tags in one arena, keyed by sequential ids.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_skill(&self, name: &str) -> i64 {
        let mut state = lock(&self.state);
        let id = state.skills.len() as i64 + 1;
        state.skills.push(Skill {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn add_career(&self, name: &str) -> i64 {
        let mut state = lock(&self.state);
        let id = state.careers.len() as i64 + 1;
        state.careers.push(Career {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn set_meeting_status(&self, meeting_id: i64, status: MeetingStatus) {
        let mut state = lock(&self.state);
        if let Some(meeting) = state.meetings.iter_mut().find(|m| m.id == meeting_id) {
            meeting.status = status;
        }
    }

    pub fn meeting_count(&self) -> usize {
        lock(&self.state).meetings.len()
    }
}

/// A valid two-hour meeting at `(lat, lng)` with room for four.
pub fn sample_new_meeting(creator_id: i64, name: &str, lat: f64, lng: f64) -> NewMeeting {
    let start = Utc
        .with_ymd_and_hms(2026, 11, 7, 10, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    NewMeeting {
        name: name.to_string(),
        creator_id,
        meeting_date: NaiveDate::from_ymd_opt(2026, 11, 7).unwrap_or_default(),
        start_time: start,
        end_time: start + Duration::hours(2),
        location_address: "Seoul".to_string(),
        location_lat: lat,
        location_lng: lng,
        total_count: 4,
        budget: 0,
        contents: String::new(),
        skill_ids: Vec::new(),
        career_ids: Vec::new(),
    }
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn create_member(&self, member: &NewMember) -> Result<Member, MemberRepositoryError> {
        let mut state = lock(&self.state);
        if state.members.iter().any(|m| m.email == member.email) {
            return Err(MemberRepositoryError::AlreadyExists);
        }
        let id = state.members.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let created = Member {
            id,
            email: member.email.clone(),
            username: member.username.clone(),
            password_hash: member.password_hash.clone(),
            role: member.role,
            refresh_token: None,
            refresh_token_expiry: None,
            created_at: Utc::now(),
        };
        state.members.push(created.clone());
        Ok(created)
    }

    async fn get_member_by_id(&self, member_id: i64) -> Result<Member, MemberRepositoryError> {
        lock(&self.state)
            .members
            .iter()
            .find(|m| m.id == member_id)
            .cloned()
            .ok_or(MemberRepositoryError::NotFound)
    }

    async fn get_member_by_email(&self, email: &str) -> Result<Member, MemberRepositoryError> {
        lock(&self.state)
            .members
            .iter()
            .find(|m| m.email == email)
            .cloned()
            .ok_or(MemberRepositoryError::NotFound)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, MemberRepositoryError> {
        Ok(lock(&self.state).members.iter().any(|m| m.email == email))
    }

    async fn delete_member(&self, member_id: i64) -> Result<(), MemberRepositoryError> {
        let mut state = lock(&self.state);
        if state.meetings.iter().any(|m| m.creator_id == member_id) {
            return Err(MemberRepositoryError::InUse);
        }
        let before = state.members.len();
        state.members.retain(|m| m.id != member_id);
        if state.members.len() == before {
            return Err(MemberRepositoryError::NotFound);
        }
        let left: Vec<i64> = state
            .meeting_members
            .iter()
            .filter(|(_, joined)| *joined == member_id)
            .map(|(meeting_id, _)| *meeting_id)
            .collect();
        state.meeting_members.retain(|(_, joined)| *joined != member_id);
        for meeting in state.meetings.iter_mut().filter(|m| left.contains(&m.id)) {
            meeting.registered_count -= 1;
        }
        Ok(())
    }

    async fn store_refresh_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MemberRepositoryError> {
        let mut state = lock(&self.state);
        let member = state
            .members
            .iter_mut()
            .find(|m| m.email == email)
            .ok_or(MemberRepositoryError::NotFound)?;
        member.refresh_token = Some(token.to_string());
        member.refresh_token_expiry = Some(expires_at);
        Ok(())
    }

    async fn clear_refresh_token(
        &self,
        email: &str,
        token: &str,
    ) -> Result<(), MemberRepositoryError> {
        let mut state = lock(&self.state);
        if let Some(member) = state
            .members
            .iter_mut()
            .find(|m| m.email == email && m.refresh_token.as_deref() == Some(token))
        {
            member.refresh_token = None;
            member.refresh_token_expiry = None;
        }
        Ok(())
    }
}

#[async_trait]
impl MeetingRepository for InMemoryStore {
    async fn search_meetings(
        &self,
        query: &MeetingSearchQuery,
    ) -> Result<Vec<NearbyMeeting>, MeetingRepositoryError> {
        let state = lock(&self.state);
        let predicates = query.predicates();
        let no_tags = Vec::new();

        let mut hits: Vec<NearbyMeeting> = state
            .meetings
            .iter()
            .filter(|meeting| {
                let skills = state.meeting_skills.get(&meeting.id).unwrap_or(&no_tags);
                let careers = state.meeting_careers.get(&meeting.id).unwrap_or(&no_tags);
                predicates.iter().all(|p| p.matches(skills, careers))
            })
            .map(|meeting| NearbyMeeting {
                distance_meters: query.center.distance_to(&meeting.location()),
                meeting: meeting.clone(),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance_meters
                .total_cmp(&b.distance_meters)
                .then(a.meeting.id.cmp(&b.meeting.id))
        });

        Ok(hits
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn create_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, MeetingRepositoryError> {
        let mut state = lock(&self.state);
        if !state.members.iter().any(|m| m.id == meeting.creator_id) {
            return Err(MeetingRepositoryError::Database(
                "creator does not exist".to_string(),
            ));
        }
        let id = state.meetings.len() as i64 + 1;
        let created = Meeting {
            id,
            name: meeting.name.clone(),
            creator_id: meeting.creator_id,
            meeting_date: meeting.meeting_date,
            start_time: meeting.start_time,
            end_time: meeting.end_time,
            location_address: meeting.location_address.clone(),
            location_lat: meeting.location_lat,
            location_lng: meeting.location_lng,
            registered_count: 0,
            total_count: meeting.total_count,
            budget: meeting.budget,
            contents: meeting.contents.clone(),
            status: MeetingStatus::Open,
        };
        let skills = state.existing_skills(&meeting.skill_ids);
        let careers = state.existing_careers(&meeting.career_ids);
        state.meeting_skills.insert(id, skills);
        state.meeting_careers.insert(id, careers);
        state.meetings.push(created.clone());
        Ok(created)
    }

    async fn get_meeting_by_id(&self, meeting_id: i64) -> Result<Meeting, MeetingRepositoryError> {
        lock(&self.state)
            .meetings
            .iter()
            .find(|m| m.id == meeting_id)
            .cloned()
            .ok_or(MeetingRepositoryError::NotFound)
    }

    async fn update_meeting(
        &self,
        meeting_id: i64,
        changes: &MeetingChanges,
    ) -> Result<Meeting, MeetingRepositoryError> {
        let mut state = lock(&self.state);
        let skills = state.existing_skills(&changes.skill_ids);
        let careers = state.existing_careers(&changes.career_ids);
        let meeting = state
            .meetings
            .iter_mut()
            .find(|m| m.id == meeting_id)
            .ok_or(MeetingRepositoryError::NotFound)?;
        if changes.total_count < meeting.registered_count {
            return Err(MeetingRepositoryError::Database(
                "violates check constraint meetings_capacity".to_string(),
            ));
        }
        meeting.name = changes.name.clone();
        meeting.meeting_date = changes.meeting_date;
        meeting.start_time = changes.start_time;
        meeting.end_time = changes.end_time;
        meeting.location_address = changes.location_address.clone();
        meeting.location_lat = changes.location_lat;
        meeting.location_lng = changes.location_lng;
        meeting.total_count = changes.total_count;
        meeting.budget = changes.budget;
        meeting.contents = changes.contents.clone();
        let updated = meeting.clone();

        state.meeting_skills.insert(meeting_id, skills);
        state.meeting_careers.insert(meeting_id, careers);
        Ok(updated)
    }

    async fn get_meeting_tags(&self, meeting_id: i64) -> Result<MeetingTags, MeetingRepositoryError> {
        let state = lock(&self.state);
        let skill_ids = state.meeting_skills.get(&meeting_id).cloned().unwrap_or_default();
        let career_ids = state.meeting_careers.get(&meeting_id).cloned().unwrap_or_default();
        Ok(MeetingTags {
            skills: state
                .skills
                .iter()
                .filter(|s| skill_ids.contains(&s.id))
                .cloned()
                .collect(),
            careers: state
                .careers
                .iter()
                .filter(|c| career_ids.contains(&c.id))
                .cloned()
                .collect(),
        })
    }

    async fn is_member_joined(
        &self,
        meeting_id: i64,
        member_id: i64,
    ) -> Result<bool, MeetingRepositoryError> {
        Ok(lock(&self.state)
            .meeting_members
            .contains(&(meeting_id, member_id)))
    }

    async fn enter_meeting(
        &self,
        meeting_id: i64,
        member_id: i64,
    ) -> Result<Meeting, MeetingRepositoryError> {
        let mut state = lock(&self.state);
        let already_joined = state.meeting_members.contains(&(meeting_id, member_id));
        let meeting = state
            .meetings
            .iter_mut()
            .find(|m| m.id == meeting_id)
            .ok_or(MeetingRepositoryError::NotFound)?;
        if meeting.status != MeetingStatus::Open {
            return Err(MeetingRepositoryError::NotOpen);
        }
        if already_joined {
            return Err(MeetingRepositoryError::AlreadyJoined);
        }
        if meeting.is_full() {
            return Err(MeetingRepositoryError::CapacityExceeded);
        }
        meeting.registered_count += 1;
        let entered = meeting.clone();
        state.meeting_members.insert((meeting_id, member_id));
        Ok(entered)
    }
}

enum CacheValue {
    Text(String),
    Hash(HashMap<String, String>),
}

struct CacheEntry {
    value: CacheValue,
    expires_at: Option<DateTime<Utc>>,
}

/// Session cache whose TTLs run on the supplied clock.
pub struct InMemorySessionCache {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemorySessionCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        InMemorySessionCache {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Live entries, with expired ones purged first.
    fn live(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        let now = self.clock.now();
        let mut entries = lock(&self.entries);
        entries.retain(|_, entry| entry.expires_at.map_or(true, |at| at > now));
        entries
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.live().contains_key(key)
    }

    pub fn ttl_seconds(&self, key: &str) -> Option<i64> {
        let now = self.clock.now();
        self.live()
            .get(key)
            .and_then(|entry| entry.expires_at)
            .map(|at| (at - now).num_seconds())
    }
}

fn wrong_type() -> SessionCacheError {
    SessionCacheError::Redis(
        "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
    )
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), SessionCacheError> {
        self.live().insert(
            key.to_string(),
            CacheEntry {
                value: CacheValue::Text(value.to_string()),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), SessionCacheError> {
        let expires_at = self.clock.now() + Duration::seconds(ttl_seconds.max(1) as i64);
        self.live().insert(
            key.to_string(),
            CacheEntry {
                value: CacheValue::Text(value.to_string()),
                expires_at: Some(expires_at),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionCacheError> {
        match self.live().get(key).map(|entry| &entry.value) {
            None => Ok(None),
            Some(CacheValue::Text(value)) => Ok(Some(value.clone())),
            Some(CacheValue::Hash(_)) => Err(wrong_type()),
        }
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SessionCacheError> {
        let mut entries = self.live();
        if matches!(entries.get(key).map(|entry| &entry.value), Some(CacheValue::Hash(_))) {
            return Err(wrong_type());
        }
        match entries.remove(key).map(|entry| entry.value) {
            Some(CacheValue::Text(value)) => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), SessionCacheError> {
        self.live().remove(key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, SessionCacheError> {
        let expires_at = self.clock.now() + Duration::seconds(ttl_seconds as i64);
        match self.live().get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hash_set_all(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), SessionCacheError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut entries = self.live();
        let entry = entries.entry(key.to_string()).or_insert_with(|| CacheEntry {
            value: CacheValue::Hash(HashMap::new()),
            expires_at: None,
        });
        match &mut entry.value {
            CacheValue::Hash(hash) => {
                hash.extend(fields.iter().cloned());
                Ok(())
            }
            CacheValue::Text(_) => Err(wrong_type()),
        }
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, SessionCacheError> {
        match self.live().get(key).map(|entry| &entry.value) {
            None => Ok(None),
            Some(CacheValue::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(CacheValue::Text(_)) => Err(wrong_type()),
        }
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, SessionCacheError> {
        match self.live().get(key).map(|entry| &entry.value) {
            None => Ok(HashMap::new()),
            Some(CacheValue::Hash(hash)) => Ok(hash.clone()),
            Some(CacheValue::Text(_)) => Err(wrong_type()),
        }
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<(), SessionCacheError> {
        let mut entries = self.live();
        let now_empty = match entries.get_mut(key).map(|entry| &mut entry.value) {
            None => return Ok(()),
            Some(CacheValue::Hash(hash)) => {
                hash.remove(field);
                hash.is_empty()
            }
            Some(CacheValue::Text(_)) => return Err(wrong_type()),
        };
        // Redis drops a hash once its last field is gone.
        if now_empty {
            entries.remove(key);
        }
        Ok(())
    }
}
