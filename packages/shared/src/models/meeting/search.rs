use serde::{Deserialize, Serialize};

use super::{GeoPoint, Meeting};

/// One filter condition on the meeting search. Conditions are conjoined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingPredicate {
    /// The meeting carries at least one of these skill tags.
    SkillIn(Vec<i64>),
    /// The meeting carries at least one of these career tags.
    CareerIn(Vec<i64>),
}

impl MeetingPredicate {
    /// Evaluates the predicate against a meeting's tag ids.
    pub fn matches(&self, skill_ids: &[i64], career_ids: &[i64]) -> bool {
        match self {
            MeetingPredicate::SkillIn(wanted) => skill_ids.iter().any(|id| wanted.contains(id)),
            MeetingPredicate::CareerIn(wanted) => career_ids.iter().any(|id| wanted.contains(id)),
        }
    }
}

/// A validated, ready-to-run nearest-meetings query.
///
/// `limit` is one more than the page size so the caller can tell whether another
/// page exists without counting.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingSearchQuery {
    pub center: GeoPoint,
    pub skill_ids: Vec<i64>,
    pub career_ids: Vec<i64>,
    pub offset: i64,
    pub limit: i64,
}

impl MeetingSearchQuery {
    pub fn new(
        center: GeoPoint,
        skill_ids: &[i64],
        career_ids: &[i64],
        page: i64,
        page_size: i64,
    ) -> Self {
        MeetingSearchQuery {
            center,
            skill_ids: dedup_ids(skill_ids),
            career_ids: dedup_ids(career_ids),
            offset: page * page_size,
            limit: page_size + 1,
        }
    }

    /// Filter conditions, one per non-empty id list. An empty list adds nothing.
    pub fn predicates(&self) -> Vec<MeetingPredicate> {
        let mut predicates = Vec::new();
        if !self.skill_ids.is_empty() {
            predicates.push(MeetingPredicate::SkillIn(self.skill_ids.clone()));
        }
        if !self.career_ids.is_empty() {
            predicates.push(MeetingPredicate::CareerIn(self.career_ids.clone()));
        }
        predicates
    }
}

fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// A search hit: the meeting and its distance from the search center.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NearbyMeeting {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meeting: Meeting,
    pub distance_meters: f64,
}
