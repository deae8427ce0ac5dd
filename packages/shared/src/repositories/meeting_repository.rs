use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::models::meeting::search::{MeetingPredicate, MeetingSearchQuery, NearbyMeeting};
use crate::models::meeting::{
    Career, Meeting, MeetingChanges, MeetingStatus, MeetingTags, NewMeeting, Skill,
    EARTH_RADIUS_METERS,
};
use crate::repositories::errors::meeting_repository_errors::MeetingRepositoryError;

#[cfg(test)]
use mockall::automock;

const MEETING_COLUMNS: &str = "id, name, creator_id, meeting_date, start_time, end_time, \
                               location_address, location_lat, location_lng, registered_count, \
                               total_count, budget, contents, status";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Nearest meetings first, ties broken by id, at most `query.limit` rows.
    async fn search_meetings(
        &self,
        query: &MeetingSearchQuery,
    ) -> Result<Vec<NearbyMeeting>, MeetingRepositoryError>;
    /// Stores the meeting and tags it with those of its skill and career ids that exist.
    async fn create_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, MeetingRepositoryError>;
    async fn get_meeting_by_id(&self, meeting_id: i64) -> Result<Meeting, MeetingRepositoryError>;
    /// Replaces the mutable columns and the tag set of a meeting.
    async fn update_meeting(
        &self,
        meeting_id: i64,
        changes: &MeetingChanges,
    ) -> Result<Meeting, MeetingRepositoryError>;
    async fn get_meeting_tags(&self, meeting_id: i64) -> Result<MeetingTags, MeetingRepositoryError>;
    async fn is_member_joined(
        &self,
        meeting_id: i64,
        member_id: i64,
    ) -> Result<bool, MeetingRepositoryError>;
    /// Adds the member and bumps `registered_count`, or fails without changing anything.
    async fn enter_meeting(
        &self,
        meeting_id: i64,
        member_id: i64,
    ) -> Result<Meeting, MeetingRepositoryError>;
}

/// Haversine distance from the row's coordinates to the bound center, in meters.
fn push_distance_expr(builder: &mut QueryBuilder<'static, Postgres>, query: &MeetingSearchQuery) {
    builder.push("2 * ");
    builder.push(EARTH_RADIUS_METERS);
    builder.push(" * ASIN(SQRT(LEAST(1, POWER(SIN(RADIANS(m.location_lat - ");
    builder.push_bind(query.center.lat);
    builder.push(") / 2), 2) + COS(RADIANS(");
    builder.push_bind(query.center.lat);
    builder.push(")) * COS(RADIANS(m.location_lat)) * POWER(SIN(RADIANS(m.location_lng - ");
    builder.push_bind(query.center.lng);
    builder.push(") / 2), 2))))");
}

/// Builds the single search statement for `query`.
///
/// Each predicate adds one `AND`ed condition; rows multiplied by the tag joins
/// collapse back to one per meeting before `LIMIT`/`OFFSET` apply.
pub fn build_search_query(query: &MeetingSearchQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT ");
    for (i, column) in MEETING_COLUMNS.split(',').enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push("m.");
        builder.push(column.trim());
    }
    builder.push(", ");
    push_distance_expr(&mut builder, query);
    builder.push(
        " AS distance_meters FROM meetings m \
         LEFT JOIN meeting_skills ms ON ms.meeting_id = m.id \
         LEFT JOIN meeting_careers mc ON mc.meeting_id = m.id",
    );

    for (i, predicate) in query.predicates().into_iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            MeetingPredicate::SkillIn(ids) => {
                builder.push("ms.skill_id = ANY(");
                builder.push_bind(ids);
            }
            MeetingPredicate::CareerIn(ids) => {
                builder.push("mc.career_id = ANY(");
                builder.push_bind(ids);
            }
        }
        builder.push(")");
    }

    builder.push(" GROUP BY m.id ORDER BY distance_meters ASC, m.id ASC LIMIT ");
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset);
    builder
}

pub struct PostgresMeetingRepository {
    pool: PgPool,
}

impl PostgresMeetingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_tags(
    tx: &mut Transaction<'_, Postgres>,
    meeting_id: i64,
    skill_ids: &[i64],
    career_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO meeting_skills (meeting_id, skill_id) \
         SELECT $1, id FROM skills WHERE id = ANY($2) ON CONFLICT DO NOTHING",
    )
    .bind(meeting_id)
    .bind(skill_ids)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO meeting_careers (meeting_id, career_id) \
         SELECT $1, id FROM careers WHERE id = ANY($2) ON CONFLICT DO NOTHING",
    )
    .bind(meeting_id)
    .bind(career_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl MeetingRepository for PostgresMeetingRepository {
    async fn search_meetings(
        &self,
        query: &MeetingSearchQuery,
    ) -> Result<Vec<NearbyMeeting>, MeetingRepositoryError> {
        let mut builder = build_search_query(query);
        let rows = builder
            .build_query_as::<NearbyMeeting>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, MeetingRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO meetings (name, creator_id, meeting_date, start_time, end_time, \
             location_address, location_lat, location_lng, total_count, budget, contents) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
            MEETING_COLUMNS
        );
        let created = sqlx::query_as::<_, Meeting>(&sql)
            .bind(&meeting.name)
            .bind(meeting.creator_id)
            .bind(meeting.meeting_date)
            .bind(meeting.start_time)
            .bind(meeting.end_time)
            .bind(&meeting.location_address)
            .bind(meeting.location_lat)
            .bind(meeting.location_lng)
            .bind(meeting.total_count)
            .bind(meeting.budget)
            .bind(&meeting.contents)
            .fetch_one(&mut *tx)
            .await?;

        insert_tags(&mut tx, created.id, &meeting.skill_ids, &meeting.career_ids).await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn get_meeting_by_id(&self, meeting_id: i64) -> Result<Meeting, MeetingRepositoryError> {
        let sql = format!("SELECT {} FROM meetings WHERE id = $1", MEETING_COLUMNS);
        sqlx::query_as::<_, Meeting>(&sql)
            .bind(meeting_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(MeetingRepositoryError::NotFound)
    }

    async fn update_meeting(
        &self,
        meeting_id: i64,
        changes: &MeetingChanges,
    ) -> Result<Meeting, MeetingRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE meetings SET name = $2, meeting_date = $3, start_time = $4, end_time = $5, \
             location_address = $6, location_lat = $7, location_lng = $8, total_count = $9, \
             budget = $10, contents = $11 WHERE id = $1 RETURNING {}",
            MEETING_COLUMNS
        );
        let updated = sqlx::query_as::<_, Meeting>(&sql)
            .bind(meeting_id)
            .bind(&changes.name)
            .bind(changes.meeting_date)
            .bind(changes.start_time)
            .bind(changes.end_time)
            .bind(&changes.location_address)
            .bind(changes.location_lat)
            .bind(changes.location_lng)
            .bind(changes.total_count)
            .bind(changes.budget)
            .bind(&changes.contents)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(MeetingRepositoryError::NotFound)?;

        sqlx::query("DELETE FROM meeting_skills WHERE meeting_id = $1")
            .bind(meeting_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM meeting_careers WHERE meeting_id = $1")
            .bind(meeting_id)
            .execute(&mut *tx)
            .await?;
        insert_tags(&mut tx, meeting_id, &changes.skill_ids, &changes.career_ids).await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn get_meeting_tags(&self, meeting_id: i64) -> Result<MeetingTags, MeetingRepositoryError> {
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT s.id, s.name FROM skills s \
             JOIN meeting_skills ms ON ms.skill_id = s.id \
             WHERE ms.meeting_id = $1 ORDER BY s.id",
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await?;

        let careers = sqlx::query_as::<_, Career>(
            "SELECT c.id, c.name FROM careers c \
             JOIN meeting_careers mc ON mc.career_id = c.id \
             WHERE mc.meeting_id = $1 ORDER BY c.id",
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(MeetingTags { skills, careers })
    }

    async fn is_member_joined(
        &self,
        meeting_id: i64,
        member_id: i64,
    ) -> Result<bool, MeetingRepositoryError> {
        let joined: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM meeting_members WHERE meeting_id = $1 AND member_id = $2)",
        )
        .bind(meeting_id)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(joined)
    }

    async fn enter_meeting(
        &self,
        meeting_id: i64,
        member_id: i64,
    ) -> Result<Meeting, MeetingRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM meetings WHERE id = $1 FOR UPDATE",
            MEETING_COLUMNS
        );
        let meeting = sqlx::query_as::<_, Meeting>(&sql)
            .bind(meeting_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(MeetingRepositoryError::NotFound)?;
        if meeting.status != MeetingStatus::Open {
            return Err(MeetingRepositoryError::NotOpen);
        }

        let inserted = sqlx::query(
            "INSERT INTO meeting_members (meeting_id, member_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(meeting_id)
        .bind(member_id)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(MeetingRepositoryError::AlreadyJoined);
        }

        let sql = format!(
            "UPDATE meetings SET registered_count = registered_count + 1 \
             WHERE id = $1 AND registered_count < total_count RETURNING {}",
            MEETING_COLUMNS
        );
        let entered = sqlx::query_as::<_, Meeting>(&sql)
            .bind(meeting_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(MeetingRepositoryError::CapacityExceeded)?;

        tx.commit().await?;
        Ok(entered)
    }
}
