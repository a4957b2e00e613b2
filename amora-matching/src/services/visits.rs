//! Profile visit log: append-only, deduplicated per ordered pair within a
//! 5-minute window.

use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::Connection as _;
use serde::Serialize;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewVisit, ProfilePicture, PublicUser};
use crate::schema::{profiles, users, visits};
use crate::services::fame;
use crate::services::interactions::public_user;
use crate::services::notify::{Notice, NotificationKind};
use crate::services::profiles as profile_lookup;

const DEDUP_WINDOW_MINUTES: i64 = 5;

/// Whether a repeat visit at `now` still falls inside the dedup window
/// opened by `last_visit`.
fn within_dedup_window(last_visit: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(last_visit) < Duration::minutes(DEDUP_WINDOW_MINUTES)
}

#[derive(Debug, PartialEq, Eq)]
pub enum VisitOutcome {
    Recorded,
    /// Self-visit or a repeat within the dedup window; nothing written.
    Skipped,
}

pub fn record_visit(
    conn: &mut PgConnection,
    visitor_profile_id: Uuid,
    visited_profile_id: Uuid,
) -> AppResult<(VisitOutcome, Vec<Notice>)> {
    if visitor_profile_id == visited_profile_id {
        return Ok((VisitOutcome::Skipped, Vec::new()));
    }

    let mut notices = Vec::new();

    let outcome = conn.transaction::<_, AppError, _>(|conn| {
        let pair: Vec<(Uuid, Uuid)> = profiles::table
            .filter(profiles::id.eq_any(vec![visitor_profile_id, visited_profile_id]))
            .select((profiles::id, profiles::user_id))
            .load(conn)?;
        if pair.len() != 2 {
            return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
        }

        let last_visit: Option<DateTime<Utc>> = visits::table
            .filter(visits::visitor_id.eq(visitor_profile_id))
            .filter(visits::visited_id.eq(visited_profile_id))
            .order(visits::created_at.desc())
            .select(visits::created_at)
            .first(conn)
            .optional()?;

        if last_visit.map_or(false, |t| within_dedup_window(t, Utc::now())) {
            return Ok(VisitOutcome::Skipped);
        }

        diesel::insert_into(visits::table)
            .values(&NewVisit {
                visitor_id: visitor_profile_id,
                visited_id: visited_profile_id,
            })
            .execute(conn)?;

        let user_of = |pid: Uuid| {
            pair.iter()
                .find(|(id, _)| *id == pid)
                .map(|(_, uid)| *uid)
                .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
        };
        let visitor_user_id = user_of(visitor_profile_id)?;
        let visited_user_id = user_of(visited_profile_id)?;

        let visitor_user = public_user(conn, visitor_user_id)?;
        notices.push(Notice::new(
            visited_user_id,
            visitor_user_id,
            NotificationKind::Visit,
            format!("{} visited your profile!", visitor_user.first_name),
        ));

        Ok(VisitOutcome::Recorded)
    })?;

    if outcome == VisitOutcome::Recorded {
        fame::recompute_quietly(conn, visited_profile_id);
    }

    Ok((outcome, notices))
}

#[derive(Debug, Serialize)]
pub struct VisitorProfile {
    pub id: Uuid,
    pub user: PublicUser,
    pub pictures: Vec<ProfilePicture>,
    pub visited_at: DateTime<Utc>,
}

/// Who visited this profile, newest first. Repeat visitors appear once per
/// recorded visit.
pub fn list_received_visits(
    conn: &mut PgConnection,
    viewer_profile_id: Uuid,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<VisitorProfile>> {
    let visit_rows: Vec<(Uuid, DateTime<Utc>)> = visits::table
        .filter(visits::visited_id.eq(viewer_profile_id))
        .select((visits::visitor_id, visits::created_at))
        .order(visits::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(conn)?;

    let visitor_ids: Vec<Uuid> = visit_rows.iter().map(|(id, _)| *id).collect();

    let rows: Vec<(Uuid, PublicUser)> = profiles::table
        .inner_join(users::table)
        .filter(profiles::id.eq_any(&visitor_ids))
        .select((
            profiles::id,
            (
                users::id,
                users::username,
                users::first_name,
                users::last_name,
                users::is_online,
            ),
        ))
        .load(conn)?;

    let pictures = profile_lookup::pictures_by_profile(conn, &visitor_ids)?;

    let users_by_id: std::collections::HashMap<Uuid, PublicUser> = rows.into_iter().collect();

    // A repeat visitor appears once per visit; clone rather than move the
    // picture set.
    let result = visit_rows
        .into_iter()
        .filter_map(|(profile_id, visited_at)| {
            users_by_id.get(&profile_id).map(|user| VisitorProfile {
                id: profile_id,
                user: user.clone(),
                pictures: pictures.get(&profile_id).cloned().unwrap_or_default(),
                visited_at,
            })
        })
        .collect();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes: i64, seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(minutes * 60 + seconds, 0).unwrap()
    }

    #[test]
    fn repeat_inside_the_window_is_deduplicated() {
        assert!(within_dedup_window(at(0, 0), at(0, 1)));
        assert!(within_dedup_window(at(0, 0), at(4, 59)));
    }

    #[test]
    fn window_closes_at_five_minutes() {
        assert!(!within_dedup_window(at(0, 0), at(5, 0)));
        assert!(!within_dedup_window(at(0, 0), at(17, 30)));
    }
}
