//! Suggested-profiles query: compatibility + filter dimensions in one
//! candidate query, batched annotation, two-tier ranking. The database does
//! cheap default ordering; proximity search re-ranks on exact haversine
//! distance after the bounding-box pre-filter.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Profile, ProfilePicture, Tag, User};
use crate::schema::{blocks, likes, profile_tags, profiles, tags, users};
use crate::services::{compatibility, geo, profiles as profile_lookup};

diesel::define_sql_function! {
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionFilters {
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub min_fame: Option<f64>,
    pub max_fame: Option<f64>,
    pub max_distance: Option<f64>,
    /// Candidates must carry every listed tag (case-insensitive).
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuggestedProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gender: Option<String>,
    pub sexual_preference: Option<String>,
    pub biography: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub fame_rating: f64,
    pub birth_date: Option<NaiveDate>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_online: bool,
    pub last_online: Option<chrono::DateTime<Utc>>,
    pub pictures: Vec<ProfilePicture>,
    pub tags: Vec<Tag>,
    pub distance: Option<f64>,
    pub age: Option<i32>,
    pub has_liked: bool,
    pub common_tags: i64,
}

pub fn suggest(
    conn: &mut PgConnection,
    viewer_user_id: Uuid,
    limit: i64,
    offset: i64,
    filters: &SuggestionFilters,
) -> AppResult<Vec<SuggestedProfile>> {
    let viewer = profile_lookup::profile_by_user_id(conn, viewer_user_id)?;
    if !viewer.is_complete {
        return Err(AppError::new(
            ErrorCode::ProfileIncomplete,
            "complete your profile to get suggestions",
        ));
    }

    // Blocks in either direction exclude a candidate outright.
    let mut excluded: Vec<Uuid> = blocks::table
        .filter(blocks::blocker_id.eq(viewer.id))
        .select(blocks::blocked_id)
        .load(conn)?;
    let blockers: Vec<Uuid> = blocks::table
        .filter(blocks::blocked_id.eq(viewer.id))
        .select(blocks::blocker_id)
        .load(conn)?;
    excluded.extend(blockers);
    excluded.push(viewer.id);

    let mut query = profiles::table
        .inner_join(users::table)
        .into_boxed()
        .filter(profiles::is_complete.eq(true))
        .filter(profiles::id.ne_all(excluded));

    query = compatibility::apply(query, &viewer);

    let today = Utc::now().date_naive();
    if let Some(min_age) = filters.min_age {
        let max_birth = today - Duration::days((min_age as f64 * 365.25) as i64);
        query = query.filter(profiles::birth_date.le(max_birth));
    }
    if let Some(max_age) = filters.max_age {
        let min_birth = today - Duration::days(((max_age + 1) as f64 * 365.25) as i64);
        query = query.filter(profiles::birth_date.ge(min_birth));
    }

    if let Some(min_fame) = filters.min_fame {
        query = query.filter(profiles::fame_rating.ge(min_fame));
    }
    if let Some(max_fame) = filters.max_fame {
        query = query.filter(profiles::fame_rating.le(max_fame));
    }

    // Bounding-box pre-filter; ignored when the viewer has no coordinates.
    let viewer_coords = viewer.latitude.zip(viewer.longitude);
    let geo_filter = filters.max_distance.zip(viewer_coords);
    if let Some((max_km, (lat, lng))) = geo_filter {
        let bb = geo::bounding_box(lat, lng, max_km);
        query = query
            .filter(profiles::latitude.is_not_null())
            .filter(profiles::longitude.is_not_null())
            .filter(profiles::latitude.between(bb.min_lat, bb.max_lat))
            .filter(profiles::longitude.between(bb.min_lng, bb.max_lng));
    }

    for tag in &filters.tags {
        let needle = tag.trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }
        query = query.filter(diesel::dsl::exists(
            profile_tags::table
                .inner_join(tags::table)
                .filter(profile_tags::profile_id.eq(profiles::id))
                .filter(lower(tags::name).eq(needle)),
        ));
    }

    let candidates: Vec<(Profile, User)> = query
        .order((
            profiles::fame_rating.desc(),
            users::is_online.desc(),
            users::last_online.desc(),
        ))
        .limit(limit)
        .offset(offset)
        .load(conn)?;

    let mut results = annotate(conn, &viewer, candidates)?;

    if let Some((max_km, _)) = geo_filter {
        // Exact-radius cut and nearest-first ranking on top of the cheap
        // bounding-box result.
        results.retain(|p| p.distance.map_or(true, |d| d <= max_km));
        rank_by_proximity(&mut results);
    }

    Ok(results)
}

/// Batch-load pictures, tags, like status and tag overlap for the page of
/// candidates.
fn annotate(
    conn: &mut PgConnection,
    viewer: &Profile,
    candidates: Vec<(Profile, User)>,
) -> AppResult<Vec<SuggestedProfile>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = candidates.iter().map(|(p, _)| p.id).collect();

    let mut pictures_by_profile = profile_lookup::pictures_by_profile(conn, &ids)?;

    let mut tags_by_profile: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    let tag_rows: Vec<(Uuid, Tag)> = profile_tags::table
        .inner_join(tags::table)
        .filter(profile_tags::profile_id.eq_any(&ids))
        .select((profile_tags::profile_id, (tags::id, tags::name)))
        .load(conn)?;
    for (profile_id, tag) in tag_rows {
        tags_by_profile.entry(profile_id).or_default().push(tag);
    }

    let viewer_tag_ids: HashSet<Uuid> = profile_tags::table
        .filter(profile_tags::profile_id.eq(viewer.id))
        .select(profile_tags::tag_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();

    let liked_ids: HashSet<Uuid> = likes::table
        .filter(likes::liker_id.eq(viewer.id))
        .filter(likes::liked_id.eq_any(&ids))
        .select(likes::liked_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();

    let today = Utc::now().date_naive();
    let viewer_coords = viewer.latitude.zip(viewer.longitude);

    let results = candidates
        .into_iter()
        .map(|(profile, user)| {
            let candidate_tags = tags_by_profile.remove(&profile.id).unwrap_or_default();
            let common_tags = candidate_tags
                .iter()
                .filter(|t| viewer_tag_ids.contains(&t.id))
                .count() as i64;

            let distance = viewer_coords
                .zip(profile.latitude.zip(profile.longitude))
                .map(|((vlat, vlng), (clat, clng))| geo::haversine_km(vlat, vlng, clat, clng));

            SuggestedProfile {
                id: profile.id,
                user_id: profile.user_id,
                gender: profile.gender,
                sexual_preference: profile.sexual_preference,
                biography: profile.biography,
                latitude: profile.latitude,
                longitude: profile.longitude,
                fame_rating: profile.fame_rating,
                birth_date: profile.birth_date,
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                is_online: user.is_online,
                last_online: user.last_online,
                pictures: pictures_by_profile.remove(&profile.id).unwrap_or_default(),
                tags: candidate_tags,
                distance,
                age: profile.birth_date.map(|b| age_on(b, today)),
                has_liked: liked_ids.contains(&profile.id),
                common_tags,
            }
        })
        .collect();

    Ok(results)
}

/// Completed years between `birth` and `today`.
fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Nearest first (unknown distance last), then most common tags, then fame.
fn rank_by_proximity(results: &mut [SuggestedProfile]) {
    results.sort_by(|a, b| {
        let da = a.distance.unwrap_or(f64::INFINITY);
        let db = b.distance.unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
            .then_with(|| b.common_tags.cmp(&a.common_tags))
            .then_with(|| b.fame_rating.total_cmp(&a.fame_rating))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn age_counts_completed_years() {
        assert_eq!(age_on(d(1990, 6, 15), d(2020, 6, 15)), 30);
        assert_eq!(age_on(d(1990, 6, 15), d(2020, 6, 14)), 29);
        assert_eq!(age_on(d(1990, 6, 15), d(2020, 6, 16)), 30);
        assert_eq!(age_on(d(2000, 1, 1), d(2020, 12, 31)), 20);
    }

    fn entry(distance: Option<f64>, common_tags: i64, fame_rating: f64) -> SuggestedProfile {
        SuggestedProfile {
            distance,
            common_tags,
            fame_rating,
            ..Default::default()
        }
    }

    #[test]
    fn closer_candidate_ranks_first_regardless_of_fame() {
        let mut results = vec![entry(Some(80.0), 0, 5.0), entry(Some(50.0), 0, 3.0)];
        rank_by_proximity(&mut results);
        assert_eq!(results[0].distance, Some(50.0));
    }

    #[test]
    fn unknown_distance_sorts_last() {
        let mut results = vec![entry(None, 9, 5.0), entry(Some(400.0), 0, 0.1)];
        rank_by_proximity(&mut results);
        assert_eq!(results[0].distance, Some(400.0));
        assert_eq!(results[1].distance, None);
    }

    #[test]
    fn ties_break_on_common_tags_then_fame() {
        let mut results = vec![
            entry(Some(10.0), 1, 4.0),
            entry(Some(10.0), 3, 2.0),
            entry(Some(10.0), 3, 4.5),
        ];
        rank_by_proximity(&mut results);
        assert_eq!(results[0].common_tags, 3);
        assert_eq!(results[0].fame_rating, 4.5);
        assert_eq!(results[1].common_tags, 3);
        assert_eq!(results[2].common_tags, 1);
    }

    #[test]
    fn exact_radius_drops_far_candidates() {
        // Mirrors the bounding-box corner case: a candidate inside the box
        // but outside the circle must not survive.
        let mut results = vec![entry(Some(50.0), 0, 3.0), entry(Some(200.0), 0, 5.0)];
        let max_km = 100.0;
        results.retain(|p| p.distance.map_or(true, |dd| dd <= max_km));
        rank_by_proximity(&mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].distance, Some(50.0));
    }
}
