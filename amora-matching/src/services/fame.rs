//! Fame rating: a derived popularity score in [0, 5] recomputed from
//! like/visit counts. Last-write-wins is fine; it is a ranking signal, never
//! a source of truth.

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use amora_shared::errors::AppResult;

use crate::schema::{likes, profiles, visits};

/// `min(5.0, (likes * 2 + visits) / total_profiles * 5)`, 0.0 for an empty
/// population.
pub fn fame_score(like_count: i64, visit_count: i64, total_profiles: i64) -> f64 {
    if total_profiles <= 0 {
        return 0.0;
    }
    let raw = (like_count * 2 + visit_count) as f64 / total_profiles as f64 * 5.0;
    raw.min(5.0)
}

/// Recompute and persist a profile's fame rating from current counts.
pub fn recompute(conn: &mut PgConnection, profile_id: Uuid) -> AppResult<f64> {
    let like_count: i64 = likes::table
        .filter(likes::liked_id.eq(profile_id))
        .count()
        .get_result(conn)?;

    let visit_count: i64 = visits::table
        .filter(visits::visited_id.eq(profile_id))
        .count()
        .get_result(conn)?;

    let total_profiles: i64 = profiles::table.count().get_result(conn)?;

    let score = fame_score(like_count, visit_count, total_profiles);

    diesel::update(profiles::table.filter(profiles::id.eq(profile_id)))
        .set((
            profiles::fame_rating.eq(score),
            profiles::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;

    Ok(score)
}

/// Recompute, logging and swallowing failures. A fame update must never fail
/// the like/unlike/visit operation that triggered it.
pub fn recompute_quietly(conn: &mut PgConnection, profile_id: Uuid) {
    if let Err(e) = recompute(conn, profile_id) {
        tracing::warn!(error = %e, profile_id = %profile_id, "fame rating recompute failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_population_scores_zero() {
        assert_eq!(fame_score(10, 10, 0), 0.0);
    }

    #[test]
    fn documented_scenario() {
        // 100 profiles, 10 likes, 5 visits -> (10*2 + 5) / 100 * 5 = 1.25
        assert!((fame_score(10, 5, 100) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn score_is_capped_at_five() {
        assert_eq!(fame_score(1_000, 1_000, 3), 5.0);
    }

    #[test]
    fn score_stays_in_range() {
        for (l, v, t) in [(0, 0, 1), (1, 0, 1), (0, 1, 1), (50, 50, 2), (3, 7, 1_000)] {
            let s = fame_score(l, v, t);
            assert!((0.0..=5.0).contains(&s), "({l},{v},{t}) -> {s}");
        }
    }
}
