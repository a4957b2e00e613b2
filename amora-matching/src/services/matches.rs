//! Read side of the match state: active connections, newest activity first,
//! annotated with the partner's public profile.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use amora_shared::errors::AppResult;

use crate::models::{ProfilePicture, PublicUser};
use crate::schema::{connections, profiles, users};
use crate::services::profiles as profile_lookup;

#[derive(Debug, Serialize)]
pub struct MatchEntry {
    pub connection_id: Uuid,
    pub profile_id: Uuid,
    pub user: PublicUser,
    pub pictures: Vec<ProfilePicture>,
    pub matched_at: DateTime<Utc>,
}

/// The other participant of a connection pair.
fn partner_user_id(viewer_user_id: Uuid, user1_id: Uuid, user2_id: Uuid) -> Uuid {
    if user1_id == viewer_user_id {
        user2_id
    } else {
        user1_id
    }
}

pub fn list_matches(
    conn: &mut PgConnection,
    viewer_user_id: Uuid,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<MatchEntry>> {
    let rows: Vec<(Uuid, Uuid, Uuid, DateTime<Utc>)> = connections::table
        .filter(connections::is_active.eq(true))
        .filter(
            connections::user1_id
                .eq(viewer_user_id)
                .or(connections::user2_id.eq(viewer_user_id)),
        )
        .select((
            connections::id,
            connections::user1_id,
            connections::user2_id,
            connections::updated_at,
        ))
        .order(connections::updated_at.desc())
        .limit(limit)
        .offset(offset)
        .load(conn)?;

    let partner_ids: Vec<Uuid> = rows
        .iter()
        .map(|(_, u1, u2, _)| partner_user_id(viewer_user_id, *u1, *u2))
        .collect();

    let partner_rows: Vec<(Uuid, Uuid, PublicUser)> = profiles::table
        .inner_join(users::table)
        .filter(profiles::user_id.eq_any(&partner_ids))
        .select((
            profiles::id,
            profiles::user_id,
            (
                users::id,
                users::username,
                users::first_name,
                users::last_name,
                users::is_online,
            ),
        ))
        .load(conn)?;

    let profile_ids: Vec<Uuid> = partner_rows.iter().map(|(pid, _, _)| *pid).collect();
    let mut pictures = profile_lookup::pictures_by_profile(conn, &profile_ids)?;

    let by_user: HashMap<Uuid, (Uuid, PublicUser)> = partner_rows
        .into_iter()
        .map(|(profile_id, user_id, user)| (user_id, (profile_id, user)))
        .collect();

    let result = rows
        .into_iter()
        .filter_map(|(connection_id, u1, u2, matched_at)| {
            let partner = partner_user_id(viewer_user_id, u1, u2);
            by_user.get(&partner).map(|(profile_id, user)| MatchEntry {
                connection_id,
                profile_id: *profile_id,
                user: user.clone(),
                pictures: pictures.remove(profile_id).unwrap_or_default(),
                matched_at,
            })
        })
        .collect();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partner_is_the_other_side_of_the_pair() {
        let me = Uuid::now_v7();
        let other = Uuid::now_v7();
        assert_eq!(partner_user_id(me, me, other), other);
        assert_eq!(partner_user_id(me, other, me), other);
    }
}
