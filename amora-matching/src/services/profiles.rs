use std::collections::HashMap;

use diesel::prelude::*;
use diesel::Connection as _;
use uuid::Uuid;

use amora_shared::clients::db::DbPool;
use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::payloads::UserRegistered;

use crate::models::{NewProfile, NewUser, Profile, ProfilePicture};
use crate::schema::{profile_pictures, profiles, users};

pub fn profile_by_user_id(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Profile> {
    profiles::table
        .filter(profiles::user_id.eq(user_id))
        .first::<Profile>(conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

pub fn profile_by_id(conn: &mut PgConnection, profile_id: Uuid) -> AppResult<Profile> {
    profiles::table
        .filter(profiles::id.eq(profile_id))
        .first::<Profile>(conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

/// Pictures for a batch of profiles, primary first then oldest first.
pub fn pictures_by_profile(
    conn: &mut PgConnection,
    profile_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<ProfilePicture>>> {
    let mut grouped: HashMap<Uuid, Vec<ProfilePicture>> = HashMap::new();
    if profile_ids.is_empty() {
        return Ok(grouped);
    }

    let pictures: Vec<ProfilePicture> = profile_pictures::table
        .filter(profile_pictures::profile_id.eq_any(profile_ids))
        .order((
            profile_pictures::is_primary.desc(),
            profile_pictures::created_at.asc(),
        ))
        .load(conn)?;
    for pic in pictures {
        grouped.entry(pic.profile_id).or_default().push(pic);
    }
    Ok(grouped)
}

/// Insert the user row and an empty, incomplete profile for a freshly
/// registered account. Idempotent across redelivered events.
pub fn create_profile_for_user(pool: &DbPool, registered: &UserRegistered) -> AppResult<Profile> {
    let mut conn = pool
        .get()
        .map_err(|e| AppError::internal(e.to_string()))?;

    conn.transaction::<_, AppError, _>(|conn| {
        diesel::insert_into(users::table)
            .values(&NewUser {
                id: registered.user_id,
                username: registered.username.clone(),
                first_name: registered.first_name.clone(),
                last_name: registered.last_name.clone(),
            })
            .on_conflict_do_nothing()
            .execute(conn)?;

        let existing = profiles::table
            .filter(profiles::user_id.eq(registered.user_id))
            .first::<Profile>(conn)
            .optional()?;

        if let Some(profile) = existing {
            return Ok(profile);
        }

        let profile = diesel::insert_into(profiles::table)
            .values(&NewProfile {
                user_id: registered.user_id,
                fame_rating: 0.0,
                is_complete: false,
            })
            .get_result::<Profile>(conn)?;

        Ok(profile)
    })
}
