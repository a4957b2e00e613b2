//! Like/unlike/block state machine.
//!
//! Invariants maintained here:
//! - an active connection between two users exists iff both like directions
//!   exist;
//! - a block in either direction implies no like exists in either direction.
//!
//! Every mutation runs as one transaction. The two pair profile rows are
//! locked first (`FOR UPDATE`, ascending id order) so a concurrent
//! like(A->B) / block(B->A) pair serializes on the row locks and the block
//! re-check inside the transaction stays valid until commit.

use chrono::Utc;
use diesel::prelude::*;
use diesel::Connection as _;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Connection, NewBlock, NewConnection, NewLike, Profile, PublicUser};
use crate::schema::{blocks, connections, likes, profiles, users};
use crate::services::fame;
use crate::services::notify::{Notice, NotificationKind};

/// Both sides of a new match, for client-side display.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MatchedPair {
    pub liker: PublicUser,
    pub liked: PublicUser,
}

#[derive(Debug)]
pub enum LikeOutcome {
    /// Like inserted; `matched` is set when this like completed a mutual pair.
    Created {
        is_match: bool,
        matched: Option<MatchedPair>,
    },
    /// The like already existed; nothing changed.
    AlreadyLiked,
    /// A block exists between the pair; the like was not recorded.
    Rejected,
}

#[derive(Debug)]
pub struct UnlikeOutcome {
    pub was_match: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum BlockOutcome {
    Blocked,
    AlreadyBlocked,
}

/// What to do with the connection record when a mutual like appears.
#[derive(Debug, PartialEq, Eq)]
enum ConnectionAction {
    Create,
    Reactivate,
    /// Both likes present implies already matched; no duplicate notification.
    AlreadyActive,
}

fn connection_action(existing: Option<&Connection>) -> ConnectionAction {
    match existing {
        None => ConnectionAction::Create,
        Some(c) if c.is_active => ConnectionAction::AlreadyActive,
        Some(_) => ConnectionAction::Reactivate,
    }
}

pub fn create_like(
    conn: &mut PgConnection,
    liker_profile_id: Uuid,
    liked_profile_id: Uuid,
) -> AppResult<(LikeOutcome, Vec<Notice>)> {
    if liker_profile_id == liked_profile_id {
        return Err(AppError::new(
            ErrorCode::CannotLikeSelf,
            "cannot like your own profile",
        ));
    }

    let mut notices = Vec::new();

    let outcome = conn.transaction::<_, AppError, _>(|conn| {
        let (liker, liked) = lock_pair_profiles(conn, liker_profile_id, liked_profile_id)?;

        // Re-checked under the row locks taken above.
        if block_exists_either_direction(conn, liker_profile_id, liked_profile_id)? {
            return Ok(LikeOutcome::Rejected);
        }

        let already_liked: Option<Uuid> = likes::table
            .filter(likes::liker_id.eq(liker_profile_id))
            .filter(likes::liked_id.eq(liked_profile_id))
            .select(likes::id)
            .first(conn)
            .optional()?;

        if already_liked.is_some() {
            return Ok(LikeOutcome::AlreadyLiked);
        }

        diesel::insert_into(likes::table)
            .values(&NewLike {
                liker_id: liker_profile_id,
                liked_id: liked_profile_id,
            })
            .execute(conn)?;

        let liker_user = public_user(conn, liker.user_id)?;
        let liked_user = public_user(conn, liked.user_id)?;

        notices.push(Notice::new(
            liked.user_id,
            liker.user_id,
            NotificationKind::Like,
            format!("{} liked your profile!", liker_user.first_name),
        ));

        let mutual: Option<Uuid> = likes::table
            .filter(likes::liker_id.eq(liked_profile_id))
            .filter(likes::liked_id.eq(liker_profile_id))
            .select(likes::id)
            .first(conn)
            .optional()?;

        if mutual.is_none() {
            return Ok(LikeOutcome::Created {
                is_match: false,
                matched: None,
            });
        }

        let existing = connection_between(conn, liker.user_id, liked.user_id)?;
        match connection_action(existing.as_ref()) {
            ConnectionAction::Create => {
                diesel::insert_into(connections::table)
                    .values(&NewConnection {
                        user1_id: liker.user_id,
                        user2_id: liked.user_id,
                        is_active: true,
                    })
                    .execute(conn)?;

                push_match_notices(
                    &mut notices,
                    &liker_user,
                    &liked_user,
                    NotificationKind::Match,
                );
            }
            ConnectionAction::Reactivate => {
                let existing = existing.expect("reactivate implies a connection row");
                diesel::update(connections::table.filter(connections::id.eq(existing.id)))
                    .set((
                        connections::is_active.eq(true),
                        connections::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;

                push_match_notices(
                    &mut notices,
                    &liker_user,
                    &liked_user,
                    NotificationKind::Rematch,
                );
            }
            ConnectionAction::AlreadyActive => {}
        }

        Ok(LikeOutcome::Created {
            is_match: true,
            matched: Some(MatchedPair {
                liker: liker_user,
                liked: liked_user,
            }),
        })
    })?;

    if matches!(outcome, LikeOutcome::Created { .. }) {
        fame::recompute_quietly(conn, liked_profile_id);
    }

    Ok((outcome, notices))
}

pub fn delete_like(
    conn: &mut PgConnection,
    liker_profile_id: Uuid,
    liked_profile_id: Uuid,
    both_ways: bool,
) -> AppResult<(UnlikeOutcome, Vec<Notice>)> {
    let mut notices = Vec::new();

    let outcome = conn.transaction::<_, AppError, _>(|conn| {
        let (liker, liked) = lock_pair_profiles(conn, liker_profile_id, liked_profile_id)?;

        let was_match: bool = diesel::select(diesel::dsl::exists(
            likes::table
                .filter(likes::liker_id.eq(liked_profile_id))
                .filter(likes::liked_id.eq(liker_profile_id)),
        ))
        .get_result(conn)?;

        let deleted = diesel::delete(
            likes::table
                .filter(likes::liker_id.eq(liker_profile_id))
                .filter(likes::liked_id.eq(liked_profile_id)),
        )
        .execute(conn)?;

        if deleted == 0 {
            return Err(AppError::new(ErrorCode::LikeNotFound, "like not found"));
        }

        let liker_user = public_user(conn, liker.user_id)?;
        let liked_user = public_user(conn, liked.user_id)?;

        notices.push(Notice::new(
            liked.user_id,
            liker.user_id,
            NotificationKind::Unlike,
            format!("{} no longer likes your profile.", liker_user.first_name),
        ));

        if was_match {
            if both_ways {
                diesel::delete(
                    likes::table
                        .filter(likes::liker_id.eq(liked_profile_id))
                        .filter(likes::liked_id.eq(liker_profile_id)),
                )
                .execute(conn)?;
            }

            deactivate_connection(conn, liker.user_id, liked.user_id)?;
            push_unmatch_notices(&mut notices, &liker_user, &liked_user);
        }

        Ok(UnlikeOutcome { was_match })
    })?;

    fame::recompute_quietly(conn, liked_profile_id);

    Ok((outcome, notices))
}

pub fn create_block(
    conn: &mut PgConnection,
    blocker_profile_id: Uuid,
    blocked_profile_id: Uuid,
) -> AppResult<(BlockOutcome, Vec<Notice>)> {
    if blocker_profile_id == blocked_profile_id {
        return Err(AppError::new(
            ErrorCode::CannotBlockSelf,
            "cannot block your own profile",
        ));
    }

    let mut notices = Vec::new();

    let outcome = conn.transaction::<_, AppError, _>(|conn| {
        let (blocker, blocked) = lock_pair_profiles(conn, blocker_profile_id, blocked_profile_id)?;

        let already: Option<Uuid> = blocks::table
            .filter(blocks::blocker_id.eq(blocker_profile_id))
            .filter(blocks::blocked_id.eq(blocked_profile_id))
            .select(blocks::id)
            .first(conn)
            .optional()?;

        if already.is_some() {
            return Ok(BlockOutcome::AlreadyBlocked);
        }

        // A block is a strict superset of unmatching: purge like/match state
        // in both directions before the block row lands, inside the same
        // transaction.
        purge_pair_likes(conn, &blocker, &blocked, &mut notices)?;

        diesel::insert_into(blocks::table)
            .values(&NewBlock {
                blocker_id: blocker_profile_id,
                blocked_id: blocked_profile_id,
            })
            .execute(conn)?;

        Ok(BlockOutcome::Blocked)
    })?;

    if outcome == BlockOutcome::Blocked {
        fame::recompute_quietly(conn, blocked_profile_id);
    }

    Ok((outcome, notices))
}

pub fn delete_block(
    conn: &mut PgConnection,
    blocker_profile_id: Uuid,
    blocked_profile_id: Uuid,
) -> AppResult<()> {
    let deleted = diesel::delete(
        blocks::table
            .filter(blocks::blocker_id.eq(blocker_profile_id))
            .filter(blocks::blocked_id.eq(blocked_profile_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(AppError::new(ErrorCode::BlockNotFound, "block not found"));
    }

    // Prior likes are not resurrected.
    Ok(())
}

/// Delete likes in both directions between a pair and deactivate the
/// connection when the pair was matched. Tolerates any prior state; used by
/// the block flow, which must never leave a stale like or match behind.
fn purge_pair_likes(
    conn: &mut PgConnection,
    blocker: &Profile,
    blocked: &Profile,
    notices: &mut Vec<Notice>,
) -> AppResult<()> {
    let forward = diesel::delete(
        likes::table
            .filter(likes::liker_id.eq(blocker.id))
            .filter(likes::liked_id.eq(blocked.id)),
    )
    .execute(conn)?;

    let reverse = diesel::delete(
        likes::table
            .filter(likes::liker_id.eq(blocked.id))
            .filter(likes::liked_id.eq(blocker.id)),
    )
    .execute(conn)?;

    let was_match = forward > 0 && reverse > 0;

    if forward > 0 || was_match {
        let blocker_user = public_user(conn, blocker.user_id)?;
        let blocked_user = public_user(conn, blocked.user_id)?;

        if forward > 0 {
            notices.push(Notice::new(
                blocked.user_id,
                blocker.user_id,
                NotificationKind::Unlike,
                format!("{} no longer likes your profile.", blocker_user.first_name),
            ));
        }

        if was_match {
            deactivate_connection(conn, blocker.user_id, blocked.user_id)?;
            push_unmatch_notices(notices, &blocker_user, &blocked_user);
        }
    }

    Ok(())
}

fn push_match_notices(
    notices: &mut Vec<Notice>,
    liker_user: &PublicUser,
    liked_user: &PublicUser,
    kind: NotificationKind,
) {
    let verb = match kind {
        NotificationKind::Rematch => "matched again with",
        _ => "matched with",
    };
    notices.push(Notice::new(
        liker_user.id,
        liked_user.id,
        kind,
        format!("You {verb} {}! You can chat now.", liked_user.first_name),
    ));
    notices.push(Notice::new(
        liked_user.id,
        liker_user.id,
        kind,
        format!("You {verb} {}! You can chat now.", liker_user.first_name),
    ));
}

fn push_unmatch_notices(notices: &mut Vec<Notice>, a: &PublicUser, b: &PublicUser) {
    notices.push(Notice::new(
        a.id,
        b.id,
        NotificationKind::Unmatch,
        format!("{} is no longer in your matches.", b.first_name),
    ));
    notices.push(Notice::new(
        b.id,
        a.id,
        NotificationKind::Unmatch,
        format!("{} is no longer in your matches.", a.first_name),
    ));
}

/// Lock both pair profiles in ascending id order and return them as
/// (first, second) of the caller's ordering. `ProfileNotFound` if either is
/// missing.
fn lock_pair_profiles(
    conn: &mut PgConnection,
    first_id: Uuid,
    second_id: Uuid,
) -> AppResult<(Profile, Profile)> {
    let rows: Vec<Profile> = profiles::table
        .filter(profiles::id.eq_any(vec![first_id, second_id]))
        .order(profiles::id.asc())
        .for_update()
        .load(conn)?;

    let find = |id: Uuid| rows.iter().find(|p| p.id == id).cloned();
    match (find(first_id), find(second_id)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found")),
    }
}

fn block_exists_either_direction(
    conn: &mut PgConnection,
    a: Uuid,
    b: Uuid,
) -> AppResult<bool> {
    let exists: bool = diesel::select(diesel::dsl::exists(
        blocks::table.filter(
            blocks::blocker_id
                .eq(a)
                .and(blocks::blocked_id.eq(b))
                .or(blocks::blocker_id.eq(b).and(blocks::blocked_id.eq(a))),
        ),
    ))
    .get_result(conn)?;
    Ok(exists)
}

fn connection_between(
    conn: &mut PgConnection,
    user_a: Uuid,
    user_b: Uuid,
) -> AppResult<Option<Connection>> {
    let found = connections::table
        .filter(
            connections::user1_id
                .eq(user_a)
                .and(connections::user2_id.eq(user_b))
                .or(connections::user1_id
                    .eq(user_b)
                    .and(connections::user2_id.eq(user_a))),
        )
        .first::<Connection>(conn)
        .optional()?;
    Ok(found)
}

fn deactivate_connection(conn: &mut PgConnection, user_a: Uuid, user_b: Uuid) -> AppResult<()> {
    diesel::update(
        connections::table.filter(
            connections::user1_id
                .eq(user_a)
                .and(connections::user2_id.eq(user_b))
                .or(connections::user1_id
                    .eq(user_b)
                    .and(connections::user2_id.eq(user_a))),
        ),
    )
    .set((
        connections::is_active.eq(false),
        connections::updated_at.eq(Utc::now()),
    ))
    .execute(conn)?;
    Ok(())
}

pub(crate) fn public_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<PublicUser> {
    let user = users::table
        .filter(users::id.eq(user_id))
        .select((
            users::id,
            users::username,
            users::first_name,
            users::last_name,
            users::is_online,
        ))
        .first::<PublicUser>(conn)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn connection(is_active: bool) -> Connection {
        Connection {
            id: Uuid::now_v7(),
            user1_id: Uuid::now_v7(),
            user2_id: Uuid::now_v7(),
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_pair_creates_a_connection() {
        assert_eq!(connection_action(None), ConnectionAction::Create);
    }

    #[test]
    fn inactive_connection_is_reactivated() {
        let c = connection(false);
        assert_eq!(connection_action(Some(&c)), ConnectionAction::Reactivate);
    }

    #[test]
    fn active_connection_is_left_alone() {
        let c = connection(true);
        assert_eq!(connection_action(Some(&c)), ConnectionAction::AlreadyActive);
    }
}
