use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{
    blocks, connections, likes, profile_pictures, profiles, reports, tags, users, visits,
};

// --- Declared identity enums ---
//
// Stored as varchar; parsed where the compatibility rules need them.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non_binary",
            Gender::Other => "other",
        }
    }

    /// The gender a heterosexual person of this gender is interested in.
    pub fn opposite(&self) -> Gender {
        match self {
            Gender::Male => Gender::Female,
            _ => Gender::Male,
        }
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "non_binary" => Some(Gender::NonBinary),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SexualPreference {
    Heterosexual,
    Homosexual,
    Bisexual,
    Other,
}

impl SexualPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            SexualPreference::Heterosexual => "heterosexual",
            SexualPreference::Homosexual => "homosexual",
            SexualPreference::Bisexual => "bisexual",
            SexualPreference::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<SexualPreference> {
        match s {
            "heterosexual" => Some(SexualPreference::Heterosexual),
            "homosexual" => Some(SexualPreference::Homosexual),
            "bisexual" => Some(SexualPreference::Bisexual),
            "other" => Some(SexualPreference::Other),
            _ => None,
        }
    }
}

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_online: bool,
    pub last_online: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Public display fields exposed to other users.
#[derive(Debug, Clone, Queryable, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_online: bool,
}

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gender: Option<String>,
    pub sexual_preference: Option<String>,
    pub biography: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub birth_date: Option<NaiveDate>,
    pub fame_rating: f64,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub fame_rating: f64,
    pub is_complete: bool,
}

// --- Tag ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = tags)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

// --- Picture ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profile_pictures)]
pub struct ProfilePicture {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub file_path: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

// --- Like ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = likes)]
pub struct Like {
    pub id: Uuid,
    pub liker_id: Uuid,
    pub liked_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub liker_id: Uuid,
    pub liked_id: Uuid,
}

// --- Block ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = blocks)]
pub struct Block {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blocks)]
pub struct NewBlock {
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
}

// --- Connection (mutual match) ---
//
// Persisted as a user-id pair. Never deleted, only deactivated, so match
// history survives unmatching.

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = connections)]
pub struct Connection {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = connections)]
pub struct NewConnection {
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub is_active: bool,
}

// --- Visit ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = visits)]
pub struct Visit {
    pub id: Uuid,
    pub visitor_id: Uuid,
    pub visited_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = visits)]
pub struct NewVisit {
    pub visitor_id: Uuid,
    pub visited_id: Uuid,
}

// --- Report ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = reports)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
}
