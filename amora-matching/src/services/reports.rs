use diesel::prelude::*;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewReport, Report};
use crate::schema::{profiles, reports};

fn validate_reason(reason: &str) -> AppResult<()> {
    if reason.trim().is_empty() {
        return Err(AppError::Validation("reason must not be empty".into()));
    }
    Ok(())
}

pub fn create_report(
    conn: &mut PgConnection,
    reporter_profile_id: Uuid,
    reported_profile_id: Uuid,
    reason: &str,
    description: Option<&str>,
) -> AppResult<Report> {
    if reporter_profile_id == reported_profile_id {
        return Err(AppError::new(
            ErrorCode::CannotReportSelf,
            "cannot report your own profile",
        ));
    }

    validate_reason(reason)?;

    let reported_exists: bool = diesel::select(diesel::dsl::exists(
        profiles::table.filter(profiles::id.eq(reported_profile_id)),
    ))
    .get_result(conn)?;

    if !reported_exists {
        return Err(AppError::new(
            ErrorCode::ProfileNotFound,
            "profile to report not found",
        ));
    }

    let report = diesel::insert_into(reports::table)
        .values(&NewReport {
            reporter_id: reporter_profile_id,
            reported_id: reported_profile_id,
            reason: reason.to_string(),
            description: description.map(str::to_string),
        })
        .get_result::<Report>(conn)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_reason_is_rejected() {
        assert!(matches!(
            validate_reason(""),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_reason("   "),
            Err(AppError::Validation(_))
        ));
        assert!(validate_reason("harassment").is_ok());
    }
}
