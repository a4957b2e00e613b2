//! Directional eligibility rules based on declared gender and sexual
//! preference. This encodes who the viewer is interested in; mutual interest
//! is only required for matching, never for suggestion.

use diesel::helper_types::{InnerJoin, IntoBoxed};
use diesel::pg::Pg;
use diesel::prelude::*;

use crate::models::{Gender, Profile, SexualPreference};
use crate::schema::{profiles, users};

/// The boxed candidate query the suggestion ranker assembles filter by filter.
pub type CandidateQuery<'a> = IntoBoxed<'a, InnerJoin<profiles::table, users::table>, Pg>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub gender: Gender,
    pub preference: SexualPreference,
}

impl Orientation {
    pub fn of(profile: &Profile) -> Option<Orientation> {
        let gender = profile.gender.as_deref().and_then(Gender::parse)?;
        let preference = profile
            .sexual_preference
            .as_deref()
            .and_then(SexualPreference::parse)?;
        Some(Orientation { gender, preference })
    }
}

/// Whether `candidate` is an eligible suggestion for `viewer`.
pub fn is_eligible(viewer: &Orientation, candidate: &Orientation) -> bool {
    match viewer.preference {
        SexualPreference::Heterosexual => {
            candidate.gender == viewer.gender.opposite()
                && matches!(
                    candidate.preference,
                    SexualPreference::Heterosexual | SexualPreference::Bisexual
                )
        }
        SexualPreference::Homosexual => {
            candidate.gender == viewer.gender
                && matches!(
                    candidate.preference,
                    SexualPreference::Homosexual | SexualPreference::Bisexual
                )
        }
        SexualPreference::Bisexual => match candidate.preference {
            SexualPreference::Heterosexual => candidate.gender == viewer.gender.opposite(),
            SexualPreference::Homosexual => candidate.gender == viewer.gender,
            SexualPreference::Bisexual => true,
            SexualPreference::Other => false,
        },
        // "other" preference carries no gender/preference constraint.
        SexualPreference::Other => true,
    }
}

/// Apply the viewer's gender/preference rules to the candidate query. An
/// incomplete orientation (unset gender or preference) applies no filter; the
/// completeness precondition is enforced separately.
pub fn apply<'a>(query: CandidateQuery<'a>, viewer: &'a Profile) -> CandidateQuery<'a> {
    let Some(orientation) = Orientation::of(viewer) else {
        return query;
    };

    match orientation.preference {
        SexualPreference::Heterosexual => query
            .filter(profiles::gender.eq(orientation.gender.opposite().as_str()))
            .filter(profiles::sexual_preference.eq_any(vec!["heterosexual", "bisexual"])),
        SexualPreference::Homosexual => query
            .filter(profiles::gender.eq(orientation.gender.as_str()))
            .filter(profiles::sexual_preference.eq_any(vec!["homosexual", "bisexual"])),
        SexualPreference::Bisexual => query.filter(
            profiles::sexual_preference
                .eq("heterosexual")
                .and(profiles::gender.eq(orientation.gender.opposite().as_str()))
                .or(profiles::sexual_preference
                    .eq("homosexual")
                    .and(profiles::gender.eq(orientation.gender.as_str())))
                .or(profiles::sexual_preference.eq("bisexual")),
        ),
        SexualPreference::Other => query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn o(gender: Gender, preference: SexualPreference) -> Orientation {
        Orientation { gender, preference }
    }

    use Gender::{Female, Male};
    use SexualPreference::{Bisexual, Heterosexual, Homosexual, Other};

    #[test]
    fn heterosexual_male_viewer() {
        let viewer = o(Male, Heterosexual);
        assert!(is_eligible(&viewer, &o(Female, Heterosexual)));
        assert!(is_eligible(&viewer, &o(Female, Bisexual)));
        assert!(!is_eligible(&viewer, &o(Female, Homosexual)));
        assert!(!is_eligible(&viewer, &o(Male, Heterosexual)));
        assert!(!is_eligible(&viewer, &o(Male, Homosexual)));
    }

    #[test]
    fn homosexual_viewer_wants_same_gender() {
        let viewer = o(Female, Homosexual);
        assert!(is_eligible(&viewer, &o(Female, Homosexual)));
        assert!(is_eligible(&viewer, &o(Female, Bisexual)));
        assert!(!is_eligible(&viewer, &o(Female, Heterosexual)));
        assert!(!is_eligible(&viewer, &o(Male, Homosexual)));
    }

    #[test]
    fn bisexual_viewer_branches_on_candidate_preference() {
        let viewer = o(Male, Bisexual);
        // heterosexual candidates only when opposite gender
        assert!(is_eligible(&viewer, &o(Female, Heterosexual)));
        assert!(!is_eligible(&viewer, &o(Male, Heterosexual)));
        // homosexual candidates only when same gender
        assert!(is_eligible(&viewer, &o(Male, Homosexual)));
        assert!(!is_eligible(&viewer, &o(Female, Homosexual)));
        // bisexual candidates regardless of gender
        assert!(is_eligible(&viewer, &o(Male, Bisexual)));
        assert!(is_eligible(&viewer, &o(Female, Bisexual)));
    }

    #[test]
    fn other_preference_is_unconstrained_for_the_viewer() {
        let viewer = o(Male, Other);
        assert!(is_eligible(&viewer, &o(Male, Homosexual)));
        assert!(is_eligible(&viewer, &o(Female, Heterosexual)));
    }

    #[test]
    fn orientation_requires_both_fields() {
        let mut profile = blank_profile();
        assert!(Orientation::of(&profile).is_none());
        profile.gender = Some("male".into());
        assert!(Orientation::of(&profile).is_none());
        profile.sexual_preference = Some("bisexual".into());
        let got = Orientation::of(&profile).unwrap();
        assert_eq!(got, o(Male, Bisexual));
    }

    fn blank_profile() -> Profile {
        Profile {
            id: uuid::Uuid::nil(),
            user_id: uuid::Uuid::nil(),
            gender: None,
            sexual_preference: None,
            biography: None,
            latitude: None,
            longitude: None,
            birth_date: None,
            fame_rating: 0.0,
            is_complete: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }
}
