use serde::Serialize;

use super::{analyze, Compatibility, CompatibilityLevel};
use crate::reference::{FollowerSelection, ReferenceData, TypeCode};

/// Members scoring below this get a coaching recommendation
const LOW_COMPATIBILITY: u8 = 70;

#[derive(Debug, Clone, Serialize)]
pub struct TeamMemberAnalysis {
    pub follower: FollowerSelection,
    pub compatibility: Compatibility,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub code: TypeCode,
    pub members: Vec<TeamMemberAnalysis>,
    /// Mean member score, rounded
    pub overall_score: u8,
    pub overall_level: CompatibilityLevel,
    pub recommendations: Vec<String>,
}

/// Analyse a leader's code against every selected team member
pub fn team_report(
    reference: &ReferenceData,
    code: TypeCode,
    selections: &[FollowerSelection],
) -> TeamReport {
    let members: Vec<TeamMemberAnalysis> = selections
        .iter()
        .map(|selection| TeamMemberAnalysis {
            follower: selection.clone(),
            compatibility: analyze(&reference.compatibility, code, &selection.id),
        })
        .collect();

    let average = if members.is_empty() {
        0.0
    } else {
        members
            .iter()
            .map(|m| m.compatibility.score as f64)
            .sum::<f64>()
            / members.len() as f64
    };

    let recommendations = recommendations(code, &members);

    TeamReport {
        code,
        overall_score: average.round() as u8,
        overall_level: CompatibilityLevel::from_score(average),
        members,
        recommendations,
    }
}

fn recommendations(code: TypeCode, members: &[TeamMemberAnalysis]) -> Vec<String> {
    let mut out = Vec::new();

    if members
        .iter()
        .any(|m| m.compatibility.score < LOW_COMPATIBILITY)
    {
        out.push(
            "Compatibility with some members is low. Plan individual coaching and more frequent check-ins."
                .to_string(),
        );
    }

    let advice = match code {
        TypeCode::Lll => Some(
            "Work on giving the team clearer direction; pick one area (sharing, interaction or growth) to build first.",
        ),
        TypeCode::Hll => Some(
            "Strengthen interaction and growth orientation for a more balanced leadership style.",
        ),
        TypeCode::Lhl => Some("Develop sharing and growth orientation to move the team forward."),
        TypeCode::Llh => Some("Strengthen sharing and interaction to build team cohesion."),
        _ => None,
    };
    if let Some(advice) = advice {
        out.push(advice.to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(data: &ReferenceData, picks: &[(&str, &str)]) -> Vec<FollowerSelection> {
        picks
            .iter()
            .map(|(id, name)| data.followers.select(id, name).unwrap())
            .collect()
    }

    #[test]
    fn test_team_report_average_and_level() {
        let data = ReferenceData::builtin().unwrap();
        let team = select(&data, &[("driver", "Ana"), ("supporter", "Ben")]);

        // HHH: driver 95, supporter 90
        let report = team_report(&data, TypeCode::Hhh, &team);
        assert_eq!(report.members.len(), 2);
        assert_eq!(report.members[0].follower.member_name, "Ana");
        assert_eq!(report.overall_score, 93); // 92.5 rounds half away from zero
        assert_eq!(report.overall_level, CompatibilityLevel::Excellent);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_low_member_adds_recommendation() {
        let data = ReferenceData::builtin().unwrap();
        let team = select(&data, &[("follower", "Cy")]);

        // LLL: follower 50
        let report = team_report(&data, TypeCode::Lll, &team);
        assert_eq!(report.overall_score, 50);
        assert_eq!(report.overall_level, CompatibilityLevel::NeedsWork);
        assert_eq!(report.recommendations.len(), 2);
        assert!(report.recommendations[0].contains("individual coaching"));
        assert!(report.recommendations[1].contains("clearer direction"));
    }

    #[test]
    fn test_code_specific_advice_only_for_some_codes() {
        let data = ReferenceData::builtin().unwrap();
        let team = select(&data, &[("doer", "Dee")]);

        assert_eq!(team_report(&data, TypeCode::Lhh, &team).recommendations.len(), 0);
        assert_eq!(team_report(&data, TypeCode::Hll, &team).recommendations.len(), 1);
        assert_eq!(team_report(&data, TypeCode::Lhl, &team).recommendations.len(), 1);
        assert_eq!(team_report(&data, TypeCode::Llh, &team).recommendations.len(), 1);
    }

    #[test]
    fn test_empty_team() {
        let data = ReferenceData::builtin().unwrap();
        let report = team_report(&data, TypeCode::Hhl, &[]);
        assert!(report.members.is_empty());
        assert_eq!(report.overall_score, 0);
        assert_eq!(report.overall_level, CompatibilityLevel::NeedsWork);
    }
}
