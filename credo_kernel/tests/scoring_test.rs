/// Golden scoring test. Scores a frozen achievement set and asserts
/// the recorded points, breakdown and skill proficiencies.
///
/// If this fails, the scoring rules changed. Bump KERNEL_VERSION and
/// regenerate the expectations deliberately; never edit them to match.

use std::fs;

use serde_json::Value;

use credo_kernel::activity::{activity_points_breakdown, calculate_activity_points};
use credo_kernel::domain::{Achievement, ActivityPointsBreakdown, Status};
use credo_kernel::passport::{categorize, passport_items};
use credo_kernel::skills::{
    extract_skills, skill_proficiency, summarize, SkillKind, SkillScorer, PROFICIENCY_CAP,
    SCORER_CAP,
};
use credo_kernel::KERNEL_VERSION;

fn load_golden() -> (Vec<Achievement>, Value) {
    let path = "tests/golden/achievements.json";
    let data = fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
    let doc: Value = serde_json::from_str(&data).expect("Failed to parse golden JSON");
    let achievements: Vec<Achievement> =
        serde_json::from_value(doc["achievements"].clone()).expect("Bad achievements");
    (achievements, doc["expected"].clone())
}

#[test]
fn golden_activity_points() {
    let (achievements, expected) = load_golden();
    assert_eq!(
        calculate_activity_points(&achievements) as u64,
        expected["activityPoints"].as_u64().unwrap()
    );
}

#[test]
fn golden_breakdown_matches_and_is_consistent() {
    let (achievements, expected) = load_golden();
    let breakdown = activity_points_breakdown(&achievements);
    let want: ActivityPointsBreakdown =
        serde_json::from_value(expected["breakdown"].clone()).unwrap();

    assert_eq!(breakdown, want);
    assert_eq!(breakdown.total, calculate_activity_points(&achievements));
}

#[test]
fn golden_skill_proficiency() {
    let (achievements, expected) = load_golden();
    let report = extract_skills(&achievements);

    let got: Vec<(String, u64)> = report
        .skills
        .iter()
        .map(|s| (s.name.clone(), s.proficiency as u64))
        .collect();
    let want: Vec<(String, u64)> = serde_json::from_value(expected["skills"].clone()).unwrap();
    assert_eq!(got, want);

    let python = &report.skills[0];
    assert_eq!(python.count, 5);
    assert_eq!(
        python.categories,
        vec!["competition", "internship", "freelancing", "workshop"]
    );
    assert!(report.skills.iter().all(|s| s.verified));
    assert_eq!(report.total_achievements, 9);
    assert_eq!(report.approved_achievements, 7);
}

#[test]
fn golden_summary() {
    let (achievements, expected) = load_golden();
    let summary = summarize(&extract_skills(&achievements));
    assert_eq!(serde_json::to_value(summary).unwrap(), expected["summary"]);
}

#[test]
fn scorer_caps_at_105() {
    let (achievements, _) = load_golden();
    let score = SkillScorer::new().score_skill(&achievements, "python");

    assert_eq!(score.total_score, SCORER_CAP);
    assert!(score.recommendations.is_empty());
    let internships = score.contributions[&SkillKind::Internship];
    assert_eq!(internships.count, 2);
    assert_eq!(internships.score, 60);
}

#[test]
fn internship_contribution_is_capped() {
    let five = [SkillKind::Internship; 5];
    assert_eq!(skill_proficiency(&five), 60);

    let score = SkillScorer::new().score(&five);
    let c = score.contributions[&SkillKind::Internship];
    assert_eq!((c.count, c.total_count, c.score), (2, 5, 60));
}

#[test]
fn proficiency_never_exceeds_cap() {
    let mut kinds = Vec::new();
    for kind in SkillKind::ALL {
        kinds.extend(std::iter::repeat(kind).take(10));
    }
    assert_eq!(skill_proficiency(&kinds), PROFICIENCY_CAP);
    assert_eq!(SkillScorer::new().score(&kinds).total_score, SCORER_CAP);
}

#[test]
fn another_approved_internship_adds_thirty() {
    let (mut achievements, _) = load_golden();
    let before = calculate_activity_points(&achievements);

    let mut extra = achievements[1].clone();
    extra.id = "g10".to_string();
    extra.title = "Winter Internship".to_string();
    extra.status = Status::Approved;
    achievements.push(extra);

    assert_eq!(calculate_activity_points(&achievements), before + 30);
}

#[test]
fn golden_passport_sections() {
    let (achievements, _) = load_golden();
    let items = passport_items(&achievements);
    assert_eq!(items.len(), 7);

    let sections = categorize(&items);
    assert_eq!(sections.competitions.len(), 2);
    assert_eq!(sections.professional.len(), 2);
    assert_eq!(sections.certifications.len(), 1);
    assert_eq!(sections.others.len(), 2);
}

#[test]
fn unknown_fields_survive() {
    let (achievements, _) = load_golden();
    assert_eq!(achievements[1].extra["company"], "Google");
    let round: Achievement =
        serde_json::from_str(&serde_json::to_string(&achievements[1]).unwrap()).unwrap();
    assert_eq!(round, achievements[1]);
}

#[test]
fn kernel_version_is_one() {
    assert_eq!(KERNEL_VERSION, 1);
}
