/// StudentCredo — Activity Points
///
/// Pure scoring over achievement lists. Only approved achievements
/// earn points. Each achievement is classified once, first matching
/// rule wins, against its lower-cased category and title:
///
///   1. competition term + win term  → 30
///   2. internship                   → 30
///   3. freelancing                  → 25
///   4. certificate / certification  →  5
///   5. workshop / seminar           →  5
///   6. competition / participation  →  1
///   7. exact category lookup in CATEGORY_POINTS, else 0
///
/// The total and the per-bucket breakdown share this classifier, so
/// `activity_points_breakdown(a).total == calculate_activity_points(a)`.

use crate::domain::{Achievement, ActivityPointsBreakdown, CategoryTally, Status};
use crate::keywords::{
    any_contains_any, contains_any, normalize, CATEGORY_WIN_TERMS, CERTIFICATE_TERMS,
    COMPETITION_TERMS, PARTICIPATION_TERMS, WIN_TERMS, WORKSHOP_TERMS,
};

pub const COMPETITION_WIN_POINTS: u32 = 30;
pub const INTERNSHIP_POINTS: u32 = 30;
pub const FREELANCING_POINTS: u32 = 25;
pub const CERTIFICATE_POINTS: u32 = 5;
pub const WORKSHOP_POINTS: u32 = 5;
pub const PARTICIPATION_POINTS: u32 = 1;

/// Exact-category fallback table (rule 7).
pub const CATEGORY_POINTS: &[(&str, u32, ActivityBucket)] = &[
    ("certificate", 5, ActivityBucket::Certificates),
    ("certification", 5, ActivityBucket::Certificates),
    ("competition", 30, ActivityBucket::Competitions),
    ("contest", 30, ActivityBucket::Competitions),
    ("workshop", 5, ActivityBucket::Workshops),
    ("seminar", 5, ActivityBucket::Workshops),
    ("internship", 30, ActivityBucket::Internships),
    ("freelancing", 25, ActivityBucket::Freelancing),
    ("freelance", 25, ActivityBucket::Freelancing),
    ("participate", 1, ActivityBucket::Participation),
    ("participation", 1, ActivityBucket::Participation),
    ("participating", 1, ActivityBucket::Participation),
];

/// Display bucket of the breakdown view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityBucket {
    Certificates,
    Competitions,
    Workshops,
    Internships,
    Freelancing,
    Participation,
}

/// Outcome of classifying one achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityClass {
    pub bucket: ActivityBucket,
    pub points: u32,
}

/// Classify an achievement regardless of its status.
/// Returns `None` when no rule matches (0 points).
pub fn classify_activity(achievement: &Achievement) -> Option<ActivityClass> {
    let category = normalize(&achievement.category);
    let title = normalize(&achievement.title);
    let fields = [category.as_str(), title.as_str()];

    let class = |bucket, points| Some(ActivityClass { bucket, points });

    let competitive = any_contains_any(&fields, COMPETITION_TERMS);
    let won = contains_any(&title, WIN_TERMS) || contains_any(&category, CATEGORY_WIN_TERMS);

    if competitive && won {
        return class(ActivityBucket::Competitions, COMPETITION_WIN_POINTS);
    }
    if any_contains_any(&fields, &["internship"]) {
        return class(ActivityBucket::Internships, INTERNSHIP_POINTS);
    }
    if any_contains_any(&fields, &["freelanc"]) {
        return class(ActivityBucket::Freelancing, FREELANCING_POINTS);
    }
    if any_contains_any(&fields, CERTIFICATE_TERMS) {
        return class(ActivityBucket::Certificates, CERTIFICATE_POINTS);
    }
    if any_contains_any(&fields, WORKSHOP_TERMS) {
        return class(ActivityBucket::Workshops, WORKSHOP_POINTS);
    }
    if competitive || contains_any(&title, PARTICIPATION_TERMS) {
        return class(ActivityBucket::Participation, PARTICIPATION_POINTS);
    }

    CATEGORY_POINTS
        .iter()
        .find(|(key, _, _)| *key == category)
        .map(|&(_, points, bucket)| ActivityClass { bucket, points })
}

/// Points a single achievement is worth once approved.
pub fn activity_points(achievement: &Achievement) -> u32 {
    classify_activity(achievement).map(|c| c.points).unwrap_or(0)
}

/// Sum of points over approved achievements.
pub fn calculate_activity_points(achievements: &[Achievement]) -> u32 {
    achievements
        .iter()
        .filter(|a| a.status == Status::Approved)
        .map(activity_points)
        .sum()
}

/// Per-bucket counts and points over approved achievements.
pub fn activity_points_breakdown(achievements: &[Achievement]) -> ActivityPointsBreakdown {
    let mut breakdown = ActivityPointsBreakdown::default();

    for achievement in achievements.iter().filter(|a| a.status == Status::Approved) {
        let Some(class) = classify_activity(achievement) else {
            continue;
        };
        let tally: &mut CategoryTally = match class.bucket {
            ActivityBucket::Certificates => &mut breakdown.certificates,
            ActivityBucket::Competitions => &mut breakdown.competitions,
            ActivityBucket::Workshops => &mut breakdown.workshops,
            ActivityBucket::Internships => &mut breakdown.internships,
            ActivityBucket::Freelancing => &mut breakdown.freelancing,
            ActivityBucket::Participation => &mut breakdown.participation,
        };
        tally.count += 1;
        tally.points += class.points;
        breakdown.total += class.points;
    }

    breakdown
}
