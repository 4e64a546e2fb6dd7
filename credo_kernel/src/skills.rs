/// StudentCredo — Skill Proficiency
///
/// Pure scoring of skills evidenced by approved achievements.
///
/// Every achievement that lists a skill is mapped to one SkillKind.
/// Each kind contributes `points * min(count, max_count)`:
///
///   certificate              5 × ≤2  (10)
///   competition-win         30 × ≤1  (30)
///   workshop                 5 × ≤1   (5)
///   internship              30 × ≤2  (60)
///   freelance               25 × ≤1  (25)
///   competition-participate  1 × ≤5   (5)
///
/// Two caps exist. The skills analysis clamps to PROFICIENCY_CAP (135),
/// the per-skill SkillScorer clamps to SCORER_CAP (105). They belong to
/// different views and are kept apart.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{Achievement, Status};
use crate::keywords::{
    any_contains_any, contains_any, normalize, CATEGORY_WIN_TERMS, CERTIFICATE_TERMS,
    COMPETITION_TERMS, PARTICIPATION_TERMS, WIN_TERMS, WORKSHOP_TERMS,
};

/// Cap of the skills-analysis proficiency.
pub const PROFICIENCY_CAP: u32 = 135;

/// Cap of the per-skill scorer.
pub const SCORER_CAP: u32 = 105;

/// Proficiency above which a skill counts as expert level.
pub const EXPERT_THRESHOLD: u32 = 80;

/// Proficiency below which a skill needs improvement.
pub const WEAK_THRESHOLD: u32 = 50;

/// Proficiency above which a skill is a strength.
pub const STRONG_THRESHOLD: u32 = 70;

/// Skill entries that are not skills. Matched exactly, case-insensitive.
pub const NON_SKILLS: &[&str] = &[
    // companies
    "ibm", "google", "microsoft", "amazon", "apple", "meta", "facebook", "netflix", "tesla",
    "uber", "airbnb", "spotify", "adobe", "oracle", "salesforce", "intel", "nvidia",
    "samsung", "sony", "hp", "dell",
    // generic terms
    "internship", "job", "work", "experience", "training", "course", "program", "workshop",
    "seminar", "conference", "event", "project", "competition", "contest", "hackathon",
    "bootcamp", "certification",
    // combinations
    "ibm internship", "google internship", "microsoft internship", "summer internship",
    "winter internship", "full time", "part time",
];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillKind {
    Certificate,
    CompetitionWin,
    Workshop,
    Internship,
    Freelance,
    CompetitionParticipate,
}

impl SkillKind {
    pub const ALL: [SkillKind; 6] = [
        SkillKind::Certificate,
        SkillKind::CompetitionWin,
        SkillKind::Workshop,
        SkillKind::Internship,
        SkillKind::Freelance,
        SkillKind::CompetitionParticipate,
    ];

    pub fn points(self) -> u32 {
        match self {
            SkillKind::Certificate => 5,
            SkillKind::CompetitionWin => 30,
            SkillKind::Workshop => 5,
            SkillKind::Internship => 30,
            SkillKind::Freelance => 25,
            SkillKind::CompetitionParticipate => 1,
        }
    }

    /// Occurrences beyond this count add nothing.
    pub fn max_count(self) -> u32 {
        match self {
            SkillKind::Certificate => 2,
            SkillKind::CompetitionWin => 1,
            SkillKind::Workshop => 1,
            SkillKind::Internship => 2,
            SkillKind::Freelance => 1,
            SkillKind::CompetitionParticipate => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillKind::Certificate => "certificate",
            SkillKind::CompetitionWin => "competition-win",
            SkillKind::Workshop => "workshop",
            SkillKind::Internship => "internship",
            SkillKind::Freelance => "freelance",
            SkillKind::CompetitionParticipate => "competition-participate",
        }
    }
}

/// Map one piece of evidence to a SkillKind. Never fails: unmatched
/// evidence rates as a certificate.
pub fn classify_skill_evidence(title: &str, category: &str, kind: Option<&str>) -> SkillKind {
    let title = normalize(title);
    let category = normalize(category);
    let kind = normalize(kind.unwrap_or(""));
    let fields = [title.as_str(), category.as_str(), kind.as_str()];

    let competitive = any_contains_any(&fields, COMPETITION_TERMS);
    let won = contains_any(&title, WIN_TERMS)
        || contains_any(&category, CATEGORY_WIN_TERMS)
        || contains_any(&kind, CATEGORY_WIN_TERMS);

    if competitive && won {
        SkillKind::CompetitionWin
    } else if any_contains_any(&fields, &["internship"]) || has_word(&title, "intern") {
        SkillKind::Internship
    } else if any_contains_any(&fields, &["freelanc"]) {
        SkillKind::Freelance
    } else if any_contains_any(&fields, CERTIFICATE_TERMS) {
        SkillKind::Certificate
    } else if any_contains_any(&fields, WORKSHOP_TERMS) {
        SkillKind::Workshop
    } else if any_contains_any(&fields, &["project"]) {
        SkillKind::Freelance
    } else if competitive || any_contains_any(&fields, PARTICIPATION_TERMS) {
        SkillKind::CompetitionParticipate
    } else {
        // programming, technical and academic evidence lands here too
        SkillKind::Certificate
    }
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}

/// Whether a listed skill is a real skill rather than a company,
/// a generic term, a stray character or a number.
pub fn is_valid_skill(skill: &str) -> bool {
    let trimmed = skill.trim();
    if trimmed.chars().count() < 2 {
        return false;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !NON_SKILLS.contains(&lower.as_str())
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn count_kinds(kinds: &[SkillKind]) -> BTreeMap<SkillKind, u32> {
    let mut counts = BTreeMap::new();
    for k in kinds {
        *counts.entry(*k).or_insert(0) += 1;
    }
    counts
}

/// Uncapped sum of capped per-kind contributions.
fn raw_score(counts: &BTreeMap<SkillKind, u32>) -> u32 {
    SkillKind::ALL
        .iter()
        .map(|k| counts.get(k).copied().unwrap_or(0).min(k.max_count()) * k.points())
        .sum()
}

/// Skills-analysis proficiency, clamped to PROFICIENCY_CAP.
pub fn skill_proficiency(kinds: &[SkillKind]) -> u32 {
    raw_score(&count_kinds(kinds)).min(PROFICIENCY_CAP)
}

// ---------------------------------------------------------------------------
// Skills analysis
// ---------------------------------------------------------------------------

/// One achievement evidencing a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillEvidence {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: String,
}

impl SkillEvidence {
    pub fn skill_kind(&self) -> SkillKind {
        classify_skill_evidence(&self.title, &self.category, self.kind.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillProfile {
    pub name: String,
    pub count: usize,
    /// Distinct categories in first-seen order; the first is primary.
    pub categories: Vec<String>,
    pub evidence: Vec<SkillEvidence>,
    pub proficiency: u32,
    pub verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsReport {
    pub skills: Vec<SkillProfile>,
    pub total_achievements: usize,
    pub approved_achievements: usize,
    pub verified_skills: usize,
}

/// Collect every valid skill of the approved achievements, in
/// first-seen order, and score it.
pub fn extract_skills(achievements: &[Achievement]) -> SkillsReport {
    let approved: Vec<&Achievement> = achievements
        .iter()
        .filter(|a| a.status == Status::Approved)
        .collect();

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut skills: Vec<SkillProfile> = Vec::new();

    for achievement in &approved {
        let category = if achievement.category.is_empty() {
            "General".to_string()
        } else {
            achievement.category.clone()
        };

        for skill in achievement.skills.iter().filter(|s| is_valid_skill(s)) {
            let evidence = SkillEvidence {
                title: achievement.title.clone(),
                kind: achievement.kind.clone(),
                category: category.clone(),
            };
            let slot = *index.entry(skill.as_str()).or_insert_with(|| {
                skills.push(SkillProfile {
                    name: skill.clone(),
                    count: 0,
                    categories: Vec::new(),
                    evidence: Vec::new(),
                    proficiency: 0,
                    verified: true,
                });
                skills.len() - 1
            });
            let profile = &mut skills[slot];
            profile.count += 1;
            if !profile.categories.contains(&category) {
                profile.categories.push(category.clone());
            }
            profile.evidence.push(evidence);
        }
    }

    for profile in &mut skills {
        let kinds: Vec<SkillKind> = profile.evidence.iter().map(|e| e.skill_kind()).collect();
        profile.proficiency = skill_proficiency(&kinds);
    }

    SkillsReport {
        verified_skills: skills.len(),
        skills,
        total_achievements: achievements.len(),
        approved_achievements: approved.len(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsSummary {
    /// Equals the approved achievement count.
    pub total_skills: usize,
    pub avg_proficiency: u32,
    pub expert_level: usize,
    pub areas_to_improve: usize,
}

/// Headline numbers of a skills report. The average rounds half up.
pub fn summarize(report: &SkillsReport) -> SkillsSummary {
    let n = report.skills.len() as u64;
    let sum: u64 = report.skills.iter().map(|s| s.proficiency as u64).sum();
    let avg_proficiency = if n == 0 { 0 } else { ((2 * sum + n) / (2 * n)) as u32 };

    SkillsSummary {
        total_skills: report.approved_achievements,
        avg_proficiency,
        expert_level: report
            .skills
            .iter()
            .filter(|s| s.proficiency > EXPERT_THRESHOLD)
            .count(),
        areas_to_improve: report
            .skills
            .iter()
            .filter(|s| s.proficiency < WEAK_THRESHOLD)
            .count(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    ImproveCoreSkills,
    LeverageStrengths,
    DiversifySkills,
    ContinuousLearning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
}

/// At most three suggestions derived from the scored skills.
pub fn recommendations(skills: &[SkillProfile]) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if let Some(weak) = skills.iter().find(|s| s.proficiency < WEAK_THRESHOLD) {
        recs.push(Recommendation {
            kind: RecommendationKind::ImproveCoreSkills,
            title: "Improve Core Skills".to_string(),
            description: format!(
                "Focus on strengthening {} through more achievements in this area.",
                weak.name
            ),
        });
    }
    if let Some(strong) = skills.iter().find(|s| s.proficiency > STRONG_THRESHOLD) {
        recs.push(Recommendation {
            kind: RecommendationKind::LeverageStrengths,
            title: "Leverage Your Strengths".to_string(),
            description: format!(
                "Your {} skills are excellent. Consider showcasing them in your digital passport.",
                strong.name
            ),
        });
    }
    if skills.len() < 5 {
        recs.push(Recommendation {
            kind: RecommendationKind::DiversifySkills,
            title: "Diversify Your Skills".to_string(),
            description: "Add more achievements to build a comprehensive skill profile."
                .to_string(),
        });
    }
    recs.push(Recommendation {
        kind: RecommendationKind::ContinuousLearning,
        title: "Continuous Learning".to_string(),
        description: "Explore new technologies and methodologies in your field to stay competitive."
            .to_string(),
    });

    recs.truncate(3);
    recs
}

// ---------------------------------------------------------------------------
// Per-skill scorer (105 cap)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    /// Occurrences that scored.
    pub count: u32,
    /// Occurrences seen.
    pub total_count: u32,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecommendation {
    pub kind: SkillKind,
    pub description: String,
    pub potential_gain: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillScore {
    pub total_score: u32,
    pub contributions: BTreeMap<SkillKind, Contribution>,
    pub recommendations: Vec<ScoreRecommendation>,
}

/// Scores a single skill with per-kind contributions and the three
/// most valuable next steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillScorer;

impl SkillScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, kinds: &[SkillKind]) -> SkillScore {
        let counts = count_kinds(kinds);
        let raw = raw_score(&counts);

        let mut contributions = BTreeMap::new();
        for kind in SkillKind::ALL {
            let total_count = counts.get(&kind).copied().unwrap_or(0);
            let count = total_count.min(kind.max_count());
            if count > 0 {
                contributions.insert(
                    kind,
                    Contribution {
                        count,
                        total_count,
                        score: count * kind.points(),
                    },
                );
            }
        }

        let recommendations = if raw >= SCORER_CAP {
            Vec::new()
        } else {
            let mut recs: Vec<ScoreRecommendation> = SkillKind::ALL
                .iter()
                .filter_map(|&kind| {
                    let have = contributions.get(&kind).map(|c| c.count).unwrap_or(0);
                    (have < kind.max_count()).then(|| ScoreRecommendation {
                        kind,
                        description: recommendation_text(kind).to_string(),
                        potential_gain: (kind.max_count() - have) * kind.points(),
                    })
                })
                .collect();
            recs.sort_by(|a, b| b.potential_gain.cmp(&a.potential_gain));
            recs.truncate(3);
            recs
        };

        SkillScore {
            total_score: raw.min(SCORER_CAP),
            contributions,
            recommendations,
        }
    }

    /// Score `skill` from the approved achievements that list it.
    pub fn score_skill(&self, achievements: &[Achievement], skill: &str) -> SkillScore {
        let kinds: Vec<SkillKind> = achievements
            .iter()
            .filter(|a| a.status == Status::Approved)
            .filter(|a| a.skills.iter().any(|s| s.eq_ignore_ascii_case(skill)))
            .map(|a| classify_skill_evidence(&a.title, &a.category, a.kind.as_deref()))
            .collect();
        self.score(&kinds)
    }
}

fn recommendation_text(kind: SkillKind) -> &'static str {
    match kind {
        SkillKind::Certificate => "Get a professional certification",
        SkillKind::CompetitionWin => "Win a competition in this skill area",
        SkillKind::Workshop => "Attend a relevant workshop",
        SkillKind::Internship => "Complete an internship",
        SkillKind::Freelance => "Work on a freelance project",
        SkillKind::CompetitionParticipate => "Participate in more competitions",
    }
}
