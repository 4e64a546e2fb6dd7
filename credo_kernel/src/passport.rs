/// StudentCredo — Digital Passport
///
/// Read-only views over approved achievements: filtering, grouping by
/// section and skill de-duplication.

use serde::Serialize;

use crate::domain::{Achievement, Status, UserProfile};
use crate::keywords::normalize;

/// Portfolio section an achievement is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassportSection {
    Academic,
    Professional,
    Certifications,
    Competitions,
    Projects,
    Others,
}

impl PassportSection {
    pub const ALL: [PassportSection; 6] = [
        PassportSection::Academic,
        PassportSection::Professional,
        PassportSection::Certifications,
        PassportSection::Competitions,
        PassportSection::Projects,
        PassportSection::Others,
    ];

    /// First matching rule wins.
    pub fn for_category(category: &str) -> PassportSection {
        let c = normalize(category);
        let has = |terms: &[&str]| terms.iter().any(|t| c.contains(t));

        if has(&["academic", "education"]) {
            PassportSection::Academic
        } else if has(&["professional", "internship", "job"]) {
            PassportSection::Professional
        } else if has(&["certification", "certificate"]) {
            PassportSection::Certifications
        } else if has(&["competition", "contest"]) {
            PassportSection::Competitions
        } else if has(&["project"]) {
            PassportSection::Projects
        } else {
            PassportSection::Others
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PassportSection::Academic => "academic",
            PassportSection::Professional => "professional",
            PassportSection::Certifications => "certifications",
            PassportSection::Competitions => "competitions",
            PassportSection::Projects => "projects",
            PassportSection::Others => "others",
        }
    }
}

/// Achievements grouped by section, input order kept within each group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassportSections {
    pub academic: Vec<Achievement>,
    pub professional: Vec<Achievement>,
    pub certifications: Vec<Achievement>,
    pub competitions: Vec<Achievement>,
    pub projects: Vec<Achievement>,
    pub others: Vec<Achievement>,
}

impl PassportSections {
    pub fn get(&self, section: PassportSection) -> &[Achievement] {
        match section {
            PassportSection::Academic => &self.academic,
            PassportSection::Professional => &self.professional,
            PassportSection::Certifications => &self.certifications,
            PassportSection::Competitions => &self.competitions,
            PassportSection::Projects => &self.projects,
            PassportSection::Others => &self.others,
        }
    }

    fn bucket(&mut self, section: PassportSection) -> &mut Vec<Achievement> {
        match section {
            PassportSection::Academic => &mut self.academic,
            PassportSection::Professional => &mut self.professional,
            PassportSection::Certifications => &mut self.certifications,
            PassportSection::Competitions => &mut self.competitions,
            PassportSection::Projects => &mut self.projects,
            PassportSection::Others => &mut self.others,
        }
    }
}

/// Approved achievements only.
pub fn passport_items(achievements: &[Achievement]) -> Vec<Achievement> {
    achievements
        .iter()
        .filter(|a| a.status == Status::Approved)
        .cloned()
        .collect()
}

/// Case-insensitive search over title and description. `category` and
/// `status` must match exactly when given; empty strings match all.
pub fn filter_passport<'a>(
    items: &'a [Achievement],
    search: &str,
    category: Option<&str>,
    status: Option<Status>,
) -> Vec<&'a Achievement> {
    let needle = search.trim().to_lowercase();
    let category = category.map(normalize).filter(|c| !c.is_empty());

    items
        .iter()
        .filter(|a| {
            needle.is_empty()
                || a.title.to_lowercase().contains(&needle)
                || a.description.to_lowercase().contains(&needle)
        })
        .filter(|a| match &category {
            Some(c) => a.category.to_lowercase() == *c,
            None => true,
        })
        .filter(|a| status.map_or(true, |s| a.status == s))
        .collect()
}

pub fn categorize(achievements: &[Achievement]) -> PassportSections {
    let mut sections = PassportSections::default();
    for a in achievements {
        sections
            .bucket(PassportSection::for_category(&a.category))
            .push(a.clone());
    }
    sections
}

/// Distinct skills, first-seen order. Matching is exact.
pub fn unique_skills(achievements: &[Achievement]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for skill in achievements.iter().flat_map(|a| a.skills.iter()) {
        if !out.contains(skill) {
            out.push(skill.clone());
        }
    }
    out
}

/// One-paragraph portfolio blurb.
pub fn profile_summary(profile: &UserProfile, achievements: &[Achievement]) -> String {
    let has = |c: &str| achievements.iter().any(|a| a.category == c);

    let mut summary = format!(
        "A motivated and results-oriented {} student with a proven track record in ",
        profile.department
    );
    if has("competition") {
        summary.push_str("competitive programming and ");
    }
    if has("professional") || has("internship") {
        summary.push_str("professional development and ");
    }
    if has("project") {
        summary.push_str("project development and ");
    }
    summary.push_str(
        "academic excellence. Passionate about building innovative solutions and adept at \
         leading projects from concept to completion. Seeking challenging opportunities to \
         apply and expand technical skills.",
    );
    summary
}
