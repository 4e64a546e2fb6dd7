/// StudentCredo — Keyword Primitives
///
/// All classification in the kernel is case-insensitive substring
/// matching against fixed term lists. The lists live here so the
/// activity-point rules and the skill-type rules share one vocabulary.

/// Terms marking a competitive event.
pub const COMPETITION_TERMS: &[&str] = &["competition", "contest", "hackathon"];

/// Terms in a title marking a podium finish.
pub const WIN_TERMS: &[&str] = &[
    "win", "won", "winner", "1st", "first", "champion", "gold", "silver", "bronze",
];

/// Win terms that also count when they appear in the category.
pub const CATEGORY_WIN_TERMS: &[&str] = &["win", "winner", "champion"];

pub const PARTICIPATION_TERMS: &[&str] = &["participate", "participating", "participation"];

pub const CERTIFICATE_TERMS: &[&str] = &["certificate", "certification"];

pub const WORKSHOP_TERMS: &[&str] = &["workshop", "seminar"];

/// Lower-case and trim a free-text field.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// True when `haystack` contains any of `terms`.
///
/// `haystack` must already be lower-cased.
pub fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| haystack.contains(t))
}

/// True when any of the lower-cased fields contains any of `terms`.
pub fn any_contains_any(fields: &[&str], terms: &[&str]) -> bool {
    fields.iter().any(|f| contains_any(f, terms))
}
