/// StudentCredo — State Construction
///
/// The four persisted records as one value, plus first-run seed data.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Achievement, BlockchainCredential, PendingApproval, Status, UserProfile};

/// Verifier recorded on credentials minted by the approval workflow.
pub const SYSTEM_VERIFIER: &str = "System Admin";

/// Every persisted record of one student session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredoState {
    pub achievements: Vec<Achievement>,
    pub pending_approvals: Vec<PendingApproval>,
    pub blockchain_credentials: Vec<BlockchainCredential>,
    pub user_profile: UserProfile,
}

/// The four approved sample achievements seeded on a first run,
/// back-dated relative to `now`.
pub fn sample_achievements(now: DateTime<Utc>) -> Vec<Achievement> {
    let days_ago = |d: i64| now - Duration::days(d);
    let extra = |pairs: &[(&str, Value)]| -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    };

    vec![
        Achievement {
            id: "sample_1".to_string(),
            title: "JavaScript Fundamentals Certificate".to_string(),
            description: "Completed comprehensive JavaScript programming course covering ES6+, \
                          DOM manipulation, and modern development practices."
                .to_string(),
            category: "certificate".to_string(),
            kind: None,
            skills: strings(&["JavaScript", "ES6+", "DOM Manipulation", "Async Programming"]),
            files: Vec::new(),
            status: Status::Approved,
            date_created: days_ago(30),
            date_approved: Some(days_ago(25)),
            submitted_date: None,
            review_date: None,
            issuer: "Tech Academy".to_string(),
            reason: None,
            extra: extra(&[(
                "verificationUrl",
                Value::from("https://techacademy.com/verify/js-cert-2024"),
            )]),
        },
        Achievement {
            id: "sample_2".to_string(),
            title: "Hackathon Winner - Smart City Solutions".to_string(),
            description: "First place winner in the National Smart City Hackathon 2024. \
                          Developed an IoT-based traffic management system."
                .to_string(),
            category: "competition-win".to_string(),
            kind: None,
            skills: strings(&["IoT", "Python", "Machine Learning", "System Design"]),
            files: Vec::new(),
            status: Status::Approved,
            date_created: days_ago(20),
            date_approved: Some(days_ago(18)),
            submitted_date: None,
            review_date: None,
            issuer: "National Innovation Council".to_string(),
            reason: None,
            extra: extra(&[
                ("prize", Value::from("First Place - ₹50,000")),
                ("teamSize", Value::from(4)),
            ]),
        },
        Achievement {
            id: "sample_3".to_string(),
            title: "Software Development Internship".to_string(),
            description: "Completed 3-month internship at TechCorp as Full Stack Developer. \
                          Worked on React.js and Node.js projects."
                .to_string(),
            category: "internship".to_string(),
            kind: None,
            skills: strings(&["React.js", "Node.js", "MongoDB", "Express.js", "Git"]),
            files: Vec::new(),
            status: Status::Approved,
            date_created: days_ago(15),
            date_approved: Some(days_ago(12)),
            submitted_date: None,
            review_date: None,
            issuer: String::new(),
            reason: None,
            extra: extra(&[
                ("company", Value::from("TechCorp Solutions")),
                ("duration", Value::from("3 months")),
                ("role", Value::from("Full Stack Developer Intern")),
            ]),
        },
        Achievement {
            id: "sample_4".to_string(),
            title: "AI/ML Workshop Participation".to_string(),
            description: "Attended intensive 2-day workshop on Artificial Intelligence and \
                          Machine Learning fundamentals with hands-on projects."
                .to_string(),
            category: "workshop".to_string(),
            kind: None,
            skills: strings(&["Python", "Machine Learning", "Data Analysis", "TensorFlow"]),
            files: Vec::new(),
            status: Status::Approved,
            date_created: days_ago(10),
            date_approved: Some(days_ago(8)),
            submitted_date: None,
            review_date: None,
            issuer: "AI Research Institute".to_string(),
            reason: None,
            extra: extra(&[("duration", Value::from("2 days"))]),
        },
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Minimal achievement for unit tests.
#[cfg(test)]
pub(crate) fn achievement_fixture(
    id: &str,
    title: &str,
    category: &str,
    status: Status,
) -> Achievement {
    use chrono::TimeZone;

    Achievement {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        category: category.to_string(),
        kind: None,
        skills: Vec::new(),
        files: Vec::new(),
        status,
        date_created: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        date_approved: None,
        submitted_date: None,
        review_date: None,
        issuer: String::new(),
        reason: None,
        extra: Map::new(),
    }
}
