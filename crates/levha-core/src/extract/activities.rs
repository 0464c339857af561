//! Business activity (faaliyet) extraction.

use super::patterns::{
    ACTIVITY_BOILERPLATE, ACTIVITY_LINE, ACTIVITY_TRAILING_YEAR, DENSE_ACTIVITY,
};
use super::FieldExtractor;
use crate::models::ActivityEntry;

const MIN_DESCRIPTION: usize = 4;

/// Extracts `code - description` activity lines.
#[derive(Debug, Default)]
pub struct ActivityExtractor;

impl ActivityExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for ActivityExtractor {
    type Output = ActivityEntry;

    fn extract_all(&self, text: &str) -> Vec<ActivityEntry> {
        let mut activities: Vec<ActivityEntry> = Vec::new();

        for line in text.lines() {
            let Some(caps) = ACTIVITY_LINE.captures(line) else {
                continue;
            };
            let description = clean_description(&caps[2]);
            push_unique(&mut activities, &caps[1], description);
        }

        if activities.is_empty() {
            for caps in DENSE_ACTIVITY.captures_iter(text) {
                push_unique(&mut activities, &caps[1], caps[2].trim().to_string());
            }
        }

        activities
    }
}

/// Cut trailing boilerplate (calendar, declaration, approval, tax base
/// columns) and a trailing year.
fn clean_description(raw: &str) -> String {
    let mut description = raw;
    if let Some(m) = ACTIVITY_BOILERPLATE.find(description) {
        if m.start() > 0 {
            description = &description[..m.start()];
        }
    }
    ACTIVITY_TRAILING_YEAR
        .replace(description, "")
        .trim()
        .to_string()
}

fn push_unique(activities: &mut Vec<ActivityEntry>, code: &str, description: String) {
    if description.chars().count() < MIN_DESCRIPTION
        || !description.chars().any(char::is_alphabetic)
        || activities.iter().any(|a| a.code == code)
    {
        return;
    }
    activities.push(ActivityEntry::new(code, description));
}

/// Extract activities from the text.
pub fn extract_activities(text: &str) -> Vec<ActivityEntry> {
    ActivityExtractor::new().extract_all(text)
}
