//! Turns the model's free-form reply into a validated `NewJob`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ExtractionError;
use crate::types::{Category, ExperienceLevel, JobType, NewJob};
use crate::utils::{clean_optional, truncate_chars};

pub mod prompts;

pub const MAX_TITLE_CHARS: usize = 500;
pub const DESCRIPTION_FALLBACK_CHARS: usize = 500;

/// Raw extraction as the model returned it. Only `title` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedJob {
    pub title: String,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub skills: Option<Value>,
    #[serde(default)]
    pub budget: Option<Value>,
    #[serde(default)]
    pub client_location: Option<Value>,
    #[serde(default)]
    pub experience_level: Option<Value>,
    #[serde(default)]
    pub job_type: Option<Value>,
}

/// Parse a model reply into an `ExtractedJob`
pub fn parse_reply(content: &str) -> Result<ExtractedJob, ExtractionError> {
    let value = extract_json(content)?;
    serde_json::from_value(value)
        .map_err(|e| ExtractionError::Parse(format!("reply is missing required fields: {e}")))
}

/// Find the JSON object in a model reply: whole text, fenced block, or first `{` to last `}`
pub fn extract_json(content: &str) -> Result<Value, ExtractionError> {
    let candidates = [
        Some(content.trim()),
        Some(strip_json_fences(content)),
        brace_slice(content),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            if value.is_object() {
                return Ok(value);
            }
        }
    }

    Err(ExtractionError::Parse(format!(
        "no JSON object found in reply: {}",
        truncate_chars(content.trim(), 200)
    )))
}

/// Strips ```json ... ``` or ``` ... ``` code fences
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

fn brace_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Validate and normalize an extraction. Pure: same input, same output.
pub fn normalize(extracted: ExtractedJob, raw_text: &str) -> Result<NewJob, ExtractionError> {
    let title = extracted.title.trim();
    if title.is_empty() {
        return Err(ExtractionError::Parse("reply has an empty title".to_string()));
    }

    let category = extracted.category.map(category_from_value).unwrap_or_default();

    let description = clean_optional(extracted.description.and_then(value_to_text))
        .unwrap_or_else(|| truncate_chars(raw_text.trim(), DESCRIPTION_FALLBACK_CHARS));

    Ok(NewJob {
        title: truncate_chars(title, MAX_TITLE_CHARS),
        category,
        description,
        skills: normalize_skills(extracted.skills),
        budget: clean_optional(extracted.budget.and_then(value_to_text)),
        client_location: clean_optional(extracted.client_location.and_then(value_to_text)),
        experience_level: extracted
            .experience_level
            .and_then(value_to_text)
            .and_then(|level| ExperienceLevel::parse_loose(&level)),
        job_type: extracted
            .job_type
            .and_then(value_to_text)
            .and_then(|kind| JobType::parse_loose(&kind)),
        raw_text: raw_text.to_string(),
    })
}

/// Accepts a JSON list or a comma-separated string; trims, drops blanks and case-insensitive repeats
fn normalize_skills(skills: Option<Value>) -> Vec<String> {
    let items: Vec<String> = match skills {
        Some(Value::Array(values)) => values.into_iter().filter_map(value_to_text).collect(),
        Some(Value::String(text)) => text.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

/// A list picks its first known label; anything else unusable becomes `Other`
fn category_from_value(value: Value) -> Category {
    match value {
        Value::Array(values) => values
            .into_iter()
            .filter_map(value_to_text)
            .map(|label| Category::from_label(&label))
            .find(|category| *category != Category::Other)
            .unwrap_or_default(),
        other => value_to_text(other)
            .map(|label| Category::from_label(&label))
            .unwrap_or_default(),
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "Looking for a Python developer to build web scraper...";

    #[test]
    fn test_extract_json_direct() {
        let value = extract_json(r#"{"title": "Test", "category": "Other"}"#).unwrap();
        assert_eq!(value["title"], "Test");
    }

    #[test]
    fn test_extract_json_from_markdown_fence() {
        let content = "```json\n{\"title\": \"ML Engineer\"}\n```";
        assert_eq!(extract_json(content).unwrap()["title"], "ML Engineer");
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let content = r#"Here is the result:
        {"title": "Test Job", "category": "Web Development", "skills": ["Python"]}

        Let me know if you need anything else!"#;

        let value = extract_json(content).unwrap();
        assert_eq!(value["title"], "Test Job");
        assert_eq!(value["category"], "Web Development");
    }

    #[test]
    fn test_extract_json_failure() {
        let err = extract_json("This contains no valid JSON").unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }

    #[test]
    fn test_extract_json_rejects_non_object() {
        assert!(extract_json("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_parse_reply_requires_title() {
        let err = parse_reply(r#"{"category": "DevOps"}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }

    #[test]
    fn test_normalize_full_reply() {
        let extracted = parse_reply(
            r#"{
                "title": "Web Scraper Developer",
                "category": "Web Scraping",
                "description": "Build a web scraper for e-commerce",
                "skills": ["Python", "BeautifulSoup"],
                "budget": "$300",
                "client_location": "USA",
                "experience_level": "Intermediate",
                "job_type": "Fixed"
            }"#,
        )
        .unwrap();

        let job = normalize(extracted, RAW).unwrap();
        assert_eq!(job.title, "Web Scraper Developer");
        assert_eq!(job.category, Category::WebScraping);
        assert_eq!(job.skills, vec!["Python", "BeautifulSoup"]);
        assert_eq!(job.budget.as_deref(), Some("$300"));
        assert_eq!(job.client_location.as_deref(), Some("USA"));
        assert_eq!(job.experience_level, Some(ExperienceLevel::Intermediate));
        assert_eq!(job.job_type, Some(JobType::Fixed));
        assert_eq!(job.raw_text, RAW);
    }

    #[test]
    fn test_normalize_defaults_missing_fields() {
        let extracted = parse_reply(r#"{"title": "Developer", "budget": null, "skills": null}"#).unwrap();
        let job = normalize(extracted, RAW).unwrap();

        assert_eq!(job.category, Category::Other);
        assert!(job.skills.is_empty());
        assert_eq!(job.budget, None);
        assert_eq!(job.experience_level, None);
        assert_eq!(job.job_type, None);
        assert_eq!(job.description, RAW);
    }

    #[test]
    fn test_unknown_category_becomes_other() {
        let extracted = parse_reply(r#"{"title": "Dev", "category": "Quantum Knitting"}"#).unwrap();
        assert_eq!(normalize(extracted, RAW).unwrap().category, Category::Other);
    }

    #[test]
    fn test_every_valid_category_is_kept() {
        for category in Category::ALL {
            let reply = format!(r#"{{"title": "Dev", "category": "{}"}}"#, category.label().to_uppercase());
            let job = normalize(parse_reply(&reply).unwrap(), RAW).unwrap();
            assert_eq!(job.category, category);
        }
    }

    #[test]
    fn test_invalid_enums_fall_back() {
        let extracted = parse_reply(
            r#"{"title": "Dev", "experience_level": "Wizard", "job_type": "Barter"}"#,
        )
        .unwrap();
        let job = normalize(extracted, RAW).unwrap();
        assert_eq!(job.experience_level, None);
        assert_eq!(job.job_type, None);
    }

    #[test]
    fn test_non_string_category_and_enums_do_not_reject_reply() {
        let extracted = parse_reply(
            r#"{"title": "Dev", "category": ["Web Scraping", "Automation"], "experience_level": 2, "job_type": {"kind": "hourly"}}"#,
        )
        .unwrap();
        let job = normalize(extracted, RAW).unwrap();
        assert_eq!(job.category, Category::WebScraping);
        assert_eq!(job.experience_level, None);
        assert_eq!(job.job_type, None);

        let extracted = parse_reply(
            r#"{"title": "Dev", "category": 7, "description": ["x"], "client_location": false}"#,
        )
        .unwrap();
        let job = normalize(extracted, RAW).unwrap();
        assert_eq!(job.category, Category::Other);
        assert_eq!(job.description, RAW);
        assert_eq!(job.client_location, None);
    }

    #[test]
    fn test_category_list_without_known_label_becomes_other() {
        let extracted = parse_reply(r#"{"title": "Dev", "category": ["Knitting", 3]}"#).unwrap();
        assert_eq!(normalize(extracted, RAW).unwrap().category, Category::Other);
    }

    #[test]
    fn test_skills_as_comma_string_are_split_and_deduped() {
        let extracted = parse_reply(r#"{"title": "Dev", "skills": "Rust, tokio , ,rust, SQL"}"#).unwrap();
        let job = normalize(extracted, RAW).unwrap();
        assert_eq!(job.skills, vec!["Rust", "tokio", "SQL"]);
    }

    #[test]
    fn test_numeric_budget_is_kept_as_text() {
        let extracted = parse_reply(r#"{"title": "Dev", "budget": 500}"#).unwrap();
        assert_eq!(normalize(extracted, RAW).unwrap().budget.as_deref(), Some("500"));
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let extracted = parse_reply(r#"{"title": "   "}"#).unwrap();
        assert!(matches!(normalize(extracted, RAW), Err(ExtractionError::Parse(_))));
    }

    #[test]
    fn test_long_title_is_truncated() {
        let extracted = ExtractedJob {
            title: "x".repeat(MAX_TITLE_CHARS + 20),
            ..Default::default()
        };
        assert_eq!(normalize(extracted, RAW).unwrap().title.len(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        assert_eq!(strip_json_fences("```\n{\"key\": 1}\n```"), "{\"key\": 1}");
        assert_eq!(strip_json_fences("{\"key\": 1}"), "{\"key\": 1}");
    }
}
