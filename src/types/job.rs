// src/types/job.rs
use chrono::{DateTime, Utc};
use std::fmt;

/// Job category. The set is closed: anything the model invents becomes `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    WebScraping,
    ComputerVision,
    MachineLearning,
    DataScience,
    WebDevelopment,
    MobileDevelopment,
    ApiDevelopment,
    Automation,
    NaturalLanguageProcessing,
    LargeLanguageModels,
    CloudComputing,
    AgentDevelopment,
    DataEngineering,
    DevOps,
    Database,
    DesktopApplication,
    BotDevelopment,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 18] = [
        Category::WebScraping,
        Category::ComputerVision,
        Category::MachineLearning,
        Category::DataScience,
        Category::WebDevelopment,
        Category::MobileDevelopment,
        Category::ApiDevelopment,
        Category::Automation,
        Category::NaturalLanguageProcessing,
        Category::LargeLanguageModels,
        Category::CloudComputing,
        Category::AgentDevelopment,
        Category::DataEngineering,
        Category::DevOps,
        Category::Database,
        Category::DesktopApplication,
        Category::BotDevelopment,
        Category::Other,
    ];

    /// Human-readable label, also the value stored in the database
    pub fn label(&self) -> &'static str {
        match self {
            Category::WebScraping => "Web Scraping",
            Category::ComputerVision => "Computer Vision",
            Category::MachineLearning => "Machine Learning",
            Category::DataScience => "Data Science",
            Category::WebDevelopment => "Web Development",
            Category::MobileDevelopment => "Mobile Development",
            Category::ApiDevelopment => "API Development",
            Category::Automation => "Automation",
            Category::NaturalLanguageProcessing => "Natural Language Processing",
            Category::LargeLanguageModels => "Large Language Models",
            Category::CloudComputing => "Cloud Computing",
            Category::AgentDevelopment => "Agent Development",
            Category::DataEngineering => "Data Engineering",
            Category::DevOps => "DevOps",
            Category::Database => "Database",
            Category::DesktopApplication => "Desktop Application",
            Category::BotDevelopment => "Bot Development",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive lookup by label. Unknown labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        let wanted = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .unwrap_or_default()
    }

    /// Comma-separated list of every label, used in the extraction prompt
    pub fn prompt_list() -> String {
        Self::ALL
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceLevel {
    Entry,
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Expert => "Expert",
        }
    }

    /// Lenient parse of whatever wording the model used
    pub fn parse_loose(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return None;
        }
        if value.starts_with("entry") || value == "beginner" || value == "junior" {
            Some(ExperienceLevel::Entry)
        } else if value.starts_with("intermediate") || value == "mid" || value == "mid-level" {
            Some(ExperienceLevel::Intermediate)
        } else if value.starts_with("expert") || value == "senior" {
            Some(ExperienceLevel::Expert)
        } else {
            None
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    Fixed,
    Hourly,
}

impl JobType {
    pub fn label(&self) -> &'static str {
        match self {
            JobType::Fixed => "Fixed",
            JobType::Hourly => "Hourly",
        }
    }

    pub fn parse_loose(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        if value.contains("hour") {
            Some(JobType::Hourly)
        } else if value.contains("fixed") {
            Some(JobType::Fixed)
        } else {
            None
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated job that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub category: Category,
    pub description: String,
    pub skills: Vec<String>,
    pub budget: Option<String>,
    pub client_location: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub job_type: Option<JobType>,
    pub raw_text: String,
}

/// A stored job record
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub description: String,
    pub skills: Vec<String>,
    pub budget: Option<String>,
    pub client_location: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub job_type: Option<JobType>,
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn skills_display(&self) -> String {
        self.skills.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_label_is_case_insensitive() {
        assert_eq!(Category::from_label("web scraping"), Category::WebScraping);
        assert_eq!(Category::from_label("  DevOps "), Category::DevOps);
        assert_eq!(Category::from_label("API DEVELOPMENT"), Category::ApiDevelopment);
    }

    #[test]
    fn test_unknown_category_falls_back_to_other() {
        assert_eq!(Category::from_label("Underwater Basket Weaving"), Category::Other);
        assert_eq!(Category::from_label(""), Category::Other);
    }

    #[test]
    fn test_every_label_round_trips() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), category);
        }
    }

    #[test]
    fn test_prompt_list_contains_expected_categories() {
        let list = Category::prompt_list();
        for expected in ["Web Scraping", "Large Language Models", "Agent Development", "Other"] {
            assert!(list.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn test_experience_level_parse_loose() {
        assert_eq!(ExperienceLevel::parse_loose("Entry Level"), Some(ExperienceLevel::Entry));
        assert_eq!(ExperienceLevel::parse_loose("intermediate"), Some(ExperienceLevel::Intermediate));
        assert_eq!(ExperienceLevel::parse_loose("EXPERT"), Some(ExperienceLevel::Expert));
        assert_eq!(ExperienceLevel::parse_loose("guru"), None);
        assert_eq!(ExperienceLevel::parse_loose(""), None);
    }

    #[test]
    fn test_job_type_parse_loose() {
        assert_eq!(JobType::parse_loose("Hourly"), Some(JobType::Hourly));
        assert_eq!(JobType::parse_loose("$25 per hour"), Some(JobType::Hourly));
        assert_eq!(JobType::parse_loose("Fixed-price"), Some(JobType::Fixed));
        assert_eq!(JobType::parse_loose("contract"), None);
    }
}
