// Prompt text for job extraction.

use crate::types::Category;

/// Instructions sent as the system message. The category list comes from `Category::ALL`.
pub fn extraction_system_prompt() -> String {
    format!(
        r#"You are an expert at parsing Upwork job postings. Given a raw job posting text, extract the following information in JSON format:

1. title: The job title (create a concise one if not explicitly stated)
2. category: Classify the job into ONE of these categories: {categories}
3. description: A brief summary of what the job requires (2-3 sentences)
4. skills: A list of required/preferred skills mentioned
5. budget: The budget information if mentioned (e.g., "$50-100", "$25/hr", "Fixed: $500")
6. client_location: The client's location if mentioned
7. experience_level: The required experience level if mentioned (Entry, Intermediate, Expert)
8. job_type: "Fixed" or "Hourly" based on the job posting

IMPORTANT:
- Always respond with valid JSON only, no additional text
- Choose the most appropriate category based on the primary focus of the job
- If information is not available, use null for optional fields
- For skills, extract specific technologies, tools, and competencies mentioned

Example output:
{{
    "title": "Build Web Scraper for E-commerce Sites",
    "category": "Web Scraping",
    "description": "Need a Python developer to build a web scraper that extracts product data from multiple e-commerce websites.",
    "skills": ["Python", "BeautifulSoup", "Selenium", "Scrapy"],
    "budget": "$200-400",
    "client_location": "United States",
    "experience_level": "Intermediate",
    "job_type": "Fixed"
}}"#,
        categories = Category::prompt_list()
    )
}

/// User message wrapping the pasted posting
pub fn extraction_user_prompt(raw_text: &str) -> String {
    format!("Parse this job posting:\n\n{raw_text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_every_category() {
        let prompt = extraction_system_prompt();
        for category in Category::ALL {
            assert!(prompt.contains(category.label()), "missing {category}");
        }
    }

    #[test]
    fn test_user_prompt_embeds_text() {
        let prompt = extraction_user_prompt("Need a Rust dev");
        assert!(prompt.ends_with("Need a Rust dev"));
    }
}
