//! Parsed job and candidate records.
//!
//! These records are produced upstream (document text is turned into
//! structured JSON by a parsing collaborator) and are immutable once built.
//! Construction goes through `from_json`, which returns a typed error
//! instead of letting a half-filled record into the pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid record json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("required field `{0}` is blank")]
    BlankField(&'static str),
}

/// Four priority tiers of job skills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillCluster {
    pub must_have: Vec<String>,
    pub important: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub implicit_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedJob {
    pub job_title: String,
    pub required_years_experience: u32,
    pub skills: SkillCluster,
    /// Industry tags such as "FinTech" or "Healthcare".
    #[serde(default)]
    pub domain_keywords: Vec<String>,
    /// Used as the retrieval query.
    pub responsibilities_summary: String,
}

impl ParsedJob {
    pub fn from_json(raw: &str) -> Result<Self, RecordError> {
        let job: Self = serde_json::from_str(raw)?;
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.job_title.trim().is_empty() {
            return Err(RecordError::BlankField("job_title"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub start_date: String,
    /// Free text: "Present", something containing a year, or anything else.
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub name: String,
    pub total_years_experience: u32,
    pub skills: Vec<String>,
    /// Degrees or certifications, e.g. "B.S. in Computer Science".
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub domain_keywords: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    /// Retrieval document for this candidate.
    pub full_text_summary: String,
}

impl ParsedResume {
    pub fn from_json(raw: &str) -> Result<Self, RecordError> {
        let resume: Self = serde_json::from_str(raw)?;
        resume.validate()?;
        Ok(resume)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::BlankField("name"));
        }
        Ok(())
    }

    /// Skills followed by education entries; the keyword set checked
    /// against required skill phrases.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.skills
            .iter()
            .chain(self.education.iter())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_JSON: &str = r#"{
        "job_title": "Backend Engineer",
        "required_years_experience": 4,
        "skills": {
            "must_have": ["5+ years of Python experience"],
            "important": ["PostgreSQL"],
            "nice_to_have": [],
            "implicit_skills": ["git"]
        },
        "responsibilities_summary": "Build payment APIs"
    }"#;

    #[test]
    fn job_from_json_defaults_domain_keywords() {
        let job = ParsedJob::from_json(JOB_JSON).expect("job should parse");

        assert_eq!(job.job_title, "Backend Engineer");
        assert_eq!(job.required_years_experience, 4);
        assert_eq!(job.skills.important, vec!["PostgreSQL".to_string()]);
        assert!(job.domain_keywords.is_empty());
    }

    #[test]
    fn job_with_blank_title_is_rejected() {
        let raw = JOB_JSON.replace("Backend Engineer", "   ");
        let err = ParsedJob::from_json(&raw).unwrap_err();

        assert!(matches!(err, RecordError::BlankField("job_title")));
    }

    #[test]
    fn job_missing_skill_cluster_is_a_json_error() {
        let raw = r#"{"job_title": "x", "required_years_experience": 1, "responsibilities_summary": ""}"#;
        let err = ParsedJob::from_json(raw).unwrap_err();

        assert!(matches!(err, RecordError::Json(_)));
    }

    #[test]
    fn negative_years_are_rejected() {
        let raw = r#"{
            "name": "Ada",
            "total_years_experience": -2,
            "skills": [],
            "experience": [],
            "full_text_summary": ""
        }"#;

        assert!(matches!(
            ParsedResume::from_json(raw).unwrap_err(),
            RecordError::Json(_)
        ));
    }

    #[test]
    fn resume_keywords_chain_skills_then_education() {
        let raw = r#"{
            "name": "Ada",
            "total_years_experience": 6,
            "skills": ["Python", "SQL"],
            "education": ["B.S. in Computer Science"],
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "start_date": "2019",
                "end_date": "Present",
                "description": "APIs"
            }],
            "full_text_summary": "Python engineer"
        }"#;
        let resume = ParsedResume::from_json(raw).expect("resume should parse");

        let keywords: Vec<_> = resume.keywords().collect();
        assert_eq!(keywords, vec!["Python", "SQL", "B.S. in Computer Science"]);
        assert!(resume.domain_keywords.is_empty());
        assert_eq!(resume.experience[0].end_date, "Present");
    }

    #[test]
    fn resume_with_blank_name_is_rejected() {
        let raw = r#"{
            "name": "",
            "total_years_experience": 1,
            "skills": [],
            "experience": [],
            "full_text_summary": "x"
        }"#;

        assert!(matches!(
            ParsedResume::from_json(raw).unwrap_err(),
            RecordError::BlankField("name")
        ));
    }
}
