use tm_common::explain::{explain_report, ExplainError, Explainer, Explanation, ExplanationRequest};
use tm_common::retry::RetryPolicy;
use tm_common::{CandidatePool, MatchingConfig, MatchingPipeline, ParsedJob, ParsedResume};

const JOB: &str = r#"{
    "job_title": "Senior Data Engineer",
    "required_years_experience": 5,
    "skills": {
        "must_have": ["Python", "SQL", "Spark"],
        "important": ["Kafka", "AWS"],
        "nice_to_have": ["Scala"],
        "implicit_skills": ["git"]
    },
    "domain_keywords": ["FinTech"],
    "responsibilities_summary": "Design streaming data pipelines with spark and kafka for payment analytics"
}"#;

fn resume(name: &str, years: u32, skills: &[&str], end_date: &str, domain: &str, summary: &str) -> ParsedResume {
    let raw = serde_json::json!({
        "name": name,
        "total_years_experience": years,
        "skills": skills,
        "domain_keywords": [domain],
        "experience": [{
            "title": "Engineer",
            "company": "Acme",
            "start_date": "2015",
            "end_date": end_date,
            "description": ""
        }],
        "full_text_summary": summary,
    });
    ParsedResume::from_json(&raw.to_string()).unwrap()
}

fn pool() -> CandidatePool {
    let mut pool = CandidatePool::new();
    pool.insert(
        "lin.json",
        resume(
            "Lin",
            7,
            &["python", "sql", "spark", "kafka", "aws", "scala"],
            "Present",
            "fintech",
            "Built streaming pipelines on spark and kafka for a payments company",
        ),
    )
    .unwrap();
    pool.insert(
        "omar.json",
        resume(
            "Omar",
            2,
            &["sql", "excel"],
            "2012",
            "retail",
            "Reporting analyst producing weekly retail dashboards",
        ),
    )
    .unwrap();
    pool.insert(
        "mei.json",
        resume(
            "Mei",
            5,
            &["python", "spark"],
            "2025",
            "healthcare",
            "Data engineer building spark batch jobs for clinical research",
        ),
    )
    .unwrap();
    pool
}

#[test]
fn end_to_end_run_ranks_the_strongest_candidate_first() {
    let job = ParsedJob::from_json(JOB).unwrap();
    let mut pipeline = MatchingPipeline::from_config(&MatchingConfig::default()).unwrap();

    let outcome = pipeline.run(&job, &pool()).unwrap();

    assert_eq!(outcome.retrieved, 3);
    assert_eq!(outcome.reports.len(), 3);
    assert_eq!(outcome.reports[0].candidate_id, "lin.json");
    assert_eq!(outcome.reports[0].final_score, 100.0);
    for pair in outcome.reports.windows(2) {
        assert!(pair[0].final_score >= pair[1].final_score);
    }
    for report in &outcome.reports {
        assert!((0.0..=100.0).contains(&report.final_score));
        assert_eq!(report.job_summary, job.responsibilities_summary);
    }
}

#[test]
fn reports_serialize_with_flat_score_fields() {
    let job = ParsedJob::from_json(JOB).unwrap();
    let mut pipeline = MatchingPipeline::from_config(&MatchingConfig::default()).unwrap();
    let outcome = pipeline.run(&job, &pool()).unwrap();

    let value = serde_json::to_value(&outcome.reports).unwrap();
    let first = &value[0];
    for key in [
        "candidate_id",
        "name",
        "final_score",
        "must_have_score",
        "important_score",
        "nice_to_have_score",
        "experience_score",
        "recency_score",
        "domain_score",
        "job_summary",
        "resume_summary",
    ] {
        assert!(first.get(key).is_some(), "missing {key}");
    }
}

struct DownExplainer;

impl Explainer for DownExplainer {
    fn explain(&self, _request: &ExplanationRequest) -> Result<Explanation, ExplainError> {
        Err(ExplainError::Unavailable("connection refused".into()))
    }
}

#[test]
fn failing_explainer_keeps_every_report() {
    let job = ParsedJob::from_json(JOB).unwrap();
    let mut pipeline = MatchingPipeline::from_config(&MatchingConfig::default()).unwrap();
    let outcome = pipeline.run(&job, &pool()).unwrap();
    let scored = outcome.reports.len();

    let explained: Vec<_> = outcome
        .reports
        .into_iter()
        .map(|report| explain_report(&DownExplainer, report, &RetryPolicy::immediate(3)))
        .collect();

    assert_eq!(explained.len(), scored);
    assert!(explained.iter().all(|e| e.is_fallback()));
    assert_eq!(explained[0].notes, "System error.");
}
