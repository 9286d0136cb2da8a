/// Coverage of one tier of required skill phrases, 0–100.
///
/// A phrase counts as matched when any candidate keyword occurs inside it,
/// case-insensitively: keyword "python" matches phrase
/// "5+ years of Python experience". An empty tier is vacuously satisfied.
/// Keywords are compared as given, whitespace included, so an empty keyword
/// matches every phrase.
pub fn score_skill_coverage<'a>(
    required: &[String],
    candidate_keywords: impl IntoIterator<Item = &'a str>,
) -> f64 {
    if required.is_empty() {
        return 100.0;
    }

    let keywords: Vec<String> = candidate_keywords
        .into_iter()
        .map(str::to_lowercase)
        .collect();

    let matched = required
        .iter()
        .map(|phrase| phrase.to_lowercase())
        .filter(|phrase| keywords.iter().any(|k| phrase.contains(k.as_str())))
        .count();

    matched as f64 / required.len() as f64 * 100.0
}
