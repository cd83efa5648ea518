//! Report text analysis.

use tidewatch_entity::Severity;

/// Severity keywords, most severe first. Ties resolve to the earlier entry.
const SEVERITY_KEYWORDS: [(Severity, &[&str]); 4] = [
    (
        Severity::Critical,
        &["emergency", "disaster", "catastrophic", "severe", "massive", "devastating"],
    ),
    (
        Severity::High,
        &["dangerous", "serious", "major", "significant", "extensive"],
    ),
    (
        Severity::Medium,
        &["moderate", "concerning", "noticeable", "unusual"],
    ),
    (Severity::Low, &["minor", "slight", "small", "light"]),
];

const TAG_KEYWORDS: [(&str, &[&str]); 4] = [
    ("weather", &["wind", "rain", "storm", "cyclone", "hurricane"]),
    ("water", &["wave", "tide", "flood", "tsunami", "surge"]),
    (
        "infrastructure_damage",
        &["damage", "destruction", "broken", "collapsed"],
    ),
    (
        "pollution",
        &["oil", "chemical", "waste", "pollution", "contamination"],
    ),
];

const LOCATION_KEYWORDS: [&str; 7] = ["km", "meter", "coast", "beach", "shore", "village", "town"];
const TIME_KEYWORDS: [&str; 6] = ["morning", "evening", "hour", "minute", "yesterday", "today"];

/// Result of analysing one description.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnalysis {
    /// Severity suggested by keywords. `Medium` when nothing matched.
    pub predicted_severity: Severity,
    /// Keyword hits for the predicted severity.
    pub keyword_hits: usize,
    /// Credibility score, 50 to 100.
    pub credibility: f64,
    /// Topic tags.
    pub tags: Vec<String>,
}

/// Analyse a report description.
pub fn analyze_text(description: &str) -> TextAnalysis {
    let lower = description.to_lowercase();

    let mut predicted_severity = Severity::Medium;
    let mut keyword_hits = 0;
    for (severity, keywords) in SEVERITY_KEYWORDS {
        let hits = keywords.iter().filter(|k| lower.contains(*k)).count();
        if hits > keyword_hits {
            predicted_severity = severity;
            keyword_hits = hits;
        }
    }

    let tags = TAG_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(tag, _)| tag.to_string())
        .collect();

    TextAnalysis {
        predicted_severity,
        keyword_hits,
        credibility: credibility(description),
        tags,
    }
}

/// Text credibility: a base of 50 plus bonuses for length, figures, word
/// count, place mentions and time mentions. Capped at 100.
pub fn credibility(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let length = text.chars().count();
    let mut score: u32 = 50;

    if length > 100 {
        score += 15;
    } else if length > 50 {
        score += 10;
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        score += 10;
    }
    if text.split_whitespace().count() > 10 {
        score += 5;
    }
    if LOCATION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        score += 10;
    }
    if TIME_KEYWORDS.iter().any(|k| lower.contains(k)) {
        score += 5;
    }

    f64::from(score.min(100))
}

/// Confidence adjustment for agreement between reported and predicted severity.
pub fn severity_consistency(reported: Severity, predicted: Severity) -> f64 {
    match reported.rank().abs_diff(predicted.rank()) {
        0 => 20.0,
        1 => 10.0,
        2 => 0.0,
        _ => -10.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keywords_predicts_medium() {
        let analysis = analyze_text("Water on the road");
        assert_eq!(analysis.predicted_severity, Severity::Medium);
        assert_eq!(analysis.keyword_hits, 0);
    }

    #[test]
    fn test_tie_prefers_more_severe() {
        let analysis = analyze_text("A minor but dangerous leak");
        assert_eq!(analysis.predicted_severity, Severity::High);
    }

    #[test]
    fn test_tags() {
        let analysis = analyze_text("Storm surge has broken the jetty and an oil slick followed");
        assert_eq!(
            analysis.tags,
            vec!["weather", "water", "infrastructure_damage", "pollution"]
        );
    }

    #[test]
    fn test_credibility_bonuses() {
        assert_eq!(credibility("Flooding"), 50.0);
        assert_eq!(credibility("Flooding at the beach this morning"), 65.0);
        let detailed = "Around 6 this morning the water reached 2 meter along the coast road near the old village market and kept rising";
        assert_eq!(credibility(detailed), 95.0);
    }

    #[test]
    fn test_severity_consistency() {
        assert_eq!(severity_consistency(Severity::High, Severity::High), 20.0);
        assert_eq!(severity_consistency(Severity::High, Severity::Critical), 10.0);
        assert_eq!(severity_consistency(Severity::Low, Severity::High), 0.0);
        assert_eq!(severity_consistency(Severity::Low, Severity::Critical), -10.0);
    }
}
