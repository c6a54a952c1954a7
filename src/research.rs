//! Research paper lookup backed by a fixed in-process corpus.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A research paper as returned by search and attached to an idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchPaper {
    pub id: String,
    pub title: String,
    pub description: String,
    pub authors: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub selected: bool,
}

fn paper(
    id: &str,
    title: &str,
    description: &str,
    authors: &str,
    doi: &str,
    year: i32,
    subjects: &[&str],
) -> ResearchPaper {
    ResearchPaper {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        authors: authors.to_string(),
        doi: Some(doi.to_string()),
        url: format!("https://edmond.mpg.de/dataset.xhtml?persistentId=doi:{}", doi),
        year: Some(year),
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        selected: false,
    }
}

static CORPUS: Lazy<Vec<ResearchPaper>> = Lazy::new(|| {
    vec![
        paper(
            "1",
            "Machine Learning Applications in Sustainable Energy Systems",
            "This research explores the application of advanced machine learning techniques for optimizing renewable energy systems and predicting energy consumption patterns.",
            "Dr. Sarah Mueller, Prof. Andreas Schmidt, Dr. Lisa Chen",
            "10.17617/3.7x",
            2024,
            &["Machine Learning", "Renewable Energy", "Sustainability", "Optimization"],
        ),
        paper(
            "2",
            "AI-Driven Innovation in Healthcare: A Comprehensive Analysis",
            "Comprehensive analysis of artificial intelligence applications in modern healthcare, including diagnostic tools, treatment optimization, and patient care systems.",
            "Prof. Michael Wagner, Dr. Emma Thompson, Dr. Rajesh Kumar",
            "10.17617/3.8y",
            2024,
            &["Artificial Intelligence", "Healthcare", "Medical Technology", "Patient Care"],
        ),
        paper(
            "3",
            "Quantum Computing for Complex Optimization Problems",
            "Investigation into quantum computing algorithms for solving NP-hard optimization problems in logistics, finance, and scientific computing.",
            "Dr. Johann Fischer, Prof. Maria Gonzalez, Dr. Wei Zhang",
            "10.17617/3.9z",
            2023,
            &["Quantum Computing", "Optimization", "Algorithms", "Complex Systems"],
        ),
        paper(
            "4",
            "Sustainable Materials Science: Bio-Based Alternatives",
            "Research on developing biodegradable and sustainable materials from renewable resources for industrial applications.",
            "Prof. Anna Schneider, Dr. Carlos Rodriguez, Dr. Kim Park",
            "10.17617/3.1a",
            2024,
            &["Materials Science", "Sustainability", "Biodegradable Materials", "Green Chemistry"],
        ),
        paper(
            "5",
            "Neural Networks in Climate Modeling and Prediction",
            "Application of deep neural networks for improving climate models and long-term weather prediction accuracy.",
            "Dr. Thomas Braun, Prof. Jennifer Liu, Dr. Ahmed Hassan",
            "10.17617/3.2b",
            2023,
            &["Neural Networks", "Climate Science", "Weather Prediction", "Deep Learning"],
        ),
    ]
});

/// Case-insensitive substring match over title, description, subjects and
/// authors. An empty query matches every paper.
pub fn search(query: &str) -> Vec<ResearchPaper> {
    let needle = query.trim().to_lowercase();
    CORPUS
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
                || p.subjects.iter().any(|s| s.to_lowercase().contains(&needle))
                || p.authors.to_lowercase().contains(&needle)
        })
        .cloned()
        .map(|mut p| {
            p.selected = false;
            p
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_subjects_case_insensitively() {
        let hits = search("  SUSTAINABILITY ");
        let ids: Vec<_> = hits.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert!(hits.iter().all(|p| !p.selected));
    }

    #[test]
    fn matches_authors() {
        let hits = search("wei zhang");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Quantum Computing for Complex Optimization Problems");
    }

    #[test]
    fn unknown_terms_return_nothing() {
        assert!(search("blockchain").is_empty());
    }

    #[test]
    fn empty_query_returns_whole_corpus() {
        assert_eq!(search("").len(), 5);
    }

    #[test]
    fn serializes_with_selected_flag() {
        let json = serde_json::to_value(&search("climate")[0]).unwrap();
        assert_eq!(json["selected"], false);
        assert_eq!(json["year"], 2023);
        assert_eq!(json["doi"], "10.17617/3.2b");
    }
}
