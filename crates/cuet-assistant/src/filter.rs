//! Keyword relevance filtering over the reference datasets.
//!
//! Both filters are pure functions over borrowed, read-only collections. They
//! return `None` when the dataset should be left out of the prompt entirely.
//!
//! Intent keywords, scoring and location matching all use plain substring
//! containment, so "toppers" shows ranking intent and a query term may match
//! inside a longer word. University abbreviations are the exception: they
//! only count when no letter touches either side, so "cu" does not fire on
//! "cuet" and "du" does not fire on "duration".

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{RankingRecord, UniversityCourseRecord};

pub const MAX_UNIVERSITY_RESULTS: usize = 30;
pub const DEFAULT_RANKING_LIMIT: usize = 20;
pub const MAX_RANKING_LIMIT: usize = 50;

const UNIVERSITY_KEYWORDS: &[&str] = &[
    "university", "universities", "college", "colleges", "du", "jnu", "bhu", "amu", "jamia",
    "allahabad", "course", "courses", "admission", "admissions", "eligibility", "seat", "seats",
    "cutoff", "cut-off", "campus",
];

const COURSE_KEYWORDS: &[&str] = &[
    "ba", "bsc", "bcom", "bba", "bca", "llb", "law", "engineering", "btech", "b.tech", "arts",
    "science", "commerce", "humanities", "economics", "psychology", "english", "history",
    "political", "sociology", "physics", "chemistry", "mathematics", "maths", "biology",
    "computer",
];

const RANKING_KEYWORDS: &[&str] = &[
    "nirf", "ranking", "rankings", "rank", "ranked", "best", "top", "good",
];

/// Abbreviation → phrase appended to the query when the abbreviation appears.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("du", "delhi university"),
    ("jnu", "jawaharlal nehru"),
    ("bhu", "banaras hindu"),
    ("amu", "aligarh muslim"),
    ("jamia", "jamia millia"),
    ("au", "allahabad"),
    ("cu", "central university"),
    ("nehu", "north eastern hill"),
    ("bbau", "babasaheb bhimrao ambedkar"),
];

static TOP_N_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\p{L}])top\s*(\d+)").expect("valid regex"));

/// Pick the university/course records relevant to `query`.
///
/// Returns `None` when the query shows no university or course intent, and
/// also when it does but no record scores above zero.
pub fn filter_universities<'a>(
    query: &str,
    records: &'a [UniversityCourseRecord],
) -> Option<Vec<&'a UniversityCourseRecord>> {
    let query = query.to_lowercase();

    let needed = UNIVERSITY_KEYWORDS
        .iter()
        .chain(COURSE_KEYWORDS)
        .any(|kw| query.contains(kw))
        || ABBREVIATIONS.iter().any(|(abbr, _)| contains_term(&query, abbr));
    if !needed {
        return None;
    }

    let expanded = expand_abbreviations(&query);
    let terms = search_terms(&expanded);

    let mut scored: Vec<(usize, &UniversityCourseRecord)> = records
        .iter()
        .filter_map(|record| {
            let points = score(&record.search_text(), &terms);
            (points > 0).then_some((points, record))
        })
        .collect();
    // `sort_by` is stable: equal scores keep dataset order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let relevant: Vec<_> = scored
        .into_iter()
        .take(MAX_UNIVERSITY_RESULTS)
        .map(|(_, record)| record)
        .collect();
    (!relevant.is_empty()).then_some(relevant)
}

/// Pick the ranking records relevant to `query`.
///
/// Returns `None` only when the query shows no ranking intent. Otherwise the
/// result is the first `limit` records of either the location-matched subset
/// or, when nothing matches a location, the whole list.
pub fn filter_rankings<'a>(
    query: &str,
    records: &'a [RankingRecord],
) -> Option<Vec<&'a RankingRecord>> {
    let query = query.to_lowercase();

    if !RANKING_KEYWORDS.iter().any(|kw| query.contains(kw)) {
        return None;
    }

    let limit = requested_limit(&query);
    let location_terms: Vec<&str> = search_terms(&query)
        .into_iter()
        .filter(|term| term.chars().count() > 3)
        .collect();

    let located: Vec<&RankingRecord> = records
        .iter()
        .filter(|record| {
            let text = record.search_text();
            location_terms.iter().any(|term| text.contains(term))
        })
        .collect();

    let pool = if located.is_empty() {
        records.iter().collect()
    } else {
        located
    };
    Some(pool.into_iter().take(limit).collect())
}

/// "top N" in the query, capped at `MAX_RANKING_LIMIT`.
fn requested_limit(query: &str) -> usize {
    match TOP_N_RE.captures(query) {
        // Digit runs too long for usize are still "more than the cap".
        Some(caps) => caps[1]
            .parse::<usize>()
            .map_or(MAX_RANKING_LIMIT, |n| n.min(MAX_RANKING_LIMIT)),
        None => DEFAULT_RANKING_LIMIT,
    }
}

/// Appends the expansion of every abbreviation present. The abbreviation
/// itself stays in place.
fn expand_abbreviations(query: &str) -> String {
    let mut expanded = query.to_string();
    for (abbr, full) in ABBREVIATIONS {
        if contains_term(query, abbr) {
            expanded.push(' ');
            expanded.push_str(full);
        }
    }
    expanded
}

/// Whitespace tokens longer than two characters. Duplicates are kept.
fn search_terms(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .collect()
}

fn score(search_text: &str, terms: &[&str]) -> usize {
    terms
        .iter()
        .filter(|term| search_text.contains(*term))
        .map(|term| if term.chars().count() > 4 { 2 } else { 1 })
        .sum()
}

/// True when `term` occurs in `haystack` without a letter directly before or
/// after it. Used for abbreviations only.
fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + term.len()..].chars().next();
        !before.is_some_and(char::is_alphabetic) && !after.is_some_and(char::is_alphabetic)
    })
}
