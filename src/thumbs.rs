//! Best-effort course thumbnail lookup against Udemy's public search API.
//!
//! The endpoint is undocumented and may break or rate-limit at any time, so
//! every failure path degrades to "no thumbnail" rather than an error.

use std::time::Duration;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Deserialize;

const UDEMY_API: &str = "https://www.udemy.com/api-2.0/courses/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A candidate must score at least this fraction of the query's self-match
/// before its image is trusted; below that the match is too weak to attach.
const MIN_SCORE_RATIO: f64 = 0.7;

/// One search hit, ranked against the local course title.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub image: Option<String>,
    pub score: i64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    image_480x270: Option<String>,
    image_240x135: Option<String>,
    #[serde(rename = "image_125_H")]
    image_125_h: Option<String>,
}

/// Collapse runs of whitespace; directory names often carry doubled spaces.
fn clean(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Search Udemy for courses matching `query`, ranked best-first.
pub fn search_candidates(query: &str, limit: usize) -> Vec<Candidate> {
    let q = clean(query);
    if q.is_empty() {
        return Vec::new();
    }

    let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();

    let response = match agent
        .get(UDEMY_API)
        .query("search", &q)
        .query("page", "1")
        .query("page_size", &limit.clamp(1, 20).to_string())
        .query(
            "fields[course]",
            "title,url,image_480x270,image_240x135,image_125_H",
        )
        .set("User-Agent", "Mozilla/5.0 (X11; Linux x86_64) courseshelf/0.1")
        .set("Accept", "application/json,text/plain,*/*")
        .set("Referer", "https://www.udemy.com/")
        .call()
    {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("udemy search failed for {:?}: {}", q, e);
            return Vec::new();
        }
    };

    let parsed: SearchResponse = match response.into_json() {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("udemy search returned unparseable payload: {}", e);
            return Vec::new();
        }
    };

    let matcher = SkimMatcherV2::default().ignore_case();

    let mut candidates = Vec::new();
    for item in parsed.results {
        let title = clean(&item.title);
        if title.is_empty() {
            continue;
        }

        let url = if item.url.starts_with('/') {
            format!("https://www.udemy.com{}", item.url)
        } else {
            item.url
        };

        let image = item
            .image_480x270
            .or(item.image_240x135)
            .or(item.image_125_h);

        let score = matcher.fuzzy_match(&title, &q).unwrap_or(0);
        candidates.push(Candidate {
            title,
            url,
            image,
            score,
        });
    }

    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.title.len().cmp(&b.title.len()))
    });
    candidates.truncate(limit);
    candidates
}

/// The image URL of the best match for a course title, or None when the
/// match is too weak to attach something random.
pub fn best_thumbnail_for_title(title: &str) -> Option<String> {
    let q = clean(title);
    let best = search_candidates(&q, 5).into_iter().next()?;

    let matcher = SkimMatcherV2::default().ignore_case();
    let self_score = matcher.fuzzy_match(&q, &q).unwrap_or(0);
    if self_score == 0 || (best.score as f64) < (self_score as f64) * MIN_SCORE_RATIO {
        return None;
    }

    best.image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_whitespace() {
        assert_eq!(clean("  The  Complete\tCourse "), "The Complete Course");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn empty_query_yields_no_candidates() {
        // Short-circuits before any network traffic.
        assert!(search_candidates("", 5).is_empty());
        assert!(search_candidates("   ", 5).is_empty());
    }
}
