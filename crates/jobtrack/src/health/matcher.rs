//! Linking job-posting files to tracked records.
//!
//! Matching is layered: an exact `source_file` backreference (YAML front
//! matter or a literal filename mention in a record's job-description.md)
//! always wins; token-overlap similarity between the posting filename and
//! record folder names is the fallback. The fuzzy result is advisory only:
//! it suppresses an orphan flag and is never allowed to drive a mutation.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;

use crate::record::ApplicationRecord;

/// Minimum token-overlap score for a fuzzy match to count.
pub const MATCH_THRESHOLD: f64 = 0.3;

const STOP_WORDS: &[&str] = &[
    "at", "in", "the", "a", "an", "for", "on", "to", "of", "and", "or", "job", "application",
    "apply", "career", "careers", "jobs", "linkedin", "director", "head", "senior", "manager",
    "lead", "vp", "vice", "president", "product", "management", "pm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The record's job-description.md references the posting filename.
    SourceReference,
    /// Token-overlap similarity above [`MATCH_THRESHOLD`].
    TokenOverlap,
}

pub struct PostingMatcher {
    camel_boundary: Regex,
    acronym_boundary: Regex,
}

impl Default for PostingMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PostingMatcher {
    pub fn new() -> Self {
        // Static patterns; compilation cannot fail.
        Self {
            camel_boundary: Regex::new(r"([a-z])([A-Z])").unwrap(),
            acronym_boundary: Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap(),
        }
    }

    /// Tokenize for matching: split camel-case boundaries before
    /// lowercasing (VPProduct -> vp product), strip separators, drop stop
    /// words, short tokens and bare numbers.
    pub fn extract_tokens(&self, text: &str) -> HashSet<String> {
        let spaced = self.camel_boundary.replace_all(text, "$1 $2");
        let spaced = self.acronym_boundary.replace_all(&spaced, "$1 $2");
        let lowered = spaced.to_lowercase();
        let cleaned: String = lowered
            .chars()
            .map(|c| {
                if matches!(c, '-' | '_' | '(' | ')') {
                    ' '
                } else {
                    c
                }
            })
            .collect();

        cleaned
            .split_whitespace()
            .filter(|token| {
                token.len() > 2
                    && !STOP_WORDS.contains(token)
                    && !token.chars().all(|c| c.is_ascii_digit())
            })
            .map(str::to_string)
            .collect()
    }

    /// Overlap score: |common| / max(|a|, |b|). Zero when either side has
    /// no meaningful tokens.
    pub fn overlap_score(&self, a: &HashSet<String>, b: &HashSet<String>) -> f64 {
        let larger = a.len().max(b.len());
        if larger == 0 {
            return 0.0;
        }
        let common = a.intersection(b).count();
        common as f64 / larger as f64
    }

    /// Find the record a posting file belongs to, if any.
    pub fn find_matching_record<'a>(
        &self,
        posting: &Path,
        records: &'a [ApplicationRecord],
    ) -> Option<(&'a ApplicationRecord, MatchKind)> {
        let filename = posting.file_name()?.to_str()?;

        // Strategy 1: explicit backreference in job-description.md
        for record in records {
            if record_references_posting(record, filename) {
                return Some((record, MatchKind::SourceReference));
            }
        }

        // Strategy 2: token-overlap on the filename stem vs folder names
        let stem = posting.file_stem()?.to_str()?;
        let posting_tokens = self.extract_tokens(stem);

        let mut best: Option<(&ApplicationRecord, f64)> = None;
        for record in records {
            let folder_tokens = self.extract_tokens(record.id());
            let score = self.overlap_score(&posting_tokens, &folder_tokens);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((record, score));
            }
        }

        match best {
            Some((record, score)) if score > MATCH_THRESHOLD => {
                Some((record, MatchKind::TokenOverlap))
            }
            _ => None,
        }
    }
}

/// Whether the record's job-description.md names the posting file, either
/// anywhere in the body or as a `source_file:` front-matter field.
fn record_references_posting(record: &ApplicationRecord, filename: &str) -> bool {
    let job_description = record.folder.join("job-description.md");
    let Ok(content) = std::fs::read_to_string(&job_description) else {
        return false;
    };

    if content.contains(filename) {
        return true;
    }

    front_matter_source_file(&content).is_some_and(|source| source == filename)
}

/// Extract `source_file` from a leading YAML front-matter block.
pub fn front_matter_source_file(content: &str) -> Option<String> {
    let rest = content.strip_prefix("---")?;
    let end = rest.find("---")?;
    let block = &rest[..end];

    let value: serde_yaml::Value = serde_yaml::from_str(block).ok()?;
    value
        .get("source_file")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
