//! rules.rs - Manages the compilation and caching of detection rules.
//!
//! This module provides a thread-safe, cached mechanism to convert a
//! [`RuleConfig`] into [`CompiledDetectors`], which are optimized for
//! efficient masking. It uses a global, shared cache to avoid redundant
//! compilation. The blacklist rule and recognizer-span rules are rebuilt
//! per engine invocation from current inputs and are never cached.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::debug;
use regex::{Regex, RegexBuilder};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::category::Category;
use crate::config::{RuleConfig, MAX_PATTERN_LENGTH};
use crate::errors::VeilError;

/// Represents a single compiled detection rule.
#[derive(Debug)]
pub struct CompiledDetector {
    /// The compiled regular expression used for matching.
    pub regex: Regex,
    /// Placeholder category matches are aliased under.
    pub category: Category,
    /// The unique name of the detection rule.
    pub name: String,
    /// Evaluation priority; higher runs earlier.
    pub priority: i32,
}

/// The full set of compiled static detectors, sorted by descending priority.
#[derive(Debug)]
pub struct CompiledDetectors {
    pub detectors: Vec<CompiledDetector>,
}

lazy_static! {
    /// A thread-safe, global cache for compiled detectors.
    /// The key is a hash of the serialized `RuleConfig`.
    static ref COMPILED_DETECTORS_CACHE: RwLock<HashMap<u64, Arc<CompiledDetectors>>> =
        RwLock::new(HashMap::new());
}

/// Hashes the `RuleConfig` to create a stable, unique key for the cache.
///
/// To ensure determinism, the rules are sorted by name before hashing.
fn hash_config(config: &RuleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    let mut rules_to_hash = config.rules.clone();
    rules_to_hash.sort_by(|a, b| a.name.cmp(&b.name));
    rules_to_hash.hash(&mut hasher);
    hasher.finish()
}

fn build_regex(name: &str, pattern: &str) -> Result<Regex, VeilError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(VeilError::PatternLengthExceeded(
            name.to_string(),
            pattern.len(),
            MAX_PATTERN_LENGTH,
        ));
    }
    RegexBuilder::new(pattern)
        .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
        .build()
        .map_err(|e| VeilError::RuleCompilationError(name.to_string(), e))
}

/// Compiles a `RuleConfig` into `CompiledDetectors` for efficient matching.
/// This is the low-level function that performs the actual regex compilation.
pub fn compile_detectors(config: &RuleConfig) -> Result<CompiledDetectors, VeilError> {
    debug!("Starting compilation of {} detection rules.", config.rules.len());

    let mut compiled = Vec::new();
    let mut compilation_errors = Vec::new();

    for rule in &config.rules {
        match build_regex(&rule.name, &rule.pattern) {
            Ok(regex) => {
                debug!("Rule '{}' compiled successfully.", rule.name);
                compiled.push(CompiledDetector {
                    regex,
                    category: rule.category,
                    name: rule.name.clone(),
                    priority: rule.priority,
                });
            }
            Err(e) => compilation_errors.push(e),
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        return Err(VeilError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            compilation_errors.len(),
            error_message
        )));
    }

    // Highest priority first; ties are impossible in a validated config but
    // name order keeps the sort total anyway.
    compiled.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));

    debug!("Finished compiling detectors. Total compiled: {}.", compiled.len());
    Ok(CompiledDetectors { detectors: compiled })
}

/// Gets a `CompiledDetectors` instance from the cache or compiles one.
///
/// This is the public entry point for retrieving compiled detectors. It
/// returns an `Arc`, allowing for cheap sharing across engines.
pub fn get_or_compile_detectors(config: &RuleConfig) -> Result<Arc<CompiledDetectors>, VeilError> {
    let cache_key = hash_config(config);

    {
        let cache = COMPILED_DETECTORS_CACHE.read().unwrap();
        if let Some(detectors) = cache.get(&cache_key) {
            debug!("Serving compiled detectors from cache for key: {}", &cache_key);
            return Ok(Arc::clone(detectors));
        }
    } // Read lock is released here.

    debug!("Compiled detectors not found in cache. Compiling now.");
    let compiled = compile_detectors(config)?;
    let compiled_arc = Arc::new(compiled);

    COMPILED_DETECTORS_CACHE
        .write()
        .unwrap()
        .insert(cache_key, Arc::clone(&compiled_arc));

    debug!("Successfully compiled and cached detectors for key: {}", &cache_key);
    Ok(compiled_arc)
}

/// Builds the per-invocation blacklist detector from literal user terms.
///
/// Terms match case-insensitively and whole-word; each is regex-escaped, so
/// blacklist entries are always literals, never patterns. Returns `None`
/// when no usable terms remain.
pub fn blacklist_detector(terms: &[String]) -> Result<Option<CompiledDetector>, VeilError> {
    let escaped: Vec<String> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?i)\b(?:{})\b", escaped.join("|"));
    let regex = RegexBuilder::new(&pattern)
        .size_limit(10 * (1 << 20))
        .build()
        .map_err(|e| VeilError::RuleCompilationError("blacklist".to_string(), e))?;

    Ok(Some(CompiledDetector {
        regex,
        category: Category::Entity,
        name: "blacklist".to_string(),
        priority: 100,
    }))
}

/// Builds a literal whole-word detector for one recognizer span.
///
/// Case-sensitive: the recognizer reported this exact surface form, and a
/// lowercase collision ("mark" vs "Mark") must not be swallowed.
pub fn span_detector(span: &str, category: Category) -> Result<CompiledDetector, VeilError> {
    let pattern = format!(r"\b{}\b", regex::escape(span));
    let regex = RegexBuilder::new(&pattern)
        .size_limit(10 * (1 << 20))
        .build()
        .map_err(|e| VeilError::RuleCompilationError(format!("span:{}", category), e))?;

    Ok(CompiledDetector {
        regex,
        category,
        name: format!("recognizer_{}", category.as_str().to_lowercase()),
        priority: if category == Category::Client { 90 } else { 85 },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_detectors() -> Arc<CompiledDetectors> {
        get_or_compile_detectors(&RuleConfig::load_default_rules().unwrap()).unwrap()
    }

    fn find<'a>(detectors: &'a CompiledDetectors, name: &str) -> &'a CompiledDetector {
        detectors
            .detectors
            .iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("missing detector {}", name))
    }

    #[test]
    fn detectors_are_sorted_by_descending_priority() {
        let detectors = default_detectors();
        let priorities: Vec<i32> = detectors.detectors.iter().map(|d| d.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn cache_returns_the_same_arc() {
        let config = RuleConfig::load_default_rules().unwrap();
        let a = get_or_compile_detectors(&config).unwrap();
        let b = get_or_compile_detectors(&config).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn email_detector_matches_plausible_addresses_only() {
        let detectors = default_detectors();
        let email = find(&detectors, "email");
        assert!(email.regex.is_match("reach me at jane.doe+x@acme-corp.co.uk today"));
        assert!(!email.regex.is_match("not-an-email@@nope"));
        assert!(!email.regex.is_match("v1.2.3@"));
    }

    #[test]
    fn card_detector_requires_13_to_16_digits() {
        let detectors = default_detectors();
        let card = find(&detectors, "card_number");
        assert!(card.regex.is_match("4111 1111 1111 1111"));
        assert!(card.regex.is_match("4111-1111-1111-111"));
        assert!(card.regex.is_match("4111111111111"));
        assert!(!card.regex.is_match("123456789012"));
        assert!(!card.regex.is_match("order 12345678901234567"));
    }

    #[test]
    fn id_detector_matches_three_two_four_shapes() {
        let detectors = default_detectors();
        let id = find(&detectors, "government_id");
        assert!(id.regex.is_match("ssn 123-45-6789 on file"));
        assert!(id.regex.is_match("123.45.6789"));
        assert!(id.regex.is_match("123456789"));
        // 3-3-4 is a phone shape, not a government ID.
        assert!(!id.regex.is_match("555-123-4567"));
    }

    #[test]
    fn company_suffix_detector_requires_a_capitalized_run() {
        let detectors = default_detectors();
        let company = find(&detectors, "company_suffix");
        assert!(company.regex.is_match("signed with Globex Dynamics Inc. yesterday"));
        assert!(company.regex.is_match("Umbrella Corp"));
        assert!(company.regex.is_match("Nakatomi Trading K.K."));
        assert!(company.regex.is_match("Vandelay Industries Pty Ltd"));
        assert!(!company.regex.is_match("incorporated yesterday"));
        assert!(!company.regex.is_match("the inc was formed"));
    }

    #[test]
    fn company_suffix_does_not_swallow_word_prefixes() {
        let detectors = default_detectors();
        let company = find(&detectors, "company_suffix");
        // "Inc" inside "Incredible" must not terminate a company match.
        assert!(!company.regex.is_match("Truly Incredible results"));
    }

    #[test]
    fn proper_noun_detector_needs_two_capitalized_words() {
        let detectors = default_detectors();
        let client = find(&detectors, "proper_noun_pair");
        assert!(client.regex.is_match("met Sarah Connor at the office"));
        assert!(!client.regex.is_match("met Sarah at the office"));
        assert_eq!(
            client.regex.find("please ask John Ronald Reuel Tolkien").unwrap().as_str(),
            "John Ronald Reuel Tolkien"
        );
    }

    #[test]
    fn no_static_detector_matches_placeholder_tokens() {
        let detectors = default_detectors();
        let masked = "[Client_1] wired [Card_2] to [Email_3] per [ID_4] and [Company_5]";
        for detector in &detectors.detectors {
            assert!(
                !detector.regex.is_match(masked),
                "detector '{}' re-matched placeholder text",
                detector.name
            );
        }
    }

    #[test]
    fn blacklist_detector_is_case_insensitive_and_whole_word() {
        let detector = blacklist_detector(&["Apollo".to_string()]).unwrap().unwrap();
        assert!(detector.regex.is_match("project APOLLO launch"));
        assert!(!detector.regex.is_match("Apollonian ideals"));
        assert_eq!(detector.category, Category::Entity);
    }

    #[test]
    fn blacklist_terms_are_treated_as_literals() {
        let detector = blacklist_detector(&["a.b".to_string()]).unwrap().unwrap();
        assert!(detector.regex.is_match("code a.b here"));
        assert!(!detector.regex.is_match("code aXb here"));
    }

    #[test]
    fn empty_blacklist_builds_no_detector() {
        assert!(blacklist_detector(&[]).unwrap().is_none());
        assert!(blacklist_detector(&["   ".to_string()]).unwrap().is_none());
    }

    #[test]
    fn span_detector_is_case_sensitive() {
        let detector = span_detector("John Smith", Category::Client).unwrap();
        assert!(detector.regex.is_match("ask John Smith"));
        assert!(!detector.regex.is_match("ask john smith"));
    }
}
