//! Configuration management for `veilmask-core`.
//!
//! This module defines the data structures for detection rules and engine
//! configuration. It handles serialization/deserialization of YAML
//! configurations and provides utilities for loading and validating them.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::category::Category;
use crate::errors::VeilError;

/// Maximum allowed length for a detection rule pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Maximum allowed length for a single blacklist term.
pub const MAX_BLACKLIST_TERM_LENGTH: usize = 200;

/// A single static detection rule used by the masking engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct DetectionRule {
    /// Unique identifier for the rule (e.g., "card_number").
    pub name: String,
    /// Placeholder category this rule's matches are aliased under.
    pub category: Category,
    /// Evaluation priority; higher runs earlier and sees rawer text.
    pub priority: i32,
    /// Human-readable description of what the rule targets.
    #[serde(default)]
    pub description: Option<String>,
    /// The regex pattern string.
    pub pattern: String,
}

/// The full static rule set for one engine.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct RuleConfig {
    pub rules: Vec<DetectionRule>,
}

impl RuleConfig {
    /// Loads detection rules from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom detection rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file {}", path.display()))?;
        let config: RuleConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse rule file {}", path.display()))?;

        validate_rules(&config.rules)?;
        info!("Loaded {} rules from file {}.", config.rules.len(), path.display());

        Ok(config)
    }

    /// Loads the built-in detection rules from the embedded configuration.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default detection rules from embedded string...");
        let default_yaml = include_str!("../config/default_rules.yaml");
        let config: RuleConfig =
            serde_yml::from_str(default_yaml).context("Failed to parse default rules")?;

        debug!("Loaded {} default rules.", config.rules.len());
        Ok(config)
    }
}

/// Validates rule integrity (unique names, regex compilation, length caps).
fn validate_rules(rules: &[DetectionRule]) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.clone()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        if rule.pattern.is_empty() {
            errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
            continue;
        }

        if rule.pattern.len() > MAX_PATTERN_LENGTH {
            errors.push(format!(
                "Rule '{}': pattern length ({}) exceeds maximum allowed ({}).",
                rule.name,
                rule.pattern.len(),
                MAX_PATTERN_LENGTH
            ));
            continue;
        }

        if let Err(e) = Regex::new(&rule.pattern) {
            errors.push(format!("Rule '{}' has an invalid regex pattern: {}", rule.name, e));
        }
    }

    if !errors.is_empty() {
        let full_error_message = format!("Rule validation failed:\n{}", errors.join("\n"));
        Err(anyhow!(full_error_message))
    } else {
        Ok(())
    }
}

/// Engine-level settings: the persistent blacklist, recognizer bounds, and
/// the minimum span length the recognizer layer will act on.
///
/// Blacklist terms and recognizer wiring were ambient globals in the system
/// this engine descends from; here they are explicit constructor state so
/// several independent engines can coexist in one process.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Literal terms the caller always wants redacted (case-insensitive,
    /// whole-word). Merged with any per-call blacklist at mask time.
    pub blacklist_terms: Vec<String>,
    /// Upper bound on a single recognizer call before degrading to
    /// rule-only masking.
    pub recognizer_timeout_ms: u64,
    /// Recognizer spans must be strictly longer than this to be masked.
    pub min_entity_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blacklist_terms: Vec::new(),
            recognizer_timeout_ms: 1500,
            min_entity_len: 2,
        }
    }
}

impl EngineConfig {
    /// Loads engine configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading engine configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EngineConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_blacklist_terms(&config.blacklist_terms)
            .with_context(|| format!("Invalid blacklist in {}", path.display()))?;
        Ok(config)
    }
}

/// Rejects blank and oversized blacklist terms before they reach the
/// per-invocation rule builder.
pub fn validate_blacklist_terms(terms: &[String]) -> Result<(), VeilError> {
    for term in terms {
        if term.trim().is_empty() {
            return Err(VeilError::InvalidBlacklistTerm(
                term.clone(),
                "term is empty or whitespace-only".to_string(),
            ));
        }
        if term.len() > MAX_BLACKLIST_TERM_LENGTH {
            return Err(VeilError::InvalidBlacklistTerm(
                term.chars().take(16).collect::<String>() + "...",
                format!(
                    "term length ({}) exceeds maximum allowed ({})",
                    term.len(),
                    MAX_BLACKLIST_TERM_LENGTH
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_load_and_validate() {
        let config = RuleConfig::load_default_rules().unwrap();
        assert!(config.rules.iter().any(|r| r.name == "email"));
        assert!(validate_rules(&config.rules).is_ok());

        // Priorities must be strictly ordered so evaluation order is total.
        let mut priorities: Vec<i32> = config.rules.iter().map(|r| r.priority).collect();
        priorities.sort_unstable();
        priorities.dedup();
        assert_eq!(priorities.len(), config.rules.len());
    }

    #[test]
    fn duplicate_rule_names_are_rejected() {
        let rule = DetectionRule {
            name: "twice".to_string(),
            category: Category::Email,
            priority: 1,
            description: None,
            pattern: "a".to_string(),
        };
        let err = validate_rules(&[rule.clone(), rule]).unwrap_err();
        assert!(err.to_string().contains("Duplicate rule name"));
    }

    #[test]
    fn bad_regex_is_rejected() {
        let rule = DetectionRule {
            name: "broken".to_string(),
            category: Category::Card,
            priority: 1,
            description: None,
            pattern: "(unclosed".to_string(),
        };
        assert!(validate_rules(&[rule]).is_err());
    }

    #[test]
    fn blacklist_terms_are_validated() {
        assert!(validate_blacklist_terms(&["Apollo".to_string()]).is_ok());
        assert!(validate_blacklist_terms(&["  ".to_string()]).is_err());
        assert!(validate_blacklist_terms(&["x".repeat(300)]).is_err());
    }

    #[test]
    fn engine_config_defaults_are_sane() {
        let config = EngineConfig::default();
        assert!(config.blacklist_terms.is_empty());
        assert_eq!(config.min_entity_len, 2);
        assert!(config.recognizer_timeout_ms > 0);
    }
}
