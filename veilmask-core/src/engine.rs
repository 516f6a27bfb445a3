// veilmask-core/src/engine.rs
//! The masking and unmasking engine.
//!
//! Masking rewrites a working buffer rule by rule, in fixed priority order:
//! the user blacklist first, recognizer-supplied people and organizations
//! next, then the static detectors (email, card, government-ID shape,
//! corporate suffix, proper-noun fallback). Earlier rules see raw text;
//! later rules see already-masked text, and no rule matches a placeholder,
//! which makes repeated masking a no-op.
//!
//! Unmasking is the read-only inverse: it strips presentation decorations,
//! resolves every well-formed placeholder it can, and leaves everything else
//! untouched. Both operations are total over arbitrary input text; only a
//! persistence failure in the alias store can make `mask` return an error.
//!
//! License: MIT OR APACHE 2.0

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::category::Category;
use crate::config::{validate_blacklist_terms, EngineConfig, RuleConfig};
use crate::errors::VeilError;
use crate::recognizer::{EntityRecognizer, RecognizedSpan};
use crate::rules::{
    blacklist_detector, get_or_compile_detectors, span_detector, CompiledDetector,
    CompiledDetectors,
};
use crate::store::AliasStore;
use crate::token;

/// The result of one mask operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskOutcome {
    /// The input with every detected span replaced by its placeholder.
    pub text: String,
    /// True if at least one substitution happened.
    pub was_masked: bool,
    /// True if a recognizer was configured but failed or timed out, so only
    /// static rules ran.
    pub degraded: bool,
    /// Per-category replacement tally for this call, in priority order.
    pub summary: Vec<MaskSummaryItem>,
}

/// Replacements attributed to one category during a single mask call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskSummaryItem {
    pub category: Category,
    pub occurrences: usize,
    /// The placeholders substituted in, in replacement order. Originals are
    /// deliberately absent; the caller can resolve through the store when it
    /// genuinely needs them.
    pub aliases: Vec<String>,
}

/// A reversible de-identification engine over one alias store.
pub struct MaskEngine {
    store: AliasStore,
    detectors: Arc<CompiledDetectors>,
    recognizer: Option<Box<dyn EntityRecognizer>>,
    config: EngineConfig,
}

impl std::fmt::Debug for MaskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskEngine")
            .field("store", &self.store)
            .field("detectors", &self.detectors.detectors.len())
            .field("recognizer", &self.recognizer.is_some())
            .finish()
    }
}

impl MaskEngine {
    /// Builds an engine over `store` with default configuration and the
    /// embedded static rule set.
    pub fn new(store: AliasStore) -> Result<Self, VeilError> {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: AliasStore, config: EngineConfig) -> Result<Self, VeilError> {
        let rules = RuleConfig::load_default_rules()?;
        Self::with_rules(store, config, &rules)
    }

    /// Builds an engine over a custom static rule set instead of the
    /// embedded one. The blacklist and recognizer layers are unaffected.
    pub fn with_rules(
        store: AliasStore,
        config: EngineConfig,
        rules: &RuleConfig,
    ) -> Result<Self, VeilError> {
        validate_blacklist_terms(&config.blacklist_terms)?;
        let detectors = get_or_compile_detectors(rules)?;
        Ok(Self { store, detectors, recognizer: None, config })
    }

    /// Attaches an external entity recognizer. Without one the engine runs
    /// rule-only, which is fully supported, not an error state.
    pub fn with_recognizer(mut self, recognizer: Box<dyn EntityRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn store(&self) -> &AliasStore {
        &self.store
    }

    /// Direct alias registration, bypassing detection.
    pub fn get_or_create(&mut self, original: &str, category: Category) -> Result<String, VeilError> {
        self.store.get_or_create(original, category)
    }

    /// Resolves one placeholder back to its original text.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.store.resolve(alias)
    }

    /// Masks every detected sensitive span in `text`.
    ///
    /// `blacklist` is merged after the engine's configured terms; both are
    /// matched case-insensitively and whole-word before any other rule runs,
    /// so an explicit "always redact this" wins over automatic detection.
    pub fn mask(&mut self, text: &str, blacklist: &[String]) -> Result<MaskOutcome, VeilError> {
        validate_blacklist_terms(blacklist)?;

        let mut working = text.to_string();
        let mut was_masked = false;
        let mut degraded = false;
        let mut tally: HashMap<Category, Vec<String>> = HashMap::new();

        // 1. Blacklist (Entity), highest priority.
        let terms = self.merged_blacklist(blacklist);
        if let Some(detector) = blacklist_detector(&terms)? {
            self.apply_detector(&detector, &mut working, &mut was_masked, &mut tally)?;
        }

        // 2. Recognizer-supplied people and organizations, if available.
        let recognized = self
            .recognizer
            .as_deref()
            .map(|recognizer| Self::recognized_spans(recognizer, &self.config, &working));
        match recognized {
            Some(Ok(spans)) => {
                for span in spans {
                    let detector = span_detector(&span.text, span.category)?;
                    self.apply_detector(&detector, &mut working, &mut was_masked, &mut tally)?;
                }
            }
            Some(Err(e)) => {
                warn!("Entity recognizer degraded ({}); masking with static rules only.", e);
                degraded = true;
            }
            None => {}
        }

        // 3. Static detectors, already sorted by descending priority.
        let detectors = Arc::clone(&self.detectors);
        for detector in &detectors.detectors {
            self.apply_detector(detector, &mut working, &mut was_masked, &mut tally)?;
        }

        let summary = Category::ALL
            .iter()
            .filter_map(|category| {
                tally.remove(category).map(|aliases| MaskSummaryItem {
                    category: *category,
                    occurrences: aliases.len(),
                    aliases,
                })
            })
            .collect();

        Ok(MaskOutcome { text: working, was_masked, degraded, summary })
    }

    /// Restores original text for every resolvable placeholder.
    ///
    /// Decoration markers are stripped first. Placeholders that do not
    /// resolve (a different store instance, hand-typed tokens) and bracketed
    /// tokens outside the category vocabulary pass through unchanged; a bad
    /// token never fails the whole operation.
    pub fn unmask(&self, text: &str) -> String {
        let stripped = token::strip_decorations(text);
        token::placeholder_pattern()
            .replace_all(&stripped, |caps: &regex::Captures<'_>| {
                let placeholder = &caps[0];
                match self.store.resolve(placeholder) {
                    Some(original) => original.to_string(),
                    None => {
                        debug!("Leaving unresolvable placeholder {} in place.", placeholder);
                        placeholder.to_string()
                    }
                }
            })
            .into_owned()
    }

    fn merged_blacklist(&self, extra: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        for term in self.config.blacklist_terms.iter().chain(extra) {
            let trimmed = term.trim();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(trimmed.to_lowercase()) {
                terms.push(trimmed.to_string());
            }
        }
        terms
    }

    /// Calls the recognizer within the configured bound and normalizes its
    /// spans: only people/organizations, strictly longer than the configured
    /// minimum, people first, longest first within a category so a full name
    /// is masked before any shorter span it contains.
    fn recognized_spans(
        recognizer: &dyn EntityRecognizer,
        config: &EngineConfig,
        text: &str,
    ) -> Result<Vec<RecognizedSpan>, crate::recognizer::RecognizerError> {
        let timeout = Duration::from_millis(config.recognizer_timeout_ms);
        let mut spans = recognizer.find_entities(text, timeout)?;

        spans.retain(|span| {
            let keep = matches!(span.category, Category::Client | Category::Company)
                && span.text.trim().chars().count() > config.min_entity_len;
            if !keep {
                debug!("Dropping recognizer span outside policy ({}).", span.category);
            }
            keep
        });
        for span in &mut spans {
            span.text = span.text.trim().to_string();
        }

        let mut deduped: Vec<RecognizedSpan> = Vec::with_capacity(spans.len());
        for span in spans {
            if !deduped.contains(&span) {
                deduped.push(span);
            }
        }
        deduped.sort_by(|a, b| {
            let rank = |c: &Category| if *c == Category::Client { 0 } else { 1 };
            rank(&a.category)
                .cmp(&rank(&b.category))
                .then_with(|| b.text.len().cmp(&a.text.len()))
                .then_with(|| a.text.cmp(&b.text))
        });
        Ok(deduped)
    }

    /// Replaces every non-overlapping match of `detector` in `working` with
    /// its alias, left to right, first match wins per position.
    fn apply_detector(
        &mut self,
        detector: &CompiledDetector,
        working: &mut String,
        was_masked: &mut bool,
        tally: &mut HashMap<Category, Vec<String>>,
    ) -> Result<(), VeilError> {
        let matches: Vec<(usize, usize)> = detector
            .regex
            .find_iter(working)
            .map(|m| (m.start(), m.end()))
            .collect();
        if matches.is_empty() {
            return Ok(());
        }

        let substitutions = matches.len();
        let mut rewritten = String::with_capacity(working.len());
        let mut last_end = 0usize;
        for (start, end) in matches {
            rewritten.push_str(&working[last_end..start]);
            let alias = self.store.get_or_create(&working[start..end], detector.category)?;
            tally.entry(detector.category).or_default().push(alias.clone());
            rewritten.push_str(&alias);
            *was_masked = true;
            last_end = end;
        }
        rewritten.push_str(&working[last_end..]);

        debug!("Rule '{}' substituted {} span(s).", detector.name, substitutions);
        *working = rewritten;
        Ok(())
    }
}
