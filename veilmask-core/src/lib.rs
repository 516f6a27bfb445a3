// veilmask-core/src/lib.rs
//! # Veilmask Core Library
//!
//! `veilmask-core` provides the fundamental, platform-independent logic for
//! reversible text de-identification. It detects sensitive spans (names,
//! organizations, emails, card numbers, government-ID shapes, user-supplied
//! blacklist terms), replaces each with a stable placeholder token, records
//! the mapping in a persistent alias store, and reconstructs the original
//! text on demand.
//!
//! The library is a pure text-in/text-out engine: it knows nothing about
//! chat interfaces, clipboards, or terminals. Persistence and natural-
//! language entity recognition are external collaborators behind small
//! traits, injected at construction time.
//!
//! ## Modules
//!
//! * `category`: The fixed six-tag vocabulary of placeholder categories.
//! * `token`: The placeholder wire grammar (`[Category_N]`) and decoration
//!   stripping.
//! * `store`: The persistent, bidirectional alias store with per-category
//!   sequence numbering.
//! * `persist`: The `StoreBackend` trait plus JSON-file and in-memory
//!   implementations.
//! * `config`: Detection rules and engine configuration, YAML-loadable.
//! * `rules`: Rule compilation with a global compiled-detector cache, plus
//!   the per-invocation blacklist and recognizer-span detector builders.
//! * `recognizer`: The optional external entity-recognizer boundary.
//! * `engine`: The masking/unmasking engine tying it all together.
//! * `errors`: The crate's structured error type.
//!
//! ## Usage Example
//!
//! ```rust
//! use veilmask_core::{AliasStore, MaskEngine, MemoryBackend};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     // 1. Open an alias store. JsonFileBackend gives durable storage;
//!     //    MemoryBackend is for tests and throwaway sessions.
//!     let store = AliasStore::open(Box::new(MemoryBackend::new()))?;
//!
//!     // 2. Build the engine. Without a recognizer it runs rule-only.
//!     let mut engine = MaskEngine::new(store)?;
//!
//!     // 3. Mask before sending text to an untrusted party...
//!     let outcome = engine.mask("Contact John Smith at john@acme.com", &[])?;
//!     assert!(outcome.was_masked);
//!     assert!(!outcome.text.contains("john@acme.com"));
//!
//!     // 4. ...and unmask whatever comes back.
//!     let restored = engine.unmask(&outcome.text);
//!     assert_eq!(restored, "Contact John Smith at john@acme.com");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Masking and unmasking are total over arbitrary input text. The only
//! error a mask call can surface is a persistence failure from the alias
//! store, and even then the new alias stays usable in memory for the rest
//! of the process. A configured recognizer that is unavailable or times out
//! degrades the call to rule-only masking instead of failing it.
//!
//! ## Design Principles
//!
//! * **Reversible by contract:** the placeholder grammar is the wire format
//!   between masking and unmasking; the alias store is the single source of
//!   truth for both directions.
//! * **Injected collaborators:** persistence and entity recognition are
//!   traits, so the core logic is testable with no real filesystem or NLP
//!   service present.
//! * **Availability over recovery:** malformed persisted state starts the
//!   store empty (logged) rather than failing startup.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod category;
pub mod config;
pub mod engine;
pub mod errors;
pub mod persist;
pub mod recognizer;
pub mod rules;
pub mod store;
pub mod token;

/// Re-exports the fixed placeholder category vocabulary.
pub use category::Category;

/// Re-exports the custom error type for clear error reporting.
pub use errors::VeilError;

/// Re-exports engine configuration and rule configuration types.
pub use config::{
    validate_blacklist_terms, DetectionRule, EngineConfig, RuleConfig, MAX_BLACKLIST_TERM_LENGTH,
    MAX_PATTERN_LENGTH,
};

/// Re-exports the masking/unmasking engine and its outcome types.
pub use engine::{MaskEngine, MaskOutcome, MaskSummaryItem};

/// Re-exports the alias store and its entry type.
pub use store::{AliasEntry, AliasStore};

/// Re-exports the persistence boundary and the bundled backends.
pub use persist::{JsonFileBackend, MemoryBackend, StoreBackend};

/// Re-exports the recognizer boundary types.
pub use recognizer::{EntityRecognizer, HttpRecognizer, RecognizedSpan, RecognizerError};

/// Re-exports the placeholder grammar helpers for advanced usage.
pub use token::{format_placeholder, parse_placeholder, strip_decorations, DECORATION_MARKER};

/// Re-exports the compiled-detector types for advanced usage.
pub use rules::{compile_detectors, get_or_compile_detectors, CompiledDetector, CompiledDetectors};
