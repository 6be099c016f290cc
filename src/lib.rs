//! smartfields - smart-field generation engine for flashcard notes
//!
//! This crate is the core of a flashcard add-on that auto-populates note
//! fields ("smart fields") using AI text, speech, and image generation.
//! Fields may reference each other's output in their prompt templates, so
//! generating a note means building a dependency graph over its fields,
//! validating it, and executing it in dependency order with as much
//! concurrency as the graph allows.
//!
//! The host application (its note storage, GUI, and the provider HTTP
//! clients) stays outside this crate, behind traits: notes are accessed
//! through [`note::NoteFields`], generation happens through
//! [`resolver::FieldResolver`], and progress flows out through
//! [`utils::progress::ProgressSink`].
//!
//! # Architecture Overview
//!
//! Generation of one note flows through four stages:
//!
//! 1. **Index** - [`prompts::PromptMap`] maps note type and deck to the
//!    configured templates and per-field settings, with per-deck overrides
//!    falling back to a global scope.
//! 2. **Build** - [`graph::build_graph`] creates a [`graph::FieldNode`]
//!    per templated field and wires producer→consumer edges by scanning
//!    templates for `{{field}}` references. With a target field, the graph
//!    is pruned to the target and its transitive inputs.
//! 3. **Validate** - [`graph::has_cycle`] rejects cyclic configurations;
//!    [`graph::prompt_has_error`] checks candidate templates when the user
//!    saves a prompt.
//! 4. **Schedule** - [`scheduler::Scheduler`] repeatedly dispatches the
//!    frontier of dependency-free nodes concurrently, applies each node's
//!    resolution policy (skip, abort, reuse, or generate), propagates
//!    aborts to descendants, and unlinks resolved nodes until the graph is
//!    empty.
//!
//! [`processor::NoteProcessor`] ties the stages together for single notes
//! and for concurrent batches with per-note failure isolation.
//!
//! # Core Modules
//!
//! - [`config`] - engine defaults and policy switches
//! - [`core`] - shared identifiers, field types, and error handling
//! - [`graph`] - dependency graph construction, pruning, cycle detection
//! - [`note`] - the host note accessor trait and an in-memory note
//! - [`processor`] - per-note and batch orchestration, request guarding
//! - [`prompts`] - prompt configuration, placeholder extraction,
//!   interpolation
//! - [`resolver`] - the injected field-resolution capability
//! - [`scheduler`] - tiered-parallel graph execution
//! - [`utils`] - progress sinks and the resolver retry contract
//!
//! # Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use smartfields::config::EngineConfig;
//! use smartfields::core::{DeckId, NoteId, ResolveError};
//! use smartfields::note::InMemoryNote;
//! use smartfields::processor::{NoteProcessor, ProcessOptions};
//! use smartfields::prompts::{FieldExtras, PromptMap};
//! use smartfields::resolver::{FieldResolver, ResolveRequest};
//! use smartfields::utils::progress::NoopProgress;
//!
//! struct MyResolver;
//!
//! #[async_trait]
//! impl FieldResolver for MyResolver {
//!     async fn resolve(&self, request: ResolveRequest) -> Result<Option<String>, ResolveError> {
//!         // Call your chat/TTS/image providers here.
//!         Ok(Some(format!("generated for {}", request.field)))
//!     }
//! }
//!
//! # async fn run() -> Result<(), smartfields::core::SmartFieldsError> {
//! let mut prompts = PromptMap::default();
//! prompts.set_prompt(
//!     "Basic",
//!     DeckId::GLOBAL,
//!     "Back",
//!     "Translate {{Front}} into German",
//!     FieldExtras::default(),
//! );
//!
//! let processor = NoteProcessor::new(MyResolver, EngineConfig::default(), prompts);
//! let mut note = InMemoryNote::new("Basic", NoteId(1))
//!     .with_field("Front", "hello")
//!     .with_field("Back", "");
//!
//! let report = processor
//!     .process_note(&mut note, DeckId::GLOBAL, &ProcessOptions::default(), &NoopProgress)
//!     .await?;
//! assert!(report.did_update());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod core;
pub mod graph;
pub mod note;
pub mod processor;
pub mod prompts;
pub mod resolver;
pub mod scheduler;
pub mod utils;
