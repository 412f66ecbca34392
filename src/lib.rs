//! DLI-AI Risk Audit Library
//!
//! Validates a business profile questionnaire, builds the risk-analysis
//! prompt, calls the language model, and turns its reply into a
//! schema-checked assessment with derived figures for the report renderers.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `assessment`: Per-submission pipeline orchestration.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `leads`: Lead capture sink.
//! - `llm_client`: Chat-completions client.
//! - `metrics`: Derived figures (prevention cost, chart inputs).
//! - `models`: Form, assessment, and report models.
//! - `parser`: Model reply parsing and schema validation.
//! - `prompt`: Prompt construction.
//! - `validation`: Form input validation.

pub mod api;
pub mod core;
pub mod integrations;

pub mod assessment;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod leads;
pub mod llm_client;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod prompt;
pub mod validation;
