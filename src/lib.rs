//! EcoCred loan eligibility client library
//!
//! This library collects loan applications three ways (manual form, document
//! upload, chat), sends them to the prediction server and renders the
//! decision with its SHAP explanation and recommended schemes.
//!
//! # Modules
//!
//! - `core`: Domain components.
//! - `integrations`: Prediction server client.
//! - `chat_command`: `predict:` command detection in chat text.
//! - `config`: Configuration management.
//! - `conversation`: Chat transcript.
//! - `errors`: Error handling types.
//! - `form_state`: Manual form values and defaults.
//! - `models`: Request and response data models.
//! - `prediction_client`: HTTP client for `/predict`, `/predict_ocr` and `/chat`.
//! - `renderer`: Decision and explanation rendering.
//! - `request_builder`: Canonical prediction requests.
//! - `workflow`: Submission flows for the form and chat surfaces.

pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and the binary
pub mod chat_command;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod form_state;
pub mod models;
pub mod prediction_client;
pub mod renderer;
pub mod request_builder;
pub mod workflow;
