//! Generation-service client for the Scrivener pipeline.
//!
//! The pipeline controller talks to an external text-generation service
//! through the [`GenerationClient`] trait: one instruction string, an ordered
//! list of text/inline-image content items, and a model id in; plain text
//! out. Any transport error, timeout, or empty payload is treated by the
//! controller as a single uniform failure signal.
//!
//! - [`OpenAiAdapter`] — reqwest-based adapter for the OpenAI Responses API
//! - [`GenerationService`] — client registry with request/response middleware
//! - [`DeadlineClient`] — wraps any client with a hard deadline

mod client;
mod deadline;
mod openai;
mod service;
mod types;

pub use client::{DynClient, GenerationClient};
pub use deadline::DeadlineClient;
pub use openai::OpenAiAdapter;
pub use service::{GenerationService, LoggingMiddleware, Middleware, UsageTrackingMiddleware};
pub use types::{ContentItem, GenerationRequest, GenerationResponse, Usage};
