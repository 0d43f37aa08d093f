use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::{DynClient, GenerationClient, GenerationRequest, GenerationResponse};
use scrivener_types::ScrivenerError;

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

pub trait Middleware: Send + Sync {
    fn before(&self, _request: &mut GenerationRequest) {}
    fn after(&self, _request: &GenerationRequest, _response: &mut GenerationResponse) {}
}

// ---------------------------------------------------------------------------
// Built-in middleware: LoggingMiddleware
// ---------------------------------------------------------------------------

pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn before(&self, request: &mut GenerationRequest) {
        tracing::info!(
            model = %request.model,
            content_items = request.content.len(),
            "generation request"
        );
    }

    fn after(&self, _request: &GenerationRequest, response: &mut GenerationResponse) {
        tracing::info!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "generation response"
        );
    }
}

// ---------------------------------------------------------------------------
// Built-in middleware: UsageTrackingMiddleware
// ---------------------------------------------------------------------------

pub struct UsageTrackingMiddleware {
    total_input: Arc<AtomicU64>,
    total_output: Arc<AtomicU64>,
}

impl UsageTrackingMiddleware {
    pub fn new() -> Self {
        Self {
            total_input: Arc::new(AtomicU64::new(0)),
            total_output: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A handle that shares counters with this middleware.
    pub fn handle(&self) -> Self {
        Self {
            total_input: self.total_input.clone(),
            total_output: self.total_output.clone(),
        }
    }

    pub fn total_input_tokens(&self) -> u64 {
        self.total_input.load(Ordering::Relaxed)
    }

    pub fn total_output_tokens(&self) -> u64 {
        self.total_output.load(Ordering::Relaxed)
    }
}

impl Default for UsageTrackingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for UsageTrackingMiddleware {
    fn after(&self, _request: &GenerationRequest, response: &mut GenerationResponse) {
        self.total_input
            .fetch_add(response.usage.input_tokens, Ordering::Relaxed);
        self.total_output
            .fetch_add(response.usage.output_tokens, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// GenerationService
// ---------------------------------------------------------------------------

/// Front door to the generation service: a client registry plus middleware
/// applied around every request.
pub struct GenerationService {
    clients: HashMap<String, DynClient>,
    middleware: Vec<Box<dyn Middleware>>,
}

impl GenerationService {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
            middleware: Vec::new(),
        }
    }

    pub fn register_client(&mut self, client: impl GenerationClient + 'static) {
        let name = client.name().to_string();
        self.clients.insert(name, DynClient::new(client));
    }

    pub fn with_middleware(mut self, m: impl Middleware + 'static) -> Self {
        self.middleware.push(Box::new(m));
        self
    }

    /// Build a service from environment credentials.
    ///
    /// Fails immediately when no provider key is configured — this is the
    /// fatal-at-startup configuration error, not a per-request one.
    pub fn from_env() -> Result<Self, ScrivenerError> {
        let mut service = Self::new();
        if let Ok(adapter) = crate::OpenAiAdapter::from_env() {
            service.register_client(adapter);
        }
        if service.clients.is_empty() {
            return Err(ScrivenerError::Other(
                "No generation service credentials found in environment".to_string(),
            ));
        }
        Ok(service)
    }

    fn resolve(&self) -> Result<&DynClient, ScrivenerError> {
        self.clients.values().next().ok_or_else(|| {
            ScrivenerError::Other("No generation clients registered".to_string())
        })
    }
}

impl Default for GenerationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationClient for GenerationService {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> scrivener_types::Result<GenerationResponse> {
        let client = self.resolve()?;
        let mut req = request.clone();

        for m in &self.middleware {
            m.before(&mut req);
        }

        let mut resp = client.generate(&req).await?;

        for m in &self.middleware {
            m.after(&req, &mut resp);
        }

        Ok(resp)
    }

    fn name(&self) -> &str {
        "generation-service"
    }

    fn default_model(&self) -> &str {
        self.clients
            .values()
            .next()
            .map(|c| c.default_model())
            .unwrap_or("gpt-4.1-mini")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
