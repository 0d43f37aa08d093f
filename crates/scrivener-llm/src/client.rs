use async_trait::async_trait;

use crate::{GenerationRequest, GenerationResponse};

// ---------------------------------------------------------------------------
// GenerationClient
// ---------------------------------------------------------------------------

/// Contract with the external text-generation service.
///
/// Implementations are blocking round-trips: a call either returns the
/// generated text or fails. There is no cancellation; callers that need a
/// deadline wrap the client in [`crate::DeadlineClient`].
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> scrivener_types::Result<GenerationResponse>;

    fn name(&self) -> &str;

    fn default_model(&self) -> &str;
}

// ---------------------------------------------------------------------------
// DynClient
// ---------------------------------------------------------------------------

/// Owned, object-safe wrapper around any [`GenerationClient`].
pub struct DynClient(Box<dyn GenerationClient>);

impl DynClient {
    pub fn new(client: impl GenerationClient + 'static) -> Self {
        Self(Box::new(client))
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> scrivener_types::Result<GenerationResponse> {
        self.0.generate(request).await
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn default_model(&self) -> &str {
        self.0.default_model()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
