use std::time::Duration;

use async_trait::async_trait;

use crate::{GenerationClient, GenerationRequest, GenerationResponse};
use scrivener_types::ScrivenerError;

// ---------------------------------------------------------------------------
// DeadlineClient
// ---------------------------------------------------------------------------

/// Wraps a [`GenerationClient`] with a hard deadline.
///
/// There is no cancellation in the underlying contract: once a call is
/// issued it runs to completion or failure. This wrapper bounds how long the
/// caller waits, surfacing an elapsed deadline as a timeout error that the
/// controller folds into its uniform upstream-failure handling.
pub struct DeadlineClient<C> {
    inner: C,
    timeout: Duration,
}

impl<C> DeadlineClient<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<C: GenerationClient> GenerationClient for DeadlineClient<C> {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> scrivener_types::Result<GenerationResponse> {
        match tokio::time::timeout(self.timeout, self.inner.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(ScrivenerError::RequestTimeout {
                provider: self.inner.name().to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn default_model(&self) -> &str {
        self.inner.default_model()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Usage;

    struct SlowClient {
        delay: Duration,
    }

    #[async_trait]
    impl GenerationClient for SlowClient {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> scrivener_types::Result<GenerationResponse> {
            tokio::time::sleep(self.delay).await;
            Ok(GenerationResponse {
                id: "slow-resp".into(),
                text: "done".into(),
                model: request.model.clone(),
                usage: Usage::default(),
            })
        }

        fn name(&self) -> &str {
            "slow"
        }

        fn default_model(&self) -> &str {
            "slow-model"
        }
    }

    #[tokio::test]
    async fn passes_through_when_fast_enough() {
        let client = DeadlineClient::new(
            SlowClient {
                delay: Duration::from_millis(5),
            },
            Duration::from_secs(5),
        );
        let req = GenerationRequest::text("i", "payload", "m");
        let resp = client.generate(&req).await.unwrap();
        assert_eq!(resp.text, "done");
    }

    #[tokio::test]
    async fn elapsed_deadline_becomes_timeout_error() {
        let client = DeadlineClient::new(
            SlowClient {
                delay: Duration::from_secs(60),
            },
            Duration::from_millis(10),
        );
        let req = GenerationRequest::text("i", "payload", "m");
        let err = client.generate(&req).await.unwrap_err();
        match err {
            ScrivenerError::RequestTimeout {
                provider,
                timeout_ms,
            } => {
                assert_eq!(provider, "slow");
                assert_eq!(timeout_ms, 10);
            }
            other => panic!("expected RequestTimeout, got {other:?}"),
        }
    }

    #[test]
    fn metadata_delegates_to_inner() {
        let client = DeadlineClient::new(
            SlowClient {
                delay: Duration::ZERO,
            },
            Duration::from_secs(1),
        );
        assert_eq!(client.name(), "slow");
        assert_eq!(client.default_model(), "slow-model");
    }
}
