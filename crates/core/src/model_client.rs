use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use agent_platform_model::{
    ModelProvider, ModelProviderError, ModelRequest, ModelResponse, ModelTool,
};
use backoff::ExponentialBackoffBuilder;
use backoff::future::retry_notify;
use tracing::Instrument;

type SendRequestResult = Result<ModelResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn = Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// How transient model errors are retried.
///
/// Only errors whose [`ErrorKind::is_transient`] returns `true` are retried;
/// everything else is reported right away.
///
/// [`ErrorKind::is_transient`]: agent_platform_model::ErrorKind::is_transient
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry. Later delays grow exponentially.
    pub initial_interval: Duration,
    /// Upper bound of a single delay.
    pub max_interval: Duration,
    /// Give up once this much time has passed since the first attempt.
    /// `None` disables retrying.
    pub max_elapsed_time: Option<Duration>,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[inline]
    pub fn never() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            max_elapsed_time: None,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
            max_elapsed_time: Some(Duration::from_secs(60)),
        }
    }
}

/// A wrapper around a model provider that binds a toolset and a retry
/// policy, and provides a type-erased interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
    tools: Arc<[ModelTool]>,
    retry_policy: RetryPolicy,
}

impl ModelClient {
    /// Wraps `provider` with no tools bound and the default retry policy.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(async move {
                fut.await
                    .map_err(|err| Box::new(err) as Box<dyn ModelProviderError>)
            })
        });
        Self {
            handler_fn,
            tools: Arc::from(Vec::new()),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Returns a client that offers `tools` to the model on every request
    /// that doesn't specify its own.
    #[inline]
    pub fn bind_tools(mut self, tools: Vec<ModelTool>) -> Self {
        self.tools = tools.into();
        self
    }

    /// Returns a client retrying transient errors with `policy`.
    #[inline]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Returns the tools bound to this client.
    #[inline]
    pub fn tools(&self) -> &[ModelTool] {
        &self.tools
    }

    /// Sends a request and returns the response.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future abandons the request
    /// and any pending retries.
    pub fn send_request(
        &self,
        mut req: ModelRequest,
    ) -> impl Future<Output = SendRequestResult> + Send + 'static {
        if req.tools.is_empty() {
            req.tools = self.tools.to_vec();
        }
        let handler_fn = Arc::clone(&self.handler_fn);
        let policy = self.retry_policy;

        async move {
            trace!("got a request: {req:?}");
            let Some(max_elapsed_time) = policy.max_elapsed_time else {
                return handler_fn(req).await;
            };

            let backoff = ExponentialBackoffBuilder::new()
                .with_initial_interval(policy.initial_interval)
                .with_max_interval(policy.max_interval)
                .with_max_elapsed_time(Some(max_elapsed_time))
                .build();
            let result = retry_notify(
                backoff,
                || {
                    let fut = handler_fn(req.clone());
                    async move {
                        fut.await.map_err(|err| {
                            if err.kind().is_transient() {
                                backoff::Error::transient(err)
                            } else {
                                backoff::Error::permanent(err)
                            }
                        })
                    }
                },
                |err: Box<dyn ModelProviderError>, delay: Duration| {
                    warn!("model request failed ({err}), retrying in {delay:?}");
                },
            )
            .await;

            match &result {
                Ok(resp) => trace!("finished a request: {resp:?}"),
                Err(err) => error!("got an error: {err}"),
            }
            result
        }
        .instrument(trace_span!("model client req"))
    }
}
