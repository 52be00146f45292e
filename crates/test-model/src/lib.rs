//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agent_platform_model::{
    AssistantMessage, ErrorKind, ModelFinishReason, ModelMessage,
    ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

struct ScriptStep {
    response: PresetResponse,
    attempts: AtomicU64,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request. A step is selected by counting the
/// assistant messages already present in the request history, so the first
/// request gets the first step, the request after a tool round trip gets the
/// second one, and so on. If there are no enough steps in the script, an
/// error will be returned.
///
/// Every received request is recorded and can be inspected afterwards.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Vec<Arc<ScriptStep>>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl TestModelProvider {
    /// Creates a provider from a JSON array of [`PresetResponse`]s.
    pub fn from_script_json(json: &str) -> serde_json::Result<Self> {
        let presets: Vec<PresetResponse> = serde_json::from_str(json)?;
        let mut provider = Self::default();
        for preset in presets {
            provider.add_response(preset);
        }
        Ok(provider)
    }

    /// Appends the reply for the next assistant turn.
    #[inline]
    pub fn add_response(&mut self, preset: PresetResponse) {
        self.script.push(Arc::new(ScriptStep {
            response: preset,
            attempts: AtomicU64::new(0),
        }));
    }

    /// Delays every reply by `duration`.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the requests received so far, oldest first.
    pub fn received_requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn respond(&self, req: &ModelRequest) -> Result<ModelResponse, Error> {
        let step_idx = req
            .messages
            .iter()
            .filter(|msg| matches!(msg, ModelMessage::Assistant(_)))
            .count();
        let Some(step) = self.script.get(step_idx) else {
            return Err(Error {
                message: "not enough steps",
                kind: ErrorKind::Other,
            });
        };

        let attempt = step.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        match step.response.failures {
            Some(0) => {
                return Err(Error {
                    message: "preset failure",
                    kind: ErrorKind::Unavailable,
                });
            }
            Some(failures) if attempt <= failures => {
                return Err(Error {
                    message: "preset failure",
                    kind: ErrorKind::RateLimitExceeded,
                });
            }
            _ => {}
        }

        let preset = &step.response;
        Ok(ModelResponse {
            message: AssistantMessage {
                id: Some(format!("msg:{step_idx}")),
                content: preset.content.clone(),
                tool_calls: preset.tool_calls.clone(),
            },
            finish_reason: if preset.tool_calls.is_empty() {
                ModelFinishReason::Stop
            } else {
                ModelFinishReason::ToolCalls
            },
            usage: None,
        })
    }
}

impl Debug for TestModelProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestModelProvider")
            .field("steps", &self.script.len())
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req.clone());
        }
        let result = self.respond(req);
        let delay = self.delay.unwrap_or(Duration::from_millis(1));
        async move {
            sleep(delay).await;
            result
        }
    }
}
