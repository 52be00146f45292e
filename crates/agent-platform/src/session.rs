use agent_platform_core::conversation::Conversation;
use agent_platform_core::graph::GraphError;
use agent_platform_core::{Agent, AgentBuilder};
use agent_platform_model::ModelProvider;

use crate::tools::*;

/// The system prompt used when none is set.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider)
            .with_system_prompt(DEFAULT_SYSTEM_PROMPT.trim());
        Self { agent_builder }
    }

    /// Sets the system prompt for the agent.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.agent_builder = self.agent_builder.with_system_prompt(prompt);
        self
    }

    /// Limits the number of graph steps of one message.
    #[inline]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.agent_builder = self.agent_builder.with_recursion_limit(limit);
        self
    }

    /// Builds a new session with the built-in tools.
    pub fn build(self) -> Result<Session, GraphError> {
        let agent = self
            .agent_builder
            .with_tool(WeatherTool::new())
            .with_tool(MultiplyTool::new())
            .with_tool(AddTool::new())
            .with_tool(DivideTool::new())
            .build()?;

        Ok(Session { agent })
    }
}

/// A chat session.
///
/// The session holds a fully configured agent that you can use directly, and it
/// is basically a wrapper around [`Agent`]. Every message starts a fresh
/// conversation.
#[derive(Clone)]
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Sends a message and waits for the agent to finish answering it.
    #[inline]
    pub async fn send_message(
        &self,
        message: &str,
    ) -> Result<Conversation, GraphError> {
        self.agent.invoke(message).await
    }

    /// Renders the agent graph as a Mermaid flowchart.
    #[inline]
    pub fn draw_mermaid(&self) -> String {
        self.agent.draw_mermaid()
    }

    /// Renders the agent graph as a standalone HTML page that draws the
    /// Mermaid flowchart when opened in a browser.
    pub fn draw_html(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Agent graph</title>
<script type="module">
import mermaid from "https://cdn.jsdelivr.net/npm/mermaid@11/dist/mermaid.esm.min.mjs";
mermaid.initialize({{ startOnLoad: true }});
</script>
</head>
<body>
<pre class="mermaid">
{}</pre>
</body>
</html>
"#,
            escape_html(&self.draw_mermaid())
        )
    }

    /// Returns the underlying agent.
    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
