use std::collections::HashMap;
use std::future::ready;

use agent_platform_model::{ModelTool, ToolCallRequest};

use crate::tool::{Error, ToolFuture, ToolObject, ToolResult};

/// An executor that handles tool call requests from the model.
pub struct Executor {
    tools: Vec<Box<dyn ToolObject>>,
    by_name: HashMap<String, usize>,
}

impl Executor {
    /// Creates an executor. A later tool replaces an earlier one with the
    /// same name.
    pub fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut registered: Vec<Box<dyn ToolObject>> =
            Vec::with_capacity(tools.len());
        let mut by_name = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name().to_owned();
            match by_name.get(&name) {
                Some(&idx) => {
                    warn!("tool `{name}` is registered twice, keeping the last");
                    registered[idx] = tool;
                }
                None => {
                    by_name.insert(name, registered.len());
                    registered.push(tool);
                }
            }
        }
        Self {
            tools: registered,
            by_name,
        }
    }

    /// Tool definitions in registration order.
    #[inline]
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Turns every request into a future through `spawner`.
    ///
    /// Requests naming an unknown tool still produce a future, which
    /// resolves to a `NotFound` error, so every request gets an answer.
    pub fn handle_requests<S>(&self, requests: Vec<ToolCallRequest>, spawner: S)
    where
        S: FnMut(String, ToolFuture),
    {
        let mut spawner = spawner;

        let span = debug_span!("tool executor");
        let _enter = span.enter();
        for req in requests {
            let id = req.id;
            let Some(&idx) = self.by_name.get(&req.name) else {
                warn!("tool not found: {}", req.name);
                let err = Error::not_found()
                    .with_reason(format!("no tool named `{}`", req.name));
                spawner(id, Box::pin(ready(ToolResult::Err(err))));
                continue;
            };
            let arguments = req.arguments;
            trace!("spawning a tool ({id}) with args: {arguments:?}");
            spawner(id, self.tools[idx].execute(arguments));
        }
    }
}
