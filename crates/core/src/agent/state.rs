use agent_platform_graph::GraphState;
use agent_platform_model::ModelMessage;

/// The state threaded through the agent graph: the running message history.
///
/// The system prompt is not part of the state, it is prepended to every
/// model request instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentState {
    messages: Vec<ModelMessage>,
}

impl AgentState {
    /// Creates a state with the given history.
    #[inline]
    pub fn new(messages: Vec<ModelMessage>) -> Self {
        Self { messages }
    }

    /// Returns the history, oldest first.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Consumes the state and returns the history.
    #[inline]
    pub fn into_messages(self) -> Vec<ModelMessage> {
        self.messages
    }
}

impl GraphState for AgentState {
    type Update = Vec<ModelMessage>;

    /// Appends new messages to the history.
    #[inline]
    fn apply(&mut self, update: Self::Update) {
        self.messages.extend(update);
    }
}
