/// Where execution continues after a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Goto {
    /// Run the named node next.
    Node(String),
    /// Stop and return the state.
    End,
}

impl Goto {
    /// Shorthand for [`Goto::Node`].
    #[inline]
    pub fn node<S: Into<String>>(name: S) -> Self {
        Self::Node(name.into())
    }
}

/// The outcome of running a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command<U> {
    /// Update to merge into the state, if any.
    pub update: Option<U>,
    /// Explicit routing. When `None`, the static edges of the node decide.
    pub goto: Option<Goto>,
}

impl<U> Command<U> {
    /// A command that changes nothing and follows the static edges.
    #[inline]
    pub fn none() -> Self {
        Self {
            update: None,
            goto: None,
        }
    }

    /// A command carrying `update` that follows the static edges.
    #[inline]
    pub fn update(update: U) -> Self {
        Self {
            update: Some(update),
            goto: None,
        }
    }

    /// Routes to `goto` after this command is applied.
    #[inline]
    pub fn goto(mut self, goto: Goto) -> Self {
        self.goto = Some(goto);
        self
    }
}
