//! # Session
//!
//! The conversation window: an ordered sequence of role-tagged turns,
//! bounded to `2 × max_turns` entries (one user + one assistant message per
//! turn). Insertion order is the only ordering; eviction always removes from
//! the oldest end.

use tracing::debug;

/// Who produced a turn. Serialized on the wire as `"user"` / `"assistant"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Chat-completions API role string.
    pub fn as_str(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// One role-tagged message in the conversation history.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

/// Bounded conversation history. Holds at most `2 × max_turns` turns; adding
/// beyond the bound evicts from the front, one turn at a time.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    turns: Vec<Turn>,
    max_turns: usize,
}

impl ConversationWindow {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns,
        }
    }

    /// Appends a turn, then evicts from the front while the window exceeds
    /// its bound. The while loop keeps bulk insertions correct too.
    pub fn add_message(&mut self, role: TurnRole, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });

        while self.turns.len() > self.max_turns * 2 {
            self.turns.remove(0);
            debug!("History over limit, evicted the oldest turn");
        }
    }

    /// Current turns, oldest first. Read-only view.
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    /// Empties the window. Called once per new connection's ready
    /// transition, never mid-connection.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
