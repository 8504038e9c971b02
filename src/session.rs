use crate::models::MessageRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded exchange half
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// In-memory transcript of an interactive chat.
///
/// This is a log for display only; requests never include earlier turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    turns: Vec<Turn>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            turns: Vec::new(),
        }
    }

    pub fn record(&mut self, role: MessageRole, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
            at: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|turn| {
                let who = match turn.role {
                    MessageRole::User => "you",
                    MessageRole::Assistant => "agent",
                    MessageRole::System => "system",
                };
                format!("[{}] {}: {}", turn.at.format("%H:%M:%S"), who, turn.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_turns_in_order() {
        let mut session = ChatSession::new();
        assert!(session.is_empty());
        session.record(MessageRole::User, "hi");
        session.record(MessageRole::Assistant, "hello");

        let roles: Vec<_> = session.turns().iter().map(|t| t.role.clone()).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
        assert!(session.turns()[0].at <= session.turns()[1].at);

        let transcript = session.transcript();
        let lines: Vec<_> = transcript.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("you: hi"));
        assert!(lines[1].ends_with("agent: hello"));

        session.clear();
        assert_eq!(session.len(), 0);
    }
}
