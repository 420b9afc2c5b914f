//! Conversation context manager.
//!
//! The full history grows without a cap; only the rendered window handed to
//! the completion call is bounded. Older turns stay in the log for audit and
//! debugging but never reach the prompt.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn speaker_tag(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "CarBot",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn { role, content: content.into() });
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Renders the most recent `window` turns as speaker-tagged lines around
    /// the current message. On the very first turn there is no previous
    /// conversation worth wrapping, so the bare message is returned without
    /// the preamble.
    pub fn render_window(&self, window: usize, current_message: &str) -> String {
        if self.turns.len() <= 1 {
            return current_message.to_string();
        }

        let start = self.turns.len().saturating_sub(window);
        let context = self.turns[start..]
            .iter()
            .map(|turn| format!("{}: {}", turn.role.speaker_tag(), turn.content))
            .collect::<Vec<_>>()
            .join("\n");

        format!("Previous conversation:\n{context}\n\nCurrent message: {current_message}")
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversationLog, Role};

    #[test]
    fn first_turn_renders_bare_message_without_preamble() {
        let mut log = ConversationLog::new();
        log.append(Role::User, "I need an oil change");

        let rendered = log.render_window(10, "I need an oil change");
        assert_eq!(rendered, "I need an oil change");
    }

    #[test]
    fn short_history_renders_all_turns_in_order() {
        let mut log = ConversationLog::new();
        log.append(Role::User, "hi");
        log.append(Role::Assistant, "Hello! How can I help?");
        log.append(Role::User, "book me tomorrow");

        let rendered = log.render_window(10, "book me tomorrow");
        assert_eq!(
            rendered,
            "Previous conversation:\n\
             User: hi\n\
             CarBot: Hello! How can I help?\n\
             User: book me tomorrow\n\n\
             Current message: book me tomorrow"
        );
    }

    #[test]
    fn window_bounds_rendered_turns_regardless_of_history_length() {
        let mut log = ConversationLog::new();
        for i in 0..25 {
            log.append(Role::User, format!("message {i}"));
        }

        let rendered = log.render_window(10, "message 24");
        let context_lines = rendered
            .lines()
            .filter(|line| line.starts_with("User:"))
            .count();
        assert_eq!(context_lines, 10);
        assert!(rendered.contains("message 15"));
        assert!(!rendered.contains("message 14\n"));
        assert_eq!(log.len(), 25, "full history must be retained");
    }
}
