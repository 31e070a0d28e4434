//! Session manager for chat sessions.
//!
//! Wraps a loaded `ChatSession` and applies message-sequence mutations to
//! it in memory. Nothing here touches the store or the completion
//! provider: a mutation that needs a fresh assistant reply returns a
//! [`Regeneration`] plan and the caller fulfils it before persisting.

use chrono::Utc;
use foxie_types::chat::{ChatMessage, ChatSession};
use foxie_types::error::ChatError;

/// What the caller must do after a destructive mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regeneration {
    /// The sequence is final as-is.
    None,
    /// Generate one assistant reply for the user message at `prompt_index`,
    /// which is now the last message in the sequence.
    Reply { prompt_index: usize },
}

/// Manages the message sequence of a single chat session.
pub struct SessionManager {
    session: ChatSession,
}

impl SessionManager {
    /// Create a new session manager wrapping an existing session.
    pub fn new(session: ChatSession) -> Self {
        Self { session }
    }

    /// Access the underlying chat session.
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Consume the manager and return the mutated session.
    pub fn into_session(self) -> ChatSession {
        self.session
    }

    /// Append a completed `[user, assistant]` exchange.
    ///
    /// The first user message of a session names it, unless this is the
    /// user's first-ever session, which keeps the default name until it is
    /// explicitly renamed.
    pub fn append_exchange(&mut self, prompt: &str, reply: &str) {
        if !self.session.has_user_message() && !self.session.is_first_ever_session {
            self.session.name = prompt.to_string();
        }

        self.session.messages.push(ChatMessage::user(prompt));
        self.session.messages.push(ChatMessage::assistant(reply));
        self.touch();
    }

    /// Replace the text of the message at `index`, keeping its id.
    ///
    /// Editing a user message discards everything after it and asks for a
    /// new reply. Editing an assistant message is a plain replacement.
    pub fn edit_message(&mut self, index: usize, content: &str) -> Result<Regeneration, ChatError> {
        self.check_index(index)?;

        let message = &mut self.session.messages[index];
        message.content = content.to_string();
        let is_user = message.is_user();

        let plan = if is_user {
            self.session.messages.truncate(index + 1);
            Regeneration::Reply {
                prompt_index: index,
            }
        } else {
            Regeneration::None
        };

        self.touch();
        Ok(plan)
    }

    /// Remove the message at `index`.
    ///
    /// Removing a user message rewinds the conversation to the nearest user
    /// message before it, which then gets a fresh reply. With no earlier
    /// user message, or when an assistant message is removed, the sequence
    /// is only shortened.
    pub fn delete_message(&mut self, index: usize) -> Result<Regeneration, ChatError> {
        self.check_index(index)?;

        let removed = self.session.messages.remove(index);
        let plan = if removed.is_user() {
            match self.session.messages[..index]
                .iter()
                .rposition(ChatMessage::is_user)
            {
                Some(prompt_index) => {
                    self.session.messages.truncate(prompt_index + 1);
                    Regeneration::Reply { prompt_index }
                }
                None => Regeneration::None,
            }
        } else {
            Regeneration::None
        };

        self.touch();
        Ok(plan)
    }

    /// History and prompt text for regenerating the reply at `prompt_index`.
    pub fn regeneration_input(&self, prompt_index: usize) -> Option<(&[ChatMessage], &str)> {
        let prompt = self.session.messages.get(prompt_index)?;
        Some((&self.session.messages[..prompt_index], prompt.content.as_str()))
    }

    /// Append the assistant reply produced for a [`Regeneration::Reply`] plan.
    pub fn apply_regenerated_reply(&mut self, reply: &str) {
        self.session.messages.push(ChatMessage::assistant(reply));
        self.touch();
    }

    /// Set an explicit session name.
    pub fn rename(&mut self, name: &str) {
        self.session.name = name.to_string();
        self.touch();
    }

    /// Refresh `updated_at`, never moving it backwards.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.session.updated_at {
            self.session.updated_at = now;
        }
    }

    fn check_index(&self, index: usize) -> Result<(), ChatError> {
        let len = self.session.messages.len();
        if index >= len {
            return Err(ChatError::Validation(format!(
                "message index {index} out of range for session with {len} messages"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use foxie_types::chat::{DEFAULT_SESSION_NAME, MessageRole};

    fn alternating(turns: usize, first_ever: bool) -> ChatSession {
        let mut session = ChatSession::new("student-1", first_ever);
        for i in 0..turns {
            session.messages.push(ChatMessage::user(format!("q{i}")));
            session.messages.push(ChatMessage::assistant(format!("a{i}")));
        }
        session
    }

    fn contents(mgr: &SessionManager) -> Vec<&str> {
        mgr.session()
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect()
    }

    #[test]
    fn test_append_exchange_names_non_first_session() {
        let mut mgr = SessionManager::new(ChatSession::new("student-1", false));
        mgr.append_exchange("Explain photosynthesis", "Plants make sugar.");

        assert_eq!(mgr.session().name, "Explain photosynthesis");
        assert_eq!(mgr.session().messages.len(), 2);
        assert_eq!(mgr.session().messages[0].role, MessageRole::User);
        assert_eq!(mgr.session().messages[1].role, MessageRole::Assistant);

        mgr.append_exchange("And respiration?", "The reverse.");
        assert_eq!(mgr.session().name, "Explain photosynthesis");
    }

    #[test]
    fn test_append_exchange_keeps_default_name_on_first_ever_session() {
        let mut mgr = SessionManager::new(ChatSession::new("student-1", true));
        mgr.append_exchange("Hello", "Hi there");
        assert_eq!(mgr.session().name, DEFAULT_SESSION_NAME);
    }

    #[test]
    fn test_edit_user_message_truncates_and_plans_reply() {
        let mut mgr = SessionManager::new(alternating(3, false));
        let id = mgr.session().messages[2].id;

        let plan = mgr.edit_message(2, "q1 revised").unwrap();
        assert_eq!(plan, Regeneration::Reply { prompt_index: 2 });
        assert_eq!(contents(&mgr), vec!["q0", "a0", "q1 revised"]);
        assert_eq!(mgr.session().messages[2].id, id);

        let (history, prompt) = mgr.regeneration_input(2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(prompt, "q1 revised");

        mgr.apply_regenerated_reply("new a1");
        assert_eq!(mgr.session().messages.len(), 4);
    }

    #[test]
    fn test_edit_assistant_message_is_plain_replacement() {
        let mut mgr = SessionManager::new(alternating(2, false));
        let plan = mgr.edit_message(1, "better a0").unwrap();
        assert_eq!(plan, Regeneration::None);
        assert_eq!(contents(&mgr), vec!["q0", "better a0", "q1", "a1"]);
    }

    #[test]
    fn test_edit_out_of_range_is_validation_error() {
        let mut mgr = SessionManager::new(alternating(1, false));
        let err = mgr.edit_message(2, "nope").unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
    }

    #[test]
    fn test_delete_first_message_never_regenerates() {
        let mut mgr = SessionManager::new(alternating(2, false));
        let plan = mgr.delete_message(0).unwrap();
        assert_eq!(plan, Regeneration::None);
        assert_eq!(contents(&mgr), vec!["a0", "q1", "a1"]);
    }

    #[test]
    fn test_delete_later_user_message_rewinds_to_previous_prompt() {
        let mut mgr = SessionManager::new(alternating(3, false));
        let plan = mgr.delete_message(4).unwrap();
        assert_eq!(plan, Regeneration::Reply { prompt_index: 2 });
        assert_eq!(contents(&mgr), vec!["q0", "a0", "q1"]);

        let (history, prompt) = mgr.regeneration_input(2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(prompt, "q1");
    }

    #[test]
    fn test_delete_assistant_message_only_shortens() {
        let mut mgr = SessionManager::new(alternating(2, false));
        let plan = mgr.delete_message(1).unwrap();
        assert_eq!(plan, Regeneration::None);
        assert_eq!(contents(&mgr), vec!["q0", "q1", "a1"]);
    }

    #[test]
    fn test_delete_uses_role_in_non_alternating_sequence() {
        // After an earlier delete the sequence is [q0, q1, a1]; q1 sits at an
        // odd index but is still a user turn.
        let mut session = ChatSession::new("student-1", false);
        session.messages.push(ChatMessage::user("q0"));
        session.messages.push(ChatMessage::user("q1"));
        session.messages.push(ChatMessage::assistant("a1"));
        let mut mgr = SessionManager::new(session);

        let plan = mgr.delete_message(1).unwrap();
        assert_eq!(plan, Regeneration::Reply { prompt_index: 0 });
        assert_eq!(contents(&mgr), vec!["q0"]);
    }

    #[test]
    fn test_delete_out_of_range_is_validation_error() {
        let mut mgr = SessionManager::new(ChatSession::new("student-1", false));
        assert!(matches!(
            mgr.delete_message(0),
            Err(ChatError::Validation(_))
        ));
    }

    #[test]
    fn test_touch_never_moves_backwards() {
        let mut session = ChatSession::new("student-1", false);
        let future = Utc::now() + Duration::hours(1);
        session.updated_at = future;
        let mut mgr = SessionManager::new(session);

        mgr.touch();
        assert_eq!(mgr.session().updated_at, future);
    }

    #[test]
    fn test_rename_sets_name_and_touches() {
        let mut session = ChatSession::new("student-1", true);
        let before = session.updated_at - Duration::seconds(5);
        session.updated_at = before;
        let mut mgr = SessionManager::new(session);

        mgr.rename("Biology revision");
        assert_eq!(mgr.session().name, "Biology revision");
        assert!(mgr.session().updated_at > before);
        assert!(mgr.session().is_first_ever_session);
    }
}
