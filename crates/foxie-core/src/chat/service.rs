//! Chat service orchestrating session lifecycle and message mutations.
//!
//! `ChatSessionService` loads a session from the `SessionStore`, applies a
//! mutation through `SessionManager`, asks the `LlmProvider` for a reply when
//! the mutation calls for one, and persists the result in a single write.
//! A failed completion aborts before the write, so the stored session is
//! left exactly as it was.

use foxie_types::chat::{ChatMessage, ChatReply, ChatSession};
use foxie_types::error::ChatError;
use foxie_types::event::SessionEvent;
use foxie_types::llm::CompletionResponse;
use tokio::sync::broadcast;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::chat::repository::SessionStore;
use crate::chat::session::{Regeneration, SessionManager};
use crate::event::bus::EventBus;
use crate::llm::prompt::{CompletionSettings, build_completion_request};
use crate::llm::provider::LlmProvider;

/// Orchestrates chat sessions for every user namespace.
///
/// Generic over `SessionStore` and `LlmProvider` to maintain clean
/// architecture (foxie-core never depends on foxie-infra). Holds no
/// per-session state between calls.
pub struct ChatSessionService<S: SessionStore, P: LlmProvider> {
    store: S,
    provider: P,
    settings: CompletionSettings,
    events: EventBus,
}

impl<S: SessionStore, P: LlmProvider> ChatSessionService<S, P> {
    /// Create a new chat service with the given store, provider, and
    /// completion settings.
    pub fn new(store: S, provider: P, settings: CompletionSettings) -> Self {
        Self {
            store,
            provider,
            settings,
            events: EventBus::default(),
        }
    }

    /// Access the session store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Access the completion settings.
    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// Receive `Created`, `Updated`, and `Deleted` notifications for all
    /// sessions mutated through this service.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // --- Session lifecycle ---

    /// Create an empty session for `user_id`.
    ///
    /// The session is the user's first-ever one if they own no sessions at
    /// the moment of the count. Count and insert are separate store calls.
    pub async fn create_session(&self, user_id: &str) -> Result<ChatSession, ChatError> {
        require("userId", user_id)?;

        let existing = self.store.count_sessions(user_id).await?;
        let session = ChatSession::new(user_id, existing == 0);
        let created = self.store.create_session(&session).await?;

        info!(
            user_id = %user_id,
            session_id = %created.id,
            first_ever = created.is_first_ever_session,
            "Session created"
        );
        self.events.publish(SessionEvent::Created {
            user_id: user_id.to_string(),
            session_id: created.id.clone(),
        });
        Ok(created)
    }

    /// Get one of the caller's sessions.
    pub async fn get_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<ChatSession, ChatError> {
        require("userId", user_id)?;
        require("sessionId", session_id)?;
        self.load_owned(user_id, session_id).await
    }

    /// List the caller's sessions, most recently updated first.
    ///
    /// `None` returns every session; pass `Some(SIDEBAR_PAGE_SIZE)` for the
    /// capped sidebar view.
    pub async fn list_sessions(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ChatSession>, ChatError> {
        require("userId", user_id)?;
        Ok(self.store.list_sessions(user_id, limit).await?)
    }

    /// Set an explicit name on a session.
    pub async fn rename_session(
        &self,
        user_id: &str,
        session_id: &str,
        name: &str,
    ) -> Result<ChatSession, ChatError> {
        require("userId", user_id)?;
        require("sessionId", session_id)?;
        require("name", name)?;

        let mut manager = SessionManager::new(self.load_owned(user_id, session_id).await?);
        manager.rename(name.trim());
        self.persist(manager.into_session()).await
    }

    /// Hard-delete a session. Missing sessions are `NotFound`.
    pub async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<(), ChatError> {
        require("userId", user_id)?;
        require("sessionId", session_id)?;

        self.store.delete_session(user_id, session_id).await?;
        info!(user_id = %user_id, session_id = %session_id, "Session deleted");
        self.events.publish(SessionEvent::Deleted {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        });
        Ok(())
    }

    /// Delete a session if it exists, succeeding silently when it does not.
    ///
    /// Used by cleanup paths that must not fail on an already-removed
    /// session.
    pub async fn purge_session(&self, user_id: &str, session_id: &str) -> Result<(), ChatError> {
        match self.delete_session(user_id, session_id).await {
            Err(ChatError::NotFound) => {
                debug!(user_id = %user_id, session_id = %session_id, "Purge of absent session");
                Ok(())
            }
            other => other,
        }
    }

    // --- Message mutations ---

    /// Send `prompt` and append the `[user, assistant]` exchange.
    ///
    /// The stored history is authoritative; nothing is persisted when the
    /// completion fails.
    pub async fn send_message(
        &self,
        user_id: &str,
        session_id: &str,
        prompt: &str,
    ) -> Result<ChatReply, ChatError> {
        require("userId", user_id)?;
        require("sessionId", session_id)?;
        require("prompt", prompt)?;

        let mut manager = SessionManager::new(self.load_owned(user_id, session_id).await?);
        let bot_reply = self
            .complete(session_id, &manager.session().messages, prompt)
            .await?;

        manager.append_exchange(prompt, &bot_reply);
        let session = self.persist(manager.into_session()).await?;

        Ok(ChatReply { bot_reply, session })
    }

    /// Replace the text of the message at `index`.
    ///
    /// Editing a user message discards the rest of the conversation and
    /// regenerates the reply to the edited text.
    pub async fn edit_message(
        &self,
        user_id: &str,
        session_id: &str,
        index: usize,
        content: &str,
    ) -> Result<ChatSession, ChatError> {
        require("userId", user_id)?;
        require("sessionId", session_id)?;
        require("content", content)?;

        let mut manager = SessionManager::new(self.load_owned(user_id, session_id).await?);
        let plan = manager.edit_message(index, content)?;
        self.fulfil(session_id, &mut manager, plan).await?;
        self.persist(manager.into_session()).await
    }

    /// Remove the message at `index`, regenerating the tail when a user
    /// turn was removed and an earlier user turn exists.
    pub async fn delete_message(
        &self,
        user_id: &str,
        session_id: &str,
        index: usize,
    ) -> Result<ChatSession, ChatError> {
        require("userId", user_id)?;
        require("sessionId", session_id)?;

        let mut manager = SessionManager::new(self.load_owned(user_id, session_id).await?);
        let plan = manager.delete_message(index)?;
        self.fulfil(session_id, &mut manager, plan).await?;
        self.persist(manager.into_session()).await
    }

    // --- Internals ---

    async fn load_owned(&self, user_id: &str, session_id: &str) -> Result<ChatSession, ChatError> {
        let session = self
            .store
            .get_session(user_id, session_id)
            .await?
            .ok_or(ChatError::NotFound)?;

        if session.user_id != user_id {
            warn!(
                user_id = %user_id,
                session_id = %session_id,
                "Session lookup returned a foreign session"
            );
            return Err(ChatError::Unauthorized);
        }
        Ok(session)
    }

    async fn fulfil(
        &self,
        session_id: &str,
        manager: &mut SessionManager,
        plan: Regeneration,
    ) -> Result<(), ChatError> {
        let Regeneration::Reply { prompt_index } = plan else {
            return Ok(());
        };

        let (history, prompt) = manager
            .regeneration_input(prompt_index)
            .ok_or_else(|| ChatError::Validation(format!("no message at index {prompt_index}")))?;
        let reply = self.complete(session_id, history, prompt).await?;

        debug!(session_id = %session_id, prompt_index, "Reply regenerated");
        manager.apply_regenerated_reply(&reply);
        Ok(())
    }

    async fn complete(
        &self,
        session_id: &str,
        history: &[ChatMessage],
        prompt: &str,
    ) -> Result<String, ChatError> {
        let request = build_completion_request(&self.settings, history, prompt);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            session_id = %session_id,
        );

        let response: CompletionResponse = self
            .provider
            .complete(&request)
            .instrument(span)
            .await
            .map_err(|e| {
                warn!(session_id = %session_id, error = %e, "Completion failed");
                ChatError::from(e)
            })?;

        debug!(
            session_id = %session_id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "Completion received"
        );
        Ok(response.content.trim().to_string())
    }

    async fn persist(&self, session: ChatSession) -> Result<ChatSession, ChatError> {
        self.store.update_session(&session).await?;
        self.events.publish(SessionEvent::Updated {
            user_id: session.user_id.clone(),
            session_id: session.id.clone(),
            updated_at: session.updated_at,
            message_count: session.messages.len(),
        });
        Ok(session)
    }
}

fn require(field: &str, value: &str) -> Result<(), ChatError> {
    if value.trim().is_empty() {
        return Err(ChatError::Validation(format!("{field} is required")));
    }
    Ok(())
}
