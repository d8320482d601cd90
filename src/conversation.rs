use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// First bot turn of every conversation.
pub const GREETING: &str =
    "Hi! I'm your Loan Assistant. Ask me about loans, schemes, or eligibility.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub sender: Sender,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// Whether a surface has a call outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SubmissionState {
    #[default]
    Idle,
    Sending,
}

/// Append-only chat transcript.
///
/// Turns are never edited or removed; replies land in the order their calls
/// complete.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    id: Uuid,
    turns: Vec<ChatTurn>,
    outstanding: usize,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: vec![ChatTurn::bot(GREETING)],
            outstanding: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn all(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// Records the user's turn and marks a reply as outstanding.
    pub fn begin_exchange(&mut self, text: impl Into<String>) {
        self.append(ChatTurn::user(text));
        self.outstanding += 1;
    }

    /// Records the bot's reply to an outstanding exchange.
    pub fn complete_exchange(&mut self, reply: impl Into<String>) -> ChatTurn {
        let turn = ChatTurn::bot(reply);
        self.append(turn.clone());
        self.outstanding = self.outstanding.saturating_sub(1);
        turn
    }

    /// `Sending` while any reply is outstanding; drives the loading indicator.
    pub fn state(&self) -> SubmissionState {
        if self.outstanding > 0 {
            SubmissionState::Sending
        } else {
            SubmissionState::Idle
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_seeded_with_greeting() {
        let store = ConversationStore::new();
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].sender, Sender::Bot);
        assert_eq!(store.all()[0].text, GREETING);
        assert_eq!(store.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = ConversationStore::new();
        store.append(ChatTurn::user("first"));
        store.append(ChatTurn::bot("second"));
        let texts: Vec<&str> = store.all().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING, "first", "second"]);
    }

    #[test]
    fn test_state_tracks_outstanding_exchanges() {
        let mut store = ConversationStore::new();
        store.begin_exchange("hello");
        store.begin_exchange("anyone there?");
        assert_eq!(store.state(), SubmissionState::Sending);

        store.complete_exchange("hi");
        assert_eq!(store.state(), SubmissionState::Sending);

        let turn = store.complete_exchange("yes");
        assert_eq!(turn.sender, Sender::Bot);
        assert_eq!(store.state(), SubmissionState::Idle);
        assert_eq!(store.all().len(), 5);
    }

    #[test]
    fn test_stores_have_distinct_ids() {
        assert_ne!(ConversationStore::new().id(), ConversationStore::new().id());
    }
}
