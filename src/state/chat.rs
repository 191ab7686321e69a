//! Bounded chat and event log on the [`GameTable`].
//!
//! Player messages and engine events share one log so a reader sees
//! them interleaved in order. The log keeps a fixed number of recent
//! entries and silently drops the oldest beyond that.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::game::{ChatEntry, GameTable, SYSTEM_AUTHOR},
};

impl GameTable {
    /// Append a player's chat message.
    pub fn push_message(
        &mut self,
        author: Uuid,
        text: String,
        now: SystemTime,
    ) -> Result<(), ServiceError> {
        let name = self.player(author)?.name.clone();
        self.push_entry(ChatEntry {
            author: name,
            text,
            sent_at: now,
        });
        Ok(())
    }

    /// Append an engine-generated event entry.
    pub(crate) fn push_system(&mut self, text: String, now: SystemTime) {
        self.push_entry(ChatEntry {
            author: SYSTEM_AUTHOR.to_owned(),
            text,
            sent_at: now,
        });
    }

    fn push_entry(&mut self, entry: ChatEntry) {
        self.chat.push_back(entry);
        while self.chat.len() > self.config.chat_capacity {
            self.chat.pop_front();
        }
    }

    /// The newest `limit` log entries, oldest first.
    pub fn recent_chat(&self, limit: usize) -> impl Iterator<Item = &ChatEntry> {
        let skip = self.chat.len().saturating_sub(limit);
        self.chat.iter().skip(skip)
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use crate::{
        config::AppConfig,
        state::game::{GameTable, SYSTEM_AUTHOR},
    };

    #[test]
    fn messages_and_events_interleave_in_order() {
        let mut table = GameTable::with_seed(AppConfig::default(), 1);
        let now = SystemTime::now();
        let id = table.register_player("ala", now).unwrap();
        table.push_message(id, "hello".into(), now).unwrap();

        let authors: Vec<&str> = table
            .recent_chat(10)
            .map(|entry| entry.author.as_str())
            .collect();
        // Registration already logged a system event.
        assert_eq!(authors, vec![SYSTEM_AUTHOR, "ala"]);
    }

    #[test]
    fn unknown_authors_are_rejected() {
        let mut table = GameTable::with_seed(AppConfig::default(), 1);
        let now = SystemTime::now();
        assert!(
            table
                .push_message(uuid::Uuid::new_v4(), "hi".into(), now)
                .is_err()
        );
    }

    #[test]
    fn log_drops_the_oldest_beyond_capacity() {
        let mut table = GameTable::with_seed(AppConfig::default(), 1);
        let now = SystemTime::now();
        let capacity = table.config().chat_capacity;
        for i in 0..capacity + 5 {
            table.push_system(format!("event {i}"), now);
        }
        assert_eq!(table.chat.len(), capacity);
        let first = table.recent_chat(capacity).next().map(|e| e.text.clone());
        assert_eq!(first.as_deref(), Some("event 5"));
    }

    #[test]
    fn recent_chat_returns_the_tail() {
        let mut table = GameTable::with_seed(AppConfig::default(), 1);
        let now = SystemTime::now();
        for i in 0..10 {
            table.push_system(format!("event {i}"), now);
        }
        let texts: Vec<String> = table.recent_chat(3).map(|e| e.text.clone()).collect();
        assert_eq!(texts, vec!["event 7", "event 8", "event 9"]);
    }
}
