use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// Process-local view of the chats the bot has seen and whether each one is
/// currently locked.
///
/// Each chat's lock flag sits behind its own async mutex. Whoever evaluates and
/// flips a chat's lock holds that mutex across the gateway call, so the message
/// path and the reconciliation tick cannot both flip the same chat.
#[derive(Debug, Default)]
pub struct ChatRegistry {
    chats: DashMap<u64, Arc<Mutex<bool>>>,
}

impl ChatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chat, seeding its lock flag with `assume_locked` if it was
    /// not known yet. Returns true for a newly seen chat.
    pub fn observe(&self, chat_id: u64, assume_locked: bool) -> bool {
        let mut inserted = false;
        self.chats.entry(chat_id).or_insert_with(|| {
            inserted = true;
            Arc::new(Mutex::new(assume_locked))
        });
        inserted
    }

    pub fn is_known(&self, chat_id: u64) -> bool {
        self.chats.contains_key(&chat_id)
    }

    /// Stop tracking a chat the bot can no longer reach. Returns whether it was known.
    pub fn forget(&self, chat_id: u64) -> bool {
        self.chats.remove(&chat_id).is_some()
    }

    /// Handle to a chat's lock flag. The map guard is released before return,
    /// so the handle can be held across awaits.
    pub fn lock_state(&self, chat_id: u64) -> Option<Arc<Mutex<bool>>> {
        self.chats.get(&chat_id).map(|entry| entry.value().clone())
    }

    /// Current lock flag, if the chat is known
    pub async fn is_locked(&self, chat_id: u64) -> Option<bool> {
        let state = self.lock_state(chat_id)?;
        let locked = *state.lock().await;
        Some(locked)
    }

    /// Snapshot of known chats in ascending id order
    pub fn known_chats(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.chats.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }
}
