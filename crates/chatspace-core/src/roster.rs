//! Online-friend roster and status-change history.

use std::collections::{HashSet, VecDeque};

/// Status updates retained before the oldest drop off.
pub const STATUS_LOG_CAP: usize = 100;

/// One recorded friend status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendStatusUpdate {
    /// Account whose status changed.
    pub account: String,
    /// True when the friend came online.
    pub online: bool,
    /// Local receipt time in epoch milliseconds.
    pub timestamp: i64,
}

/// Tracks which friends are online and a bounded history of changes.
///
/// The online set is authoritative on a full roster snapshot and patched
/// incrementally by individual status updates in between.
#[derive(Debug, Default)]
pub struct Roster {
    online: HashSet<String>,
    history: VecDeque<FriendStatusUpdate>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a single status change and records it, newest first.
    pub fn apply(&mut self, account: &str, online: bool, timestamp: i64) {
        if online {
            self.online.insert(account.to_string());
        } else {
            self.online.remove(account);
        }
        if self.history.len() == STATUS_LOG_CAP {
            self.history.pop_back();
        }
        self.history.push_front(FriendStatusUpdate {
            account: account.to_string(),
            online,
            timestamp,
        });
    }

    /// Replaces the online set with a full roster snapshot.
    pub fn replace_online(&mut self, accounts: impl IntoIterator<Item = String>) {
        self.online = accounts.into_iter().collect();
    }

    /// Whether an account is currently online.
    #[must_use]
    pub fn is_online(&self, account: &str) -> bool {
        self.online.contains(account)
    }

    /// Currently online accounts, unordered.
    #[must_use]
    pub fn online_accounts(&self) -> &HashSet<String> {
        &self.online
    }

    /// Recorded status changes, newest first.
    #[must_use]
    pub fn history(&self) -> impl Iterator<Item = &FriendStatusUpdate> {
        self.history.iter()
    }
}
