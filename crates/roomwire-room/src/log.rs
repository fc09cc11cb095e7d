//! The append-only message log shared between a connection task and its
//! owner.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use roomwire_protocol::ChatMessage;

/// Messages received on one connection, in arrival order.
///
/// Cheap to clone: clones share the same underlying log. Only the
/// connection task appends; everyone else reads snapshots.
///
/// Unbounded unless a retention limit is set, in which case the oldest
/// messages are evicted first.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    inner: Arc<Mutex<VecDeque<ChatMessage>>>,
    retention: Option<usize>,
}

impl MessageLog {
    /// Creates an empty log. `retention` caps how many messages are kept.
    pub fn new(retention: Option<usize>) -> Self {
        Self {
            inner: Arc::default(),
            retention,
        }
    }

    pub(crate) fn push(&self, msg: ChatMessage) {
        let mut log = self.lock();
        log.push_back(msg);
        if let Some(limit) = self.retention {
            while log.len() > limit {
                log.pop_front();
            }
        }
    }

    /// Copies out the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.lock().iter().cloned().collect()
    }

    /// Number of messages currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no messages are held.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The newest message, if any.
    pub fn last(&self) -> Option<ChatMessage> {
        self.lock().back().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ChatMessage>> {
        // A panic while holding the lock can only happen mid-push; the
        // deque itself is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
