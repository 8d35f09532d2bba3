//! Bounded FIFO of replies between the read loop and the write loop.
//!
//! The capacity is the pipelining depth: how many replies may wait in memory ahead of
//! the one being transmitted. The read loop [reserves](ReplySender::reserve) a slot before
//! dispatching a request, so a slow client stalls request intake instead of growing the
//! queue. [`QueueSlot::End`] is pushed once, after the last reply, to stop the write loop.

use tokio::sync::mpsc;

use crate::protocol::{HttpError, Reply};

#[derive(Debug)]
pub enum QueueSlot {
    Reply(Reply),
    /// No more replies will be produced on this connection.
    End,
}

impl QueueSlot {
    pub fn is_end(&self) -> bool {
        matches!(self, QueueSlot::End)
    }
}

/// Creates a reply queue holding at most `capacity` slots.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn reply_queue(capacity: usize) -> (ReplySender, ReplyReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (ReplySender { tx }, ReplyReceiver { rx })
}

/// Producer half, owned by the read loop.
#[derive(Debug)]
pub struct ReplySender {
    tx: mpsc::Sender<QueueSlot>,
}

impl ReplySender {
    /// Whether a push would complete without waiting.
    pub fn has_free_capacity(&self) -> bool {
        self.tx.capacity() > 0
    }

    /// Waits for a free slot and holds it until the returned permit is used or dropped.
    pub async fn reserve(&self) -> Result<ReplyPermit<'_>, HttpError> {
        let permit = self.tx.reserve().await.map_err(|_e| HttpError::QueueClosed)?;
        Ok(ReplyPermit { permit })
    }

    /// Waits for a free slot, then enqueues `slot` behind every slot pushed before it.
    pub async fn push(&self, slot: QueueSlot) -> Result<(), HttpError> {
        self.tx.send(slot).await.map_err(|_e| HttpError::QueueClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A reserved queue slot; pushing through it never waits.
#[derive(Debug)]
pub struct ReplyPermit<'a> {
    permit: mpsc::Permit<'a, QueueSlot>,
}

impl ReplyPermit<'_> {
    pub fn push(self, slot: QueueSlot) {
        self.permit.send(slot);
    }
}

/// Consumer half, owned by the write loop.
#[derive(Debug)]
pub struct ReplyReceiver {
    rx: mpsc::Receiver<QueueSlot>,
}

impl ReplyReceiver {
    /// Waits for the oldest slot.
    ///
    /// Reports [`QueueSlot::End`] if the producer went away without pushing one.
    pub async fn pop(&mut self) -> QueueSlot {
        self.rx.recv().await.unwrap_or(QueueSlot::End)
    }

    /// Number of slots currently waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
