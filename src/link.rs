//! Handoff between the screen encoder and the keyboard decoder.
//!
//! Writing to the screen can make the terminal answer on the keyboard
//! channel. The encoder tells the decoder what to expect through a [`Link`]:
//!
//! - how many acknowledgement bytes to drop
//! - that a cursor position reply is due, and where to deliver it
//!
//! In the other direction, the decoder flags a power-on so the encoder
//! forgets what it believes the terminal state to be.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{MinitelError, Result};

/// Cursor coordinates, 0-based. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorPosition {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Default)]
pub struct Link {
    acknowledgement_skip: AtomicUsize,
    reset_pending: AtomicBool,
    late_reply: AtomicBool,
    closed: AtomicBool,
    cursor_query: Mutex<Option<SyncSender<CursorPosition>>>,
}

impl Link {
    pub fn new() -> Self {
        Self::default()
    }

    fn cursor_query(&self) -> MutexGuard<'_, Option<SyncSender<CursorPosition>>> {
        self.cursor_query.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arms the decoder to drop the next `len` bytes.
    pub fn expect_acknowledgement(&self, len: usize) {
        self.acknowledgement_skip.fetch_add(len, Ordering::SeqCst);
    }

    /// Consumes one armed acknowledgement byte, if any.
    pub fn consume_acknowledgement(&self) -> bool {
        self.acknowledgement_skip
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Disarms `len` bytes armed for a command that never reached the
    /// terminal.
    pub fn withdraw_acknowledgement(&self, len: usize) {
        let _ = self.acknowledgement_skip.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            Some(n.saturating_sub(len))
        });
    }

    pub fn pending_acknowledgement(&self) -> usize {
        self.acknowledgement_skip.load(Ordering::SeqCst)
    }

    /// Marks the terminal as freshly powered on.
    pub fn request_reset(&self) {
        self.acknowledgement_skip.store(0, Ordering::SeqCst);
        self.reset_pending.store(true, Ordering::SeqCst);
    }

    /// Returns whether a power-on happened since the last call.
    pub fn take_reset(&self) -> bool {
        self.reset_pending.swap(false, Ordering::SeqCst)
    }

    /// Opens the mailbox for a cursor position reply.
    ///
    /// Fails if the link is closed or another query is outstanding.
    pub fn begin_cursor_query(&self) -> Result<Receiver<CursorPosition>> {
        let mut slot = self.cursor_query();
        if self.is_closed() {
            return Err(MinitelError::Disconnected);
        }
        if slot.is_some() {
            return Err(MinitelError::QueryInProgress);
        }
        let (tx, rx) = mpsc::sync_channel(1);
        *slot = Some(tx);
        self.late_reply.store(false, Ordering::SeqCst);
        Ok(rx)
    }

    pub fn cancel_cursor_query(&self) {
        self.cursor_query().take();
    }

    /// Gives up on a query the terminal has received. Its reply may still
    /// come, and the decoder discards it if it does.
    pub fn abandon_cursor_query(&self) {
        if self.cursor_query().take().is_some() {
            self.late_reply.store(true, Ordering::SeqCst);
        }
    }

    /// Returns whether an abandoned query may still be answered, and forgets
    /// it.
    pub fn take_late_reply(&self) -> bool {
        self.late_reply.swap(false, Ordering::SeqCst)
    }

    pub fn is_cursor_query_pending(&self) -> bool {
        self.cursor_query().is_some()
    }

    /// Hands a decoded reply to the waiting query. Returns false if nobody
    /// was waiting.
    pub fn deliver_cursor_position(&self, position: CursorPosition) -> bool {
        match self.cursor_query().take() {
            Some(tx) => tx.try_send(position).is_ok(),
            None => false,
        }
    }

    /// Tears the link down. A waiting query fails with `Disconnected`.
    pub fn close(&self) {
        let mut slot = self.cursor_query();
        self.closed.store(true, Ordering::SeqCst);
        slot.take();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
