//! Inter-context messaging.
//!
//! Every context (coordinator, page agent, settings surface) owns one inbox
//! and processes it on a single task.  [`CoordinatorHandle`] is the cheap,
//! cloneable client other contexts use to reach the coordinator; the
//! coordinator reaches pages and observers through its [`Router`].
//!
//! Sends never block a context's loop: all inboxes are unbounded, and
//! replies come back over `oneshot` channels.

pub mod message;
pub mod router;

pub use message::{
    CoordinatorRequest, PageEvent, PageHandle, PageOutbox, SettingsEvent, TimerId,
};
pub use router::Router;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::shortcut::PttShortcut;

// ---------------------------------------------------------------------------
// ChannelError
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The coordinator loop has exited.
    #[error("coordinator is not running")]
    Closed,

    /// The coordinator dropped a request without replying.
    #[error("coordinator dropped the request without replying")]
    NoReply,
}

impl From<oneshot::error::RecvError> for ChannelError {
    fn from(_: oneshot::error::RecvError) -> Self {
        ChannelError::NoReply
    }
}

// ---------------------------------------------------------------------------
// CoordinatorHandle
// ---------------------------------------------------------------------------

/// Client end of the coordinator's inbox.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<CoordinatorRequest>,
}

impl CoordinatorHandle {
    /// Create a handle and the matching inbox for the coordinator loop.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CoordinatorRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, request: CoordinatorRequest) -> Result<(), ChannelError> {
        self.tx.send(request).map_err(|_| ChannelError::Closed)
    }

    /// Announce a page and wait for the current MinPttLength.
    pub async fn register_page(
        &self,
        handle: PageHandle,
        outbox: PageOutbox,
    ) -> Result<u32, ChannelError> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorRequest::PageRegistered {
            handle,
            outbox,
            reply,
        })?;
        Ok(rx.await?)
    }

    pub fn unregister_page(&self, handle: PageHandle) -> Result<(), ChannelError> {
        self.send(CoordinatorRequest::PageUnregistered { handle })
    }

    pub fn set_broadcasting(
        &self,
        handle: PageHandle,
        broadcasting: bool,
    ) -> Result<(), ChannelError> {
        self.send(CoordinatorRequest::BroadcastingChanged {
            handle,
            broadcasting,
        })
    }

    pub fn shortcut_changed(
        &self,
        handle: PageHandle,
        shortcut: PttShortcut,
    ) -> Result<(), ChannelError> {
        self.send(CoordinatorRequest::ShortcutChanged { handle, shortcut })
    }

    pub fn set_min_ptt_length(&self, value: u32) -> Result<(), ChannelError> {
        self.send(CoordinatorRequest::SetMinPttLength { value })
    }

    /// Subscribe a settings surface.  Returns the current MinPttLength and the
    /// stream of later changes.
    pub async fn open_settings(
        &self,
    ) -> Result<(u32, mpsc::UnboundedReceiver<SettingsEvent>), ChannelError> {
        let (observer, events) = mpsc::unbounded_channel();
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorRequest::SettingsOpened { observer, reply })?;
        Ok((rx.await?, events))
    }

    pub fn trigger_pulse(&self) -> Result<(), ChannelError> {
        self.send(CoordinatorRequest::TriggerPulse)
    }

    pub fn shutdown(&self) -> Result<(), ChannelError> {
        self.send(CoordinatorRequest::Shutdown)
    }

    /// Returns `true` once the coordinator loop has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
