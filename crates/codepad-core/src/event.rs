//! Event system for editor notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Rust's ownership model makes traditional observer patterns tricky.
//! We use `tokio::sync::broadcast` for a safe, async-friendly event bus.
//!
//! Key differences from OOP observers:
//! - No object references to manage
//! - Events are values, not callbacks
//! - Subscribers receive copies (Clone)
//! - No lifetime complexity
//!
//! This bus is for hosts (tab bars, status lines). The view's own
//! gutter/highlighter wiring is synchronous and lives in [`crate::view`].

use std::path::PathBuf;

use tokio::sync::broadcast;

use crate::config::Theme;
use crate::document::SessionId;

/// Events that can occur in the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    // Session events
    /// A session was created or loaded
    SessionOpened(SessionId),
    /// A session received focus
    SessionFocused(SessionId),
    /// A session was closed
    SessionClosed(SessionId),
    /// A session was written to its file
    SessionSaved(SessionId),
    /// A session's content changed
    SessionChanged(SessionId),

    /// An auto-save sweep finished
    AutoSaved { saved: usize, failed: usize },

    // Editor events
    /// Configuration changed (font, theme, interval)
    ConfigChanged,
    /// Theme switched
    ThemeChanged(Theme),
    /// Workspace opened
    WorkspaceOpened(PathBuf),
}

/// Event bus for broadcasting editor events.
///
/// ## Design
///
/// Using a broadcast channel allows:
/// - Multiple subscribers
/// - Async reception
/// - No direct coupling between components
/// - Lagged receivers don't block senders
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // Ignore error if no receivers (not a problem)
        let _ = self.sender.send(event);
    }

    /// Subscribes to events.
    ///
    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Helper for processing events asynchronously.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(editor.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(event) = handler.next().await {
///         if let EditorEvent::SessionSaved(id) = event {
///             // Refresh the tab title
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::ConfigChanged);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EditorEvent::ConfigChanged));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(EditorEvent::ConfigChanged);

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_ends_when_bus_dropped() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());
        let id = SessionId::new();

        bus.emit(EditorEvent::SessionSaved(id));
        drop(bus);

        assert_eq!(handler.next().await, Some(EditorEvent::SessionSaved(id)));
        assert_eq!(handler.next().await, None);
    }
}
