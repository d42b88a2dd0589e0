//! # Codepad Core
//!
//! Core editor logic and state management.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Editor                            │
//! │  ┌───────────┐ ┌────────┐ ┌───────────┐ ┌──────────────┐ │
//! │  │ Workspace │ │ Config │ │ AutoSave  │ │ Process runs │ │
//! │  └───────────┘ └────────┘ └───────────┘ └──────────────┘ │
//! │         │                                                 │
//! │  ┌──────┴───────────────────────────────────┐            │
//! │  │             Session Registry              │            │
//! │  │  ┌──────────────────────────────────┐    │            │
//! │  │  │ BufferSession                     │    │            │
//! │  │  │  EditorView ─▶ Gutter             │    │            │
//! │  │  │            └─▶ LineHighlighter    │    │            │
//! │  │  └──────────────────────────────────┘    │            │
//! │  └──────────────────────────────────────────┘            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod autosave;
pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod event;
pub mod geometry;
pub mod keymap;
pub mod persist;
pub mod process;
pub mod view;
pub mod workspace;

use std::path::PathBuf;

pub use autosave::{AutoSaveReport, AutoSaveTimer};
pub use command::{CloseChoice, Command, HostShell, Notice, NoticeLevel};
pub use config::{Config, ConfigError, Theme};
pub use document::{BufferSession, SessionId, SessionRegistry};
pub use editor::{Editor, SaveStatus};
pub use event::{EditorEvent, EventBus, EventHandler};
pub use geometry::Rect;
pub use keymap::{Key, KeyBinding, KeyPress, Keymap, Modifiers};
pub use process::{
    GitCommand, Invocation, ProcessError, ProcessLauncher, ProcessOutput, SystemLauncher,
};
pub use view::{EditorView, Font, FontMetrics, ViewEvent, ViewListener, ViewSnapshot};
pub use workspace::Workspace;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Cannot read {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session {0} has no file; save it before running")]
    UnsavedFile(SessionId),

    #[error(transparent)]
    Subprocess(#[from] ProcessError),

    #[error("Cannot create folder {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("No active session")]
    NoActiveSession,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] codepad_buffer::BufferError),

    #[error("Highlight error: {0}")]
    Syntax(#[from] codepad_syntax::SyntaxError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
