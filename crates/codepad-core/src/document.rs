//! Buffer sessions and the registry of open tabs.
//!
//! ## Learning: Type Aliases and Newtypes
//!
//! `SessionId` is a newtype wrapper around `Uuid`. This provides:
//! - Type safety: Can't accidentally pass a tab index where an ID is expected
//! - Stability: IDs survive tabs being closed and reordered
//! - Documentation: The type name explains its purpose

use codepad_syntax::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::Config;
use crate::persist;
use crate::view::{EditorView, ViewSettings};
use crate::{CoreError, CoreResult};

/// Title shown for a session with no path.
pub const UNTITLED: &str = "Untitled";

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new unique session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open document: its view, its file identity and its title.
///
/// ## Learning: Composition over Inheritance
///
/// A session composes an [`EditorView`] (which in turn owns the buffer,
/// gutter and highlight rules) and adds what only matters on disk. Each
/// session owns its own highlight engine; nothing is shared between tabs.
#[derive(Debug)]
pub struct BufferSession {
    id: SessionId,
    view: EditorView,
    /// Absolute path, once the session is bound to a file
    path: Option<PathBuf>,
    title: String,
    language: Language,
}

impl BufferSession {
    /// Creates an empty session with no path.
    pub fn untitled(config: &Config) -> CoreResult<Self> {
        Self::with_text("", None, config)
    }

    /// Opens a session from a file.
    pub fn load(path: impl AsRef<Path>, config: &Config) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = persist::read_text(path)?;
        let absolute = persist::resolve_path(path).map_err(|source| CoreError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_text(&text, Some(absolute), config)
    }

    fn with_text(text: &str, path: Option<PathBuf>, config: &Config) -> CoreResult<Self> {
        let language = Language::from_path(path.as_deref());
        let engine = language.engine(&config.highlight)?;
        let view = EditorView::new(
            text,
            engine,
            config.ui.font(),
            ViewSettings::from_config(config),
        );
        let title = path.as_deref().map_or_else(|| UNTITLED.to_string(), title_for);

        Ok(Self {
            id: SessionId::new(),
            view,
            path,
            title,
            language,
        })
    }

    // ==================== Getters ====================

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the tab title.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn view(&self) -> &EditorView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut EditorView {
        &mut self.view
    }

    /// Returns true if the content differs from what was last saved.
    pub fn is_modified(&self) -> bool {
        self.view.is_modified()
    }

    pub fn text(&self) -> String {
        self.view.text()
    }

    // ==================== File Operations ====================

    /// Rewrites the bound file with the full current content.
    pub fn save(&mut self) -> CoreResult<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| CoreError::InvalidOperation(format!("{} has no file path", self.title)))?;
        persist::write_text(&path, &self.view.text())?;
        self.view.mark_saved();
        Ok(())
    }

    /// Writes to `path` and, once that succeeded, rebinds the session to
    /// it. A failed write leaves path and title untouched.
    pub fn save_as(&mut self, path: impl AsRef<Path>, config: &Config) -> CoreResult<()> {
        let path = path.as_ref();
        persist::write_text(path, &self.view.text())?;
        self.view.mark_saved();

        let absolute = persist::resolve_path(path).map_err(|source| CoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        self.title = title_for(&absolute);

        let language = Language::from_path(Some(&absolute));
        if language != self.language {
            self.view.set_engine(language.engine(&config.highlight)?);
            self.language = language;
        }
        self.path = Some(absolute);
        Ok(())
    }

    /// Rebuilds the highlight rules from `config`.
    pub fn reload_rules(&mut self, config: &Config) -> CoreResult<()> {
        let engine = self.language.engine(&config.highlight)?;
        self.view.set_engine(engine);
        Ok(())
    }
}

fn title_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Open sessions in tab order, plus which one has focus.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<BufferSession>,
    current: Option<SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a session and focuses it.
    pub fn push(&mut self, session: BufferSession) -> SessionId {
        let id = session.id();
        self.sessions.push(session);
        self.current = Some(id);
        id
    }

    /// Removes a session. Focus moves to the tab that takes its place, or
    /// the new last tab.
    pub fn close(&mut self, id: SessionId) -> CoreResult<BufferSession> {
        let index = self.position(id).ok_or(CoreError::SessionNotFound(id))?;
        let session = self.sessions.remove(index);

        if self.current == Some(id) {
            self.current = self
                .sessions
                .get(index)
                .or_else(|| self.sessions.last())
                .map(BufferSession::id);
        }
        Ok(session)
    }

    pub fn get(&self, id: SessionId) -> Option<&BufferSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut BufferSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn current_id(&self) -> Option<SessionId> {
        self.current
    }

    pub fn current(&self) -> Option<&BufferSession> {
        self.current.and_then(|id| self.get(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut BufferSession> {
        self.current.and_then(|id| self.get_mut(id))
    }

    /// Focuses a session.
    pub fn set_current(&mut self, id: SessionId) -> CoreResult<()> {
        if self.position(id).is_none() {
            return Err(CoreError::SessionNotFound(id));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Finds a session bound to `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<SessionId> {
        self.sessions
            .iter()
            .find(|s| s.path() == Some(path))
            .map(BufferSession::id)
    }

    /// Tab index of a session.
    pub fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    /// Sessions in tab order.
    pub fn iter(&self) -> impl Iterator<Item = &BufferSession> {
        self.sessions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BufferSession> {
        self.sessions.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn untitled() -> BufferSession {
        BufferSession::untitled(&Config::default()).unwrap()
    }

    #[test]
    fn test_untitled_session() {
        let session = untitled();
        assert_eq!(session.title(), UNTITLED);
        assert!(session.path().is_none());
        assert!(!session.is_modified());
        assert_eq!(session.language(), Language::Python);
    }

    #[test]
    fn test_load_sets_path_and_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.rs");
        std::fs::write(&path, "fn main() {}\n").unwrap();

        let session = BufferSession::load(&path, &Config::default()).unwrap();
        assert_eq!(session.title(), "main.rs");
        assert_eq!(session.path(), Some(path.canonicalize().unwrap().as_path()));
        assert_eq!(session.language(), Language::Rust);
        assert_eq!(session.text(), "fn main() {}\n");
    }

    #[test]
    fn test_save_as_binds_after_successful_write() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut session = untitled();
        session.view_mut().insert_text("x = 1").unwrap();

        let bad = dir.path().join("missing").join("a.py");
        assert!(matches!(session.save_as(&bad, &config), Err(CoreError::Write { .. })));
        assert!(session.path().is_none());
        assert_eq!(session.title(), UNTITLED);
        assert!(session.is_modified());

        let good = dir.path().join("a.py");
        session.save_as(&good, &config).unwrap();
        assert_eq!(session.path(), Some(good.canonicalize().unwrap().as_path()));
        assert_eq!(session.title(), "a.py");
        assert!(!session.is_modified());
        assert_eq!(std::fs::read_to_string(&good).unwrap(), "x = 1");
    }

    #[test]
    fn test_save_without_path_is_rejected() {
        let mut session = untitled();
        assert!(matches!(session.save(), Err(CoreError::InvalidOperation(_))));
    }

    #[test]
    fn test_registry_order_and_focus() {
        let mut registry = SessionRegistry::new();
        let a = registry.push(untitled());
        let b = registry.push(untitled());
        let c = registry.push(untitled());

        assert_eq!(registry.current_id(), Some(c));
        let order: Vec<_> = registry.iter().map(BufferSession::id).collect();
        assert_eq!(order, vec![a, b, c]);

        registry.set_current(b).unwrap();
        registry.close(b).unwrap();
        assert_eq!(registry.current_id(), Some(c));

        registry.close(c).unwrap();
        assert_eq!(registry.current_id(), Some(a));

        registry.close(a).unwrap();
        assert_eq!(registry.current_id(), None);
        assert!(matches!(registry.close(a), Err(CoreError::SessionNotFound(_))));
    }
}
