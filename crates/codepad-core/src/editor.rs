//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade, providing a simple interface to
//! complex subsystems. External code only needs to interact with
//! `Editor`, not individual sessions, the auto-save timer or the
//! process runner.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use codepad_buffer::BufferError;
use tokio_util::sync::CancellationToken;

use crate::autosave::{AutoSaveReport, AutoSaveTimer};
use crate::config::{AUTO_SAVE_RANGE, Config, Theme};
use crate::document::{BufferSession, SessionId, SessionRegistry};
use crate::event::{EditorEvent, EventBus};
use crate::keymap::Keymap;
use crate::persist;
use crate::process::{GitCommand, Invocation, ProcessLauncher, ProcessOutput};
use crate::view::Font;
use crate::workspace::Workspace;
use crate::{CoreError, CoreResult};

/// What [`Editor::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Content was written to the session's file
    Saved,
    /// The session has no file yet; ask for one and call `save_as`
    NeedsPath,
}

/// The main editor state.
///
/// ## Thread Safety
///
/// `Editor` is owned by a single thread (the UI thread). Every mutation
/// of sessions happens through `&mut self`, so an auto-save sweep can
/// never interleave with an edit or with another sweep.
pub struct Editor {
    /// Open sessions in tab order
    sessions: SessionRegistry,

    /// Folder shown in the file tree
    workspace: Option<Workspace>,

    /// Editor configuration
    config: Config,

    /// Key bindings
    keymap: Keymap,

    /// Event bus for notifications
    event_bus: EventBus,

    auto_save: AutoSaveTimer,

    /// Cancels the running process; replaced after each cancellation
    cancel: CancellationToken,

    /// Clipboard content
    clipboard: String,
}

impl Editor {
    /// Creates an editor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let keymap = Keymap::from_config(&config);
        let auto_save = AutoSaveTimer::new(config.files.auto_save_interval(), Instant::now());
        Self {
            sessions: SessionRegistry::new(),
            workspace: None,
            config,
            keymap,
            event_bus: EventBus::new(),
            auto_save,
            cancel: CancellationToken::new(),
            clipboard: String::new(),
        }
    }

    // ==================== Sessions ====================

    /// Opens an empty, untitled session and focuses it.
    pub fn new_session(&mut self) -> CoreResult<SessionId> {
        let session = BufferSession::untitled(&self.config)?;
        let id = self.sessions.push(session);
        tracing::info!(%id, "new session");

        self.emit(EditorEvent::SessionOpened(id));
        self.emit(EditorEvent::SessionFocused(id));
        Ok(id)
    }

    /// Opens a file in a new session, or focuses the session that already
    /// has it open.
    pub fn load_session(&mut self, path: impl AsRef<Path>) -> CoreResult<SessionId> {
        let path = path.as_ref();
        let absolute = persist::resolve_path(path).map_err(|source| CoreError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;

        // Check if already open
        if let Some(id) = self.sessions.find_by_path(&absolute) {
            self.sessions.set_current(id)?;
            self.emit(EditorEvent::SessionFocused(id));
            return Ok(id);
        }

        let session = BufferSession::load(&absolute, &self.config)?;
        let id = self.sessions.push(session);
        tracing::info!(%id, path = %absolute.display(), "loaded session");

        self.emit(EditorEvent::SessionOpened(id));
        self.emit(EditorEvent::SessionFocused(id));
        Ok(id)
    }

    /// Activation from the file tree. Directories are ignored.
    pub fn open_from_tree(&mut self, path: impl AsRef<Path>) -> CoreResult<Option<SessionId>> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(None);
        }
        self.load_session(path).map(Some)
    }

    /// Rewrites the session's file with its full content.
    pub fn save(&mut self, id: SessionId) -> CoreResult<SaveStatus> {
        let session = self.session_mut(id)?;
        if session.path().is_none() {
            return Ok(SaveStatus::NeedsPath);
        }
        session.save()?;
        tracing::info!(%id, "saved session");
        self.emit(EditorEvent::SessionSaved(id));
        Ok(SaveStatus::Saved)
    }

    /// Writes the session to `path` and binds it there. A path already
    /// bound to another session is refused.
    pub fn save_as(&mut self, id: SessionId, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let target = persist::resolve_path(path).map_err(|source| CoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(other) = self.sessions.find_by_path(&target) {
            if other != id {
                return Err(CoreError::InvalidOperation(format!(
                    "{} is already open in another tab",
                    target.display()
                )));
            }
        }

        let session = self
            .sessions
            .get_mut(id)
            .ok_or(CoreError::SessionNotFound(id))?;
        session.save_as(path, &self.config)?;
        tracing::info!(%id, path = %path.display(), "saved session as");
        self.emit(EditorEvent::SessionSaved(id));
        Ok(())
    }

    /// Closes a session, discarding unsaved changes.
    ///
    /// Hosts ask first; see [`Command::CloseFile`](crate::Command::CloseFile).
    pub fn close_session(&mut self, id: SessionId) -> CoreResult<()> {
        let session = self.sessions.close(id)?;
        if session.is_modified() {
            tracing::debug!(%id, "discarded unsaved changes");
        }
        self.emit(EditorEvent::SessionClosed(id));
        if let Some(current) = self.sessions.current_id() {
            self.emit(EditorEvent::SessionFocused(current));
        }
        Ok(())
    }

    /// Focuses a session.
    pub fn focus(&mut self, id: SessionId) -> CoreResult<()> {
        self.sessions.set_current(id)?;
        self.emit(EditorEvent::SessionFocused(id));
        Ok(())
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Returns a session by ID.
    pub fn session(&self, id: SessionId) -> CoreResult<&BufferSession> {
        self.sessions.get(id).ok_or(CoreError::SessionNotFound(id))
    }

    pub fn session_mut(&mut self, id: SessionId) -> CoreResult<&mut BufferSession> {
        self.sessions
            .get_mut(id)
            .ok_or(CoreError::SessionNotFound(id))
    }

    /// Returns the focused session.
    pub fn current_session(&self) -> CoreResult<&BufferSession> {
        self.sessions.current().ok_or(CoreError::NoActiveSession)
    }

    pub fn current_session_mut(&mut self) -> CoreResult<&mut BufferSession> {
        self.sessions.current_mut().ok_or(CoreError::NoActiveSession)
    }

    /// Returns true if any session has unsaved changes.
    pub fn has_unsaved_changes(&self) -> bool {
        self.sessions.iter().any(BufferSession::is_modified)
    }

    // ==================== Auto-save ====================

    /// Rewrites every session that has a file, in tab order.
    ///
    /// A failed write is logged and reported; the remaining sessions are
    /// still attempted. Sessions without a path are skipped silently.
    pub fn auto_save_tick(&mut self) -> AutoSaveReport {
        let mut report = AutoSaveReport::default();

        for session in self.sessions.iter_mut() {
            let id = session.id();
            if session.path().is_none() {
                report.skipped.push(id);
                continue;
            }
            match session.save() {
                Ok(()) => report.saved.push(id),
                Err(e) => {
                    tracing::warn!(%id, error = %e, "auto-save failed");
                    report.failed.push((id, e));
                }
            }
        }

        tracing::debug!(
            saved = report.saved.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "auto-save tick"
        );
        for &id in &report.saved {
            self.emit(EditorEvent::SessionSaved(id));
        }
        self.emit(EditorEvent::AutoSaved {
            saved: report.saved.len(),
            failed: report.failed.len(),
        });
        report
    }

    /// Runs a sweep if the interval has elapsed at `now`.
    pub fn poll_auto_save(&mut self, now: Instant) -> Option<AutoSaveReport> {
        self.auto_save.poll(now).then(|| self.auto_save_tick())
    }

    /// When the next sweep is due, for hosts that sleep until then.
    pub fn next_auto_save(&self) -> Instant {
        self.auto_save.next_due()
    }

    /// Changes the auto-save interval and restarts the countdown.
    pub fn set_auto_save_interval(&mut self, secs: u64) -> CoreResult<()> {
        if !AUTO_SAVE_RANGE.contains(&secs) {
            return Err(CoreError::InvalidOperation(format!(
                "auto-save interval must be between {} and {} seconds",
                AUTO_SAVE_RANGE.start(),
                AUTO_SAVE_RANGE.end()
            )));
        }
        self.config.files.auto_save_interval_secs = secs;
        self.auto_save
            .restart(Duration::from_secs(secs), Instant::now());
        tracing::info!(secs, "auto-save interval changed");
        self.emit(EditorEvent::ConfigChanged);
        Ok(())
    }

    // ==================== Processes ====================

    /// The invocation that runs a session's file.
    pub fn run_invocation(&self, id: SessionId) -> CoreResult<Invocation> {
        let session = self.session(id)?;
        let path = session.path().ok_or(CoreError::UnsavedFile(id))?;
        Ok(Invocation::run_file(path, &self.config.process))
    }

    /// Runs a session's file through the interpreter and captures its
    /// output. The file is run as it is on disk.
    pub async fn run<L: ProcessLauncher>(
        &self,
        id: SessionId,
        launcher: &L,
        cancel: CancellationToken,
    ) -> CoreResult<ProcessOutput> {
        let invocation = self.run_invocation(id)?;
        Ok(launcher.launch(&invocation, cancel).await?)
    }

    /// Runs a git command in the workspace root. A successful clone
    /// re-roots the workspace to the cloned directory.
    pub async fn git<L: ProcessLauncher>(
        &mut self,
        command: GitCommand,
        launcher: &L,
        cancel: CancellationToken,
    ) -> CoreResult<ProcessOutput> {
        let root = self.root()?;
        let invocation = command.invocation(&root, &self.config.process);
        let output = launcher.launch(&invocation, cancel).await?;

        if let GitCommand::Clone { dir, .. } = &command {
            if output.success() {
                self.open_workspace(dir)?;
            }
        }
        Ok(output)
    }

    /// Token that cancels the process started by the next command. Hosts
    /// grab it before awaiting [`Editor::execute`].
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub(crate) fn reset_cancellation(&mut self) {
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
    }

    // ==================== Text Editing ====================

    /// Inserts text at the current cursor position.
    pub fn insert_text(&mut self, text: &str) -> CoreResult<()> {
        let session = self.current_session_mut()?;
        session.view_mut().insert_text(text)?;
        let id = session.id();
        self.emit(EditorEvent::SessionChanged(id));
        Ok(())
    }

    /// Undoes the last edit. Nothing to undo is not an error.
    pub fn undo(&mut self) -> CoreResult<()> {
        let session = self.current_session_mut()?;
        match session.view_mut().undo() {
            Err(CoreError::Buffer(BufferError::NothingToUndo)) => Ok(()),
            Err(e) => Err(e),
            Ok(()) => {
                let id = session.id();
                self.emit(EditorEvent::SessionChanged(id));
                Ok(())
            }
        }
    }

    /// Redoes the last undone edit.
    pub fn redo(&mut self) -> CoreResult<()> {
        let session = self.current_session_mut()?;
        match session.view_mut().redo() {
            Err(CoreError::Buffer(BufferError::NothingToRedo)) => Ok(()),
            Err(e) => Err(e),
            Ok(()) => {
                let id = session.id();
                self.emit(EditorEvent::SessionChanged(id));
                Ok(())
            }
        }
    }

    /// Copies selection to clipboard.
    pub fn copy(&mut self) -> CoreResult<()> {
        let session = self.current_session()?;
        if let Some(text) = session.view().selected_text() {
            self.clipboard = text;
        }
        Ok(())
    }

    /// Cuts selection to clipboard.
    pub fn cut(&mut self) -> CoreResult<()> {
        let session = self.current_session_mut()?;
        let Some(text) = session.view().selected_text() else {
            return Ok(());
        };
        session.view_mut().delete_backward()?;
        let id = session.id();
        self.clipboard = text;
        self.emit(EditorEvent::SessionChanged(id));
        Ok(())
    }

    /// Pastes from clipboard.
    pub fn paste(&mut self) -> CoreResult<()> {
        if self.clipboard.is_empty() {
            return Ok(());
        }
        let text = self.clipboard.clone();
        self.insert_text(&text)
    }

    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    // ==================== Workspace ====================

    /// Opens a workspace folder.
    pub fn open_workspace(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let workspace = Workspace::open(path)?;
        tracing::info!(root = %workspace.root().display(), "opened workspace");
        let root = workspace.root().to_path_buf();
        self.workspace = Some(workspace);
        self.emit(EditorEvent::WorkspaceOpened(root));
        Ok(())
    }

    /// Returns the current workspace.
    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    /// Creates a folder under the workspace root.
    pub fn new_folder(&mut self, name: &str) -> CoreResult<PathBuf> {
        let workspace = match &self.workspace {
            Some(workspace) => workspace.clone(),
            None => Workspace::open(self.root()?)?,
        };
        workspace.create_folder(name)
    }

    /// Creates `~/name` and makes it the workspace.
    pub fn new_project(&mut self, name: &str) -> CoreResult<()> {
        let workspace = Workspace::create_project(name)?;
        let root = workspace.root().to_path_buf();
        self.workspace = Some(workspace);
        self.emit(EditorEvent::WorkspaceOpened(root));
        Ok(())
    }

    /// Workspace root, or the process directory when no folder is open.
    fn root(&self) -> CoreResult<PathBuf> {
        match &self.workspace {
            Some(workspace) => Ok(workspace.root().to_path_buf()),
            None => Ok(std::env::current_dir()?),
        }
    }

    // ==================== Configuration ====================

    /// Returns the editor configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration and re-applies it to every session.
    pub fn set_config(&mut self, config: Config) -> CoreResult<()> {
        config.validate()?;
        self.config = config;
        self.keymap = Keymap::from_config(&self.config);
        self.auto_save
            .restart(self.config.files.auto_save_interval(), Instant::now());

        let font = self.config.ui.font();
        for session in self.sessions.iter_mut() {
            session.reload_rules(&self.config)?;
            session.view_mut().set_font(font.clone());
        }
        self.emit(EditorEvent::ConfigChanged);
        Ok(())
    }

    /// Applies a font to every session.
    pub fn set_font(&mut self, font: Font) {
        tracing::info!(%font, "font changed");
        for session in self.sessions.iter_mut() {
            session.view_mut().set_font(font.clone());
        }
        self.config.ui.set_font(&font);
        self.emit(EditorEvent::ConfigChanged);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.config.ui.theme = theme;
        self.emit(EditorEvent::ThemeChanged(theme));
    }

    /// Returns the keymap.
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    // ==================== Events ====================

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("sessions", &self.sessions.len())
            .field("workspace", &self.workspace)
            .field("auto_save", &self.auto_save)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessError;
    use codepad_buffer::Position;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingLauncher(AtomicUsize);

    impl ProcessLauncher for CountingLauncher {
        async fn launch(
            &self,
            _invocation: &Invocation,
            _cancel: CancellationToken,
        ) -> Result<ProcessOutput, ProcessError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ProcessOutput::default())
        }
    }

    #[test]
    fn test_new_session_is_untitled_and_current() {
        let mut editor = Editor::new();
        let a = editor.new_session().unwrap();
        let b = editor.new_session().unwrap();

        assert_eq!(editor.sessions().current_id(), Some(b));
        assert_eq!(editor.sessions().position(a), Some(0));
        assert_eq!(editor.current_session().unwrap().title(), "Untitled");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let mut editor = Editor::new();

        let err = editor.load_session(dir.path().join("nope.py")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert!(editor.sessions().is_empty());
    }

    #[test]
    fn test_load_twice_refocuses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.py");
        std::fs::write(&path, "x = 1\n").unwrap();

        let mut editor = Editor::new();
        let first = editor.load_session(&path).unwrap();
        editor.new_session().unwrap();
        let second = editor.load_session(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(editor.sessions().len(), 2);
        assert_eq!(editor.sessions().current_id(), Some(first));
    }

    #[test]
    fn test_load_through_parent_components_refocuses() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("a");
        std::fs::create_dir(&sub).unwrap();
        let path = sub.join("b.py");
        std::fs::write(&path, "x = 1\n").unwrap();

        let mut editor = Editor::new();
        let first = editor.load_session(&path).unwrap();
        let second = editor.load_session(sub.join("..").join("a").join("b.py")).unwrap();

        assert_eq!(first, second);
        assert_eq!(editor.sessions().len(), 1);
    }

    #[test]
    fn test_save_as_onto_open_file_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taken.py");
        std::fs::write(&path, "original\n").unwrap();

        let mut editor = Editor::new();
        let owner = editor.load_session(&path).unwrap();
        let other = editor.new_session().unwrap();
        editor.insert_text("other\n").unwrap();

        let err = editor.save_as(other, &path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOperation(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original\n");
        assert!(editor.session(other).unwrap().path().is_none());

        // Rebinding a session to its own path is fine
        editor.save_as(owner, &path).unwrap();
    }

    #[test]
    fn test_open_from_tree_ignores_directories() {
        let dir = tempdir().unwrap();
        let mut editor = Editor::new();
        assert_eq!(editor.open_from_tree(dir.path()).unwrap(), None);
        assert!(editor.sessions().is_empty());
    }

    #[test]
    fn test_save_then_reload_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("round.py");
        let content = "def f():\n\treturn \"é\"\r\n";

        let mut editor = Editor::new();
        let id = editor.new_session().unwrap();
        assert_eq!(editor.save(id).unwrap(), SaveStatus::NeedsPath);

        editor.insert_text(content).unwrap();
        editor.save_as(id, &path).unwrap();
        editor.insert_text("# more\n").unwrap();
        assert_eq!(editor.save(id).unwrap(), SaveStatus::Saved);

        let expected = editor.session(id).unwrap().text();
        editor.close_session(id).unwrap();
        let reloaded = editor.load_session(&path).unwrap();
        assert_eq!(editor.session(reloaded).unwrap().text(), expected);
    }

    #[test]
    fn test_auto_save_isolates_failures() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.py");
        let doomed = dir.path().join("gone").join("doomed.py");
        std::fs::create_dir(dir.path().join("gone")).unwrap();

        let mut editor = Editor::new();
        let bad_id = editor.new_session().unwrap();
        editor.insert_text("a = 1").unwrap();
        editor.save_as(bad_id, &doomed).unwrap();
        std::fs::remove_dir_all(dir.path().join("gone")).unwrap();

        let untitled = editor.new_session().unwrap();
        editor.insert_text("unsaved").unwrap();

        let good_id = editor.new_session().unwrap();
        editor.insert_text("b = 2").unwrap();
        editor.save_as(good_id, &good).unwrap();
        editor.insert_text("\nc = 3").unwrap();

        let report = editor.auto_save_tick();

        assert_eq!(report.saved, vec![good_id]);
        assert_eq!(report.skipped, vec![untitled]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, bad_id);
        assert!(matches!(report.failed[0].1, CoreError::Write { .. }));
        assert_eq!(std::fs::read_to_string(&good).unwrap(), "b = 2\nc = 3");
        assert!(editor.session(untitled).unwrap().is_modified());
    }

    #[test]
    fn test_poll_auto_save_respects_interval() {
        let mut editor = Editor::new();
        editor.set_auto_save_interval(10).unwrap();
        let due = editor.next_auto_save();

        assert!(editor.poll_auto_save(due - Duration::from_secs(1)).is_none());
        assert!(editor.poll_auto_save(due).is_some());
        assert!(editor.poll_auto_save(due).is_none());

        assert!(editor.set_auto_save_interval(0).is_err());
        assert!(editor.set_auto_save_interval(3601).is_err());
        assert_eq!(editor.config().files.auto_save_interval_secs, 10);
    }

    #[tokio::test]
    async fn test_run_without_path_launches_nothing() {
        let mut editor = Editor::new();
        let id = editor.new_session().unwrap();
        let launcher = CountingLauncher(AtomicUsize::new(0));

        let err = editor
            .run(id, &launcher, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::UnsavedFile(e) if e == id));
        assert_eq!(launcher.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clipboard() {
        let mut editor = Editor::new();
        editor.new_session().unwrap();
        editor.insert_text("hello world").unwrap();

        let view = editor.current_session_mut().unwrap().view_mut();
        view.move_cursor(Position::new(0, 6));
        view.select_to(Position::new(0, 11));

        editor.cut().unwrap();
        assert_eq!(editor.clipboard(), "world");
        assert_eq!(editor.current_session().unwrap().text(), "hello ");

        editor.paste().unwrap();
        editor.paste().unwrap();
        assert_eq!(editor.current_session().unwrap().text(), "hello worldworld");
    }

    #[test]
    fn test_undo_with_empty_history_is_quiet() {
        let mut editor = Editor::new();
        editor.new_session().unwrap();
        editor.undo().unwrap();
        editor.redo().unwrap();

        editor.insert_text("x").unwrap();
        editor.undo().unwrap();
        assert_eq!(editor.current_session().unwrap().text(), "");
    }

    #[test]
    fn test_set_font_applies_to_all_sessions() {
        let mut editor = Editor::new();
        editor.new_session().unwrap();
        editor.new_session().unwrap();

        let font = Font {
            family: "Iosevka".into(),
            size: 16.0,
        };
        editor.set_font(font.clone());

        assert!(editor.sessions().iter().all(|s| s.view().font() == &font));
        assert_eq!(editor.config().ui.font(), font);
    }

    #[tokio::test]
    async fn test_events_follow_session_lifecycle() {
        let mut editor = Editor::new();
        let mut rx = editor.subscribe();

        let id = editor.new_session().unwrap();
        editor.close_session(id).unwrap();

        assert_eq!(rx.recv().await.unwrap(), EditorEvent::SessionOpened(id));
        assert_eq!(rx.recv().await.unwrap(), EditorEvent::SessionFocused(id));
        assert_eq!(rx.recv().await.unwrap(), EditorEvent::SessionClosed(id));
    }

    #[test]
    fn test_new_folder_under_workspace() {
        let dir = tempdir().unwrap();
        let mut editor = Editor::new();
        editor.open_workspace(dir.path()).unwrap();

        let created = editor.new_folder("pkg").unwrap();
        assert!(created.is_dir());
        assert!(editor.workspace().unwrap().contains(&created));
    }
}
