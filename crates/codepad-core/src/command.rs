//! Menu commands and the host shell that answers their prompts.
//!
//! ## Learning: The Command Pattern
//!
//! Commands encapsulate actions as values:
//! - Menu items and key bindings map to the same `Command`
//! - Config files name them (`"save_as"`)
//! - One dispatcher owns the "ask, act, report" sequence
//!
//! ## Learning: Traits as Seams
//!
//! Dialogs belong to whatever UI hosts the editor. [`HostShell`] is the
//! seam: the core asks for a path or a string and gets `None` back when
//! the user cancelled. Tests drive the same code with a scripted shell.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::config::{AUTO_SAVE_RANGE, Theme};
use crate::document::SessionId;
use crate::editor::{Editor, SaveStatus};
use crate::keymap::KeyPress;
use tokio_util::sync::CancellationToken;

use crate::process::{GitCommand, ProcessError, ProcessLauncher, ProcessOutput};
use crate::view::Font;
use crate::{CoreError, CoreResult};

/// Built-in editor commands, one per menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // File menu
    NewFile,
    NewFolder,
    OpenFile,
    OpenFolder,
    Save,
    SaveAs,
    Run,
    CloseFile,

    // Edit menu
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,

    // Settings menu
    ChangeFont,
    ChangeTheme,
    SetAutoSaveInterval,

    // Project menu
    NewProject,
    OpenProject,

    // Git menu
    GitClone,
    GitCommit,
    GitPush,
}

impl Command {
    /// Every command, in menu order.
    pub const ALL: [Command; 21] = [
        Command::NewFile,
        Command::NewFolder,
        Command::OpenFile,
        Command::OpenFolder,
        Command::Save,
        Command::SaveAs,
        Command::Run,
        Command::CloseFile,
        Command::Undo,
        Command::Redo,
        Command::Copy,
        Command::Cut,
        Command::Paste,
        Command::ChangeFont,
        Command::ChangeTheme,
        Command::SetAutoSaveInterval,
        Command::NewProject,
        Command::OpenProject,
        Command::GitClone,
        Command::GitCommit,
        Command::GitPush,
    ];

    /// Returns the menu label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Command::NewFile => "New File",
            Command::NewFolder => "New Folder",
            Command::OpenFile => "Open File",
            Command::OpenFolder => "Open Folder",
            Command::Save => "Save",
            Command::SaveAs => "Save As",
            Command::Run => "Run",
            Command::CloseFile => "Close File",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::Copy => "Copy",
            Command::Cut => "Cut",
            Command::Paste => "Paste",
            Command::ChangeFont => "Change Font",
            Command::ChangeTheme => "Change Theme",
            Command::SetAutoSaveInterval => "Set Auto Save Interval",
            Command::NewProject => "New Project",
            Command::OpenProject => "Open Project",
            Command::GitClone => "Clone Repository",
            Command::GitCommit => "Commit",
            Command::GitPush => "Push",
        }
    }

    /// Returns the name used in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Command::NewFile => "new_file",
            Command::NewFolder => "new_folder",
            Command::OpenFile => "open_file",
            Command::OpenFolder => "open_folder",
            Command::Save => "save",
            Command::SaveAs => "save_as",
            Command::Run => "run",
            Command::CloseFile => "close_file",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Copy => "copy",
            Command::Cut => "cut",
            Command::Paste => "paste",
            Command::ChangeFont => "change_font",
            Command::ChangeTheme => "change_theme",
            Command::SetAutoSaveInterval => "set_auto_save_interval",
            Command::NewProject => "new_project",
            Command::OpenProject => "open_project",
            Command::GitClone => "git_clone",
            Command::GitCommit => "git_commit",
            Command::GitPush => "git_push",
        }
    }

    /// Parses a config name. Dashes and case are ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Title of the notice that reports a run or git result.
    fn result_title(&self) -> String {
        match self {
            Command::GitClone => "Clone Result".to_string(),
            _ => format!("{} Result", self.display_name()),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How serious a notice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message box for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// The notice for a failed command.
    fn from_error(command: Command, error: &CoreError) -> Self {
        let title = format!("{} Error", command.display_name());
        match error {
            CoreError::UnsavedFile(_) => Self::warning(title, "Save the file before running."),
            _ => Self::error(title, error.to_string()),
        }
    }
}

/// Answer to "save changes before closing?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// Dialogs provided by the UI hosting the editor.
///
/// Every picker and prompt returns `None` when the user cancelled.
pub trait HostShell {
    /// File picker for opening.
    fn pick_open_file(&mut self) -> Option<PathBuf>;

    /// File picker for a save destination.
    fn pick_save_path(&mut self) -> Option<PathBuf>;

    /// Directory picker.
    fn pick_folder(&mut self, title: &str) -> Option<PathBuf>;

    /// Single-line text prompt.
    fn prompt_text(&mut self, title: &str, label: &str) -> Option<String>;

    /// Integer prompt limited to `range`.
    fn prompt_int(
        &mut self,
        title: &str,
        label: &str,
        default: u64,
        range: RangeInclusive<u64>,
    ) -> Option<u64>;

    /// Pick one of `choices`; returns its index.
    fn prompt_choice(&mut self, title: &str, label: &str, choices: &[&str]) -> Option<usize>;

    /// Font dialog, starting from `current`.
    fn pick_font(&mut self, current: &Font) -> Option<Font>;

    /// Asked before a modified session is closed.
    fn confirm_close(&mut self, title: &str) -> CloseChoice;

    /// Shows a message box.
    fn notify(&mut self, notice: Notice);
}

impl Editor {
    /// Runs a menu command, asking `shell` for whatever input it needs.
    ///
    /// A failure is reported through exactly one [`HostShell::notify`]
    /// call. Cancelling a dialog is not a failure and reports nothing.
    pub async fn execute<S, L>(&mut self, command: Command, shell: &mut S, launcher: &L)
    where
        S: HostShell,
        L: ProcessLauncher,
    {
        tracing::debug!(%command, "executing command");
        match self.dispatch(command, shell, launcher).await {
            Ok(Some(notice)) => shell.notify(notice),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(%command, error = %e, "command failed");
                shell.notify(Notice::from_error(command, &e));
            }
        }
    }

    /// Runs the command bound to `key`. Returns false if nothing is bound.
    pub async fn handle_key<S, L>(&mut self, key: &KeyPress, shell: &mut S, launcher: &L) -> bool
    where
        S: HostShell,
        L: ProcessLauncher,
    {
        match self.keymap().lookup(key) {
            Some(command) => {
                self.execute(command, shell, launcher).await;
                true
            }
            None => false,
        }
    }

    async fn dispatch<S, L>(
        &mut self,
        command: Command,
        shell: &mut S,
        launcher: &L,
    ) -> CoreResult<Option<Notice>>
    where
        S: HostShell,
        L: ProcessLauncher,
    {
        match command {
            Command::NewFile => {
                self.new_session()?;
            }
            Command::NewFolder => {
                if let Some(name) = non_empty(shell.prompt_text("New Folder", "Folder Name:")) {
                    self.new_folder(&name)?;
                }
            }
            Command::OpenFile => {
                if let Some(path) = shell.pick_open_file() {
                    self.load_session(path)?;
                }
            }
            Command::OpenFolder | Command::OpenProject => {
                if let Some(path) = shell.pick_folder(command.display_name()) {
                    self.open_workspace(path)?;
                }
            }
            Command::Save => {
                if let Some(id) = self.sessions().current_id() {
                    self.save_or_prompt(id, shell)?;
                }
            }
            Command::SaveAs => {
                if let Some(id) = self.sessions().current_id() {
                    if let Some(path) = shell.pick_save_path() {
                        self.save_as(id, path)?;
                    }
                }
            }
            Command::Run => {
                if let Some(id) = self.sessions().current_id() {
                    let cancel = self.fresh_cancellation();
                    let output = self.run(id, launcher, cancel).await;
                    return self.finish_process(command, output);
                }
            }
            Command::CloseFile => {
                if let Some(id) = self.sessions().current_id() {
                    self.close_with_prompt(id, shell)?;
                }
            }
            Command::Undo => self.undo()?,
            Command::Redo => self.redo()?,
            Command::Copy => self.copy()?,
            Command::Cut => self.cut()?,
            Command::Paste => self.paste()?,
            Command::ChangeFont => {
                if let Some(font) = shell.pick_font(&self.config().ui.font()) {
                    self.set_font(font);
                }
            }
            Command::ChangeTheme => {
                let names = Theme::ALL.map(|t| t.name());
                if let Some(theme) = shell
                    .prompt_choice("Change Theme", "Select Theme:", &names)
                    .and_then(|i| Theme::ALL.get(i).copied())
                {
                    self.set_theme(theme);
                }
            }
            Command::SetAutoSaveInterval => {
                let current = self.config().files.auto_save_interval_secs;
                if let Some(secs) = shell.prompt_int(
                    "Set Auto Save Interval",
                    "Enter interval in seconds:",
                    current,
                    AUTO_SAVE_RANGE,
                ) {
                    self.set_auto_save_interval(secs)?;
                }
            }
            Command::NewProject => {
                if let Some(name) = non_empty(shell.prompt_text("New Project", "Project Name:")) {
                    self.new_project(&name)?;
                }
            }
            Command::GitClone => {
                let Some(url) = non_empty(shell.prompt_text("Clone Repository", "Repository URL:"))
                else {
                    return Ok(None);
                };
                let Some(dir) = shell.pick_folder("Select Directory") else {
                    return Ok(None);
                };
                return self.git_command(command, GitCommand::Clone { url, dir }, launcher).await;
            }
            Command::GitCommit => {
                let Some(message) = non_empty(shell.prompt_text("Commit Changes", "Commit Message:"))
                else {
                    return Ok(None);
                };
                return self.git_command(command, GitCommand::Commit { message }, launcher).await;
            }
            Command::GitPush => {
                return self.git_command(command, GitCommand::Push, launcher).await;
            }
        }
        Ok(None)
    }

    async fn git_command<L: ProcessLauncher>(
        &mut self,
        command: Command,
        git: GitCommand,
        launcher: &L,
    ) -> CoreResult<Option<Notice>> {
        let cancel = self.fresh_cancellation();
        let output = self.git(git, launcher, cancel).await;
        self.finish_process(command, output)
    }

    /// Token for a launch that is about to start. A cancel that arrived
    /// while nothing was running is dropped.
    fn fresh_cancellation(&mut self) -> CancellationToken {
        self.reset_cancellation();
        self.cancellation()
    }

    /// Turns a finished run into its result notice. Cancellation is the
    /// user's own doing and reports nothing.
    fn finish_process(
        &mut self,
        command: Command,
        output: CoreResult<ProcessOutput>,
    ) -> CoreResult<Option<Notice>> {
        self.reset_cancellation();
        let output = match output {
            Ok(output) => output,
            Err(CoreError::Subprocess(ProcessError::Cancelled { program })) => {
                tracing::info!(%command, %program, "process cancelled");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let title = command.result_title();
        Ok(Some(if output.success() {
            Notice::info(title, output.report())
        } else {
            Notice::warning(title, output.report())
        }))
    }

    /// Saves, asking for a path when the session has none. Returns false
    /// if the user cancelled the picker.
    fn save_or_prompt<S: HostShell>(
        &mut self,
        id: SessionId,
        shell: &mut S,
    ) -> CoreResult<bool> {
        match self.save(id)? {
            SaveStatus::Saved => Ok(true),
            SaveStatus::NeedsPath => match shell.pick_save_path() {
                Some(path) => {
                    self.save_as(id, path)?;
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    fn close_with_prompt<S: HostShell>(
        &mut self,
        id: SessionId,
        shell: &mut S,
    ) -> CoreResult<()> {
        let session = self.session(id)?;
        if session.is_modified() {
            match shell.confirm_close(session.title()) {
                CloseChoice::Cancel => return Ok(()),
                CloseChoice::Save => {
                    if !self.save_or_prompt(id, shell)? {
                        return Ok(());
                    }
                }
                CloseChoice::Discard => {}
            }
        }
        self.close_session(id)
    }
}

/// Treats an empty answer like a cancelled prompt.
fn non_empty(answer: Option<String>) -> Option<String> {
    answer
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
