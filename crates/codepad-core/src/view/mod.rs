//! The editable buffer view.
//!
//! ## Learning: Typed Events Instead of Overrides
//!
//! A view owns its buffer and publishes what happened to it as
//! [`ViewEvent`] values. The gutter and the highlight cache are plain
//! structs implementing [`ViewListener`]; the view hands each of them the
//! event plus a read-only [`ViewSnapshot`] of itself. Nothing holds a
//! reference back into the view, so the borrow checker stays happy:
//!
//! ```text
//! insert_text ─► TextBuffer ─► ContentChange
//!                                  │
//!                ┌─────────────────┼──────────────────┐
//!                ▼                 ▼                  ▼
//!         LineHighlighter        Gutter        extra listeners
//!        (rescan lines)   (width / damage)
//! ```

mod gutter;
mod highlight;
mod layout;
mod metrics;

pub use gutter::{Gutter, GutterDamage, GutterPaint, LineLabel, digit_count};
pub use highlight::LineHighlighter;
pub use layout::{BlockLayout, display_width};
pub use metrics::{Font, FontMetrics};

use codepad_buffer::{ContentChange, Cursor, Position, TextBuffer};
use codepad_syntax::{Color, HighlightEngine, HighlightSpan};

use crate::config::{Config, GutterConfig};
use crate::geometry::Rect;
use crate::{CoreError, CoreResult};

/// Something that happened to a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Text was inserted or removed.
    ContentChanged(ContentChange),
    /// The number of logical lines changed.
    LineCountChanged(usize),
    /// Part of the viewport needs repainting (`dy == 0`) or the viewport
    /// scrolled by `dy` pixels. `rect` is in viewport coordinates.
    UpdateRequest { rect: Rect, dy: f32 },
    /// The cursor moved.
    CursorMoved(Position),
    /// The view's contents rectangle changed.
    Resized(Rect),
    /// The font changed.
    MetricsChanged,
}

/// Read-only state handed to listeners alongside each event.
pub struct ViewSnapshot<'a> {
    pub buffer: &'a TextBuffer,
    pub layout: &'a BlockLayout,
    pub metrics: &'a FontMetrics,
    /// The text viewport, in view coordinates
    pub viewport: Rect,
    pub scroll_y: f32,
}

/// Subscriber to a view's events.
pub trait ViewListener {
    fn on_view_event(&mut self, event: &ViewEvent, view: &ViewSnapshot<'_>);
}

/// A background decoration drawn under text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtraSelection {
    /// Collapsed copy of the text cursor
    pub cursor: Cursor,
    pub background: Color,
    /// Spans the whole viewport width instead of the selected text
    pub full_width: bool,
}

/// View behavior taken from the config.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub tab_stop: usize,
    pub word_wrap: bool,
    pub read_only: bool,
    pub current_line: Color,
    pub gutter: GutterConfig,
}

impl ViewSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tab_stop: config.editor.tab_stop,
            word_wrap: config.editor.word_wrap,
            read_only: config.editor.read_only,
            current_line: config.editor.current_line,
            gutter: config.gutter.clone(),
        }
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// An editable text view with a line-number gutter and highlighting.
pub struct EditorView {
    buffer: TextBuffer,
    cursor: Cursor,
    settings: ViewSettings,
    read_only: bool,
    font: Font,
    metrics: FontMetrics,
    layout: BlockLayout,
    /// Whole view area, gutter included
    contents: Rect,
    /// Left viewport margin reserved for the gutter
    margin: f32,
    scroll_y: f32,
    gutter: Gutter,
    highlighter: LineHighlighter,
    extra_selections: Vec<ExtraSelection>,
    listeners: Vec<Box<dyn ViewListener + Send>>,
}

impl EditorView {
    pub fn new(text: &str, engine: HighlightEngine, font: Font, settings: ViewSettings) -> Self {
        let buffer = TextBuffer::from(text);
        let metrics = FontMetrics::estimate(&font);
        let gutter = Gutter::new(&settings.gutter, buffer.len_lines(), &metrics);
        let highlighter = LineHighlighter::new(engine, &buffer);
        let layout = BlockLayout::compute(&buffer, metrics.line_height, None, settings.tab_stop);

        let mut view = Self {
            margin: gutter.width(),
            read_only: settings.read_only,
            buffer,
            cursor: Cursor::default(),
            settings,
            font,
            metrics,
            layout,
            contents: Rect::default(),
            scroll_y: 0.0,
            gutter,
            highlighter,
            extra_selections: Vec::new(),
            listeners: Vec::new(),
        };
        view.highlight_current_line();
        view
    }

    // ==================== Accessors ====================

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text().into_owned()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn mark_saved(&mut self) {
        self.buffer.mark_saved();
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn gutter(&self) -> &Gutter {
        &self.gutter
    }

    pub fn highlighter(&self) -> &LineHighlighter {
        &self.highlighter
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn contents(&self) -> Rect {
        self.contents
    }

    /// The text area: the contents minus the gutter margin.
    pub fn viewport(&self) -> Rect {
        Rect::new(
            self.contents.x + self.margin,
            self.contents.y,
            (self.contents.width - self.margin).max(0.0),
            self.contents.height,
        )
    }

    pub fn viewport_margin(&self) -> f32 {
        self.margin
    }

    pub fn extra_selections(&self) -> &[ExtraSelection] {
        &self.extra_selections
    }

    /// Styled runs for one line.
    pub fn line_spans(&self, line: usize) -> Vec<HighlightSpan> {
        self.highlighter.resolved(line, &self.buffer)
    }

    pub fn add_listener(&mut self, listener: Box<dyn ViewListener + Send>) {
        self.listeners.push(listener);
    }

    // ==================== Editing ====================

    /// Types `text` at the cursor, replacing the selection.
    pub fn insert_text(&mut self, text: &str) -> CoreResult<()> {
        self.check_writable()?;
        self.remove_selection()?;
        let at = self.buffer.position_to_char_idx(self.cursor.position)?;
        let change = self.buffer.insert(at, text)?;
        let end = self.buffer.char_idx_to_position(at + change.chars_added)?;
        self.cursor.move_to(end);
        self.content_changed(change);
        Ok(())
    }

    /// Deletes the selection, or the character before the cursor.
    pub fn delete_backward(&mut self) -> CoreResult<()> {
        self.check_writable()?;
        if self.remove_selection()? {
            return Ok(());
        }
        let at = self.buffer.position_to_char_idx(self.cursor.position)?;
        if at == 0 {
            return Ok(());
        }
        self.delete_range(at - 1, at)
    }

    /// Deletes the selection, or the character after the cursor.
    pub fn delete_forward(&mut self) -> CoreResult<()> {
        self.check_writable()?;
        if self.remove_selection()? {
            return Ok(());
        }
        let at = self.buffer.position_to_char_idx(self.cursor.position)?;
        if at == self.buffer.len_chars() {
            return Ok(());
        }
        self.delete_range(at, at + 1)
    }

    /// Replaces all text, as when loading a file. The result counts as
    /// saved and has no undo history.
    pub fn set_text(&mut self, text: &str) {
        let change = self.buffer.set_text(text);
        self.cursor = Cursor::default();
        self.content_changed(change);
    }

    pub fn undo(&mut self) -> CoreResult<()> {
        self.check_writable()?;
        let change = self.buffer.undo()?;
        self.place_cursor_after(&change)?;
        self.content_changed(change);
        Ok(())
    }

    pub fn redo(&mut self) -> CoreResult<()> {
        self.check_writable()?;
        let change = self.buffer.redo()?;
        self.place_cursor_after(&change)?;
        self.content_changed(change);
        Ok(())
    }

    // ==================== Cursor & Selection ====================

    pub fn move_cursor(&mut self, position: Position) {
        let position = self.buffer.clamp(position);
        self.cursor.move_to(position);
        self.buffer.seal_undo_step();
        self.cursor_changed();
    }

    /// Extends the selection to `position`.
    pub fn select_to(&mut self, position: Position) {
        let position = self.buffer.clamp(position);
        self.cursor.select_to(position);
        self.cursor_changed();
    }

    pub fn select_all(&mut self) {
        self.cursor.move_to(Position::ZERO);
        self.select_to(self.end_position());
    }

    pub fn move_to_end(&mut self) {
        self.move_cursor(self.end_position());
    }

    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.cursor.selection_range()?;
        let start = self.buffer.position_to_char_idx(start).ok()?;
        let end = self.buffer.position_to_char_idx(end).ok()?;
        self.buffer.slice(start..end).ok().map(|s| s.into_owned())
    }

    // ==================== Geometry ====================

    /// Gives the view a new contents rectangle.
    pub fn resize(&mut self, contents: Rect) {
        self.contents = contents;
        self.relayout();
        self.dispatch(ViewEvent::Resized(contents));
        let viewport = self.viewport().local();
        self.dispatch(ViewEvent::UpdateRequest {
            rect: viewport,
            dy: 0.0,
        });
        self.scroll_to(self.scroll_y);
    }

    /// Scrolls so the document offset `y` sits at the viewport top.
    pub fn scroll_to(&mut self, y: f32) {
        let max = (self.layout.document_height() - self.viewport().height).max(0.0);
        let y = y.clamp(0.0, max);
        if y == self.scroll_y {
            return;
        }
        let dy = self.scroll_y - y;
        self.scroll_y = y;
        let viewport = self.viewport().local();
        self.dispatch(ViewEvent::UpdateRequest { rect: viewport, dy });
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.scroll_to(self.scroll_y + dy);
    }

    /// Scrolls the minimum amount needed to show the cursor row.
    pub fn ensure_cursor_visible(&mut self) {
        let height = self.viewport().height;
        if height <= 0.0 {
            return;
        }
        let top = self.layout.row_top(&self.buffer, self.cursor.position);
        let bottom = top + self.metrics.line_height;
        if top < self.scroll_y {
            self.scroll_to(top);
        } else if bottom > self.scroll_y + height {
            self.scroll_to(bottom - height);
        }
    }

    pub fn set_font(&mut self, font: Font) {
        self.metrics = FontMetrics::estimate(&font);
        self.font = font;
        self.relayout();
        self.dispatch(ViewEvent::MetricsChanged);
        self.sync_margin();
        self.scroll_to(self.scroll_y);
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        self.highlight_current_line();
    }

    /// Replaces the highlight rules and rescans.
    pub fn set_engine(&mut self, engine: HighlightEngine) {
        self.highlighter.set_engine(engine, &self.buffer);
        let viewport = self.viewport().local();
        self.dispatch(ViewEvent::UpdateRequest {
            rect: viewport,
            dy: 0.0,
        });
    }

    /// The current-line band in viewport coordinates, if one is shown.
    pub fn current_line_rect(&self) -> Option<Rect> {
        let selection = self.extra_selections.iter().find(|s| s.full_width)?;
        let top = self.layout.row_top(&self.buffer, selection.cursor.position) - self.scroll_y;
        Some(Rect::new(
            0.0,
            top,
            self.viewport().width,
            self.metrics.line_height,
        ))
    }

    /// Paints the gutter region `dirty` (gutter coordinates).
    pub fn paint_gutter(&self, dirty: Rect) -> GutterPaint {
        self.gutter.paint(dirty, &self.snapshot())
    }

    /// Pending gutter damage since the last call.
    pub fn take_gutter_damage(&mut self) -> Vec<GutterDamage> {
        self.gutter.take_damage()
    }

    // ==================== Internals ====================

    fn check_writable(&self) -> CoreResult<()> {
        if self.read_only {
            return Err(CoreError::InvalidOperation("view is read-only".into()));
        }
        Ok(())
    }

    fn end_position(&self) -> Position {
        self.buffer.clamp(Position::new(usize::MAX, usize::MAX))
    }

    /// Removes selected text; returns false if nothing was selected.
    fn remove_selection(&mut self) -> CoreResult<bool> {
        let Some((start, end)) = self.cursor.selection_range() else {
            self.cursor.clear_selection();
            return Ok(false);
        };
        let start_idx = self.buffer.position_to_char_idx(start)?;
        let end_idx = self.buffer.position_to_char_idx(end)?;
        self.delete_range(start_idx, end_idx)?;
        Ok(true)
    }

    fn delete_range(&mut self, start: usize, end: usize) -> CoreResult<()> {
        let change = self.buffer.delete(start..end)?;
        let position = self.buffer.char_idx_to_position(start)?;
        self.cursor.move_to(position);
        self.content_changed(change);
        Ok(())
    }

    fn place_cursor_after(&mut self, change: &ContentChange) -> CoreResult<()> {
        let position = self
            .buffer
            .char_idx_to_position(change.position + change.chars_added)?;
        self.cursor.move_to(position);
        Ok(())
    }

    fn snapshot(&self) -> ViewSnapshot<'_> {
        ViewSnapshot {
            buffer: &self.buffer,
            layout: &self.layout,
            metrics: &self.metrics,
            viewport: self.viewport(),
            scroll_y: self.scroll_y,
        }
    }

    fn dispatch(&mut self, event: ViewEvent) {
        let viewport = self.viewport();
        let snapshot = ViewSnapshot {
            buffer: &self.buffer,
            layout: &self.layout,
            metrics: &self.metrics,
            viewport,
            scroll_y: self.scroll_y,
        };
        self.highlighter.on_view_event(&event, &snapshot);
        self.gutter.on_view_event(&event, &snapshot);
        for listener in &mut self.listeners {
            listener.on_view_event(&event, &snapshot);
        }
    }

    fn relayout(&mut self) {
        let viewport = self.viewport();
        let wrap = (self.settings.word_wrap && viewport.width > 0.0)
            .then(|| ((viewport.width / self.metrics.char_width).floor() as usize).max(1));
        self.layout = BlockLayout::compute(
            &self.buffer,
            self.metrics.line_height,
            wrap,
            self.settings.tab_stop,
        );
    }

    /// Reserves the gutter's current width as the viewport margin.
    fn sync_margin(&mut self) {
        let width = self.gutter.width();
        if width != self.margin {
            tracing::debug!(margin = width, "viewport margin changed");
            self.margin = width;
            self.relayout();
        }
    }

    fn content_changed(&mut self, change: ContentChange) {
        let old_count = self.layout.line_count();
        self.relayout();
        self.dispatch(ViewEvent::ContentChanged(change));

        let new_count = self.buffer.len_lines();
        if new_count != old_count {
            self.dispatch(ViewEvent::LineCountChanged(new_count));
            self.sync_margin();
        }

        if let Some(rect) = self.changed_rect(&change, new_count != old_count) {
            self.dispatch(ViewEvent::UpdateRequest { rect, dy: 0.0 });
        }
        self.cursor_changed();
    }

    /// The viewport band covering the rewritten lines, or everything below
    /// them when lines shifted.
    fn changed_rect(&self, change: &ContentChange, shifted: bool) -> Option<Rect> {
        let viewport = self.viewport();
        let top = self.layout.block_top(change.first_line) - self.scroll_y;
        let bottom = if shifted {
            viewport.height
        } else {
            self.layout.block_top(change.first_line + change.lines_added + 1) - self.scroll_y
        };
        let top = top.max(0.0);
        let bottom = bottom.min(viewport.height);
        (bottom > top).then(|| Rect::new(0.0, top, viewport.width, bottom - top))
    }

    fn cursor_changed(&mut self) {
        self.ensure_cursor_visible();
        self.highlight_current_line();
    }

    /// Rebuilds the current-line emphasis: one full-width band at the
    /// cursor when editable, none when read-only.
    fn highlight_current_line(&mut self) {
        self.extra_selections.clear();
        if !self.read_only {
            self.extra_selections.push(ExtraSelection {
                cursor: self.cursor.collapsed(),
                background: self.settings.current_line,
                full_width: true,
            });
        }
        self.dispatch(ViewEvent::CursorMoved(self.cursor.position));
    }
}

impl std::fmt::Debug for EditorView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorView")
            .field("lines", &self.buffer.len_lines())
            .field("cursor", &self.cursor)
            .field("read_only", &self.read_only)
            .field("font", &self.font)
            .field("scroll_y", &self.scroll_y)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
