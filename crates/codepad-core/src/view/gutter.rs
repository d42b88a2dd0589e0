//! The line-number gutter.
//!
//! The gutter is a fixed-width strip left of the text viewport. Its width
//! follows the digit count of the line count, and it repaints from the
//! view's update requests: a scroll moves the strip by `dy`, anything else
//! repaints the damaged band.

use codepad_syntax::Color;

use super::{FontMetrics, ViewEvent, ViewListener, ViewSnapshot};
use crate::config::GutterConfig;
use crate::geometry::Rect;

/// Number of decimal digits needed to print `n` (at least 1).
pub fn digit_count(n: usize) -> usize {
    let mut digits = 1;
    let mut value = n.max(1);
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

/// What the host must do to bring the gutter up to date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GutterDamage {
    /// Shift the painted strip vertically by `dy` pixels.
    Scroll { dy: f32 },
    /// Repaint this rectangle (gutter coordinates).
    Repaint(Rect),
}

/// One line-number label, right-aligned inside `rect`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLabel {
    /// 1-based line number
    pub number: usize,
    pub rect: Rect,
}

impl LineLabel {
    pub fn text(&self) -> String {
        self.number.to_string()
    }
}

/// Everything needed to paint a dirty region of the gutter.
#[derive(Debug, Clone, PartialEq)]
pub struct GutterPaint {
    pub fill: Rect,
    pub background: Color,
    pub foreground: Color,
    pub labels: Vec<LineLabel>,
}

#[derive(Debug, Clone)]
pub struct Gutter {
    base_margin: f32,
    background: Color,
    foreground: Color,
    width: f32,
    geometry: Rect,
    damage: Vec<GutterDamage>,
}

impl Gutter {
    pub fn new(config: &GutterConfig, line_count: usize, metrics: &FontMetrics) -> Self {
        let mut gutter = Self {
            base_margin: config.base_margin,
            background: config.background,
            foreground: config.foreground,
            width: 0.0,
            geometry: Rect::default(),
            damage: Vec::new(),
        };
        gutter.width = gutter.width_for(line_count, metrics);
        gutter.geometry.width = gutter.width;
        gutter
    }

    /// `base_margin + digit_width * digits(max(1, line_count))`
    pub fn width_for(&self, line_count: usize, metrics: &FontMetrics) -> f32 {
        self.base_margin + metrics.digit_width * digit_count(line_count) as f32
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Where the gutter sits in the view's contents rectangle.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Recomputes the width; returns true if it changed.
    pub fn update_width(&mut self, line_count: usize, metrics: &FontMetrics) -> bool {
        let width = self.width_for(line_count, metrics);
        if width == self.width {
            return false;
        }
        tracing::debug!(from = self.width, to = width, line_count, "gutter width changed");
        self.width = width;
        self.geometry.width = width;
        self.damage
            .push(GutterDamage::Repaint(Rect::new(0.0, 0.0, width, self.geometry.height)));
        true
    }

    /// Handles a viewport update request.
    ///
    /// `rect` is in viewport coordinates; `viewport` is the viewport's own
    /// local rectangle.
    pub fn update_request(
        &mut self,
        rect: Rect,
        dy: f32,
        viewport: Rect,
        line_count: usize,
        metrics: &FontMetrics,
    ) {
        if dy != 0.0 {
            self.damage.push(GutterDamage::Scroll { dy });
        } else {
            self.damage
                .push(GutterDamage::Repaint(Rect::new(0.0, rect.y, self.width, rect.height)));
        }

        if rect.contains(&viewport) {
            self.update_width(line_count, metrics);
        }
    }

    /// Re-anchors the gutter to the left edge of the view's contents.
    pub fn anchor(&mut self, contents: Rect) {
        self.geometry = Rect::new(contents.left(), contents.top(), self.width, contents.height);
    }

    /// Drains accumulated damage.
    pub fn take_damage(&mut self) -> Vec<GutterDamage> {
        std::mem::take(&mut self.damage)
    }

    /// Computes the labels that intersect `dirty`.
    ///
    /// Walks blocks from the first one visible at the current scroll
    /// offset; one label per block, aligned to the block's first row, so
    /// wrapped continuation rows stay unnumbered.
    pub fn paint(&self, dirty: Rect, view: &ViewSnapshot<'_>) -> GutterPaint {
        let layout = view.layout;
        let mut labels = Vec::new();

        let mut line = layout.line_at(view.scroll_y);
        let mut top = layout.block_top(line) - view.scroll_y;
        let mut bottom = top + layout.block_height(line);

        while line < layout.line_count() && top <= dirty.bottom() {
            if bottom >= dirty.top() {
                labels.push(LineLabel {
                    number: line + 1,
                    rect: Rect::new(0.0, top, self.width, view.metrics.line_height),
                });
            }
            line += 1;
            top = bottom;
            bottom = top + layout.block_height(line);
        }

        GutterPaint {
            fill: dirty,
            background: self.background,
            foreground: self.foreground,
            labels,
        }
    }
}

impl ViewListener for Gutter {
    fn on_view_event(&mut self, event: &ViewEvent, view: &ViewSnapshot<'_>) {
        let line_count = view.buffer.len_lines();
        match event {
            ViewEvent::LineCountChanged(count) => {
                self.update_width(*count, view.metrics);
            }
            ViewEvent::MetricsChanged => {
                self.update_width(line_count, view.metrics);
            }
            ViewEvent::UpdateRequest { rect, dy } => {
                self.update_request(*rect, *dy, view.viewport.local(), line_count, view.metrics);
            }
            ViewEvent::Resized(contents) => self.anchor(*contents),
            ViewEvent::ContentChanged(_) | ViewEvent::CursorMoved(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: FontMetrics = FontMetrics {
        char_width: 8.0,
        digit_width: 8.0,
        line_height: 16.0,
    };

    fn gutter(lines: usize) -> Gutter {
        Gutter::new(&GutterConfig::default(), lines, &METRICS)
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(99), 2);
        assert_eq!(digit_count(100), 3);
        assert_eq!(digit_count(1_000_000), 7);
    }

    #[test]
    fn test_width_formula() {
        assert_eq!(gutter(1).width(), 3.0 + 8.0);
        assert_eq!(gutter(0).width(), 3.0 + 8.0);
        assert_eq!(gutter(250).width(), 3.0 + 24.0);
    }

    #[test]
    fn test_width_follows_power_of_ten() {
        let mut gutter = gutter(9);
        let narrow = gutter.width();

        assert!(gutter.update_width(10, &METRICS));
        assert!(gutter.width() > narrow);
        assert!(!gutter.update_width(42, &METRICS));

        assert!(gutter.update_width(9, &METRICS));
        assert_eq!(gutter.width(), narrow);
    }

    #[test]
    fn test_scroll_vs_repaint() {
        let mut gutter = gutter(5);
        let viewport = Rect::new(0.0, 0.0, 400.0, 300.0);

        gutter.update_request(Rect::new(0.0, 0.0, 400.0, 300.0), -16.0, viewport, 5, &METRICS);
        gutter.update_request(Rect::new(0.0, 32.0, 400.0, 16.0), 0.0, viewport, 5, &METRICS);

        let damage = gutter.take_damage();
        assert_eq!(damage[0], GutterDamage::Scroll { dy: -16.0 });
        assert_eq!(damage[1], GutterDamage::Repaint(Rect::new(0.0, 32.0, 11.0, 16.0)));
        assert!(gutter.take_damage().is_empty());
    }

    #[test]
    fn test_full_viewport_request_resyncs_width() {
        let mut gutter = gutter(5);
        let viewport = Rect::new(0.0, 0.0, 400.0, 300.0);

        // A partial request never touches the width
        gutter.update_request(Rect::new(0.0, 0.0, 400.0, 16.0), 0.0, viewport, 12, &METRICS);
        assert_eq!(gutter.width(), 11.0);

        gutter.update_request(viewport, 0.0, viewport, 12, &METRICS);
        assert_eq!(gutter.width(), 19.0);
    }

    #[test]
    fn test_anchor_keeps_width() {
        let mut gutter = gutter(120);
        gutter.anchor(Rect::new(2.0, 2.0, 640.0, 480.0));

        assert_eq!(gutter.geometry(), Rect::new(2.0, 2.0, 27.0, 480.0));
    }
}
