//! Terminal rendering for `codepad view`.
//!
//! The editor view decides which labels the gutter paints and which runs
//! are styled; this module only turns those into rows of text and writes
//! them with ANSI colors.

use std::io::Write;

use codepad_core::EditorView;
use codepad_core::geometry::Rect;
use codepad_core::view::{digit_count, display_width};
use codepad_syntax::{Color, FontWeight, HighlightSpan, Style};
use crossterm::queue;
use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};

/// One terminal row: a gutter label (first row of a line only) and
/// styled text segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub number: Option<usize>,
    pub segments: Vec<(String, Option<Style>)>,
}

impl Row {
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|(text, _)| text.as_str()).collect()
    }
}

/// Sizes the view so every line is laid out: `columns` text columns when
/// wrapping, unbounded otherwise.
pub fn fit_view(view: &mut EditorView, columns: Option<usize>) {
    let metrics = *view.metrics();
    let margin = view.gutter().width();
    // Half a column of slack so the view's floor() lands on `cols`
    let width = columns.map_or(margin, |cols| margin + (cols as f32 + 0.5) * metrics.char_width);

    view.resize(Rect::new(0.0, 0.0, width, metrics.line_height));
    let height = view.layout().document_height();
    view.resize(Rect::new(0.0, 0.0, width, height));
}

/// Lays out every line of the view as terminal rows, one row per visual
/// row of the view's block layout.
pub fn rows(view: &EditorView) -> Vec<Row> {
    let gutter = view.gutter().geometry();
    let paint = view.paint_gutter(Rect::new(0.0, 0.0, gutter.width, view.viewport().height));
    let layout = view.layout();

    let mut rows = Vec::new();
    for label in &paint.labels {
        let line = label.number - 1;
        let text = view.buffer().line_text(line).unwrap_or_default();
        let spans = view.line_spans(line);

        let mut wrapped = wrap_line(&text, &spans, layout.tab_stop(), layout.wrap_columns());
        wrapped.resize_with(layout.block_rows(line).max(wrapped.len()), Vec::new);
        for (i, segments) in wrapped.into_iter().enumerate() {
            rows.push(Row {
                number: (i == 0).then_some(label.number),
                segments,
            });
        }
    }
    rows
}

/// Expands tabs and splits one line into rows of `wrap` columns.
///
/// Columns are counted from the start of the line, as the block layout
/// counts them: a cell lands on the row holding its last column, so a line
/// of width `w` takes `w.div_ceil(wrap)` rows.
fn wrap_line(
    text: &str,
    spans: &[HighlightSpan],
    tab_stop: usize,
    wrap: Option<usize>,
) -> Vec<Vec<(String, Option<Style>)>> {
    let tab_stop = tab_stop.max(1);
    let wrap = wrap.map(|cols| cols.max(1));
    let mut rows: Vec<Vec<(String, Option<Style>)>> = vec![Vec::new()];
    let mut column = 0;

    for (idx, c) in text.chars().enumerate() {
        let style = spans
            .iter()
            .find(|s| s.start <= idx && idx < s.end())
            .map(|s| s.style);
        let cells = if c == '\t' {
            vec![(' ', 1); tab_stop - column % tab_stop]
        } else {
            vec![(c, display_width(c.encode_utf8(&mut [0; 4]), tab_stop))]
        };

        for (cell, width) in cells {
            column += width;
            if let Some(cols) = wrap {
                let row = column.saturating_sub(1) / cols;
                while rows.len() <= row {
                    rows.push(Vec::new());
                }
            }
            let Some(row) = rows.last_mut() else { continue };
            match row.last_mut() {
                Some((run, run_style)) if *run_style == style => run.push(cell),
                _ => row.push((cell.to_string(), style)),
            }
        }
    }
    rows
}

/// Writes rows with a colored gutter.
pub fn print_rows(
    out: &mut impl Write,
    rows: &[Row],
    line_count: usize,
    gutter_bg: Color,
    gutter_fg: Color,
) -> std::io::Result<()> {
    let digits = digit_count(line_count);
    for row in rows {
        let label = row.number.map(|n| n.to_string()).unwrap_or_default();
        queue!(
            out,
            SetBackgroundColor(term_color(gutter_bg)),
            SetForegroundColor(term_color(gutter_fg)),
            Print(format!(" {label:>digits$} ")),
            ResetColor,
            Print(" "),
        )?;
        for (text, style) in &row.segments {
            match style {
                Some(style) => {
                    queue!(out, SetForegroundColor(term_color(style.color)))?;
                    if style.weight == FontWeight::Bold {
                        queue!(out, SetAttribute(Attribute::Bold))?;
                    }
                    if style.italic {
                        queue!(out, SetAttribute(Attribute::Italic))?;
                    }
                    queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
                }
                None => queue!(out, Print(text))?,
            }
        }
        queue!(out, Print("\n"))?;
    }
    out.flush()
}

fn term_color(color: Color) -> crossterm::style::Color {
    crossterm::style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_core::view::{Font, ViewSettings};
    use codepad_syntax::{HighlightSettings, Language};

    fn view(text: &str) -> EditorView {
        let engine = Language::Python
            .engine(&HighlightSettings::default())
            .unwrap();
        EditorView::new(text, engine, Font::default(), ViewSettings::default())
    }

    #[test]
    fn test_rows_number_every_line() {
        let mut view = view("a = 1\nb = 2\n");
        fit_view(&mut view, None);

        let rows = rows(&view);
        let numbers: Vec<_> = rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(rows[1].plain_text(), "b = 2");
    }

    #[test]
    fn test_wrapped_rows_are_unnumbered() {
        let mut view = view("abcdefghij\nx\n");
        fit_view(&mut view, Some(4));

        let rows = rows(&view);
        let text: Vec<_> = rows.iter().map(Row::plain_text).collect();
        assert_eq!(text, vec!["abcd", "efgh", "ij", "x", ""]);
        assert_eq!(rows[1].number, None);
        assert_eq!(rows[3].number, Some(2));
    }

    #[test]
    fn test_keyword_segment_is_styled() {
        let mut view = view("class Foo: pass");
        fit_view(&mut view, None);

        let rows = rows(&view);
        let styled: Vec<_> = rows[0]
            .segments
            .iter()
            .filter(|(_, style)| style.is_some())
            .map(|(text, _)| text.as_str())
            .collect();
        assert_eq!(styled, vec!["class", "pass"]);
    }

    #[test]
    fn test_rows_follow_block_layout() {
        let mut view = view("ab日本cd\nabc\tx\n\t\t\n");
        fit_view(&mut view, Some(3));

        let rows = rows(&view);
        let layout = view.layout();
        let expected: usize = (0..layout.line_count()).map(|l| layout.block_rows(l)).sum();
        assert_eq!(rows.len(), expected);

        let text: Vec<_> = rows.iter().map(Row::plain_text).collect();
        assert_eq!(&text[..3], ["ab", "日本", "cd"]);
    }

    #[test]
    fn test_tabs_expand_to_stops() {
        let rows = wrap_line("\tx\ty", &[], 4, None);
        let text: String = rows[0].iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(text, "    x   y");
    }

    #[test]
    fn test_print_rows_writes_labels() {
        let rows = vec![Row {
            number: Some(7),
            segments: vec![("pass".to_string(), None)],
        }];
        let mut out = Vec::new();
        print_rows(&mut out, &rows, 10, Color::LIGHT_GRAY, Color::BLACK).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("  7 "));
        assert!(text.ends_with("pass\n"));
    }
}
