//! Clickable building blocks. Each one renders and registers its own click
//! targets so the two can never drift apart.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── ButtonRow ──────────────────────────────────────────────────

/// A single row of labelled buttons, e.g. `[S] Save │ [L] Logout`.
///
/// Each button's click target spans its label plus half of each adjoining
/// separator; the first and last buttons extend to the row edges.
pub struct ButtonRow<'a> {
    buttons: Vec<(String, Style, u16)>,
    separator: &'a str,
    block: Option<Block<'a>>,
}

impl<'a> ButtonRow<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            buttons: Vec::new(),
            separator,
            block: None,
        }
    }

    pub fn button(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.buttons.push((label.into(), style, action_id));
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let sep_width = Line::from(self.separator).width() as u16;
        let mut spans: Vec<Span> = Vec::new();
        let mut widths: Vec<(u16, u16)> = Vec::new();
        for (i, (label, style, action_id)) in self.buttons.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(self.separator, Style::default().fg(Color::DarkGray)));
            }
            let padded = format!(" {label} ");
            widths.push((Line::from(padded.as_str()).width() as u16, action_id));
            spans.push(Span::styled(padded, style));
        }

        let inner = self.block.as_ref().map_or(area, |b| b.inner(area));
        let mut paragraph = Paragraph::new(Line::from(spans));
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        f.render_widget(paragraph, area);

        for (rect, action_id) in button_spans(&widths, sep_width, inner.x, inner.width) {
            cs.add_click_target(Rect::new(rect.0, area.y, rect.1, area.height.max(1)), action_id);
        }
    }
}

/// Horizontal `(x, width)` extents for buttons laid out left to right.
fn button_spans(widths: &[(u16, u16)], sep: u16, x: u16, total: u16) -> Vec<((u16, u16), u16)> {
    let n = widths.len();
    if n == 0 || total == 0 {
        return Vec::new();
    }
    let mut starts = Vec::with_capacity(n);
    let mut cursor = 0u16;
    for (i, &(w, _)) in widths.iter().enumerate() {
        if i > 0 {
            cursor += sep;
        }
        starts.push(cursor);
        cursor += w;
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let left = if i == 0 { 0 } else { starts[i] - sep / 2 - sep % 2 };
        let right = if i == n - 1 {
            total
        } else {
            starts[i] + widths[i].0 + sep / 2
        };
        let left = left.min(total);
        let width = right.min(total).saturating_sub(left);
        if width > 0 {
            out.push(((x + left, width), widths[i].1));
        }
    }
    out
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines for a paragraph, some of them bound to actions. Targets follow
/// their line wherever it ends up.
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len() as u16, action_id));
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register one full-width row target per clickable line. `top` and
    /// `bottom` are the border rows around the content; lines are assumed
    /// not to wrap.
    pub fn register_targets(&self, area: Rect, cs: &mut ClickState, top: u16, bottom: u16) {
        let first_row = area.y + top;
        let end = area.y + area.height.saturating_sub(bottom);
        for &(idx, action_id) in &self.actions {
            let row = first_row + idx;
            if row < end {
                cs.add_row_target(area, row, action_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_spans_cover_row_without_gaps() {
        // " Save " (6) + " │ " (3) + " Logout " (8)
        let spans = button_spans(&[(6, 1), (8, 2)], 3, 0, 40);
        assert_eq!(spans, vec![((0, 7), 1), ((7, 33), 2)]);
    }

    #[test]
    fn button_spans_respect_offset() {
        let spans = button_spans(&[(5, 10), (5, 11), (5, 12)], 1, 4, 30);
        assert_eq!(spans[0], ((4, 5), 10));
        assert_eq!(spans[1].0 .0, 4 + 5);
        assert_eq!(spans[2].0 .0 + spans[2].0 .1, 4 + 30);
    }

    #[test]
    fn button_spans_empty() {
        assert!(button_spans(&[], 3, 0, 40).is_empty());
        assert!(button_spans(&[(5, 1)], 3, 0, 0).is_empty());
    }

    #[test]
    fn clickable_rows_skip_plain_lines() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("Shop"));
        cl.push_clickable(Line::from("[1] Cursor"), 100);
        cl.push_clickable(Line::from("[2] Grandma"), 101);
        assert_eq!(cl.len(), 3);

        let mut cs = ClickState::new();
        cl.register_targets(Rect::new(0, 5, 40, 10), &mut cs, 1, 1);
        assert_eq!(cs.hit_test(3, 6), None);
        assert_eq!(cs.hit_test(3, 7), Some(100));
        assert_eq!(cs.hit_test(3, 8), Some(101));
    }

    #[test]
    fn clickable_rows_clipped_by_border() {
        let mut cl = ClickableList::new();
        for i in 0..10 {
            cl.push_clickable(Line::from(format!("row {i}")), i);
        }
        let mut cs = ClickState::new();
        cl.register_targets(Rect::new(0, 0, 20, 4), &mut cs, 1, 1);
        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(0, 3), None);
    }
}
