use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::models::size::format_number;

pub struct ReadProgressBar {
    pub files_read: u64,
    pub files_total: u64,
    pub errors: u64,
    pub ratio: f64,
}

impl Widget for ReadProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 20 {
            return;
        }

        // Line 1: bar + percentage
        let label = format!(" {:>3.0}%", self.ratio * 100.0);
        let bar_width = (area.width as usize).saturating_sub(label.len());
        let filled = ((bar_width as f64) * self.ratio).round() as usize;
        let bar_line = Line::from(vec![
            Span::styled("█".repeat(filled), Style::default().fg(Color::Magenta)),
            Span::styled(
                "░".repeat(bar_width - filled),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(label, Style::default().fg(Color::White)),
        ]);
        buf.set_line(area.x, area.y, &bar_line, area.width);

        // Line 2: counters
        if area.height >= 2 {
            let mut spans = vec![Span::styled(
                format!(
                    "Read: {} / {} files",
                    format_number(self.files_read),
                    format_number(self.files_total),
                ),
                Style::default().fg(Color::White),
            )];
            if self.errors > 0 {
                spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
                spans.push(Span::styled(
                    format!("{} errors", self.errors),
                    Style::default().fg(Color::Red),
                ));
            }
            buf.set_line(area.x, area.y + 1, &Line::from(spans), area.width);
        }
    }
}

/// Shortens `text` to `max_width` columns by cutting out its middle.
pub fn truncate_middle(text: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthStr;
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width < 6 {
        return "...".to_string();
    }
    // Show start and end of the text
    let keep = max_width - 3; // for "..."
    let tail_len = keep / 2;
    let head_len = keep - tail_len;

    // Find char boundary for head
    let mut w = 0;
    let head_end = text
        .char_indices()
        .find(|&(_, c)| {
            w += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            w > head_len
        })
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    // Find char boundary for tail
    w = 0;
    let tail_start = text
        .char_indices()
        .rev()
        .find(|&(_, c)| {
            w += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            w > tail_len
        })
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);

    format!("{}...{}", &text[..head_end], &text[tail_start..])
}
