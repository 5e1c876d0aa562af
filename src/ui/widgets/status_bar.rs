use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::ui::view_model::KeyHint;

/// Bottom line listing the keys the current stage accepts.
pub struct StatusBar {
    pub hints: &'static [KeyHint],
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 10 {
            return;
        }

        let mut spans = Vec::new();
        for (i, hint) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
            } else {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(hint.key, Style::default().fg(Color::Yellow)));
            spans.push(Span::styled(
                format!(" {}", hint.action),
                Style::default().fg(Color::DarkGray),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
