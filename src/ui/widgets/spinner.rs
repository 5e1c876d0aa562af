use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Span,
    widgets::Widget,
};

const FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// One-cell activity indicator; `frame` advances on every UI tick.
pub struct Spinner {
    pub frame: usize,
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 1 || area.height < 1 {
            return;
        }
        let span = Span::styled(
            FRAMES[self.frame % FRAMES.len()],
            Style::default().fg(Color::Magenta),
        );
        buf.set_span(area.x, area.y, &span, area.width);
    }
}
