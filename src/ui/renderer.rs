use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::core::session::Stage;
use crate::models::size::human_readable_size;
use crate::ui::view_model::{ProgressLine, ViewModel};
use crate::ui::widgets::progress_bar::{truncate_middle, ReadProgressBar};
use crate::ui::widgets::spinner::Spinner;
use crate::ui::widgets::status_bar::StatusBar;

pub fn render(frame: &mut Frame, view: &ViewModel, spinner_frame: usize) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(5),    // stage body
            Constraint::Length(1), // key hints
        ])
        .split(area);

    render_title(frame, chunks[0], view.stage);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let body = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    match view.stage {
        Stage::AwaitingPath => render_prompt(frame, body, view),
        Stage::Scanning => render_busy(frame, body, view, spinner_frame),
        Stage::ReadyToConfirm => render_summary(frame, body, view),
        Stage::Reading => render_reading(frame, body, view, spinner_frame),
        Stage::Done => render_done(frame, body, view),
        Stage::Failed => render_error(frame, body, view),
        Stage::Exited => {}
    }

    frame.render_widget(StatusBar { hints: view.hints }, chunks[2]);
}

fn render_title(frame: &mut Frame, area: Rect, stage: Stage) {
    let subtitle = match stage {
        Stage::AwaitingPath => "choose a directory",
        Stage::Scanning => "scanning",
        Stage::ReadyToConfirm => "ready",
        Stage::Reading => "reading",
        Stage::Done => "done",
        Stage::Failed => "failed",
        Stage::Exited => "exiting",
    };
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " cachewarm ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" - {} ", subtitle), Style::default().fg(Color::White)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(title, area);
}

fn render_prompt(frame: &mut Frame, area: Rect, view: &ViewModel) {
    let input = view.input.as_deref().unwrap_or_default();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled("Enter directory:", Style::default().fg(Color::White))),
        chunks[0],
    );

    let field = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = field.inner(chunks[1]);
    let visible = truncate_start(input, inner.width.saturating_sub(3) as usize);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Magenta)),
            Span::raw(visible.clone()),
        ]))
        .block(field),
        chunks[1],
    );

    use unicode_width::UnicodeWidthStr;
    let cursor_x = inner.x + 2 + visible.width() as u16;
    frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
}

fn render_busy(frame: &mut Frame, area: Rect, view: &ViewModel, spinner_frame: usize) {
    if area.height < 1 || area.width < 3 {
        return;
    }
    if view.spinner_active {
        frame.render_widget(Spinner { frame: spinner_frame }, Rect { width: 1, height: 1, ..area });
    }
    if let Some(status) = &view.status {
        let text_area = Rect {
            x: area.x + 2,
            width: area.width - 2,
            height: 1,
            ..area
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                truncate_middle(status, text_area.width as usize),
                Style::default().fg(Color::White),
            )),
            text_area,
        );
    }
}

fn render_summary(frame: &mut Frame, area: Rect, view: &ViewModel) {
    let Some(summary) = &view.summary else {
        return;
    };
    let lines = vec![
        Line::from(vec![
            Span::raw("Found "),
            Span::styled(
                summary.file_count.to_string(),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" files in '"),
            Span::styled(summary.root_path.clone(), Style::default().fg(Color::Green)),
            Span::raw("'."),
        ]),
        Line::from(summary.size_line()),
        Line::from(""),
        Line::from(Span::styled(
            "Press enter to read every file.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_reading(frame: &mut Frame, area: Rect, view: &ViewModel, spinner_frame: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // spinner + status
            Constraint::Length(1),
            Constraint::Length(2), // progress bar
            Constraint::Length(1),
            Constraint::Min(1), // recent files
        ])
        .split(area);

    render_busy(frame, chunks[0], view, spinner_frame);

    let Some(progress) = &view.progress else {
        return;
    };
    frame.render_widget(
        ReadProgressBar {
            files_read: progress.files_read,
            files_total: progress.files_total,
            errors: progress.errors,
            ratio: progress.ratio(),
        },
        chunks[2],
    );

    let width = chunks[4].width as usize;
    let lines: Vec<Line> = progress
        .lines
        .iter()
        .map(|line| progress_line(line, width))
        .collect();
    frame.render_widget(Paragraph::new(lines), chunks[4]);
}

fn progress_line(line: &ProgressLine, width: usize) -> Line<'static> {
    if line.is_error {
        return Line::from(Span::styled(
            truncate_middle(&line.text, width),
            Style::default().fg(Color::Red),
        ));
    }
    let rate = line
        .throughput
        .map(|bps| format!("  {}/s", human_readable_size(bps as u64)))
        .unwrap_or_default();
    Line::from(vec![
        Span::styled(
            truncate_middle(&line.text, width.saturating_sub(rate.len())),
            Style::default().fg(Color::White),
        ),
        Span::styled(rate, Style::default().fg(Color::DarkGray)),
    ])
}

fn render_done(frame: &mut Frame, area: Rect, view: &ViewModel) {
    let Some(done) = &view.done else {
        return;
    };
    let lines = vec![
        Line::from(Span::styled(
            done.message(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(done.details(), Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_error(frame: &mut Frame, area: Rect, view: &ViewModel) {
    let Some(error) = &view.error else {
        return;
    };
    let text = Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red)))
        .wrap(Wrap { trim: false });
    frame.render_widget(text, area);
}

/// Keeps the end of `text`, which is where the user is typing.
fn truncate_start(text: &str, max_width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut w = 0;
    let mut kept: Vec<char> = text
        .chars()
        .rev()
        .take_while(|&c| {
            w += c.width().unwrap_or(0);
            w <= max_width
        })
        .collect();
    kept.reverse();
    kept.into_iter().collect()
}
