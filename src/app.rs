use std::time::Duration;

use anyhow::Context;
use crossterm::event::Event as TermEvent;
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::settings::Settings;
use crate::core::events::{self, Event, EventSender};
use crate::core::orchestrator::{self, ReadWorker};
use crate::core::session::{self, Command, SessionState, Stage};
use crate::ui::input;
use crate::ui::renderer;
use crate::ui::view_model::ViewModel;

/// Interactive session: owns the state, runs the workers the state machine
/// asks for and feeds their results back into it.
pub struct App {
    state: SessionState,
    settings: Settings,
    spinner_frame: usize,
    scan_task: Option<JoinHandle<()>>,
    read_worker: Option<ReadWorker>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: SessionState::awaiting_path(settings.initial_input()),
            settings,
            spinner_frame: 0,
            scan_task: None,
            read_worker: None,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Initialize terminal
        terminal::enable_raw_mode().context("could not initialize terminal")?;
        let mut terminal = restore_on_error(init_terminal(), || {
            let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        })?;

        // Run main event loop
        let result = self.event_loop(&mut terminal).await;

        // Restore terminal
        terminal::disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(&mut self, terminal: &mut Term) -> anyhow::Result<()> {
        let (event_tx, mut event_rx) = events::create_event_channel();

        // Spawn a dedicated blocking thread for terminal input.
        // This sends crossterm events to the async world via an unbounded channel,
        // avoiding re-spawning spawn_blocking on every loop iteration.
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<TermEvent>();
        let _input_thread = tokio::task::spawn_blocking(move || loop {
            match input::poll_event(Duration::from_millis(50)) {
                Ok(Some(event)) => {
                    if input_tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(_) => break,
            }
        });

        // Drives the spinner
        let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

        loop {
            let view = ViewModel::from_state(&self.state);
            terminal.draw(|frame| {
                renderer::render(frame, &view, self.spinner_frame);
            })?;

            let event = tokio::select! {
                // Terminal input events
                input_event = input_rx.recv() => match input_event {
                    Some(TermEvent::Key(key)) => input::handle_key_event(key, self.state.stage()),
                    // Resize and the like: the next iteration re-renders
                    Some(_) => None,
                    None => Some(Event::Quit),
                },
                // Scan and read results, in the order the workers sent them
                worker_event = event_rx.recv() => worker_event,
                _ = tick_interval.tick() => {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                    None
                }
            };

            if let Some(event) = event {
                if !self.dispatch(event, &event_tx)? {
                    return Ok(());
                }
            }
        }
    }

    /// Applies one event and executes the resulting commands. Returns
    /// `false` once the session should end.
    fn dispatch(&mut self, event: Event, event_tx: &EventSender) -> anyhow::Result<bool> {
        let from = self.state.stage();
        let (state, commands) = session::next(std::mem::take(&mut self.state), event);
        self.state = state;
        if from != self.state.stage() {
            tracing::debug!(?from, to = ?self.state.stage(), "stage changed");
        }

        for command in commands {
            match command {
                Command::StartScan(path) => {
                    self.cancel_workers();
                    self.scan_task = Some(orchestrator::spawn_scan(
                        path,
                        self.settings.clone(),
                        event_tx.clone(),
                    ));
                }
                Command::StartRead(snapshot) => {
                    self.cancel_workers();
                    self.read_worker = Some(
                        orchestrator::spawn_read(snapshot, event_tx.clone())
                            .context("could not start read worker")?,
                    );
                }
                Command::Exit => {
                    self.cancel_workers();
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    fn cancel_workers(&mut self) {
        if let Some(handle) = self.scan_task.take() {
            handle.abort();
        }
        if let Some(worker) = self.read_worker.take() {
            worker.cancel();
        }
    }
}

type Term = Terminal<CrosstermBackend<std::io::Stdout>>;

fn init_terminal() -> anyhow::Result<Term> {
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("could not initialize terminal")?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("could not initialize terminal")?;
    terminal.clear()?;
    Ok(terminal)
}

/// Runs `restore` when `result` is an error, then passes `result` through.
fn restore_on_error<T>(result: anyhow::Result<T>, restore: impl FnOnce()) -> anyhow::Result<T> {
    if result.is_err() {
        restore();
    }
    result
}
