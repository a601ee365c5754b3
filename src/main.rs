pub mod app_dirs;
pub mod config;
pub mod report;
pub mod runtime;
pub mod trial;
pub mod ui;
pub mod util;

use crate::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    report::Report,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    trial::{Region, Trial},
    util::sanitize_filename,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const TICK_RATE_MS: u64 = 200;

/// open field test scoring tui with live region timers and exportable reports
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal scorer for open field tests: run a countdown session, hold region keys while the subject occupies the corner, lateral, or center area, and export a per-region time report."
)]
pub struct Cli {
    /// subject (animal) id for the session
    #[clap(short = 'i', long)]
    subject_id: Option<String>,

    /// planned session duration in seconds
    #[clap(short = 's', long)]
    duration_secs: Option<usize>,

    /// directory reports are exported into
    #[clap(long)]
    report_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Setup,
    Running,
    Report,
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub trial: Trial,
    pub report: Option<Report>,
    pub state: AppState,
    pub subject_input: String,
    pub duration_input: usize,
    pub status: Option<String>,
}

impl App {
    pub fn new(cli: Cli, config: Config) -> Self {
        let subject_input = cli
            .subject_id
            .clone()
            .or(config.subject_id)
            .unwrap_or_default();
        let duration_input = cli.duration_secs.unwrap_or(config.duration_secs);

        Self {
            cli: Some(cli),
            trial: Trial::new(),
            report: None,
            state: AppState::Setup,
            subject_input,
            duration_input,
            status: None,
        }
    }

    /// Clears the finished session and returns to the setup screen with the
    /// entered subject and duration intact.
    pub fn reset(&mut self) {
        self.trial = Trial::new();
        self.report = None;
        self.state = AppState::Setup;
        self.status = None;
    }

    pub fn start_session(&mut self) {
        match self.trial.start(&self.subject_input, self.duration_input) {
            Ok(()) => {
                self.state = AppState::Running;
                self.status = None;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Running {
            self.trial.on_tick();
            if self.trial.has_finished() {
                self.finish_session();
            }
        }
    }

    /// Hands the finished (or stopping) session to the report screen.
    pub fn finish_session(&mut self) {
        match Report::generate(&self.trial) {
            Ok(report) => {
                self.report = Some(report);
                self.state = AppState::Report;
                self.status = Some(if self.trial.was_manual_stop() {
                    String::from("Session stopped early")
                } else {
                    String::from("Time elapsed, session complete")
                });
            }
            Err(err) => {
                self.state = AppState::Setup;
                self.status = Some(err.to_string());
            }
        }
    }

    pub fn export_report(&mut self) {
        let Some(report) = &self.report else {
            return;
        };

        let dir = self
            .cli
            .as_ref()
            .and_then(|cli| cli.report_dir.clone())
            .or_else(AppDirs::report_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let filename = format!(
            "openfield_{}_{}.txt",
            sanitize_filename(&report.subject_id),
            report.generated_at.format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);

        let result = std::fs::create_dir_all(&dir).and_then(|_| report.export(&path));
        self.status = Some(match result {
            Ok(()) => format!("Report exported to {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        });
    }

    /// Applies one key event. Returns true when the app should exit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.state {
            AppState::Setup => match key.code {
                KeyCode::Esc => return true,
                KeyCode::Enter => self.start_session(),
                KeyCode::Backspace => {
                    self.subject_input.pop();
                }
                KeyCode::Up => self.duration_input = self.duration_input.saturating_add(10),
                KeyCode::Down => self.duration_input = self.duration_input.saturating_sub(10),
                KeyCode::Char(c) => self.subject_input.push(c),
                _ => {}
            },
            AppState::Running => match key.code {
                KeyCode::Char('1') => self.trial.press(Region::Corner),
                KeyCode::Char('2') => self.trial.press(Region::Lateral),
                KeyCode::Char('3') => self.trial.press(Region::Center),
                KeyCode::Char(' ') => {
                    if let Some(region) = self.trial.snapshot().pressed_region() {
                        self.trial.release(region);
                    }
                }
                KeyCode::Char('s') | KeyCode::Esc => {
                    self.trial.stop(true);
                    self.finish_session();
                }
                _ => {}
            },
            AppState::Report => match key.code {
                KeyCode::Char('e') => self.export_report(),
                KeyCode::Char('r') => self.reset(),
                KeyCode::Char('q') | KeyCode::Esc => return true,
                _ => {}
            },
        }
        false
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = store.load();

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli, config);
    let result = run_app(&mut terminal, &mut app, &store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &dyn ConfigStore,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                let was_setup = app.state == AppState::Setup;
                if app.on_key(key) {
                    break;
                }
                // Remember the last session parameters that actually started.
                if was_setup && app.state == AppState::Running {
                    let _ = store.save(&Config {
                        subject_id: Some(app.trial.subject_id().to_string()),
                        duration_secs: app.trial.planned_secs(),
                    });
                }
            }
        }
    }

    Ok(())
}
