mod ui;

use std::{error::Error, io, path::PathBuf};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keystride::{
    audio::AudioHandle,
    config::{ConfigStore, FileConfigStore, Settings, SettingsOverride},
    corpus::{CorpusGenerator, FixedText, TextMode, TextSource},
    logging,
    runtime::{AppEvent, CrosstermEventSource, Runner},
    store::{MemoryResultStore, ResultStore, SqliteResultStore},
    Session, SessionState,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use ui::history::HistoryData;

/// typing speed test with live wpm and local history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing speed test. Type the prompt before the clock runs out; results are kept locally for history and analytics."
)]
pub struct Cli {
    /// time limit in seconds
    #[clap(short = 't', long = "time")]
    time_limit_secs: Option<u32>,

    /// where the prompt text comes from
    #[clap(short = 'm', long = "mode", value_enum)]
    text_mode: Option<TextMode>,

    /// custom prompt to use instead of generated text
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// disable the terminal bell cues
    #[clap(long)]
    mute: bool,

    /// remember the given options as the new defaults
    #[clap(long)]
    save: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// print statistics for past sessions
    History {
        /// how many recent sessions to list
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// write every past session to a csv file
    Export { path: PathBuf },
    /// delete all stored sessions
    Clear,
}

impl Cli {
    fn overrides(&self) -> SettingsOverride {
        SettingsOverride {
            time_limit_secs: self.time_limit_secs,
            text_mode: self.text_mode,
            sound_enabled: self.mute.then_some(false),
        }
    }

    fn text_source(&self) -> Box<dyn TextSource> {
        match &self.prompt {
            Some(prompt) => Box::new(FixedText(prompt.clone())),
            None => Box::new(CorpusGenerator::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppScreen {
    Typing,
    Results,
    History,
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub screen: AppScreen,
    /// Read from the store when the history screen opens
    pub history: Option<Result<HistoryData, String>>,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            screen: AppScreen::Typing,
            history: None,
        }
    }

    pub fn show_history(&mut self) {
        let loaded = HistoryData::load(self.session.store()).map_err(|e| {
            log::warn!("unable to read history: {e}");
            e.to_string()
        });
        self.history = Some(loaded);
        self.screen = AppScreen::History;
    }

    fn leave_history(&mut self, to: AppScreen) {
        self.history = None;
        self.screen = to;
    }

    /// Moves to the results once the session has ended on its own
    pub fn sync_screen(&mut self) {
        if self.screen == AppScreen::Typing && self.session.state() == SessionState::Complete {
            self.screen = AppScreen::Results;
        }
    }

    fn restart(&mut self) {
        self.session.restart();
        self.leave_history(AppScreen::Typing);
    }

    fn retry(&mut self) {
        self.session.retry();
        self.leave_history(AppScreen::Typing);
    }

    /// Returns false when the app should exit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if ctrl => return false,
            _ => {}
        }

        match self.screen {
            AppScreen::Typing => match key.code {
                KeyCode::Tab => self.restart(),
                KeyCode::Char('p') if ctrl => {
                    self.session.toggle_pause();
                }
                KeyCode::Char('r') if ctrl => self.retry(),
                KeyCode::Backspace => {
                    self.session.backspace();
                }
                KeyCode::Char(c) if !ctrl => {
                    if self.session.state() == SessionState::Paused {
                        self.session.resume();
                    }
                    self.session.type_char(c);
                }
                _ => {}
            },
            AppScreen::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Tab => self.restart(),
                KeyCode::Char('a') => self.retry(),
                KeyCode::Char('h') => self.show_history(),
                _ => {}
            },
            AppScreen::History => match key.code {
                KeyCode::Char('b') | KeyCode::Backspace => {
                    let back = if self.session.state() == SessionState::Complete {
                        AppScreen::Results
                    } else {
                        AppScreen::Typing
                    };
                    self.leave_history(back);
                }
                KeyCode::Char('r') | KeyCode::Tab => self.restart(),
                _ => {}
            },
        }

        self.sync_screen();
        true
    }
}

fn open_store() -> Box<dyn ResultStore> {
    match SqliteResultStore::open_default() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("history unavailable, keeping results in memory: {e}");
            Box::new(MemoryResultStore::new())
        }
    }
}

fn run_command(command: &Command, store: &mut dyn ResultStore) -> Result<(), Box<dyn Error>> {
    match command {
        Command::History { limit } => {
            let stats = store.statistics()?;
            println!(
                "{} tests   {:.1} avg wpm   {} best wpm   {:.1}% avg acc   {:.2} sd   {:.0}s typed",
                stats.total_tests,
                stats.average_wpm,
                stats.best_wpm,
                stats.average_accuracy,
                stats.wpm_std_dev,
                stats.total_time_secs
            );
            for stored in store.recent(*limit)? {
                let r = &stored.result;
                println!(
                    "{}  {:>3} wpm  {:>3} net  {:>5.1}%  {:>3}s  {}",
                    r.timestamp.format("%Y-%m-%d %H:%M"),
                    r.wpm,
                    r.net_wpm,
                    r.accuracy,
                    r.time_limit,
                    r.text_mode
                );
            }
            let ranking = store.mistake_ranking(5)?;
            if !ranking.is_empty() {
                println!("most frequent mistakes: {}", ui::format_mistakes(&ranking));
            }
        }
        Command::Export { path } => {
            let count = store.export_csv(path)?;
            println!("exported {count} sessions to {}", path.display());
        }
        Command::Clear => {
            store.clear()?;
            println!("history cleared");
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init();

    let config_store = FileConfigStore::new();
    let settings: Settings = config_store.load().with(&cli.overrides());
    if cli.save {
        config_store.save(&settings)?;
    }

    let mut store = open_store();
    if let Some(command) = &cli.command {
        return run_command(command, store.as_mut());
    }

    if !io::stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let session = Session::new(
        settings,
        cli.text_source(),
        store,
        AudioHandle::terminal_bell(settings.sound_enabled),
    );
    let mut app = App::new(session);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);
    app.session.teardown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), app.session.tick_interval());
    app.session.start();

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            AppEvent::Tick => {
                if let Some(token) = app.session.timer_token() {
                    app.session.tick(token);
                }
                app.sync_screen();
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
            }
        }
    }

    Ok(())
}
