mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use placeguess::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, PersistFailures, UntimedRounds},
    logging::init_file_logging,
    places::Places,
    runtime::{Clock, CrosstermInput, GameAction, GameEvent, InputSource, Runner, TICK_RATE},
    session::FormFields,
    store::{open_store, SessionStore, StoreBackend},
    view::TextView,
    ControllerOptions, SessionController,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{debug, info};

/// terminal place-name guessing game
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Pick a start letter and an optional time limit, then name as many places beginning with that letter as you can. Progress is saved, so a round survives a restart."
)]
pub struct Cli {
    /// letter every place must start with (prefills the setup field)
    #[clap(short = 'l', long)]
    start_letter: Option<String>,

    /// seconds per round, 0 for untimed (prefills the setup field)
    #[clap(short = 's', long)]
    time_limit: Option<u32>,

    /// built-in place list to play with
    #[clap(short = 'd', long)]
    dataset: Option<String>,

    /// play with your own place list (.json or .csv)
    #[clap(short = 'p', long)]
    places: Option<PathBuf>,

    /// where progress is saved
    #[clap(long, value_enum)]
    store: Option<StoreBackend>,

    /// path of the save file (defaults to the state directory)
    #[clap(long)]
    state_file: Option<PathBuf>,

    /// whether an untimed round stays open after the first guess
    #[clap(long, value_enum)]
    untimed_rounds: Option<UntimedRounds>,

    /// whether failed saves are shown in the message line or only logged
    #[clap(long, value_enum)]
    persist_failures: Option<PersistFailures>,

    /// number of places shown by the sample key
    #[clap(long)]
    sample_size: Option<usize>,

    /// log file (defaults to the state directory)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// list the built-in place lists and exit
    #[clap(long)]
    list_datasets: bool,
}

impl Cli {
    /// Command line flags override the config file
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(letter) = &self.start_letter {
            cfg.start_letter = letter.clone();
        }
        if let Some(secs) = self.time_limit {
            cfg.time_limit_secs = secs;
        }
        if let Some(dataset) = &self.dataset {
            cfg.dataset = dataset.clone();
        }
        if let Some(places) = &self.places {
            cfg.places_file = Some(places.clone());
        }
        if let Some(store) = self.store {
            cfg.store = store;
        }
        if let Some(path) = &self.state_file {
            cfg.state_file = Some(path.clone());
        }
        if let Some(untimed) = self.untimed_rounds {
            cfg.untimed_rounds = untimed;
        }
        if let Some(policy) = self.persist_failures {
            cfg.persist_failures = policy;
        }
        if let Some(n) = self.sample_size {
            cfg.sample_size = n;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    StartLetter,
    TimeLimit,
    Guess,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::StartLetter => Focus::TimeLimit,
            Focus::TimeLimit => Focus::Guess,
            Focus::Guess => Focus::StartLetter,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::StartLetter => Focus::Guess,
            Focus::TimeLimit => Focus::StartLetter,
            Focus::Guess => Focus::TimeLimit,
        }
    }
}

pub struct App {
    pub controller: SessionController<TextView, Box<dyn SessionStore>>,
    pub focus: Focus,
    pub message_timeout: Duration,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config, store: Box<dyn SessionStore>) -> Self {
        let form = FormFields {
            start_letter: config.start_letter.clone(),
            time_limit: match config.time_limit_secs {
                0 => String::new(),
                secs => secs.to_string(),
            },
        };

        Self {
            controller: SessionController::new(
                TextView::new(form),
                store,
                ControllerOptions::from(config),
            ),
            focus: Focus::StartLetter,
            message_timeout: config.message_timeout(),
            should_quit: false,
        }
    }

    /// Resumed rounds land straight in the guess field
    pub fn settle_focus(&mut self) {
        if self.controller.state().is_active {
            self.focus = Focus::Guess;
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.controller.poll_timer(now);
        self.controller
            .view_mut()
            .expire_message(now, self.message_timeout);
    }

    pub fn on_action(&mut self, action: GameAction) {
        match action {
            GameAction::Quit => self.should_quit = true,
            GameAction::Start => self.start(),
            GameAction::Reset => self.controller.reset_game(),
            GameAction::Sample => {
                if let Err(e) = self.controller.sample_from_form() {
                    debug!(error = %e, "no sample shown");
                }
            }
            GameAction::ToggleHint => self.controller.view_mut().toggle_hint(),
            GameAction::NextField => self.focus = self.focus.next(),
            GameAction::PrevField => self.focus = self.focus.prev(),
            GameAction::Submit => match self.focus {
                Focus::Guess => {
                    let raw = self.controller.view().guess_input.clone();
                    self.controller.check_guess(&raw);
                }
                Focus::StartLetter | Focus::TimeLimit => self.start(),
            },
            GameAction::DeleteChar => {
                self.focused_field().pop();
            }
            GameAction::Type(c) => {
                if self.focus == Focus::TimeLimit && !c.is_ascii_digit() {
                    return;
                }
                self.focused_field().push(c);
            }
        }
    }

    fn start(&mut self) {
        match self.controller.start_from_form() {
            Ok(()) => self.focus = Focus::Guess,
            Err(e) => debug!(error = %e, "round not started"),
        }
    }

    fn focused_field(&mut self) -> &mut String {
        let view = self.controller.view_mut();
        match self.focus {
            Focus::StartLetter => &mut view.form.start_letter,
            Focus::TimeLimit => &mut view.form.time_limit,
            Focus::Guess => &mut view.guess_input,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_datasets {
        for name in Places::embedded_datasets() {
            println!("{name}");
        }
        return Ok(());
    }

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(e) = init_file_logging(&path) {
            eprintln!("logging disabled: {}: {e}", path.display());
        }
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply_to(&mut config);
    if cli.save_config {
        config_store.save(&config)?;
        info!(path = %config_store.path().display(), "config saved");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = open_store(config.store, config.state_path().as_deref())?;
    let mut app = App::new(&config, store);
    app.controller.load_reference_data(&config.place_source())?;
    app.settle_focus();

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermInput::new(), TICK_RATE);
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, I: InputSource, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<I, C>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            GameEvent::Tick(now) => app.on_tick(now),
            GameEvent::Resize => {}
            GameEvent::Action(action) => app.on_action(action),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
