//! Main-loop plumbing: terminal input, key bindings and the clock that
//! feeds the round countdown.

use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// How often the loop wakes up to poll the countdown
pub const TICK_RATE: Duration = Duration::from_millis(100);

/// Raw input as read from the terminal
#[derive(Clone, Debug)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize,
}

/// What a key press asks the game to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameAction {
    Quit,
    Start,
    Reset,
    Sample,
    ToggleHint,
    NextField,
    PrevField,
    /// Enter: submit the guess field, or start from the setup fields
    Submit,
    DeleteChar,
    Type(char),
}

impl GameAction {
    /// Key bindings. Unbound keys map to `None`.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(GameAction::Quit),
                KeyCode::Char('s') => Some(GameAction::Start),
                KeyCode::Char('r') => Some(GameAction::Reset),
                KeyCode::Char('d') => Some(GameAction::Sample),
                KeyCode::Char('t') => Some(GameAction::ToggleHint),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Esc => Some(GameAction::Quit),
            KeyCode::F(1) => Some(GameAction::ToggleHint),
            KeyCode::Tab => Some(GameAction::NextField),
            KeyCode::BackTab => Some(GameAction::PrevField),
            KeyCode::Enter => Some(GameAction::Submit),
            KeyCode::Backspace => Some(GameAction::DeleteChar),
            KeyCode::Char(c) => Some(GameAction::Type(c)),
            _ => None,
        }
    }
}

/// One turn of the main loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Action(GameAction),
    Resize,
    /// Nothing bound arrived within the tick rate; carries the instant
    /// the countdown should be polled with
    Tick(Instant),
}

/// Source of terminal input
pub trait InputSource: Send + 'static {
    /// Block for up to `timeout` waiting for input
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermInput {
    rx: Receiver<InputEvent>,
}

impl CrosstermInput {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let input = match event::read() {
                // key releases arrive on some terminals; only presses matter
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => InputEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(input).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for CrosstermInput {
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Input fed from a channel, for headless runs
pub struct ChannelInput {
    rx: Receiver<InputEvent>,
}

impl ChannelInput {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }
}

impl InputSource for ChannelInput {
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Time as seen by the countdown
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Simulated clock: every reading is `step` later than the last one
#[derive(Debug)]
pub struct SteppedClock {
    next: Cell<Instant>,
    step: Duration,
}

impl SteppedClock {
    pub fn starting_at(start: Instant, step: Duration) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> Instant {
        let now = self.next.get() + self.step;
        self.next.set(now);
        now
    }
}

/// Turns input and the passage of time into game events
pub struct Runner<I: InputSource, C: Clock> {
    input: I,
    clock: C,
    tick_rate: Duration,
}

impl<I: InputSource> Runner<I, SystemClock> {
    pub fn new(input: I, tick_rate: Duration) -> Self {
        Self::with_clock(input, SystemClock, tick_rate)
    }
}

impl<I: InputSource, C: Clock> Runner<I, C> {
    pub fn with_clock(input: I, clock: C, tick_rate: Duration) -> Self {
        Self {
            input,
            clock,
            tick_rate,
        }
    }

    /// Blocks up to the tick rate. Unbound keys, timeouts and a closed
    /// input all come back as a tick.
    pub fn step(&self) -> GameEvent {
        match self.input.recv_timeout(self.tick_rate) {
            Ok(InputEvent::Resize) => GameEvent::Resize,
            Ok(InputEvent::Key(key)) => match GameAction::from_key(key) {
                Some(action) => GameEvent::Action(action),
                None => GameEvent::Tick(self.clock.now()),
            },
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                GameEvent::Tick(self.clock.now())
            }
        }
    }
}
