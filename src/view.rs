use itertools::Itertools;
use std::fmt;
use std::time::{Duration, Instant};

use crate::session::{FormFields, GuessedEntry};

pub const DEFAULT_PLACEHOLDER: &str = "Type place names";

/// User-visible status or error line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Started(char),
    NotStarted,
    TimeExpired,
    AlreadyGuessed(String),
    NotOnList(Vec<String>),
    GameOver,
    InvalidLetter(String),
    NoPlacesForLetter(char),
    SaveFailed(String),
}

impl Notice {
    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Started(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Started(letter) => write!(
                f,
                "Game started! Places must start with: {}.",
                letter.to_uppercase()
            ),
            Notice::NotStarted => write!(f, "Start the game first."),
            Notice::TimeExpired => write!(f, "Can't enter after time expired"),
            Notice::AlreadyGuessed(token) => write!(f, "{token}: Place already guessed"),
            Notice::NotOnList(tokens) => write!(
                f,
                "{}: Place not on list or doesn't start with the selected letter",
                tokens.iter().join(", ")
            ),
            Notice::GameOver => write!(f, "Game over! Time limit reached."),
            Notice::InvalidLetter(raw) if raw.trim().is_empty() => {
                write!(f, "Enter a start letter first.")
            }
            Notice::InvalidLetter(raw) => write!(f, "{}: Not a single letter", raw.trim()),
            Notice::NoPlacesForLetter(letter) => {
                write!(f, "No places start with: {}.", letter.to_uppercase())
            }
            Notice::SaveFailed(reason) => write!(f, "Progress could not be saved: {reason}"),
        }
    }
}

/// Countdown display value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLeft {
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    pub fn from_secs(secs: i64) -> Self {
        let secs = secs.max(0);
        Self {
            minutes: secs / 60,
            seconds: secs % 60,
        }
    }

    pub fn zero() -> Self {
        Self::from_secs(0)
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time left: {} minutes, {} seconds",
            self.minutes, self.seconds
        )
    }
}

/// Output regions and input fields the session controller drives.
/// `None` clears a region.
pub trait GameView {
    fn show_message(&mut self, notice: Option<Notice>);
    fn show_timer(&mut self, time_left: Option<TimeLeft>);
    fn show_guess_list(&mut self, guessed: Option<&[GuessedEntry]>);
    fn show_correct_count(&mut self, count: Option<usize>);
    fn show_sample_cities(&mut self, places: &[String]);
    fn clear_guess_input(&mut self);
    fn set_placeholder(&mut self, text: &str);
    /// Current contents of the setup fields
    fn form(&self) -> FormFields;
    fn restore_form(&mut self, form: FormFields);
}

/// In-memory view: the terminal UI renders straight from it
#[derive(Debug, Clone)]
pub struct TextView {
    pub message: Option<Notice>,
    message_at: Option<Instant>,
    pub timer: Option<TimeLeft>,
    pub guessed: Option<Vec<String>>,
    pub correct_count: Option<usize>,
    pub sample: Vec<String>,
    pub placeholder: String,
    pub form: FormFields,
    pub guess_input: String,
    pub hint_visible: bool,
}

impl Default for TextView {
    fn default() -> Self {
        Self {
            message: None,
            message_at: None,
            timer: None,
            guessed: None,
            correct_count: None,
            sample: Vec::new(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            form: FormFields::default(),
            guess_input: String::new(),
            hint_visible: false,
        }
    }
}

impl TextView {
    pub fn new(form: FormFields) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn toggle_hint(&mut self) {
        self.hint_visible = !self.hint_visible;
    }

    /// Drop the message once it has been up for `timeout`
    pub fn expire_message(&mut self, now: Instant, timeout: Duration) {
        if let Some(at) = self.message_at {
            if now.duration_since(at) >= timeout {
                self.message = None;
                self.message_at = None;
            }
        }
    }
}

impl GameView for TextView {
    fn show_message(&mut self, notice: Option<Notice>) {
        self.message_at = notice.as_ref().map(|_| Instant::now());
        self.message = notice;
    }

    fn show_timer(&mut self, time_left: Option<TimeLeft>) {
        self.timer = time_left;
    }

    fn show_guess_list(&mut self, guessed: Option<&[GuessedEntry]>) {
        self.guessed = guessed.map(|g| g.iter().map(|e| e.name.clone()).collect());
    }

    fn show_correct_count(&mut self, count: Option<usize>) {
        self.correct_count = count;
    }

    fn show_sample_cities(&mut self, places: &[String]) {
        self.sample = places.to_vec();
    }

    fn clear_guess_input(&mut self) {
        self.guess_input.clear();
    }

    fn set_placeholder(&mut self, text: &str) {
        self.placeholder = text.to_string();
    }

    fn form(&self) -> FormFields {
        self.form.clone()
    }

    fn restore_form(&mut self, form: FormFields) {
        self.form = form;
    }
}
