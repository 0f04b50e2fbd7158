use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// remaining_seconds value once a timed round has run out
pub const EXPIRED: i64 = -1;

/// An accepted guess, display-cased
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessedEntry {
    pub name: String,
}

impl GuessedEntry {
    /// First character upper-cased, the rest lower-cased
    pub fn from_token(token: &str) -> Self {
        let mut chars = token.chars();
        let name = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        };
        Self { name }
    }

    pub fn matches(&self, token: &str) -> bool {
        self.name.to_lowercase() == token
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Active,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub start_letter: Option<char>,
    pub time_limit_secs: u32,
    pub remaining_seconds: i64,
    pub is_active: bool,
    pub is_ended: bool,
    pub guessed: Vec<GuessedEntry>,
    pub correct_count: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            start_letter: None,
            time_limit_secs: 0,
            remaining_seconds: 0,
            is_active: false,
            is_ended: false,
            guessed: Vec::new(),
            correct_count: 0,
        }
    }
}

impl SessionState {
    pub fn phase(&self) -> RoundPhase {
        if !self.is_active {
            RoundPhase::Idle
        } else if self.is_ended || self.remaining_seconds < 0 {
            RoundPhase::Expired
        } else {
            RoundPhase::Active
        }
    }

    pub fn is_timed(&self) -> bool {
        self.time_limit_secs > 0
    }

    pub fn has_guessed(&self, token: &str) -> bool {
        self.guessed.iter().any(|g| g.matches(token))
    }

    pub fn record(&mut self, entry: GuessedEntry) {
        self.guessed.push(entry);
        self.correct_count = self.guessed.len();
    }
}

/// The two raw setup fields as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub start_letter: String,
    pub time_limit: String,
}

/// What goes into the session store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedGame {
    pub guessed: Vec<GuessedEntry>,
    pub correct_count: usize,
    pub start_letter: Option<char>,
    pub time_limit_secs: u32,
    pub remaining_seconds: i64,
    pub is_active: bool,
    pub is_ended: bool,
    pub form: FormFields,
    pub saved_at: Option<DateTime<Local>>,
}

impl Default for PersistedGame {
    fn default() -> Self {
        PersistedGame::capture(&SessionState::default(), FormFields::default())
    }
}

impl PersistedGame {
    pub fn capture(state: &SessionState, form: FormFields) -> Self {
        Self {
            guessed: state.guessed.clone(),
            correct_count: state.correct_count,
            start_letter: state.start_letter,
            time_limit_secs: state.time_limit_secs,
            remaining_seconds: state.remaining_seconds,
            is_active: state.is_active,
            is_ended: state.is_ended,
            form,
            saved_at: None,
        }
    }

    pub fn stamped(mut self) -> Self {
        self.saved_at = Some(Local::now());
        self
    }

    /// Rebuilds the session; the count is re-derived from the guessed list
    pub fn into_parts(self) -> (SessionState, FormFields) {
        let state = SessionState {
            start_letter: self.start_letter,
            time_limit_secs: self.time_limit_secs,
            remaining_seconds: self.remaining_seconds,
            is_active: self.is_active,
            is_ended: self.is_ended,
            correct_count: self.guessed.len(),
            guessed: self.guessed,
        };
        (state, self.form)
    }
}
