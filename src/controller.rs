//! Session controller: the only code that mutates round state.
//!
//! The UI talks to it through start/reset/check-guess/sample calls and a
//! periodic tick; it reports back through the injected [`GameView`] and
//! mirrors every change into the injected [`SessionStore`].

use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Config, PersistFailures, UntimedRounds};
use crate::error::{GameError, StoreError};
use crate::guess::{evaluate_batch, split_batch, BatchOutcome};
use crate::places::{PlaceSource, Places};
use crate::session::{PersistedGame, SessionState, EXPIRED};
use crate::store::{SessionStore, STORAGE_KEY};
use crate::timer::Countdown;
use crate::view::{GameView, Notice, TimeLeft, DEFAULT_PLACEHOLDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub untimed: UntimedRounds,
    pub persist_failures: PersistFailures,
    pub sample_size: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ControllerOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            untimed: cfg.untimed_rounds,
            persist_failures: cfg.persist_failures,
            sample_size: cfg.sample_size,
        }
    }
}

/// Exactly one alphabetic character, surrounding whitespace ignored
pub fn parse_start_letter(raw: &str) -> Result<char, GameError> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => Ok(c.to_lowercase().next().unwrap_or(c)),
        _ => Err(GameError::InvalidStartLetter(raw.to_string())),
    }
}

/// Anything that is not a positive whole number means untimed
pub fn parse_time_limit(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => u32::try_from(secs).unwrap_or(u32::MAX),
        _ => 0,
    }
}

pub struct SessionController<V: GameView, S: SessionStore> {
    state: SessionState,
    places: Places,
    countdown: Countdown,
    view: V,
    store: S,
    options: ControllerOptions,
}

impl<V: GameView, S: SessionStore> SessionController<V, S> {
    pub fn new(view: V, store: S, options: ControllerOptions) -> Self {
        Self {
            state: SessionState::default(),
            places: Places::default(),
            countdown: Countdown::default(),
            view,
            store,
            options,
        }
    }

    /// Install reference data without touching the store
    pub fn with_places(mut self, places: Places) -> Self {
        self.places = places;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn places(&self) -> &Places {
        &self.places
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn is_timer_running(&self) -> bool {
        self.countdown.is_running()
    }

    /// Load the place list, then pick up any saved round
    pub fn load_reference_data(&mut self, source: &PlaceSource) -> Result<usize, GameError> {
        self.places = Places::load(source)?;
        info!(?source, places = self.places.len(), "reference data loaded");
        self.restore();
        Ok(self.places.len())
    }

    pub fn start_game(&mut self, start_letter: char, time_limit_secs: u32) -> Result<(), GameError> {
        if !start_letter.is_alphabetic() {
            self.view
                .show_message(Some(Notice::InvalidLetter(start_letter.to_string())));
            return Err(GameError::InvalidStartLetter(start_letter.to_string()));
        }

        let letter = start_letter.to_lowercase().next().unwrap_or(start_letter);
        if !self.places.has_letter(letter) {
            warn!(%letter, "refusing to start a round nobody can score in");
            self.view.show_message(Some(Notice::NoPlacesForLetter(letter)));
            return Err(GameError::NoPlacesForLetter(letter));
        }

        self.reset_game();

        self.state.is_active = true;
        self.state.is_ended = false;
        self.state.start_letter = Some(letter);
        self.state.time_limit_secs = time_limit_secs;
        self.state.remaining_seconds = i64::from(time_limit_secs);

        self.view.show_guess_list(None);
        self.view.show_correct_count(None);
        self.view.show_message(Some(Notice::Started(letter)));
        self.view.set_placeholder(DEFAULT_PLACEHOLDER);

        if time_limit_secs > 0 {
            self.countdown.start(Instant::now());
        }

        info!(%letter, time_limit_secs, "round started");
        self.persist();
        Ok(())
    }

    /// Start button: read the setup fields from the view
    pub fn start_from_form(&mut self) -> Result<(), GameError> {
        let form = self.view.form();
        let letter = match parse_start_letter(&form.start_letter) {
            Ok(letter) => letter,
            Err(e) => {
                self.view
                    .show_message(Some(Notice::InvalidLetter(form.start_letter.clone())));
                return Err(e);
            }
        };
        self.start_game(letter, parse_time_limit(&form.time_limit))
    }

    /// Evaluate one comma-separated submission.
    ///
    /// Returns `None` when the submission was rejected before evaluation
    /// (no round, time expired, or nothing but separators).
    pub fn check_guess(&mut self, raw_input: &str) -> Option<BatchOutcome> {
        if !self.state.is_active {
            self.view.show_message(Some(Notice::NotStarted));
            return None;
        }

        if self.state.remaining_seconds < 0 || self.state.is_ended {
            self.view.show_message(Some(Notice::TimeExpired));
            return None;
        }

        let tokens = split_batch(raw_input);
        if tokens.is_empty() {
            return None;
        }

        let Some(letter) = self.state.start_letter else {
            self.view.show_message(Some(Notice::NotStarted));
            return None;
        };

        let outcome = evaluate_batch(&tokens, &self.state.guessed, &self.places, letter);
        for entry in &outcome.accepted {
            self.state.record(entry.clone());
        }

        let notice = match (&outcome.duplicate, outcome.not_on_list.is_empty()) {
            (Some(token), _) => Some(Notice::AlreadyGuessed(token.clone())),
            (None, false) => Some(Notice::NotOnList(outcome.not_on_list.clone())),
            (None, true) => None,
        };
        let mut verdict_showing = notice.is_some();
        self.view.show_message(notice);

        if !outcome.had_duplicate() {
            self.view.show_guess_list(Some(&self.state.guessed));
        }
        self.view.show_correct_count(Some(self.state.correct_count));
        self.view.clear_guess_input();

        debug!(
            accepted = outcome.accepted.len(),
            not_on_list = outcome.not_on_list.len(),
            duplicate = ?outcome.duplicate,
            correct = self.state.correct_count,
            "guess batch evaluated"
        );

        if !self.state.is_timed()
            && !outcome.had_duplicate()
            && self.options.untimed == UntimedRounds::SingleBatch
        {
            self.reset_game();
            verdict_showing = false;
        }

        // a failed save must not hide what happened to the guesses
        self.save(!verdict_showing);
        Some(outcome)
    }

    /// One countdown step; the round ends when the limit is used up
    pub fn update_timer(&mut self) {
        if !self.state.is_active || !self.state.is_timed() || self.state.remaining_seconds < 0 {
            return;
        }

        self.view
            .show_timer(Some(TimeLeft::from_secs(self.state.remaining_seconds)));
        self.state.remaining_seconds -= 1;

        if self.state.remaining_seconds <= 0 {
            self.state.remaining_seconds = EXPIRED;
            self.view.show_timer(Some(TimeLeft::zero()));
            self.end_game();
        }

        self.persist();
    }

    /// Run every countdown step that has fallen due by `now`
    pub fn poll_timer(&mut self, now: Instant) {
        let ticks = self.countdown.due_ticks(now);
        for _ in 0..ticks {
            if !self.countdown.is_running() {
                break;
            }
            self.update_timer();
        }
    }

    pub fn reset_game(&mut self) {
        if self.state.is_active && !self.state.is_ended {
            // leave the final tally on screen
            self.view.show_guess_list(Some(&self.state.guessed));
            self.view.show_correct_count(Some(self.state.correct_count));
        }

        if self.state.is_active {
            info!(correct = self.state.correct_count, "round reset");
        }

        self.state = SessionState::default();
        self.countdown.cancel();

        self.view.show_message(None);
        self.view.show_timer(None);
        self.view.clear_guess_input();
        self.view.set_placeholder(DEFAULT_PLACEHOLDER);

        self.persist();
    }

    pub fn end_game(&mut self) {
        if !self.state.is_ended {
            self.view.show_message(Some(Notice::GameOver));
            self.state.is_ended = true;
            info!(correct = self.state.correct_count, "time limit reached");
        }
        self.countdown.cancel();
    }

    /// Render `count` random places for the letter, drawn with replacement
    pub fn display_sample(&mut self, start_letter: char, count: usize) -> Result<Vec<String>, GameError> {
        let letter = start_letter.to_lowercase().next().unwrap_or(start_letter);
        match self.places.sample(letter, count) {
            Some(sample) => {
                self.view.show_sample_cities(&sample);
                Ok(sample)
            }
            None => {
                self.view.show_sample_cities(&[]);
                self.view.show_message(Some(Notice::NoPlacesForLetter(letter)));
                Err(GameError::NoPlacesForLetter(letter))
            }
        }
    }

    /// Show-sample button: letter from the setup field, configured count
    pub fn sample_from_form(&mut self) -> Result<Vec<String>, GameError> {
        let raw = self.view.form().start_letter;
        match parse_start_letter(&raw) {
            Ok(letter) => self.display_sample(letter, self.options.sample_size),
            Err(e) => {
                self.view.show_message(Some(Notice::InvalidLetter(raw)));
                Err(e)
            }
        }
    }

    /// Mirror the session and setup fields into the store
    pub fn persist(&mut self) {
        self.save(true);
    }

    fn save(&mut self, may_surface: bool) {
        let record = PersistedGame::capture(&self.state, self.view.form()).stamped();
        let result = serde_json::to_value(&record)
            .map_err(StoreError::from)
            .and_then(|value| self.store.set(STORAGE_KEY, &value));

        match result {
            Ok(()) => debug!(
                key = STORAGE_KEY,
                active = record.is_active,
                correct = record.correct_count,
                "game data saved"
            ),
            Err(error) => {
                warn!(key = STORAGE_KEY, %error, "failed to save game data");
                if may_surface && self.options.persist_failures == PersistFailures::Surface {
                    self.view.show_message(Some(Notice::SaveFailed(error.to_string())));
                }
            }
        }
    }

    /// Load a saved session if there is one. Returns whether anything was restored.
    pub fn restore(&mut self) -> bool {
        let value = match self.store.get(STORAGE_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => return false,
            Err(error) => {
                warn!(key = STORAGE_KEY, %error, "failed to read saved game");
                return false;
            }
        };

        let saved: PersistedGame = match serde_json::from_value(value) {
            Ok(saved) => saved,
            Err(error) => {
                warn!(key = STORAGE_KEY, %error, "ignoring unreadable saved game");
                return false;
            }
        };

        let saved_at = saved.saved_at;
        let (state, form) = saved.into_parts();
        self.state = state;
        self.view.restore_form(form);

        self.countdown.cancel();
        if self.state.is_active && !self.state.is_ended && self.state.remaining_seconds > 0 {
            self.countdown.start(Instant::now());
        }

        self.view.show_guess_list(Some(&self.state.guessed));
        self.view.show_correct_count(Some(self.state.correct_count));

        info!(
            ?saved_at,
            active = self.state.is_active,
            correct = self.state.correct_count,
            remaining = self.state.remaining_seconds,
            "saved game restored"
        );
        true
    }
}
