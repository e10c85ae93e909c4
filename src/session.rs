use std::fmt;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::analyzer::{analyze, live_states, CharacterState};
use crate::audio::{AudioHandle, Cue};
use crate::config::Settings;
use crate::corpus::TextSource;
use crate::metrics::LiveStats;
use crate::result::SessionResult;
use crate::store::ResultStore;
use crate::time_series::{TimeSeriesPoint, WpmSeries};
use crate::timer::{Clock, SystemClock, TickTimer, TimerToken};

/// Delay between `start` and the first accepted keystroke
pub const COUNTDOWN: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EndReason {
    /// the time limit ran out
    Time,
    /// the prompt was typed out
    Completed,
}

type CompletionCallback = Box<dyn FnMut(&SessionResult)>;

/// One typing test, from start to result.
///
/// Everything shown to the user (stats, per-character states) is derived
/// again from the prompt and the typed buffer on every event. Elapsed time
/// comes from a single monotonic anchor plus a baseline accumulated over
/// earlier running windows, so ticks only trigger recomputation.
pub struct Session {
    settings: Settings,
    active: Settings,
    state: SessionState,
    target: Vec<char>,
    typed: Vec<char>,
    elapsed_baseline: Duration,
    running_anchor: Option<Instant>,
    stats: LiveStats,
    wpm_series: WpmSeries,
    end_reason: Option<EndReason>,
    result: Option<SessionResult>,
    timer: TickTimer,
    countdown: Duration,
    clock: Box<dyn Clock>,
    source: Box<dyn TextSource>,
    store: Box<dyn ResultStore>,
    audio: AudioHandle,
    on_complete: Option<CompletionCallback>,
}

impl Session {
    pub fn new(
        settings: Settings,
        source: Box<dyn TextSource>,
        store: Box<dyn ResultStore>,
        mut audio: AudioHandle,
    ) -> Self {
        let settings = settings.normalized();
        audio.set_enabled(settings.sound_enabled);

        Self {
            settings,
            active: settings,
            state: SessionState::Idle,
            target: Vec::new(),
            typed: Vec::new(),
            elapsed_baseline: Duration::ZERO,
            running_anchor: None,
            stats: LiveStats::default(),
            wpm_series: WpmSeries::new(),
            end_reason: None,
            result: None,
            timer: TickTimer::default(),
            countdown: COUNTDOWN,
            clock: Box::new(SystemClock),
            source,
            store,
            audio,
            on_complete: None,
        }
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_countdown(mut self, countdown: Duration) -> Self {
        self.countdown = countdown;
        self
    }

    /// Called exactly once per session with the final result
    pub fn on_complete<F: FnMut(&SessionResult) + 'static>(mut self, callback: F) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Sound takes effect immediately, everything else on the next start
    pub fn configure(&mut self, settings: Settings) {
        self.settings = settings.normalized();
        self.audio.set_enabled(self.settings.sound_enabled);
    }

    pub fn start(&mut self) -> bool {
        if !matches!(self.state, SessionState::Idle | SessionState::Complete) {
            return false;
        }
        let text = self
            .source
            .generate_for_duration(self.settings.time_limit_secs, self.settings.text_mode);
        self.begin(text);
        true
    }

    /// Throws the current session away and starts a fresh one
    pub fn restart(&mut self) {
        self.timer.cancel();
        self.state = SessionState::Idle;
        self.start();
    }

    /// Like `restart` but keeps the current prompt
    pub fn retry(&mut self) {
        let text: String = self.target.iter().collect();
        self.timer.cancel();
        self.state = SessionState::Idle;
        if text.is_empty() {
            self.start();
        } else {
            self.begin(text);
        }
    }

    fn begin(&mut self, text: String) {
        self.active = self.settings;
        self.target = text.chars().collect();
        self.typed.clear();
        self.elapsed_baseline = Duration::ZERO;
        self.running_anchor = Some(self.clock.now() + self.countdown);
        self.wpm_series.clear();
        self.end_reason = None;
        self.result = None;
        self.state = SessionState::Running;
        self.timer.arm();
        self.audio.play(Cue::Countdown);
        self.refresh_stats();

        debug!(
            "session started: {} chars, {}s, {} mode",
            self.target.len(),
            self.active.time_limit_secs,
            self.active.text_mode
        );
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.elapsed_baseline = self.elapsed();
        self.running_anchor = None;
        self.timer.cancel();
        self.state = SessionState::Paused;
        debug!("session paused at {:.1}s", self.elapsed_secs());
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            return false;
        }
        self.running_anchor = Some(self.clock.now());
        self.state = SessionState::Running;
        self.timer.arm();
        debug!("session resumed at {:.1}s", self.elapsed_secs());
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    /// Replaces the typed buffer. Returns false if the input was ignored,
    /// either because the session is not accepting input or because
    /// `text` is longer than the prompt.
    pub fn on_input(&mut self, text: &str) -> bool {
        if !self.is_accepting_input() {
            return false;
        }
        let next: Vec<char> = text.chars().collect();
        if next.len() > self.target.len() {
            return false;
        }

        if next.len() > self.typed.len() {
            let idx = next.len() - 1;
            let cue = if next[idx] == self.target[idx] {
                Cue::KeyPress
            } else {
                Cue::KeyError
            };
            self.audio.play(cue);
        }

        self.typed = next;
        self.refresh_stats();
        self.check_termination();
        true
    }

    pub fn type_char(&mut self, c: char) -> bool {
        let mut text = self.typed_text();
        text.push(c);
        self.on_input(&text)
    }

    pub fn backspace(&mut self) -> bool {
        if self.typed.is_empty() {
            return false;
        }
        let text: String = self.typed[..self.typed.len() - 1].iter().collect();
        self.on_input(&text)
    }

    /// Periodic repaint trigger. Ticks from a cancelled timer are ignored.
    pub fn tick(&mut self, token: TimerToken) -> bool {
        if self.state != SessionState::Running || !self.timer.accepts(token) {
            return false;
        }
        self.refresh_stats();
        let elapsed = self.elapsed_secs();
        self.wpm_series.sample(elapsed, self.stats.wpm);
        self.check_termination();
        true
    }

    /// Ends the session if the time is up or the prompt has been typed out.
    /// Time wins when both hold. No-op once complete.
    pub fn check_termination(&mut self) -> Option<EndReason> {
        if !matches!(self.state, SessionState::Running | SessionState::Paused) {
            return None;
        }
        let reason = self.termination_reason()?;
        self.finish(reason);
        Some(reason)
    }

    fn termination_reason(&self) -> Option<EndReason> {
        if self.elapsed_secs() >= self.active.time_limit_secs as f64 {
            return Some(EndReason::Time);
        }
        if self.typed.len() >= self.target.len() {
            let typed: String = self.typed.iter().collect();
            let expected: String = self.target[..self.typed.len()].iter().collect();
            if typed.trim() == expected.trim() {
                return Some(EndReason::Completed);
            }
        }
        None
    }

    /// Finishes the session now
    pub fn complete(&mut self) {
        self.finish(EndReason::Completed);
    }

    fn finish(&mut self, reason: EndReason) {
        if !matches!(self.state, SessionState::Running | SessionState::Paused) {
            return;
        }

        let limit = self.active.time_limit_secs as f64;
        let mut elapsed = self.elapsed_secs().min(limit);
        if elapsed <= 0.0 {
            elapsed = limit;
        }

        self.timer.cancel();
        self.elapsed_baseline = Duration::from_secs_f64(elapsed);
        self.running_anchor = None;
        self.state = SessionState::Complete;
        self.end_reason = Some(reason);

        let result = SessionResult::new(
            &self.target,
            analyze(&self.target, &self.typed),
            elapsed,
            self.active.time_limit_secs,
            self.active.text_mode,
            Utc::now(),
        );
        self.stats = LiveStats::compute(&self.target, &self.typed, elapsed);

        match self.store.save(result.clone()) {
            Ok(stored) => info!(
                "session {} saved: {} wpm, {}% acc ({reason})",
                stored.id, result.wpm, result.accuracy
            ),
            Err(e) => warn!("unable to save session result: {e}"),
        }

        self.audio.play(Cue::TestComplete);
        if let Some(callback) = self.on_complete.as_mut() {
            callback(&result);
        }
        self.result = Some(result);
    }

    /// Stops the timer and releases audio, e.g. when the view goes away
    pub fn teardown(&mut self) {
        self.timer.cancel();
        self.audio.dispose();
    }

    fn refresh_stats(&mut self) {
        self.stats = LiveStats::compute(&self.target, &self.typed, self.elapsed_secs());
    }

    fn elapsed(&self) -> Duration {
        match (self.state, self.running_anchor) {
            (SessionState::Running, Some(anchor)) => self
                .elapsed_baseline
                .saturating_add(self.clock.now().saturating_duration_since(anchor)),
            _ => self.elapsed_baseline,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    pub fn remaining_secs(&self) -> f64 {
        (self.active.time_limit_secs as f64 - self.elapsed_secs()).max(0.0)
    }

    /// Running and past the countdown
    pub fn is_accepting_input(&self) -> bool {
        self.state == SessionState::Running
            && self
                .running_anchor
                .is_some_and(|anchor| self.clock.now() >= anchor)
    }

    pub fn is_counting_down(&self) -> bool {
        self.state == SessionState::Running && !self.is_accepting_input()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn live_stats(&self) -> LiveStats {
        self.stats
    }

    pub fn character_states(&self) -> Vec<CharacterState> {
        match &self.result {
            Some(result) => result.character_states.clone(),
            None => live_states(&self.target, &self.typed, self.typed.len()),
        }
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn typed_text(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn wpm_samples(&self) -> &[TimeSeriesPoint] {
        self.wpm_series.points()
    }

    pub fn wpm_series(&self) -> &WpmSeries {
        &self.wpm_series
    }

    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.token()
    }

    pub fn tick_interval(&self) -> Duration {
        self.timer.interval()
    }

    /// Settings for the next start
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Settings the current session runs with
    pub fn active_settings(&self) -> Settings {
        self.active
    }

    pub fn store(&self) -> &dyn ResultStore {
        self.store.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("target_len", &self.target.len())
            .field("typed_len", &self.typed.len())
            .field("elapsed_secs", &self.elapsed_secs())
            .field("end_reason", &self.end_reason)
            .field("audio", &self.audio)
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CueRecorder;
    use crate::corpus::{FixedText, TextMode};
    use crate::result::StoredResult;
    use crate::store::{MemoryResultStore, StoreError};
    use crate::timer::ManualClock;
    use assert_matches::assert_matches;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        session: Session,
        clock: ManualClock,
        cues: CueRecorder,
        completions: Rc<RefCell<Vec<SessionResult>>>,
    }

    fn harness(text: &str, time_limit_secs: u32) -> Harness {
        let clock = ManualClock::new();
        let cues = CueRecorder::new();
        let completions = Rc::new(RefCell::new(Vec::new()));
        let sink = completions.clone();
        let settings = Settings {
            time_limit_secs,
            text_mode: TextMode::Words,
            sound_enabled: true,
        };

        let session = Session::new(
            settings,
            Box::new(FixedText(text.to_string())),
            Box::new(MemoryResultStore::new()),
            AudioHandle::with_sink(true, cues.clone()),
        )
        .with_clock(clock.clone())
        .on_complete(move |r| sink.borrow_mut().push(r.clone()));

        Harness {
            session,
            clock,
            cues,
            completions,
        }
    }

    /// Starts and waits out the countdown
    fn started(text: &str, time_limit_secs: u32) -> Harness {
        let mut h = harness(text, time_limit_secs);
        assert!(h.session.start());
        h.clock.advance(COUNTDOWN);
        h
    }

    fn tick(session: &mut Session) -> bool {
        match session.timer_token() {
            Some(token) => session.tick(token),
            None => false,
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let h = harness("hello", 30);

        assert_eq!(h.session.state(), SessionState::Idle);
        assert_eq!(h.session.timer_token(), None);
        assert!(h.session.character_states().is_empty());
    }

    #[test]
    fn test_start_enters_running_with_countdown() {
        let mut h = harness("hello", 30);
        assert!(h.session.start());

        assert_eq!(h.session.state(), SessionState::Running);
        assert_eq!(h.session.target_text(), "hello");
        assert!(h.session.is_counting_down());
        assert_eq!(h.cues.played(), vec![Cue::Countdown]);

        // keystrokes during the countdown are dropped
        assert!(!h.session.type_char('h'));
        assert_eq!(h.session.typed_text(), "");
        assert_eq!(h.session.elapsed_secs(), 0.0);

        h.clock.advance(COUNTDOWN);
        assert!(h.session.is_accepting_input());
        assert!(h.session.type_char('h'));
    }

    #[test]
    fn test_start_only_from_idle_or_complete() {
        let mut h = started("hi", 30);
        assert!(!h.session.start());

        h.session.pause();
        assert!(!h.session.start());
    }

    #[test]
    fn test_input_longer_than_target_is_rejected() {
        let mut h = started("abc", 30);
        assert!(h.session.on_input("ab"));

        assert!(!h.session.on_input("abcd"));
        assert_eq!(h.session.typed_text(), "ab");
    }

    #[test]
    fn test_key_cues() {
        let mut h = started("abc", 30);
        h.session.type_char('a');
        h.session.type_char('x');
        h.session.backspace();

        assert_eq!(
            h.cues.played(),
            vec![Cue::Countdown, Cue::KeyPress, Cue::KeyError]
        );
    }

    #[test]
    fn test_live_stats_follow_input() {
        let mut h = started("abcd", 30);
        h.clock.advance_secs(6.0);
        h.session.on_input("abx");

        let stats = h.session.live_stats();
        assert_eq!(stats.correct_characters, 2);
        assert_eq!(stats.incorrect_characters, 1);
        assert_eq!(stats.mistake_count, 1);
        assert_eq!(stats.progress_percent, 75.0);
        // 2 chars in 6s = 4 wpm
        assert_eq!(stats.wpm, 4);

        assert_eq!(
            h.session.character_states(),
            vec![
                CharacterState::Correct,
                CharacterState::Correct,
                CharacterState::Incorrect,
                CharacterState::Current,
            ]
        );
    }

    #[test]
    fn test_completion_by_exact_match() {
        let mut h = started("the cat sat", 30);
        h.clock.advance_secs(10.0);

        assert!(h.session.on_input("the cat sat"));

        assert_eq!(h.session.state(), SessionState::Complete);
        assert_eq!(h.session.end_reason(), Some(EndReason::Completed));
        let result = h.session.result().unwrap();
        assert_eq!(result.correct_characters, 11);
        assert_eq!(result.incorrect_characters, 0);
        assert_eq!(result.wpm, 13);
        assert_eq!(result.net_wpm, 13);
        assert_eq!(result.accuracy, 100.0);
        assert_eq!(result.time_elapsed, 10.0);
    }

    #[test]
    fn test_full_length_with_mistake_does_not_complete() {
        let mut h = started("abc", 30);
        h.session.on_input("abd");
        assert_eq!(h.session.state(), SessionState::Running);

        h.session.backspace();
        h.session.type_char('c');
        assert_eq!(h.session.state(), SessionState::Complete);
    }

    #[test]
    fn test_trailing_whitespace_does_not_block_completion() {
        let mut h = started("ab ", 30);
        h.session.on_input("ab\t");
        assert_eq!(h.session.end_reason(), Some(EndReason::Completed));
    }

    #[test]
    fn test_timeout_before_completion() {
        let mut h = started("hello world", 15);
        h.session.on_input("hel");
        h.clock.advance_secs(15.0);

        assert!(tick(&mut h.session));

        assert_eq!(h.session.state(), SessionState::Complete);
        assert_eq!(h.session.end_reason(), Some(EndReason::Time));
        assert_eq!(h.session.result().unwrap().time_elapsed, 15.0);
        assert_eq!(h.session.remaining_secs(), 0.0);
    }

    #[test]
    fn test_time_wins_when_both_conditions_hold() {
        let mut h = started("hi", 5);
        h.clock.advance_secs(6.0);

        h.session.on_input("hi");

        assert_eq!(h.session.end_reason(), Some(EndReason::Time));
        assert_eq!(h.session.result().unwrap().time_elapsed, 5.0);
    }

    #[test]
    fn test_completion_is_idempotent() {
        let mut h = started("hi", 30);
        h.clock.advance_secs(3.0);
        h.session.on_input("hi");
        let first = h.session.result().cloned();

        h.clock.advance_secs(60.0);
        assert_eq!(h.session.check_termination(), None);
        h.session.complete();
        assert!(!tick(&mut h.session));

        assert_eq!(h.session.result().cloned(), first);
        assert_eq!(h.completions.borrow().len(), 1);
        assert_eq!(h.cues.count(Cue::TestComplete), 1);
        assert_eq!(h.session.store().all().unwrap().len(), 1);
    }

    #[test]
    fn test_explicit_complete_with_zero_elapsed_uses_limit() {
        let mut h = harness("hello", 20);
        h.session.start();
        h.session.complete();

        let result = h.session.result().unwrap();
        assert_eq!(result.time_elapsed, 20.0);
        assert_eq!(result.wpm, 0);
        assert_eq!(result.accuracy, 100.0);
        assert_eq!(result.character_states, vec![CharacterState::Missed; 5]);
    }

    #[test]
    fn test_pause_resume_preserves_elapsed() {
        let mut h = started("hello world", 60);
        h.clock.advance_secs(5.0);
        assert!(h.session.pause());
        assert_eq!(h.session.state(), SessionState::Paused);

        h.clock.advance_secs(100.0);
        assert_eq!(h.session.elapsed_secs(), 5.0);

        assert!(h.session.resume());
        h.clock.advance_secs(2.0);
        assert!(tick(&mut h.session));

        assert_eq!(h.session.elapsed_secs(), 7.0);
        assert_eq!(h.session.state(), SessionState::Running);
    }

    #[test]
    fn test_paused_session_ignores_input_and_ticks() {
        let mut h = started("hello", 60);
        let token = h.session.timer_token().unwrap();
        h.session.pause();

        assert!(!h.session.type_char('h'));
        assert!(!h.session.tick(token));
        assert_eq!(h.session.timer_token(), None);
        assert!(!h.session.pause());
    }

    #[test]
    fn test_resume_issues_new_token() {
        let mut h = started("hello", 60);
        let before = h.session.timer_token().unwrap();
        h.session.pause();
        h.session.resume();

        let after = h.session.timer_token().unwrap();
        assert_ne!(before, after);
        assert!(!h.session.tick(before));
        assert!(h.session.tick(after));
    }

    #[test]
    fn test_restart_discards_stale_ticks() {
        let mut h = started("hello", 60);
        h.session.on_input("he");
        let stale = h.session.timer_token().unwrap();

        h.session.restart();

        assert_eq!(h.session.state(), SessionState::Running);
        assert_eq!(h.session.typed_text(), "");
        assert_eq!(h.session.elapsed_secs(), 0.0);
        assert!(!h.session.tick(stale));
    }

    #[test]
    fn test_restart_from_paused() {
        let mut h = started("hello", 60);
        h.clock.advance_secs(3.0);
        h.session.on_input("he");
        assert!(h.session.pause());
        let paused_token = h.session.timer_token();
        h.clock.advance_secs(10.0);

        h.session.restart();

        assert_eq!(paused_token, None);
        assert_eq!(h.session.state(), SessionState::Running);
        assert_eq!(h.session.typed_text(), "");
        assert_eq!(h.session.elapsed_secs(), 0.0);
        assert!(h.session.is_counting_down());

        // the paused baseline does not carry over
        h.clock.advance(COUNTDOWN);
        h.clock.advance_secs(1.0);
        assert!(tick(&mut h.session));
        assert_eq!(h.session.elapsed_secs(), 1.0);
        assert!(h.completions.borrow().is_empty());
        assert_eq!(h.cues.count(Cue::Countdown), 2);
    }

    #[test]
    fn test_restart_after_complete() {
        let mut h = started("hi", 30);
        h.session.on_input("hi");
        assert_eq!(h.session.state(), SessionState::Complete);

        assert!(h.session.start());
        assert_eq!(h.session.state(), SessionState::Running);
        assert_eq!(h.session.result(), None);
        assert_eq!(h.session.end_reason(), None);
    }

    #[test]
    fn test_retry_keeps_prompt() {
        let mut h = started("hi there", 30);
        h.session.on_input("hi");
        h.session.retry();

        assert_eq!(h.session.target_text(), "hi there");
        assert_eq!(h.session.typed_text(), "");
    }

    #[test]
    fn test_wpm_samples_once_per_second() {
        let mut h = started("hello world", 60);
        h.session.on_input("hello");

        for _ in 0..25 {
            h.clock.advance_secs(0.1);
            tick(&mut h.session);
        }

        let samples = h.session.wpm_samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].t, 1.0);
        assert_eq!(samples[1].t, 2.0);
    }

    #[test]
    fn test_configure_applies_on_next_start() {
        let mut h = started("hello", 30);
        h.session.configure(Settings {
            time_limit_secs: 60,
            text_mode: TextMode::Mixed,
            sound_enabled: false,
        });

        assert_eq!(h.session.active_settings().time_limit_secs, 30);
        h.session.type_char('x');
        assert_eq!(h.cues.count(Cue::KeyError), 0);

        h.session.restart();
        assert_eq!(h.session.active_settings().time_limit_secs, 60);
        assert_eq!(h.session.active_settings().text_mode, TextMode::Mixed);
    }

    struct FailingStore;

    impl ResultStore for FailingStore {
        fn save(&mut self, _result: SessionResult) -> Result<StoredResult, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }

        fn all(&self) -> Result<Vec<StoredResult>, StoreError> {
            Ok(Vec::new())
        }

        fn clear(&mut self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_store_failure_does_not_affect_session() {
        let clock = ManualClock::new();
        let fired = Rc::new(RefCell::new(0));
        let counter = fired.clone();
        let mut session = Session::new(
            Settings::default(),
            Box::new(FixedText("ok".to_string())),
            Box::new(FailingStore),
            AudioHandle::silent(),
        )
        .with_clock(clock.clone())
        .with_countdown(Duration::ZERO)
        .on_complete(move |_| *counter.borrow_mut() += 1);

        session.start();
        clock.advance_secs(1.0);
        session.on_input("ok");

        assert_eq!(session.state(), SessionState::Complete);
        assert_matches!(session.result(), Some(r) if r.correct_characters == 2);
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn test_teardown_cancels_timer() {
        let mut h = started("hello", 30);
        let token = h.session.timer_token().unwrap();
        h.session.teardown();

        assert!(!h.session.tick(token));
    }
}
