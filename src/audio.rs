use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, warn};
use thiserror::Error;

/// Feedback cues fired by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "camelCase")]
pub enum Cue {
    KeyPress,
    KeyError,
    Countdown,
    TestComplete,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    Unavailable(String),
    #[error("failed to play cue: {0}")]
    Io(#[from] io::Error),
}

/// Something that can play a cue
pub trait CueSink {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError>;
}

/// Rings the terminal bell for cues that deserve attention.
/// Key presses stay silent.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> CueSink for TerminalBell<W> {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
        match cue {
            Cue::KeyPress => Ok(()),
            Cue::KeyError | Cue::Countdown | Cue::TestComplete => {
                self.out.write_all(b"\x07")?;
                self.out.flush()?;
                Ok(())
            }
        }
    }
}

/// Records cues instead of playing them. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CueRecorder {
    played: Rc<RefCell<Vec<Cue>>>,
}

impl CueRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Cue> {
        self.played.borrow().clone()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.played.borrow().iter().filter(|c| **c == cue).count()
    }
}

impl CueSink for CueRecorder {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
        self.played.borrow_mut().push(cue);
        Ok(())
    }
}

type SinkFactory = Box<dyn Fn() -> Result<Box<dyn CueSink>, AudioError>>;

/// Owned audio resource for a session.
///
/// The sink is opened on the first cue and dropped by `dispose`. Failures
/// are logged and swallowed so they never reach session logic.
pub struct AudioHandle {
    enabled: bool,
    factory: SinkFactory,
    sink: Option<Box<dyn CueSink>>,
}

impl AudioHandle {
    pub fn new<F>(enabled: bool, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn CueSink>, AudioError> + 'static,
    {
        Self {
            enabled,
            factory: Box::new(factory),
            sink: None,
        }
    }

    pub fn terminal_bell(enabled: bool) -> Self {
        Self::new(enabled, || Ok(Box::new(TerminalBell::stdout())))
    }

    pub fn silent() -> Self {
        Self::new(false, || {
            Err(AudioError::Unavailable("audio disabled".to_string()))
        })
    }

    pub fn with_sink<S: CueSink + Clone + 'static>(enabled: bool, sink: S) -> Self {
        Self::new(enabled, move || Ok(Box::new(sink.clone())))
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }

    pub fn play(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }

        if self.sink.is_none() {
            match (self.factory)() {
                Ok(sink) => {
                    debug!("audio sink opened");
                    self.sink = Some(sink);
                }
                Err(e) => {
                    warn!("unable to open audio sink: {e}");
                    return;
                }
            }
        }

        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.play(cue) {
                warn!("cue {cue} failed: {e}");
            }
        }
    }

    pub fn dispose(&mut self) {
        if self.sink.take().is_some() {
            debug!("audio sink disposed");
        }
    }
}

impl fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioHandle")
            .field("enabled", &self.enabled)
            .field("open", &self.sink.is_some())
            .finish()
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
