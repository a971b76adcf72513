//! Caption stabilization: deciding when a noisy caption frame has settled.
//!
//! Caption text arrives as repeated snapshots of whatever is on screen:
//! fragments grow word by word, get re-rendered without change, and vanish
//! when the line is done. The detector classifies each snapshot against the
//! previous one and reports when a caption is final (translate and display)
//! versus still growing (worth a debounced prefetch at most).

use std::time::Duration;

/// Detector state: the possibly-still-growing caption and the last text that
/// was handed downstream.
#[derive(Default)]
pub struct CaptionState {
    pub current: String,
    pub last_emitted: String,
}

/// Tunables for the stabilization pass.
#[derive(Clone, Debug)]
pub struct StabilityConfig {
    /// Quiet period before a growing caption becomes a prefetch candidate.
    pub debounce: Duration,
    /// Prefetch candidates shorter than this are dropped; finalize is cheap
    /// enough to wait for when there is this little context.
    pub min_prefetch_chars: usize,
    /// Overlay auto-hide delay once captions disappear.
    pub hide_delay: Duration,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_prefetch_chars: 5,
            hide_delay: Duration::from_millis(2000),
        }
    }
}

/// What one observation asks the caller to do.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Caption that settled and should be translated for display.
    pub finalize: Option<String>,
    /// Text to (re)arm the debounced prefetch with. Re-arming replaces any
    /// previously armed candidate.
    pub prefetch: Option<String>,
    /// Captions disappeared: cancel the prefetch timer, arm the auto-hide.
    pub cleared: bool,
}

pub struct StabilityDetector {
    state: CaptionState,
    cfg: StabilityConfig,
}

impl StabilityDetector {
    pub fn new(cfg: StabilityConfig) -> Self {
        Self {
            state: CaptionState::default(),
            cfg,
        }
    }

    /// Classify one caption snapshot. `None` (or blank text) means no caption
    /// is currently rendered.
    pub fn observe(&mut self, observation: Option<&str>) -> Outcome {
        let text = observation.map(str::trim).filter(|t| !t.is_empty());

        let Some(text) = text else {
            if self.state.current.is_empty() {
                return Outcome::default();
            }
            let settled = std::mem::take(&mut self.state.current);
            return Outcome {
                finalize: self.emit(settled),
                prefetch: None,
                cleared: true,
            };
        };

        if self.state.current.is_empty() {
            self.state.current = text.to_string();
            return Outcome {
                prefetch: self.prefetch_candidate(),
                ..Outcome::default()
            };
        }

        if text == self.state.current {
            // Render churn without textual change.
            return Outcome::default();
        }

        if text.starts_with(&self.state.current) {
            self.state.current = text.to_string();
            return Outcome {
                prefetch: self.prefetch_candidate(),
                ..Outcome::default()
            };
        }

        // Unrelated replacement: the old caption is as settled as it gets.
        let settled = std::mem::replace(&mut self.state.current, text.to_string());
        Outcome {
            finalize: self.emit(settled),
            prefetch: self.prefetch_candidate(),
            cleared: false,
        }
    }

    /// Gate finalization on the duplicate-emission guard, updating the guard
    /// the moment the event fires so rapid repeats are always suppressed
    /// regardless of how long the translation takes.
    fn emit(&mut self, text: String) -> Option<String> {
        if text == self.state.last_emitted {
            return None;
        }
        self.state.last_emitted = text.clone();
        Some(text)
    }

    fn prefetch_candidate(&self) -> Option<String> {
        if self.state.current.chars().count() < self.cfg.min_prefetch_chars {
            None
        } else {
            Some(self.state.current.clone())
        }
    }

    pub fn last_emitted(&self) -> &str {
        &self.state.last_emitted
    }

    pub fn current(&self) -> &str {
        &self.state.current
    }
}
