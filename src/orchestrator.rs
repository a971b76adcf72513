//! Request orchestration: cache consult, request coalescing, provider
//! dispatch, and display events.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};

use crate::cache::{Lookup, TranslationCache, TranslationKey};
use crate::config::{ProviderConfig, ProviderId, Scope};
use crate::overlay::OverlaySink;
use crate::providers::{self, TranslateProvider};
use crate::timer::{self, TimerHandle};

/// Adapter lookup, swappable so tests can run without a network.
pub type ProviderLookup = fn(ProviderId) -> &'static dyn TranslateProvider;

pub struct Orchestrator {
    cache: Arc<TranslationCache>,
    overlay: Arc<dyn OverlaySink>,
    lookup: ProviderLookup,
    /// Caption the overlay is allowed to reflect next. Settled outcomes for
    /// anything else are cached but never surfaced (stale-result
    /// suppression: last completed wins only among results still wanted).
    active_text: Mutex<Option<String>>,
    /// Latest-wins slot for the overlay auto-hide.
    hide_timer: Mutex<Option<TimerHandle>>,
    hide_delay: Duration,
}

impl Orchestrator {
    pub fn new(
        cache: Arc<TranslationCache>,
        overlay: Arc<dyn OverlaySink>,
        hide_delay: Duration,
    ) -> Self {
        Self::with_lookup(cache, overlay, hide_delay, providers::provider_for)
    }

    pub fn with_lookup(
        cache: Arc<TranslationCache>,
        overlay: Arc<dyn OverlaySink>,
        hide_delay: Duration,
        lookup: ProviderLookup,
    ) -> Self {
        Self {
            cache,
            overlay,
            lookup,
            active_text: Mutex::new(None),
            hide_timer: Mutex::new(None),
            hide_delay,
        }
    }

    /// Mark `text` as the caption the overlay should reflect next.
    pub fn set_active_text(&self, text: Option<&str>) {
        *self.active_text.lock().unwrap() = text.map(str::to_string);
    }

    /// Translate `text` under the given scope/config snapshot.
    ///
    /// Display callers (`is_prefetch == false`) drive the overlay: `loading`
    /// when the call suspends on the network, then exactly one of
    /// `result`/`error` when it settles. Prefetch callers are silent and only
    /// warm the cache. Returns the translation when one became available.
    pub fn request_translation(
        &self,
        scope: &Scope,
        config: &ProviderConfig,
        text: &str,
        is_prefetch: bool,
    ) -> Option<String> {
        let key = TranslationKey::new(scope, text);

        match self.cache.lookup_or_claim(&key) {
            Lookup::Hit(hit) => {
                debug!("cache hit for {:?}", short(text));
                if !is_prefetch {
                    self.surface(&key, &Ok(hit.clone()));
                }
                Some(hit)
            }
            Lookup::InFlight(cell) => {
                debug!("joining in-flight request for {:?}", short(text));
                if !is_prefetch {
                    self.overlay.show_loading();
                }
                let outcome = cell.wait();
                if !is_prefetch {
                    self.surface(&key, &outcome);
                }
                outcome.ok()
            }
            Lookup::Miss(cell) => {
                if !is_prefetch {
                    self.overlay.show_loading();
                }

                let adapter = (self.lookup)(scope.provider);
                let outcome =
                    adapter.translate(text, &scope.source_lang, &scope.target_lang, config);
                if let Err(err) = &outcome {
                    warn!(
                        "translation via {} failed: {}",
                        scope.provider.as_str(),
                        err
                    );
                }

                // Settle order matters: the cache first so late joiners see
                // the entry, then the cell so waiters wake into a settled
                // world. The pending slot is gone either way.
                self.cache.settle(&key, &outcome);
                cell.settle(outcome.clone());

                if !is_prefetch {
                    self.surface(&key, &outcome);
                }
                outcome.ok()
            }
        }
    }

    /// Replace the auto-hide timer; the overlay hides once it fires.
    pub fn schedule_hide(&self) {
        let overlay = self.overlay.clone();
        let handle = timer::schedule(self.hide_delay, move || overlay.hide());
        let mut slot = self.hide_timer.lock().unwrap();
        if let Some(old) = slot.take() {
            old.cancel();
        }
        *slot = Some(handle);
    }

    /// Hide immediately, dropping any pending auto-hide.
    pub fn hide_now(&self) {
        if let Some(old) = self.hide_timer.lock().unwrap().take() {
            old.cancel();
        }
        self.overlay.hide();
    }

    /// Push a settled display outcome to the overlay unless a newer caption
    /// has replaced the one this request was issued for.
    fn surface(&self, key: &TranslationKey, outcome: &Result<String, providers::ProviderError>) {
        {
            let active = self.active_text.lock().unwrap();
            if active.as_deref() != Some(key.text.as_str()) {
                debug!("dropping stale result for {:?}", short(&key.text));
                return;
            }
        }
        match outcome {
            Ok(translated) => self.overlay.show_result(translated),
            Err(_) => {
                self.overlay.show_error();
                // Transient error indicator: clears itself like the
                // caption-gone path does.
                self.schedule_hide();
            }
        }
    }
}

fn short(text: &str) -> String {
    if text.chars().count() > 40 {
        let head: String = text.chars().take(37).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
