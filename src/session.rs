//! Session context: one caption stream's worth of translation state.
//!
//! Settings, caption state, the cache, and the pending table all live behind
//! one explicit object instead of module-level globals, so two players (or
//! two tests) never share state.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::cache::store::CacheStore;
use crate::cache::TranslationCache;
use crate::config::{ProviderConfig, Scope, Settings};
use crate::orchestrator::{Orchestrator, ProviderLookup};
use crate::overlay::OverlaySink;
use crate::providers;
use crate::stability::{StabilityConfig, StabilityDetector};
use crate::timer::{self, TimerHandle};

/// Quiet period before dirty cache entries are written back to the store.
const FLUSH_QUIET_PERIOD: Duration = Duration::from_millis(1000);

struct SessionState {
    settings: Settings,
    detector: StabilityDetector,
    prefetch_timer: Option<TimerHandle>,
}

struct SessionInner {
    state: Mutex<SessionState>,
    cache: Arc<TranslationCache>,
    store: Arc<dyn CacheStore>,
    orchestrator: Orchestrator,
    flush_timer: Mutex<Option<TimerHandle>>,
    stability: StabilityConfig,
}

/// Owns every piece of mutable translation state for one caption stream and
/// wires the stability detector, cache, and orchestrator together.
pub struct TranslationSession {
    inner: Arc<SessionInner>,
}

impl TranslationSession {
    pub fn new(
        settings: Settings,
        overlay: Arc<dyn OverlaySink>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        Self::with_config(
            settings,
            overlay,
            store,
            StabilityConfig::default(),
            providers::provider_for,
        )
    }

    pub fn with_config(
        settings: Settings,
        overlay: Arc<dyn OverlaySink>,
        store: Arc<dyn CacheStore>,
        stability: StabilityConfig,
        lookup: ProviderLookup,
    ) -> Self {
        let cache = Arc::new(TranslationCache::new());
        let orchestrator =
            Orchestrator::with_lookup(cache.clone(), overlay, stability.hide_delay, lookup);
        let scope = settings.scope();

        let inner = Arc::new(SessionInner {
            state: Mutex::new(SessionState {
                settings,
                detector: StabilityDetector::new(stability.clone()),
                prefetch_timer: None,
            }),
            cache,
            store,
            orchestrator,
            flush_timer: Mutex::new(None),
            stability,
        });

        SessionInner::reload_scope(&inner, scope);
        Self { inner }
    }

    /// Push entry point for the caption source: the current concatenated
    /// caption text, or `None` when no caption is rendered. Call this on
    /// every change notification.
    pub fn observe(&self, observation: Option<&str>) {
        let (outcome, scope, config) = {
            let mut state = self.inner.state.lock().unwrap();
            if !state.settings.enabled {
                return;
            }
            let outcome = state.detector.observe(observation);
            let scope = state.settings.scope();
            let config = state.settings.provider_config();
            (outcome, scope, config)
        };

        if outcome.cleared {
            // The caption the armed prefetch belonged to is gone.
            self.cancel_prefetch();
        }

        if let Some(text) = outcome.finalize {
            self.inner.orchestrator.set_active_text(Some(&text));
            let inner = self.inner.clone();
            thread::spawn(move || {
                SessionInner::request(&inner, &scope, &config, &text, false);
            });
        }

        if outcome.cleared {
            self.inner.orchestrator.schedule_hide();
        }

        if let Some(candidate) = outcome.prefetch {
            self.arm_prefetch(candidate);
        }
    }

    /// Translate `text` under the current settings without touching the
    /// overlay. Useful for warmup and for callers outside the caption flow.
    pub fn translate(&self, text: &str) -> Option<String> {
        let (scope, config) = {
            let state = self.inner.state.lock().unwrap();
            (state.settings.scope(), state.settings.provider_config())
        };
        SessionInner::request(&self.inner, &scope, &config, text, true)
    }

    /// Apply a settings snapshot. A change to the (provider, source, target)
    /// triple invalidates the cache scope; styling-only edits touch nothing.
    pub fn update_settings(&self, settings: Settings) {
        let (old_scope, new_scope, disabled) = {
            let mut state = self.inner.state.lock().unwrap();
            let old_scope = state.settings.scope();
            let new_scope = settings.scope();
            let disabled = !settings.enabled;
            state.settings = settings;
            (old_scope, new_scope, disabled)
        };

        if old_scope != new_scope {
            info!(
                "translation scope changed to {}/{}/{}; invalidating cache",
                new_scope.provider.as_str(),
                new_scope.source_lang,
                new_scope.target_lang
            );
            // Persist what the old scope accumulated before dropping it.
            self.cancel_flush();
            self.inner.flush_now(&old_scope);
            self.inner.cache.clear();
            SessionInner::reload_scope(&self.inner, new_scope);
        }

        if disabled {
            self.cancel_prefetch();
            self.inner.orchestrator.hide_now();
        }
    }

    /// Flip the enabled flag (the global shortcut). Returns the new value.
    pub fn toggle_enabled(&self) -> bool {
        let enabled = {
            let mut state = self.inner.state.lock().unwrap();
            state.settings.enabled = !state.settings.enabled;
            state.settings.enabled
        };
        if !enabled {
            self.cancel_prefetch();
            self.inner.orchestrator.hide_now();
        }
        enabled
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Settings {
        self.inner.state.lock().unwrap().settings.clone()
    }

    fn arm_prefetch(&self, text: String) {
        let inner = self.inner.clone();
        let handle = timer::schedule(self.inner.stability.debounce, move || {
            // Settings may have changed while the timer was pending; take a
            // fresh snapshot before going to the network.
            let (enabled, scope, config) = {
                let state = inner.state.lock().unwrap();
                (
                    state.settings.enabled,
                    state.settings.scope(),
                    state.settings.provider_config(),
                )
            };
            if enabled {
                SessionInner::request(&inner, &scope, &config, &text, true);
            }
        });

        let mut state = self.inner.state.lock().unwrap();
        if let Some(old) = state.prefetch_timer.take() {
            old.cancel();
        }
        state.prefetch_timer = Some(handle);
    }

    fn cancel_prefetch(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if let Some(old) = state.prefetch_timer.take() {
            old.cancel();
        }
    }

    fn cancel_flush(&self) {
        if let Some(old) = self.inner.flush_timer.lock().unwrap().take() {
            old.cancel();
        }
    }
}

impl SessionInner {
    /// One orchestrated translation plus write-back bookkeeping.
    fn request(
        inner: &Arc<Self>,
        scope: &Scope,
        config: &ProviderConfig,
        text: &str,
        is_prefetch: bool,
    ) -> Option<String> {
        let result = inner
            .orchestrator
            .request_translation(scope, config, text, is_prefetch);
        if result.is_some() {
            Self::schedule_flush(inner);
        }
        result
    }

    /// Debounced write-back: repeated results within the quiet period
    /// coalesce into a single store write.
    fn schedule_flush(inner: &Arc<Self>) {
        let worker = inner.clone();
        let handle = timer::schedule(FLUSH_QUIET_PERIOD, move || {
            let scope = worker.state.lock().unwrap().settings.scope();
            worker.flush_now(&scope);
        });
        let mut slot = inner.flush_timer.lock().unwrap();
        if let Some(old) = slot.take() {
            old.cancel();
        }
        *slot = Some(handle);
    }

    fn flush_now(&self, scope: &Scope) {
        if !self.cache.take_dirty() {
            return;
        }
        let entries = self.cache.scope_snapshot(scope);
        if let Err(err) = self.store.save_scope(scope, &entries) {
            warn!("cache flush failed: {:#}", err);
        }
    }

    /// Load the scope's persisted entries off-thread; results that landed in
    /// the meantime keep priority, and a scope change during the load makes
    /// it a no-op.
    fn reload_scope(inner: &Arc<Self>, scope: Scope) {
        let worker = inner.clone();
        thread::spawn(move || {
            let entries = match worker.store.load_scope(&scope) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("cache load failed: {:#}", err);
                    return;
                }
            };
            let state = worker.state.lock().unwrap();
            if state.settings.scope() != scope {
                return;
            }
            worker.cache.populate(&scope, entries);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryStore;
    use crate::config::{ProviderConfig, ProviderId};
    use crate::providers::{ProviderResult, TranslateProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingOverlay {
        events: Mutex<Vec<String>>,
    }

    impl RecordingOverlay {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn count(&self, event: &str) -> usize {
            self.events()
                .iter()
                .filter(|e| e.as_str() == event || e.starts_with(event))
                .count()
        }
    }

    impl OverlaySink for RecordingOverlay {
        fn show_loading(&self) {
            self.events.lock().unwrap().push("loading".to_string());
        }
        fn show_result(&self, text: &str) {
            self.events.lock().unwrap().push(format!("result:{}", text));
        }
        fn show_error(&self) {
            self.events.lock().unwrap().push("error".to_string());
        }
        fn hide(&self) {
            self.events.lock().unwrap().push("hide".to_string());
        }
    }

    struct EchoProvider {
        calls: AtomicUsize,
    }

    impl TranslateProvider for EchoProvider {
        fn translate(
            &self,
            text: &str,
            _source: &str,
            target: &str,
            _config: &ProviderConfig,
        ) -> ProviderResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{}]{}", target, text))
        }
    }

    // One static per test that reads call counts; tests run concurrently.
    static ECHO_SCENARIO: EchoProvider = EchoProvider {
        calls: AtomicUsize::new(0),
    };
    fn echo_scenario(_: ProviderId) -> &'static dyn TranslateProvider {
        &ECHO_SCENARIO
    }

    static ECHO_DUP: EchoProvider = EchoProvider {
        calls: AtomicUsize::new(0),
    };
    fn echo_dup(_: ProviderId) -> &'static dyn TranslateProvider {
        &ECHO_DUP
    }

    static ECHO_SCOPE: EchoProvider = EchoProvider {
        calls: AtomicUsize::new(0),
    };
    fn echo_scope(_: ProviderId) -> &'static dyn TranslateProvider {
        &ECHO_SCOPE
    }

    static ECHO_SEED: EchoProvider = EchoProvider {
        calls: AtomicUsize::new(0),
    };
    fn echo_seed(_: ProviderId) -> &'static dyn TranslateProvider {
        &ECHO_SEED
    }

    static ECHO_FLUSH: EchoProvider = EchoProvider {
        calls: AtomicUsize::new(0),
    };
    fn echo_flush(_: ProviderId) -> &'static dyn TranslateProvider {
        &ECHO_FLUSH
    }

    static ECHO_DISABLED: EchoProvider = EchoProvider {
        calls: AtomicUsize::new(0),
    };
    fn echo_disabled(_: ProviderId) -> &'static dyn TranslateProvider {
        &ECHO_DISABLED
    }

    static ECHO_HIDE: EchoProvider = EchoProvider {
        calls: AtomicUsize::new(0),
    };
    fn echo_hide(_: ProviderId) -> &'static dyn TranslateProvider {
        &ECHO_HIDE
    }

    fn test_config() -> StabilityConfig {
        StabilityConfig {
            debounce: Duration::from_millis(30),
            min_prefetch_chars: 5,
            hide_delay: Duration::from_millis(40),
        }
    }

    fn session(
        lookup: ProviderLookup,
        overlay: Arc<RecordingOverlay>,
        store: Arc<dyn CacheStore>,
    ) -> TranslationSession {
        TranslationSession::with_config(
            Settings {
                source_lang: "en".to_string(),
                target_lang: "zh-CN".to_string(),
                ..Settings::default()
            },
            overlay,
            store,
            test_config(),
            lookup,
        )
    }

    fn settle() {
        thread::sleep(Duration::from_millis(200));
    }

    #[test]
    fn growing_caption_translates_once_via_prefetch() {
        let overlay = RecordingOverlay::new();
        let s = session(echo_scenario, overlay.clone(), Arc::new(MemoryStore::default()));

        // Frames arrive faster than the debounce, so only the final prefetch
        // candidate survives to fire.
        s.observe(Some("Hel"));
        s.observe(Some("Hello"));
        s.observe(Some("Hello wor"));
        s.observe(Some("Hello world"));
        settle();
        s.observe(None);
        settle();

        // The prefetch warmed the cache; finalize displayed from it.
        assert_eq!(ECHO_SCENARIO.calls.load(Ordering::SeqCst), 1);
        assert_eq!(overlay.count("result:"), 1);
        assert!(overlay
            .events()
            .contains(&"result:[zh-CN]Hello world".to_string()));
    }

    #[test]
    fn duplicate_finalize_emits_one_display_sequence() {
        let overlay = RecordingOverlay::new();
        let s = session(echo_dup, overlay.clone(), Arc::new(MemoryStore::default()));

        s.observe(Some("Thanks"));
        s.observe(None);
        settle();
        s.observe(Some("Thanks"));
        s.observe(None);
        settle();

        assert_eq!(overlay.count("result:"), 1);
        assert_eq!(ECHO_DUP.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scope_change_invalidates_and_styling_change_does_not() {
        let overlay = RecordingOverlay::new();
        let s = session(echo_scope, overlay.clone(), Arc::new(MemoryStore::default()));

        assert_eq!(s.translate("hello").as_deref(), Some("[zh-CN]hello"));
        assert_eq!(ECHO_SCOPE.calls.load(Ordering::SeqCst), 1);

        // Same text, new target language: the old entry no longer applies.
        let mut settings = s.settings();
        settings.target_lang = "fr".to_string();
        s.update_settings(settings);

        assert_eq!(s.translate("hello").as_deref(), Some("[fr]hello"));
        assert_eq!(ECHO_SCOPE.calls.load(Ordering::SeqCst), 2);

        // Styling-only edit: cache stays warm.
        let mut settings = s.settings();
        settings.font_size = 2.4;
        s.update_settings(settings);

        assert_eq!(s.translate("hello").as_deref(), Some("[fr]hello"));
        assert_eq!(ECHO_SCOPE.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn persisted_entries_serve_without_network() {
        let store = Arc::new(MemoryStore::default());
        let scope = Scope {
            provider: ProviderId::Google,
            source_lang: "en".to_string(),
            target_lang: "zh-CN".to_string(),
        };
        store.seed(&scope, vec![("hello".to_string(), "你好".to_string())]);

        let overlay = RecordingOverlay::new();
        let s = session(echo_seed, overlay, store);
        // The initial scope load runs off-thread.
        settle();

        assert_eq!(s.translate("hello").as_deref(), Some("你好"));
        assert_eq!(ECHO_SEED.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn results_flush_to_the_store_after_quiet_period() {
        let store = Arc::new(MemoryStore::default());
        let overlay = RecordingOverlay::new();
        let s = session(echo_flush, overlay, store.clone());

        s.translate("hello");
        s.translate("world");
        thread::sleep(FLUSH_QUIET_PERIOD + Duration::from_millis(400));

        let scope = s.settings().scope();
        let mut persisted = store.load_scope(&scope).unwrap();
        persisted.sort();
        assert_eq!(
            persisted,
            vec![
                ("hello".to_string(), "[zh-CN]hello".to_string()),
                ("world".to_string(), "[zh-CN]world".to_string()),
            ]
        );
    }

    #[test]
    fn disabled_session_ignores_observations() {
        let overlay = RecordingOverlay::new();
        let s = session(echo_disabled, overlay.clone(), Arc::new(MemoryStore::default()));

        assert!(!s.toggle_enabled());
        s.observe(Some("Hello world"));
        s.observe(None);
        settle();

        assert_eq!(ECHO_DISABLED.calls.load(Ordering::SeqCst), 0);
        assert_eq!(overlay.count("result:"), 0);

        // Re-enabling picks captions back up.
        assert!(s.toggle_enabled());
        s.observe(Some("Hello again"));
        s.observe(None);
        settle();
        assert_eq!(overlay.count("result:"), 1);
    }

    #[test]
    fn caption_clear_schedules_overlay_hide() {
        let overlay = RecordingOverlay::new();
        let s = session(echo_hide, overlay.clone(), Arc::new(MemoryStore::default()));

        s.observe(Some("Short one"));
        s.observe(None);
        settle();
        assert!(overlay.events().contains(&"hide".to_string()));
    }
}
