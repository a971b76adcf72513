//! Console harness: feed caption frames from stdin, watch display events.
//!
//! Each input line is treated as one caption snapshot; a blank line means the
//! caption disappeared. Useful for exercising the translation pipeline
//! without a video player. `RUST_LOG=debug` shows the orchestration.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use subflow::cache::store::{CacheStore, MemoryStore, SqliteStore};
use subflow::config::{load_settings, save_settings};
use subflow::overlay::OverlaySink;
use subflow::session::TranslationSession;

struct ConsoleOverlay;

impl OverlaySink for ConsoleOverlay {
    fn show_loading(&self) {
        println!("  [...]");
    }

    fn show_result(&self, text: &str) {
        println!("  >> {}", text);
    }

    fn show_error(&self) {
        println!("  !! translation failed");
    }

    fn hide(&self) {
        println!("  --");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = load_settings();
    // Materialize the file with defaults on first run so there is something
    // to edit.
    save_settings(&settings);

    let store: Arc<dyn CacheStore> = match SqliteStore::open_default() {
        Ok(store) => Arc::new(store),
        Err(err) => {
            log::warn!("cache store unavailable, running in-memory: {:#}", err);
            Arc::new(MemoryStore::default())
        }
    };

    let session = TranslationSession::new(settings.clone(), Arc::new(ConsoleOverlay), store);

    println!(
        "subflow: translating {} -> {} via {}",
        settings.source_lang,
        settings.target_lang,
        settings.translator.as_str()
    );
    println!("type caption frames; a blank line clears the caption; Ctrl-D exits");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            session.observe(None);
        } else {
            session.observe(Some(text));
        }
    }

    // Flush the last caption and give its request a moment to settle.
    session.observe(None);
    std::thread::sleep(Duration::from_secs(2));
    Ok(())
}
