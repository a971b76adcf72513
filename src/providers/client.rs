//! Shared HTTP agent. Subtitle translations are small and latency-bound, so
//! the global timeout is short; a request that slow is better retried by the
//! next finalize anyway.

use lazy_static::lazy_static;
use std::time::Duration;

lazy_static! {
    pub static ref UREQ_AGENT: ureq::Agent = {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(15)))
            .build();
        config.into()
    };
}
