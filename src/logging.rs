// ABOUTME: Structured logging initialization built on tracing-subscriber
// ABOUTME: Env-filter driven, init-once, safe to call from bins and tests alike
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! Logging infrastructure for the coaching engine.
//!
//! Configurable via the `RUST_LOG` environment variable; defaults to `info`
//! for this crate and `warn` for everything else. Initialization happens at
//! most once per process, so libraries embedding the engine can call
//! [`init`] without worrying about double registration.

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize structured logging for the process.
///
/// Safe to call multiple times; only the first call installs the subscriber.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,repcoach=info"));

        // try_init: some test harnesses install their own subscriber first
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    });
}
