//! # Runtime Configuration Module
//!
//! Environment-driven knobs for the coroutine runtime and the dispatch loop.
//!
//! ## Environment Variables
//!
//! ### `CHAINROUTE_STACK_SIZE`
//!
//! Stack size for the coroutines serving requests. Accepts decimal (`65536`)
//! or hexadecimal (`0x10000`). Default: `0x10000` (64 KB).
//!
//! Handler chains run on the request coroutine's stack, so long chains or
//! template rendering with deep includes need more than the minimal 16 KB.
//!
//! ### `CHAINROUTE_MAX_CHAIN`
//!
//! Upper bound on handler invocations per request. A chain that exceeds it is
//! aborted with a `500`. Default: `64`. `0` disables the guard.
//!
//! ## Usage
//!
//! ```rust
//! use chainroute::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use crate::dispatcher::DEFAULT_MAX_CHAIN;
use std::env;

/// Default coroutine stack size (64 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Loop guard for handler chains; `None` means unbounded
    pub max_chain: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            max_chain: Some(DEFAULT_MAX_CHAIN),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stack_size = lookup("CHAINROUTE_STACK_SIZE")
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);

        let max_chain = match lookup("CHAINROUTE_MAX_CHAIN").and_then(|val| parse_size(&val)) {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => Some(DEFAULT_MAX_CHAIN),
        };

        RuntimeConfig {
            stack_size,
            max_chain,
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
