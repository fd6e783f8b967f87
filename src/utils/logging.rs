//! Conditional logging macros that check a module-level `ENABLE_LOGS` flag.
//!
//! A module opts in by declaring the flag next to its imports:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::log_warn;
//!
//! log_warn!("dropping malformed facial payload of turn {turn_id}");
//! ```

/// `log::info!` gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// `log::error!` gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

