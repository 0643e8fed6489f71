//! log macro's for simulation logging

/// Writes a debug! message to the app::sim logger
#[macro_export]
macro_rules! sim_debug {
    ($($arg:tt)+) => {
        log::debug!(target: "app::sim", $($arg)+)
    };
}

/// Writes an info! message to the app::sim logger
#[macro_export]
macro_rules! sim_info {
    ($($arg:tt)+) => {
        log::info!(target: "app::sim", $($arg)+)
    };
}

/// Writes an warn! message to the app::sim logger
#[macro_export]
macro_rules! sim_warn {
    ($($arg:tt)+) => {
        log::warn!(target: "app::sim", $($arg)+)
    };
}

/// Writes an error! message to the app::sim logger
#[macro_export]
macro_rules! sim_error {
    ($($arg:tt)+) => {
        log::error!(target: "app::sim", $($arg)+)
    };
}
