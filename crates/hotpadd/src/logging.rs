// Colorized wrappers for logging

use fern::Dispatch;

#[inline(always)]
pub fn format_log(message: &str) -> String {
    let now = chrono::Local::now().format("%Y.%m.%d %H:%M:%S").to_string();
    format!("[{now}] {message}")
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::error!("{}", message.bright_red());
    }
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::info!("{message}");
    }
}

#[macro_export]
macro_rules! print_debug {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::debug!("{}", message.dimmed());
    }
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::info!("{}", message.bright_yellow());
    }
}

/// Setup the logger.
///
/// Everything is written to stderr, keeping stdout free for a host process
/// that wraps the daemon. Dependencies stay capped at error level.
pub fn setup(level: log::LevelFilter, no_color: bool) {
    Dispatch::new()
        .level(log::LevelFilter::Error)
        .level_for("hotpadd", level)
        .chain(std::io::stderr())
        .apply()
        .expect("Unable to set up logger");

    if no_color {
        colored::control::set_override(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_log_keeps_message_after_timestamp() {
        let line = format_log("device connected");
        assert!(line.starts_with('['));
        assert!(line.ends_with("] device connected"));
    }
}
