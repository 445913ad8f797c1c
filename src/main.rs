//! Initializes WhisperWriter logging and prints the log file location.

use whisper_writer_logging::{get_log_path, install_exception_hook, setup};

fn main() {
    setup();
    install_exception_hook();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging initialized");

    println!("{}", get_log_path().display());
}
