//! Utilities: logging setup (level from -v/-q, `RUST_LOG` override) and
//! monotonic timing.
//!
//! Key items:
//!   derive_level / init_logging
//!   Stopwatch

use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Instant;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Map CLI verbosity flags to a log level.
pub fn derive_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global stderr subscriber. Only the first call has an effect.
///
/// `RUST_LOG`, when set and valid, takes precedence over `level`.
pub fn init_logging(level: Level) {
    static INITIALISED: OnceLock<()> = OnceLock::new();

    INITIALISED.get_or_init(|| {
        let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
        let subscriber = fmt::fmt()
            .with_env_filter(filter)
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Elapsed-time helper for command output.
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(derive_level(3, true), Level::ERROR);
    }

    #[test]
    fn verbosity_steps() {
        assert_eq!(derive_level(0, false), Level::INFO);
        assert_eq!(derive_level(1, false), Level::DEBUG);
        assert_eq!(derive_level(2, false), Level::TRACE);
        assert_eq!(derive_level(9, false), Level::TRACE);
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(Level::ERROR);
        init_logging(Level::TRACE);
    }
}
