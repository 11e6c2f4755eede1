//! Tracing setup for the CLI
//!
//! Log events go to stderr so command output on stdout stays scriptable.
//! `RUST_LOG` takes precedence over the level picked from the flags, e.g.
//! `RUST_LOG=bulkform::selection=debug`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default level for the given output flags
#[must_use]
pub const fn default_level(verbose: bool, quiet: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    }
}

/// Install the global subscriber
///
/// Calling it twice is harmless; the second call leaves the first subscriber
/// in place.
pub fn init(verbose: bool, quiet: bool) {
    let default = default_level(verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default.into()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false, false), Level::WARN);
        assert_eq!(default_level(true, false), Level::DEBUG);
        assert_eq!(default_level(false, true), Level::ERROR);
        assert_eq!(default_level(true, true), Level::DEBUG);
    }

    #[test]
    fn test_init_twice() {
        init(false, true);
        init(true, false);
    }
}
