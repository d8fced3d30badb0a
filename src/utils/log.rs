use colog::format::CologStyle;
use env_logger::Builder;
use log::{Level, LevelFilter};

struct CustomLevelTokens;

impl CologStyle for CustomLevelTokens {
    fn level_token(&self, level: &Level) -> &str {
        match *level {
            Level::Error => "ERR",
            Level::Warn => "WRN",
            Level::Info => "INF",
            Level::Debug => "DBG",
            Level::Trace => "TRC",
        }
    }
}

pub struct Logger;

impl Logger {
    /// Our own records at `level`, chatty dependencies held back to warnings.
    pub fn init(level: Option<LevelFilter>) {
        let level = level.unwrap_or(LevelFilter::Info);

        Builder::new()
            .filter(Some("ragchain"), level)
            .filter(Some("rig"), level.min(LevelFilter::Info))
            .filter(Some("qdrant_client"), LevelFilter::Warn)
            .filter(Some("reqwest"), LevelFilter::Warn)
            .filter(Some("hyper"), LevelFilter::Warn)
            .filter(Some("h2"), LevelFilter::Warn)
            .target(env_logger::Target::Stderr)
            .format(colog::formatter(CustomLevelTokens))
            .write_style(env_logger::WriteStyle::Auto)
            .init();
    }

    pub fn level_from_verbosity(verbose: u8, quiet: bool) -> LevelFilter {
        match verbose {
            0 if quiet => LevelFilter::Error,
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(Logger::level_from_verbosity(0, true), LevelFilter::Error);
        assert_eq!(Logger::level_from_verbosity(0, false), LevelFilter::Info);
        assert_eq!(Logger::level_from_verbosity(1, false), LevelFilter::Debug);
        assert_eq!(Logger::level_from_verbosity(3, true), LevelFilter::Trace);
    }
}
