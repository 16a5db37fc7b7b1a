use crate::config;

use std::env;
use std::fs::OpenOptions;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger};

const LOG_ENV: &str = "MASH_LOG";

fn parse_level(s: &str) -> Option<LevelFilter> {
	s.trim().parse().ok()
}

/// `$MASH_LOG` wins over the configured level.
pub fn level(config: &config::Logging) -> LevelFilter {
	env::var(LOG_ENV).ok().and_then(|v| parse_level(&v))
		.or_else(|| parse_level(&config.level))
		.unwrap_or(LevelFilter::Warn)
}

/// Logs go to the configured file, or to stderr. Failure to set up a logger
/// is reported once and otherwise ignored.
pub fn init(config: &config::Logging) {
	let level = level(config);
	let log_config = ConfigBuilder::new()
		.set_time_level(LevelFilter::Debug)
		.set_thread_level(LevelFilter::Off)
		.build();
	let result = match config.file {
		Some(ref path) => match OpenOptions::new().create(true).append(true).open(path) {
			Ok(file) => WriteLogger::init(level, log_config, file),
			Err(e) => {
				eprintln!("mash: log file {}: {}", path.display(), e);
				TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto)
			},
		},
		None => TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto),
	};
	if let Err(e) = result {
		eprintln!("mash: logger: {}", e);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_level_names() {
		assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
		assert_eq!(parse_level(" WARN "), Some(LevelFilter::Warn));
		assert_eq!(parse_level("off"), Some(LevelFilter::Off));
		assert_eq!(parse_level("chatty"), None);
	}

	#[test]
	fn bad_configured_level_falls_back_to_warn() {
		if env::var_os(LOG_ENV).is_some() {
			return;
		}
		let logging = config::Logging { level: "chatty".to_string(), file: None };
		assert_eq!(level(&logging), LevelFilter::Warn);
	}
}
