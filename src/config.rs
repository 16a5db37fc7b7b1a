use serde::Deserialize;

use std::env;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "MASH_CONFIG";

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
	#[serde(default)]
	pub logging: Logging,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Logging {
	#[serde(default = "default_level")]
	pub level: String,
	#[serde(default)]
	pub file: Option<PathBuf>,
}

impl Default for Logging {
	fn default() -> Logging {
		Logging { level: default_level(), file: None }
	}
}

fn default_level() -> String {
	"warn".to_string()
}

impl Config {
	/// `$MASH_CONFIG`, else `~/.config/mash/config.toml`.
	pub fn path() -> Option<PathBuf> {
		if let Some(path) = env::var_os(CONFIG_ENV) {
			return Some(PathBuf::from(path));
		}
		let home = env::var_os("HOME")?;
		Some(Path::new(&home).join(".config/mash/config.toml"))
	}

	/// Missing file gives the defaults; a broken one is reported and ignored.
	pub fn load() -> Config {
		let path = match Config::path() {
			Some(path) => path,
			None => return Config::default(),
		};
		let content = match std::fs::read_to_string(&path) {
			Ok(content) => content,
			Err(_) => return Config::default(),
		};
		match Config::from_toml(&content) {
			Ok(config) => config,
			Err(e) => {
				eprintln!("mash: config parse error: {}: {}", path.display(), e);
				Config::default()
			},
		}
	}

	pub fn from_toml(content: &str) -> Result<Config, toml::de::Error> {
		toml::from_str(content)
	}
}
