use crate::types::*;

use std::{error, fmt, fs, io};
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::IntoRawFd;
use nix::unistd;

/// rw for owner and group on newly created output files.
const CREATE_MODE: u32 = 0o660;

#[derive(Debug)]
pub enum RedirectError {
	MissingOperand(RedirectType),
	Duplicate(RedirectType),
	Open { path: String, source: io::Error },
	Bind(nix::Error),
}

impl From<nix::Error> for RedirectError {
	fn from(e: nix::Error) -> RedirectError {
		RedirectError::Bind(e)
	}
}

impl fmt::Display for RedirectError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			RedirectError::MissingOperand(typ) => write!(f, "syntax error: missing file after '{}'", typ),
			RedirectError::Duplicate(typ) => write!(f, "syntax error: more than one '{}' in one command", typ),
			RedirectError::Open { ref path, ref source } => write!(f, "{}: {}", path, source),
			RedirectError::Bind(ref e) => write!(f, "redirect: {}", e),
		}
	}
}

impl error::Error for RedirectError {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match *self {
			RedirectError::Open { ref source, .. } => Some(source),
			RedirectError::Bind(ref e) => Some(e),
			_ => None,
		}
	}
}

/// Pulls `<` / `>` and their operands out of a stage. Nothing is opened here;
/// the returned redirects are bound later by [`apply`] inside the child.
pub fn resolve<'a>(stage: &[Token<'a>]) -> Result<Command<'a>, RedirectError> {
	let mut command = Command { argv: Vec::with_capacity(stage.len()), redirects: vec![] };
	let mut tokens = stage.iter();
	while let Some(&token) = tokens.next() {
		let typ = match RedirectType::from_token(token) {
			Some(typ) => typ,
			None => {
				command.argv.push(token);
				continue;
			},
		};
		let &target = tokens.next().ok_or(RedirectError::MissingOperand(typ))?;
		if RedirectType::from_token(target).is_some() {
			return Err(RedirectError::MissingOperand(typ));
		}
		if command.redirects.iter().any(|r| r.typ == typ) {
			return Err(RedirectError::Duplicate(typ));
		}
		command.redirects.push(Redirect { target, typ });
	}
	Ok(command)
}

fn open(redirect: &Redirect) -> Result<fs::File, RedirectError> {
	let mut oopt = fs::OpenOptions::new();
	let _ = match redirect.typ {
		RedirectType::Input => oopt.read(true),
		RedirectType::Output => oopt.write(true).truncate(true).create(true).mode(CREATE_MODE),
	};
	oopt.open(OsStr::from_bytes(redirect.target)).map_err(|source| RedirectError::Open {
		path: String::from_utf8_lossy(redirect.target).into_owned(),
		source,
	})
}

/// Binds each redirect onto stdin/stdout of the calling process.
/// Only ever called in a forked child.
pub fn apply(redirects: &[Redirect]) -> Result<(), RedirectError> {
	for redirect in redirects {
		let fd = open(redirect)?.into_raw_fd();
		let to = match redirect.typ {
			RedirectType::Input => libc::STDIN_FILENO,
			RedirectType::Output => libc::STDOUT_FILENO,
		};
		if fd != to {
			unistd::dup2(fd, to)?;
			unistd::close(fd)?;
		}
	}
	Ok(())
}
