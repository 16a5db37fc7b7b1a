use crate::global;
use crate::types::*;

use std::env;
use std::ffi::OsStr;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use log::debug;

pub type Builtin = fn(&mut global::State, &[Token], &mut dyn Write) -> Status;

/// Looked up in order, exact match on the name.
pub const BUILTINS: &[(&str, Builtin)] = &[
	("cd", builtin_cd),
	("exit", builtin_exit),
	("help", builtin_help),
];

pub fn builtin_cd(_: &mut global::State, argv: &[Token], _: &mut dyn Write) -> Status {
	let dir = match argv.get(1) {
		Some(dir) => PathBuf::from(OsStr::from_bytes(dir)),
		None => match env::var_os("HOME") {
			Some(home) => PathBuf::from(home),
			None => {
				eprintln!("mash: cd: HOME not set");
				return Status::Continue(1);
			},
		},
	};
	match env::set_current_dir(&dir) {
		Ok(()) => {
			debug!("cd {}", dir.display());
			Status::Continue(0)
		},
		Err(e) => {
			eprintln!("mash: cd: {}: {}", dir.display(), e);
			Status::Continue(1)
		},
	}
}

pub fn builtin_exit(state: &mut global::State, argv: &[Token], _: &mut dyn Write) -> Status {
	let arg = match argv.get(1) {
		Some(arg) => arg,
		None => return Status::Exit(state.last_status),
	};
	match std::str::from_utf8(arg).ok().and_then(|s| s.parse::<i32>().ok()) {
		Some(code) => Status::Exit(code),
		None => {
			eprintln!("mash: exit: {}: numeric argument required", String::from_utf8_lossy(arg));
			Status::Exit(2)
		},
	}
}

pub fn builtin_help(_: &mut global::State, _: &[Token], out: &mut dyn Write) -> Status {
	let mut write = || -> std::io::Result<()> {
		writeln!(out, "mash: a minimal shell")?;
		writeln!(out, "Type a command and its arguments, then hit enter.")?;
		writeln!(out, "Stages are joined with '|'; '<' and '>' redirect input and output.")?;
		writeln!(out, "The following commands are built in:")?;
		for &(name, _) in BUILTINS {
			writeln!(out, "  {}", name)?;
		}
		out.flush()
	};
	match write() {
		Ok(()) => Status::Continue(0),
		Err(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe => Status::Continue(128 + libc::SIGPIPE),
		Err(e) => {
			eprintln!("mash: help: {}", e);
			Status::Continue(1)
		},
	}
}

pub fn match_builtin(name: &[u8]) -> Option<Builtin> {
	BUILTINS.iter().find(|&&(label, _)| label.as_bytes() == name).map(|&(_, func)| func)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn argv(line: &str) -> Vec<Token> {
		line.split(' ').map(str::as_bytes).collect()
	}

	#[test]
	fn lookup_is_exact_and_case_sensitive() {
		assert!(match_builtin(b"cd").is_some());
		assert!(match_builtin(b"exit").is_some());
		assert!(match_builtin(b"help").is_some());
		assert!(match_builtin(b"CD").is_none());
		assert!(match_builtin(b"hel").is_none());
		assert!(match_builtin(b"").is_none());
	}

	#[test]
	fn help_lists_every_builtin() {
		let mut state = global::State::default();
		let mut out: Vec<u8> = vec![];
		assert_eq!(builtin_help(&mut state, &argv("help"), &mut out), Status::Continue(0));
		let text = String::from_utf8(out).unwrap();
		for &(name, _) in BUILTINS {
			assert!(text.lines().any(|l| l.trim() == name), "{} missing from {}", name, text);
		}
	}

	struct ClosedPipe;

	impl Write for ClosedPipe {
		fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
			Err(std::io::ErrorKind::BrokenPipe.into())
		}
		fn flush(&mut self) -> std::io::Result<()> {
			Err(std::io::ErrorKind::BrokenPipe.into())
		}
	}

	#[test]
	fn help_into_closed_pipe_is_quiet() {
		let mut state = global::State::default();
		let status = builtin_help(&mut state, &argv("help"), &mut ClosedPipe);
		assert_eq!(status, Status::Continue(128 + libc::SIGPIPE));
	}

	#[test]
	fn exit_defaults_to_last_status() {
		let mut state = global::State::default();
		state.last_status = 3;
		assert_eq!(builtin_exit(&mut state, &argv("exit"), &mut std::io::sink()), Status::Exit(3));
	}

	#[test]
	fn exit_with_code() {
		let mut state = global::State::default();
		assert_eq!(builtin_exit(&mut state, &argv("exit 42"), &mut std::io::sink()), Status::Exit(42));
		assert_eq!(builtin_exit(&mut state, &argv("exit x"), &mut std::io::sink()), Status::Exit(2));
	}

	#[test]
	fn cd_into_missing_dir_fails() {
		let mut state = global::State::default();
		let status = builtin_cd(&mut state, &argv("cd /definitely/not/a/dir"), &mut std::io::sink());
		assert_eq!(status, Status::Continue(1));
	}
}
