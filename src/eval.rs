use crate::{builtin, global, job, redirect, search};
use crate::redirect::RedirectError;
use crate::types::*;

use std::{error, ffi, fmt, io};
use std::ffi::CString;
use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};
use io::Write;
use nix::fcntl::OFlag;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd;
use log::debug;

use crate::job::WaitStatusExt;

const FAILURE: i32 = 1;
const CANNOT_EXEC: i32 = 126;
const NOT_FOUND: i32 = 127;
const BROKEN_PIPE: i32 = 128 + libc::SIGPIPE;

#[derive(Debug)]
enum ExecError {
	NixError(nix::Error),
	IoError(io::Error),
	NulError(ffi::NulError),
	RedirectError(RedirectError),
}
impl From<nix::Error> for ExecError {
	fn from(e: nix::Error) -> ExecError {
		ExecError::NixError(e)
	}
}
impl From<io::Error> for ExecError {
	fn from(e: io::Error) -> ExecError {
		ExecError::IoError(e)
	}
}
impl From<ffi::NulError> for ExecError {
	fn from(e: ffi::NulError) -> ExecError {
		ExecError::NulError(e)
	}
}
impl From<RedirectError> for ExecError {
	fn from(e: RedirectError) -> ExecError {
		ExecError::RedirectError(e)
	}
}
impl fmt::Display for ExecError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			ExecError::NixError(ref e) => write!(f, "{}", e),
			ExecError::IoError(ref e) => write!(f, "{}", e),
			ExecError::NulError(ref e) => write!(f, "nul char in argument: {}", e),
			ExecError::RedirectError(ref e) => write!(f, "{}", e),
		}
	}
}
impl error::Error for ExecError {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match *self {
			ExecError::NixError(ref e) => Some(e),
			ExecError::IoError(ref e) => Some(e),
			ExecError::NulError(ref e) => Some(e),
			ExecError::RedirectError(ref e) => Some(e),
		}
	}
}
impl ExecError {
	fn exit_code(&self) -> i32 {
		match *self {
			ExecError::RedirectError(_) => FAILURE,
			_ => CANNOT_EXEC,
		}
	}
}

/// A stage after redirection resolution. Dropped stages are never spawned
/// and report the carried status.
#[derive(Debug)]
enum Stage<'a> {
	Run(Command<'a>),
	Skip(i32),
}

fn resolve_stages<'a>(pipeline: &Pipeline<'a>) -> Vec<Stage<'a>> {
	pipeline.stages.iter().enumerate().map(|(i, tokens)| {
		if tokens.is_empty() {
			debug!("stage {} is empty, skipping", i);
			return Stage::Skip(0);
		}
		match redirect::resolve(tokens) {
			Ok(ref command) if command.argv.is_empty() => {
				debug!("stage {} has no command, skipping", i);
				Stage::Skip(0)
			},
			Ok(command) => Stage::Run(command),
			Err(e) => {
				eprintln!("mash: {}", e);
				Stage::Skip(FAILURE)
			},
		}
	}).collect()
}

fn bind(fd: Option<RawFd>, to: RawFd) -> nix::Result<()> {
	if let Some(fd) = fd {
		unistd::dup2(fd, to)?;
	}
	Ok(())
}

fn do_exec_command(state: &mut global::State, command: &Command, pipe_in: Option<RawFd>, pipe_out: Option<RawFd>,
                   skip_match_builtin: bool) -> Result<i32, ExecError> {
	// the pipe ends themselves are O_CLOEXEC
	bind(pipe_in, libc::STDIN_FILENO)?;
	bind(pipe_out, libc::STDOUT_FILENO)?;
	redirect::apply(&command.redirects)?;

	let name = command.argv[0];
	if !skip_match_builtin {
		if let Some(builtin) = builtin::match_builtin(name) {
			let mut stdout = io::stdout();
			let status = builtin(state, &command.argv, &mut stdout);
			match stdout.flush() {
				Err(ref e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(BROKEN_PIPE),
				r => r?,
			}
			return Ok(status.code());
		}
	}
	let external = match search::lookup(name) {
		Some(e) => e,
		None => {
			eprintln!("mash: command not found: {}", String::from_utf8_lossy(name));
			return Ok(NOT_FOUND);
		}
	};
	let argv = command.argv.iter().map(|&s| CString::new(s)).collect::<Result<Vec<CString>, ffi::NulError>>()?;
	unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) }?;
	let e = match unistd::execv(&external, &argv) {
		Ok(never) => match never {},
		Err(e) => e,
	};
	debug!("execv {:?}: {}", external, e);
	eprintln!("mash: command not found: {}", String::from_utf8_lossy(name));
	Ok(CANNOT_EXEC)
}

/// Runs in the forked child and never returns into shell code.
fn exec_command(state: &mut global::State, command: &Command, pipe_in: Option<RawFd>, pipe_out: Option<RawFd>,
                skip_match_builtin: bool) -> ! {
	let r = do_exec_command(state, command, pipe_in, pipe_out, skip_match_builtin);
	let s = r.unwrap_or_else(|e| {
		eprintln!("mash: {}: {}", String::from_utf8_lossy(command.argv[0]), e);
		e.exit_code()
	});
	unsafe { libc::_exit(s) }
}

/// Forks one child per runnable stage, left to right, with stage i's stdout
/// piped into stage i+1's stdin. The parent closes each pipe end as soon as
/// the children that need it exist.
fn spawn_commands(state: &mut global::State, stages: &[Stage], skip_match_builtin: bool,
                  job_builder: &mut job::JobBuilder) -> nix::Result<()> {
	let mut pipe_stdin: Option<OwnedFd> = None;
	for (i, stage) in stages.iter().enumerate() {
		let is_last = i + 1 == stages.len();
		let (pipe_stdin_next, pipe_stdout) = if is_last {
			(None, None)
		} else {
			let (pipe_read, pipe_write) = unistd::pipe2(OFlag::O_CLOEXEC)?;
			(Some(pipe_read), Some(pipe_write))
		};
		if let Stage::Run(ref command) = *stage {
			match job_builder.push_fork()? {
				unistd::ForkResult::Parent { .. } => {},
				unistd::ForkResult::Child => {
					exec_command(state, command,
					             pipe_stdin.as_ref().map(|fd| fd.as_raw_fd()),
					             pipe_stdout.as_ref().map(|fd| fd.as_raw_fd()),
					             skip_match_builtin);
				},
			}
		}
		drop(pipe_stdout);
		pipe_stdin = pipe_stdin_next;
	}
	Ok(())
}

fn eval_pipeline(state: &mut global::State, stages: &[Stage]) -> Status {
	let mut skip_match_builtin = false;
	if let [Stage::Run(ref command)] = *stages {
		if command.redirects.is_empty() {
			if let Some(func) = builtin::match_builtin(command.argv[0]) {
				return func(state, &command.argv, &mut io::stdout());
			}
			skip_match_builtin = true;
		}
	}

	// children must not inherit unflushed prompt bytes
	let _ = io::stdout().flush();

	let mut job_builder = job::JobBuilder::new(stages.len());
	let spawned = match spawn_commands(state, stages, skip_match_builtin, &mut job_builder) {
		Ok(()) => true,
		Err(e) => {
			eprintln!("mash: {}", e);
			false
		},
	};
	let mut job = job_builder.build();
	job.wait();

	let code = match stages.last() {
		Some(&Stage::Skip(code)) => code,
		Some(&Stage::Run(_)) if spawned => job.processes.last().map_or(CANNOT_EXEC, |pr| pr.status.code()),
		_ => CANNOT_EXEC,
	};
	Status::Continue(code)
}

/// Runs one parsed line. An empty pipeline leaves the last status as is.
pub fn eval(state: &mut global::State, pipeline: &Pipeline) -> Status {
	if pipeline.is_empty() {
		return Status::Continue(state.last_status);
	}
	debug!("pipeline: {:?}", pipeline);
	let stages = resolve_stages(pipeline);
	let status = eval_pipeline(state, &stages);
	if let Status::Continue(code) = status {
		if code != 0 {
			debug!("pipeline exited with {}", code);
		}
	} else {
		debug!("exit requested with {}", status.code());
	}
	status
}
