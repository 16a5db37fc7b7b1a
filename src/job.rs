use nix::errno::Errno;
use nix::unistd::{self, Pid};
use nix::sys::wait::{self, WaitStatus};
use log::{debug, warn};

pub trait WaitStatusExt {
	fn code(self) -> i32;
}

impl WaitStatusExt for WaitStatus {
	/// Shell-style exit code; death by signal N reads as 128 + N.
	fn code(self) -> i32 {
		match self {
			WaitStatus::Exited(_, code) => code,
			WaitStatus::Signaled(_, signal, _) => 128 + signal as i32,
			_ => 1,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Process {
	pub pid: Pid,
	pub status: WaitStatus,
}

/// One forked child per pipeline stage, in stage order.
#[derive(Debug, Default)]
pub struct Job {
	pub processes: Vec<Process>,
}

impl Job {
	/// Blocks until every child has terminated. Each pid is waited on by
	/// identity so unrelated children are never reaped here.
	pub fn wait(&mut self) {
		for pr in self.processes.iter_mut() {
			pr.status = loop {
				match wait::waitpid(pr.pid, None) {
					Ok(status @ WaitStatus::Exited(..)) | Ok(status @ WaitStatus::Signaled(..)) => break status,
					Ok(_) | Err(Errno::EINTR) => continue,
					Err(e) => {
						warn!("waitpid {}: {}", pr.pid, e);
						break WaitStatus::Exited(pr.pid, 1);
					},
				}
			};
			debug!("reaped {} with {:?}", pr.pid, pr.status);
		}
	}
}

#[derive(Debug)]
pub struct JobBuilder {
	imp: Job,
}

impl JobBuilder {
	pub fn new(size_hint: usize) -> JobBuilder {
		JobBuilder {
			imp: Job { processes: Vec::with_capacity(size_hint) }
		}
	}

	/// Forks and, in the parent, records the child.
	pub fn push_fork(&mut self) -> nix::Result<unistd::ForkResult> {
		let r = unsafe { unistd::fork() }?;
		if let unistd::ForkResult::Parent { child } = r {
			debug!("forked {}", child);
			self.imp.processes.push(Process { pid: child, status: WaitStatus::StillAlive });
		}
		Ok(r)
	}

	pub fn build(self) -> Job {
		self.imp
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use nix::sys::signal::Signal;

	#[test]
	fn exit_codes() {
		let pid = Pid::from_raw(1);
		assert_eq!(WaitStatus::Exited(pid, 0).code(), 0);
		assert_eq!(WaitStatus::Exited(pid, 127).code(), 127);
		assert_eq!(WaitStatus::Signaled(pid, Signal::SIGKILL, false).code(), 137);
	}

	#[test]
	fn waits_for_each_child() {
		let mut builder = JobBuilder::new(2);
		for code in [3, 5] {
			match builder.push_fork().unwrap() {
				unistd::ForkResult::Child => unsafe { libc::_exit(code) },
				unistd::ForkResult::Parent { .. } => {},
			}
		}
		let mut job = builder.build();
		job.wait();
		let codes: Vec<i32> = job.processes.iter().map(|pr| pr.status.code()).collect();
		assert_eq!(codes, [3, 5]);
	}
}
