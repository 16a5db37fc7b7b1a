mod builtin;
mod config;
mod eval;
mod global;
mod job;
mod logging;
mod parser;
mod prompt;
mod redirect;
mod search;
mod types;

use std::io;
use std::process;
use io::Write;
use io::BufRead;
use log::debug;

use types::Status;

fn run(state: &mut global::State) -> i32 {
	let mut stdout = io::stdout();
	let stdin = io::stdin();
	let mut stdin_locked = stdin.lock();
	loop {
		let _ = stdout.write_all(prompt::current().as_bytes());
		let _ = stdout.flush();
		let mut line: Vec<u8> = vec![];
		match stdin_locked.read_until(b'\n', &mut line) {
			Ok(0) => {
				debug!("end of input");
				return state.last_status;
			},
			Ok(_) => {},
			Err(e) => {
				eprintln!("mash: {}", e);
				return state.last_status;
			},
		}
		let pipeline = parser::parse(&line);
		match eval::eval(state, &pipeline) {
			Status::Continue(code) => state.last_status = code,
			Status::Exit(code) => return code,
		}
	}
}

fn main() {
	let config = config::Config::load();
	logging::init(&config.logging);
	let mut state = global::State::new();
	let code = run(&mut state);
	let _ = io::stdout().flush();
	process::exit(code)
}
