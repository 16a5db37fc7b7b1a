/// Interpreter state that outlives a single line.
#[derive(Debug, Default)]
pub struct State {
	pub last_status: i32,
}

impl State {
	pub fn new() -> State {
		State { last_status: 0 }
	}
}
