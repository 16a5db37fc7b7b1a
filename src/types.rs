use std::fmt;

/// A whitespace-free slice of the input line.
pub type Token<'a> = &'a [u8];

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectType { Input, Output }

impl RedirectType {
	pub fn operator(self) -> &'static str {
		match self {
			RedirectType::Input => "<",
			RedirectType::Output => ">",
		}
	}

	pub fn from_token(token: Token) -> Option<RedirectType> {
		match token {
			b"<" => Some(RedirectType::Input),
			b">" => Some(RedirectType::Output),
			_ => None,
		}
	}
}

impl fmt::Display for RedirectType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.operator())
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Redirect<'a> {
	pub target: Token<'a>,
	pub typ: RedirectType,
}

/// One stage after redirection resolution: the residual argument vector
/// (`argv[0]` is the command name) and the redirections it carries.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Command<'a> {
	pub argv: Vec<Token<'a>>,
	pub redirects: Vec<Redirect<'a>>,
}

/// Raw stages in left-to-right order. A stage may be empty.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Pipeline<'a> {
	pub stages: Vec<Vec<Token<'a>>>,
}

impl<'a> Pipeline<'a> {
	pub fn is_empty(&self) -> bool {
		self.stages.is_empty()
	}
}

/// Outcome of a built-in or of a whole pipeline.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
	Continue(i32),
	Exit(i32),
}

impl Status {
	pub fn code(self) -> i32 {
		match self {
			Status::Continue(c) | Status::Exit(c) => c,
		}
	}
}
