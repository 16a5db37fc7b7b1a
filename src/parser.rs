use crate::types::*;

const PIPE: &[u8] = b"|";

struct Tokenizer<'a> {
	line: &'a [u8],
	i: usize,
}

impl<'a> Tokenizer<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_delimiter(c: u8) -> bool {
		matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x07)
	}

	fn skip_delimiters(&mut self) {
		self.proceed_while(Tokenizer::is_delimiter);
	}

	fn read_token(&mut self) -> Option<Token<'a>> {
		self.skip_delimiters();
		let orig = self.i;
		self.proceed_while(|c| !Tokenizer::is_delimiter(c));
		if orig == self.i {
			None
		} else {
			Some(&self.line[orig .. self.i])
		}
	}
}

impl<'a> Iterator for Tokenizer<'a> {
	type Item = Token<'a>;

	fn next(&mut self) -> Option<Token<'a>> {
		self.read_token()
	}
}

/// Splits a line on runs of space, tab, CR, LF and BEL.
pub fn tokenize(line: &[u8]) -> Vec<Token> {
	Tokenizer { line, i: 0 }.collect()
}

/// Partitions tokens on `|`. The separator itself never lands in a stage;
/// leading, trailing and doubled separators yield empty stages.
pub fn split_pipeline<'a>(tokens: &[Token<'a>]) -> Pipeline<'a> {
	if tokens.is_empty() {
		return Pipeline::default();
	}
	let stages = tokens.split(|&t| t == PIPE).map(|s| s.to_vec()).collect();
	Pipeline { stages }
}

pub fn parse(line: &[u8]) -> Pipeline {
	split_pipeline(&tokenize(line))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn strs(tokens: &[Token]) -> Vec<String> {
		tokens.iter().map(|t| String::from_utf8_lossy(t).into_owned()).collect()
	}

	#[test]
	fn tokenize_collapses_whitespace() {
		assert_eq!(strs(&tokenize(b"  ls  -la   /tmp ")), ["ls", "-la", "/tmp"]);
	}

	#[test]
	fn tokenize_all_delimiters() {
		assert_eq!(strs(&tokenize(b"a\tb\r\nc\x07d\n")), ["a", "b", "c", "d"]);
	}

	#[test]
	fn tokenize_blank_line() {
		assert!(tokenize(b"").is_empty());
		assert!(tokenize(b" \t \n").is_empty());
	}

	#[test]
	fn tokens_borrow_the_line() {
		let line = b"echo hi".to_vec();
		let tokens = tokenize(&line);
		assert_eq!(tokens[1].as_ptr(), line[5..].as_ptr());
	}

	#[test]
	fn split_two_stages() {
		let p = parse(b"ls | grep foo");
		assert_eq!(p.stages.len(), 2);
		assert_eq!(strs(&p.stages[0]), ["ls"]);
		assert_eq!(strs(&p.stages[1]), ["grep", "foo"]);
	}

	#[test]
	fn split_leading_pipe() {
		let p = parse(b"| ls");
		assert_eq!(p.stages.len(), 2);
		assert!(p.stages[0].is_empty());
		assert_eq!(strs(&p.stages[1]), ["ls"]);
	}

	#[test]
	fn split_malformed() {
		assert_eq!(parse(b"|").stages, vec![Vec::<Token>::new(), vec![]]);
		let p = parse(b"cmd1 | | cmd2");
		assert_eq!(p.stages.len(), 3);
		assert!(p.stages[1].is_empty());
	}

	#[test]
	fn split_empty_line() {
		assert!(parse(b"   \n").is_empty());
	}

	#[test]
	fn pipe_must_be_its_own_token() {
		let p = parse(b"echo a|b");
		assert_eq!(p.stages.len(), 1);
		assert_eq!(strs(&p.stages[0]), ["echo", "a|b"]);
	}
}
