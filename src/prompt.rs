use std::env;
use std::path::Path;

/// `-> <last component of cwd> `; the root directory shows as `/`.
pub fn render(cwd: &Path) -> String {
	let dir = match cwd.file_name() {
		Some(name) => name.to_string_lossy(),
		None => cwd.to_string_lossy(),
	};
	format!("-> {} ", dir)
}

pub fn current() -> String {
	match env::current_dir() {
		Ok(cwd) => render(&cwd),
		Err(_) => render(Path::new("?")),
	}
}
