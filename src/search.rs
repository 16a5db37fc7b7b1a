use std::env;
use std::ffi::{CString, OsStr};
use std::path::{Path, PathBuf};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use nix::unistd::{self, AccessFlags};

const PATH_KEY: &str = "PATH";

fn is_executable(path: &Path) -> bool {
	path.is_file() && unistd::access(path, AccessFlags::X_OK).is_ok()
}

/// Names with a `/` are taken as paths; anything else is looked up in
/// each `$PATH` entry in order.
pub fn lookup_in(search_paths: &OsStr, name: &[u8]) -> Option<CString> {
	if name.is_empty() {
		return None;
	}
	let found = if name.contains(&b'/') {
		let path = PathBuf::from(OsStr::from_bytes(name));
		if is_executable(&path) { Some(path) } else { None }
	} else {
		env::split_paths(search_paths)
			.map(|dir| dir.join(OsStr::from_bytes(name)))
			.find(|path| is_executable(path))
	};
	found.and_then(|path| CString::new(path.into_os_string().into_vec()).ok())
}

pub fn lookup(name: &[u8]) -> Option<CString> {
	let search_paths = env::var_os(PATH_KEY).unwrap_or_default();
	lookup_in(&search_paths, name)
}
