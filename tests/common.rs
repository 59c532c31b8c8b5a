use std::{
	ffi::OsStr,
	fs,
	path::{Path, PathBuf},
};

use reprise::{
	ir::source::lex,
	op::parse::parse,
	session::{CommandError, Outcome, Session},
};

pub const EXTENSION: &str = "ind";

pub fn programs(directory: impl AsRef<Path>) -> impl Iterator<Item = PathBuf> {
	fs::read_dir(directory)
		.unwrap()
		.flatten()
		.map(|x| x.path())
		.filter(|x| x.extension() == Some(OsStr::new(EXTENSION)))
}

/// Runs `source` in `session`; the source itself must lex and parse.
pub fn run_in(session: &mut Session, source: &str) -> Result<Vec<Outcome>, CommandError> {
	let lexed_source = lex(source).ok().expect(source);
	let program = parse(&lexed_source, session.interner_mut()).expect(source);
	session.run(&program)
}

pub fn run_source(source: &str) -> (Session, Result<Vec<Outcome>, CommandError>) {
	let mut session = Session::new();
	let result = run_in(&mut session, source);
	(session, result)
}

pub fn run_file(path: PathBuf) -> Result<Vec<Outcome>, CommandError> {
	let path_str = path.as_os_str().to_str().unwrap().to_owned();
	let source = fs::read_to_string(path).expect(&path_str);
	run_source(&source).1
}
