use crate::common::{programs, run_file};

/// Ensures every example declares, derives and renders without error, and that every check holds.
#[test]
fn run_examples() {
	for path in programs("tests/examples/programs") {
		let path_str = path.as_os_str().to_str().unwrap().to_owned();
		if let Err(error) = run_file(path) {
			panic!("{path_str}: {}", error.kind);
		}
	}
}
