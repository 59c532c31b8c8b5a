use crate::common::{programs, run_file};

#[test]
fn run_fail_tests() {
	for path in programs("tests/fail/programs") {
		let path_str = path.as_os_str().to_str().unwrap().to_owned();
		assert!(run_file(path).is_err(), "{path_str}");
	}
}
