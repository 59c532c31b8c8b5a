use peg::error::ParseError;
use unicode_width::UnicodeWidthStr;

use crate::{
	ir::{
		presyntax::Range,
		source::{LexError, LexErrorKind, LexedSource},
	},
	session::CommandError,
};

const TAB_WIDTH: usize = 3;

pub fn report_lex_error(source: &str, error: LexError) {
	let location = error.0;
	report_line_error(source, (location, location + 1), &format_lex_error(source, error))
}

pub fn report_parse_error(source: &LexedSource, error: ParseError<usize>) {
	let expected = error.expected.tokens().collect::<Vec<_>>().join(", ");
	report_line_error(source.source, source.range(error.location), &format!("parse error: expected one of: {expected}"));
}

pub fn report_command_error(source: &LexedSource, error: &CommandError) {
	report_line_error(source.source, byte_range(source, error.range), &error.kind.to_string());
}

// Token ranges run from the first token to one past the last.
fn byte_range(source: &LexedSource, (init, fini): Range) -> (usize, usize) {
	let start = source.range(init).0;
	let end = if fini > init { source.range(fini - 1).1 } else { start + 1 };
	(start, end.max(start + 1))
}

struct Location<'s> {
	line_number: usize,
	line: &'s str,
	column: usize,
}

// Past the end of the source, the location is the end of the last line.
fn locate(source: &str, offset: usize) -> Location<'_> {
	let mut start = 0;
	for (index, line) in source.split_inclusive('\n').enumerate() {
		if offset < start + line.len() {
			return Location { line_number: index + 1, line, column: offset - start };
		}
		start += line.len();
	}
	let line_number = source.split('\n').count();
	let line = source.rsplit('\n').next().unwrap_or_default();
	Location { line_number, line, column: line.len() }
}

fn visual(text: &str) -> String { text.replace('\t', &" ".repeat(TAB_WIDTH)) }

fn report_line_error(source: &str, range: (usize, usize), message: &str) {
	let Location { line_number, line, column } = locate(source, range.0);
	println!("[{line_number}:{column}] error: {message}");

	let offset = visual(&line[..column]).width();
	let end = (column + range.1.saturating_sub(range.0)).min(line.trim_end().len());
	let underlined = line.get(column..end).map_or(1, |s| visual(s).width());
	let gutter = line_number.to_string();
	let blank = " ".repeat(gutter.len());
	println!("{blank} |");
	println!("{gutter} | {}", visual(line).trim_end());
	println!("{blank} | {}{}", " ".repeat(offset), "^".repeat(underlined.max(1)));
}

fn format_lex_error(source: &str, LexError(location, kind): LexError) -> String {
	let quoted = |chars: &[char]| chars.iter().map(|c| format!("`{c}`")).collect::<Vec<_>>().join(", ");
	let found = source.get(location..).and_then(|rest| rest.chars().next()).map(char::escape_default);
	let found = found.map(|c| c.to_string()).unwrap_or_default();
	match kind {
		LexErrorKind::UnrecognizedLexemePrefix => format!("lex error: unrecognized lexeme prefix `{found}`"),
		LexErrorKind::UnexpectedCharacter(expected) =>
			format!("lex error: expected one of {}; found `{found}`", quoted(expected)),
		LexErrorKind::UnexpectedEnd(expected) =>
			format!("lex error: expected one of {}; found end of input", quoted(expected)),
	}
}
