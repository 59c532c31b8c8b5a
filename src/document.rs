use std::rc::Rc;

use unicode_width::UnicodeWidthStr;

/// Arguments rendered above this precedence are parenthesized.
pub const APPLICATION_PRECEDENCE: u64 = 10;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Document {
	Text(Rc<str>),
	// A space when laid out flat, a newline otherwise.
	Line,
	Concat(Vec<Self>),
	Group(Rc<Self>),
	// Continuation lines are indented relative to the column where the hang begins.
	Hang(usize, Rc<Self>),
}

pub fn text(s: impl Into<Rc<str>>) -> Document { Document::Text(s.into()) }

pub fn line() -> Document { Document::Line }

pub fn concat(documents: impl IntoIterator<Item = Document>) -> Document { Document::Concat(documents.into_iter().collect()) }

pub fn group(document: Document) -> Document { Document::Group(document.into()) }

pub fn hang(indent: usize, document: Document) -> Document { Document::Hang(indent, document.into()) }

pub fn parens_if(condition: bool, document: Document) -> Document {
	if condition {
		concat([text("("), document, text(")")])
	} else {
		document
	}
}

/// Renders a constructor applied to already-rendered arguments.
pub fn constructor_application(label: &str, arguments: Vec<Document>, precedence: u64) -> Document {
	if arguments.is_empty() {
		return text(label);
	}
	let mut parts = vec![text(label)];
	for argument in arguments {
		parts.push(line());
		parts.push(argument);
	}
	parens_if(precedence > APPLICATION_PRECEDENCE, hang(2, group(concat(parts))))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
	Flat,
	Break,
}

impl Document {
	/// Lays the document out within `width` columns where possible.
	pub fn render(&self, width: usize) -> String {
		let mut output = String::new();
		let mut column = 0;
		let mut stack = vec![(0, Mode::Break, self)];
		while let Some((indent, mode, document)) = stack.pop() {
			match document {
				Document::Text(s) => {
					output.push_str(s);
					column += s.width();
				}
				Document::Line => match mode {
					Mode::Flat => {
						output.push(' ');
						column += 1;
					}
					Mode::Break => {
						output.push('\n');
						output.extend(std::iter::repeat(' ').take(indent));
						column = indent;
					}
				},
				Document::Concat(documents) =>
					stack.extend(documents.iter().rev().map(|document| (indent, mode, document))),
				Document::Group(document) => {
					let mode = if mode == Mode::Flat || fits(width.saturating_sub(column), document, &stack) {
						Mode::Flat
					} else {
						Mode::Break
					};
					stack.push((indent, mode, document));
				}
				Document::Hang(extra, document) => stack.push((column + extra, mode, document)),
			}
		}
		output
	}
}

// Whether `document` laid out flat, followed by the rest of the line, takes at most `width` columns.
// The rest of the line is whatever `pending` prints before its next line break.
fn fits(mut width: usize, document: &Document, pending: &[(usize, Mode, &Document)]) -> bool {
	let mut items = vec![(Mode::Flat, document)];
	let mut rest = pending.iter().rev();
	loop {
		let (mode, document) = match items.pop() {
			Some(item) => item,
			None => match rest.next() {
				Some(&(_, mode, document)) => (mode, document),
				None => return true,
			},
		};
		let used = match document {
			Document::Text(s) => s.width(),
			Document::Line if mode == Mode::Break => return true,
			Document::Line => 1,
			Document::Concat(documents) => {
				items.extend(documents.iter().rev().map(|document| (mode, document)));
				0
			}
			Document::Group(document) | Document::Hang(_, document) => {
				items.push((mode, document));
				0
			}
		};
		match width.checked_sub(used) {
			Some(left) => width = left,
			None => return false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nullary_constructor_is_bare_label() {
		assert_eq!(constructor_application("A", vec![], 11).render(80), "A");
	}

	#[test]
	fn arguments_are_space_separated() {
		let document = constructor_application("MkRecord", vec![text("true"), text("false")], 0);
		assert_eq!(document.render(80), "MkRecord true false");
	}

	#[test]
	fn parenthesized_above_application_precedence() {
		let inner = constructor_application("Cons", vec![text("2"), text("Nil")], APPLICATION_PRECEDENCE + 1);
		let outer = constructor_application("Cons", vec![text("3"), inner], 0);
		assert_eq!(outer.render(80), "Cons 3 (Cons 2 Nil)");
	}

	#[test]
	fn hanging_indent_on_overflow() {
		let document = constructor_application("Pair", vec![text("aaaaaa"), text("bbbbbb")], 0);
		assert_eq!(document.render(10), "Pair\n  aaaaaa\n  bbbbbb");
	}

	#[test]
	fn closing_parenthesis_counts_toward_width() {
		let inner = constructor_application("Cons", vec![text("2"), text("Nil")], APPLICATION_PRECEDENCE + 1);
		let outer = constructor_application("Cons", vec![text("3"), inner], 0);
		let rendered = outer.render(13);
		assert_eq!(rendered, "Cons\n  3\n  (Cons\n     2\n     Nil)");
		assert!(rendered.lines().all(|line| line.len() <= 13));
	}
}
