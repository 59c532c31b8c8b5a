use std::str::Chars;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Token {
	Whitespace,
	Keyword(Keyword),
	Identifier,
	Number,
	String,
	LowDash,
	Pipe,
	Colon,
	ColonEqual,
	Semi,
	Period,
	Comma,
	Equal,
	ParenL,
	ParenR,
	CurlyL,
	CurlyR,
	Arrow,
	DoubleArrow,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Keyword {
	// Declarations.
	Inductive,
	CoInductive,
	Record,
	With,

	// Commands.
	Derive,
	Show,
	Check,

	// Localities.
	Local,
	Global,
	Export,

	// Terms.
	Forall,
	Fun,
	Prop,
	Set,
	Type,
}

pub struct LexError(pub usize, pub LexErrorKind);

pub enum LexErrorKind {
	UnrecognizedLexemePrefix,
	UnexpectedCharacter(&'static [char]),
	UnexpectedEnd(&'static [char]),
}

struct Scanner<'s> {
	len: usize,
	chars: Chars<'s>,
}

impl<'s> Scanner<'s> {
	pub fn new(source: &'s str) -> Self { Self { len: source.len(), chars: source.chars() } }

	pub fn position(&self) -> usize { self.len - self.chars.as_str().len() }

	pub fn next(&mut self) -> Option<(char, usize)> {
		let position = self.position();
		Some((self.chars.next()?, position))
	}

	pub fn pop(&mut self) -> Option<char> { self.chars.next() }

	pub fn peek(&mut self) -> Option<char> { self.chars.clone().next() }
}

pub struct LexedSource<'s> {
	pub source: &'s str,
	pub tokens: Box<[Token]>,
	pub ranges: Box<[(usize, usize)]>,
}

impl<'s> LexedSource<'s> {
	/// The byte range of the token at `index`, or the end of the source past the last token.
	pub fn range(&self, index: usize) -> (usize, usize) {
		self.ranges.get(index).copied().unwrap_or((self.source.len(), self.source.len() + 1))
	}
}

fn keyword_or_identifier(string: &str) -> Token {
	use Keyword::*;
	use Token::Keyword as K;
	match string {
		"inductive" => K(Inductive),
		"coinductive" => K(CoInductive),
		"record" => K(Record),
		"with" => K(With),

		"derive" => K(Derive),
		"show" => K(Show),
		"check" => K(Check),

		"local" => K(Local),
		"global" => K(Global),
		"export" => K(Export),

		"forall" => K(Forall),
		"fun" => K(Fun),
		"Prop" => K(Prop),
		"Set" => K(Set),
		"Type" => K(Type),

		_ => Token::Identifier,
	}
}

/// Splits a source string into tokens, keeping the byte range of each.
pub fn lex(source: &str) -> Result<LexedSource<'_>, LexError> {
	use LexErrorKind::*;
	use Token::*;
	let mut scanner = Scanner::new(source);
	let mut tokens = Vec::new();
	let mut ranges = Vec::new();
	while let Some((initial, start)) = scanner.next() {
		let token = match initial {
			' ' | '\n' | '\t' | '\r' => {
				while let Some(' ' | '\n' | '\t' | '\r') = scanner.peek() {
					scanner.pop();
				}
				Whitespace
			}
			'%' => {
				while let Some(c) = scanner.pop() {
					if c == '\n' {
						break;
					}
				}
				Whitespace
			}
			'a'..='z' | 'A'..='Z' => {
				while let Some('a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '\'') = scanner.peek() {
					scanner.pop();
				}
				keyword_or_identifier(&source[start..scanner.position()])
			}
			'0'..='9' => {
				while let Some('0'..='9') = scanner.peek() {
					scanner.pop();
				}
				Number
			}
			'"' => {
				const EXPECTED: [char; 1] = ['"'];
				loop {
					match scanner.pop() {
						Some('"') => break String,
						Some('\\') => {
							scanner.pop();
						}
						Some(_) => (),
						None => return Err(LexError(scanner.position(), UnexpectedEnd(&EXPECTED))),
					}
				}
			}
			'_' => LowDash,
			'|' => Pipe,
			':' =>
				if let Some('=') = scanner.peek() {
					scanner.pop();
					ColonEqual
				} else {
					Colon
				},
			';' => Semi,
			'.' => Period,
			',' => Comma,
			'=' =>
				if let Some('>') = scanner.peek() {
					scanner.pop();
					DoubleArrow
				} else {
					Equal
				},
			'(' => ParenL,
			')' => ParenR,
			'{' => CurlyL,
			'}' => CurlyR,
			'-' => {
				const EXPECTED: [char; 1] = ['>'];
				match scanner.pop() {
					Some('>') => Arrow,
					Some(_) => return Err(LexError(scanner.position() - 1, UnexpectedCharacter(&EXPECTED))),
					None => return Err(LexError(scanner.position(), UnexpectedEnd(&EXPECTED))),
				}
			}
			_ => return Err(LexError(start, UnrecognizedLexemePrefix)),
		};
		tokens.push(token);
		ranges.push((start, scanner.position()));
	}

	debug_assert!(tokens.len() == ranges.len());
	Ok(LexedSource { source, tokens: tokens.into_boxed_slice(), ranges: ranges.into_boxed_slice() })
}

/// Reads the contents of a string literal token, quotes included.
pub fn unescape(literal: &str) -> std::string::String {
	let mut contents = std::string::String::new();
	let mut chars = literal.trim_start_matches('"').strip_suffix('"').unwrap_or(literal).chars();
	while let Some(c) = chars.next() {
		match c {
			'\\' => match chars.next() {
				Some('n') => contents.push('\n'),
				Some('t') => contents.push('\t'),
				Some(c) => contents.push(c),
				None => (),
			},
			c => contents.push(c),
		}
	}
	contents
}
