use crate::{
	common::Name,
	ir::{descriptor::Finiteness, syntax::Sort},
	registry::Locality,
};

// Ranges are in tokens, from the first token to one past the last.
pub type Range = (usize, usize);

#[derive(Debug, Clone)]
pub struct Expression {
	pub range: Range,
	pub preterm: Preterm,
}

#[derive(Debug, Clone)]
pub enum Preterm {
	Variable(Name),
	Sort(Sort),
	Number(u64),
	String(String),

	// Dependent functions.
	Pi { parameters: Vec<ParsedBinder>, codomain: Box<Expression> },
	Arrow { domain: Box<Expression>, codomain: Box<Expression> },
	Lambda { parameters: Vec<ParsedBinder>, body: Box<Expression> },
	Call { callee: Box<Expression>, arguments: Vec<Expression> },
}

impl Preterm {
	pub fn at(self, range: Range) -> Expression { Expression { range, preterm: self } }
}

#[derive(Debug, Clone)]
pub struct ParsedBinder {
	pub range: Range,
	pub name: Name,
	pub ty: Expression,
}

#[derive(Debug, Clone)]
pub struct ParsedConstructor {
	pub range: Range,
	pub name: Name,
	pub arguments: Vec<ParsedBinder>,
	// The type constructed, when it carries indices.
	pub result: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct ParsedInductive {
	pub range: Range,
	pub name: Name,
	pub parameters: Vec<ParsedBinder>,
	pub arity: Expression,
	pub constructors: Vec<ParsedConstructor>,
}

#[derive(Debug, Clone)]
pub enum Command {
	// A block of types declared together; records are always alone.
	Declare { finiteness: Finiteness, block: Vec<ParsedInductive> },
	Derive { name: Name, locality: Locality },
	Show { expression: Expression, ty: Expression },
	Check { expression: Expression, ty: Expression, expected: String },
}

#[derive(Debug, Clone)]
pub struct ParsedCommand {
	pub range: Range,
	pub command: Command,
}

#[derive(Debug, Clone)]
pub struct ParsedProgram {
	pub commands: Vec<ParsedCommand>,
}
