use std::{fmt, rc::Rc};

use crate::common::{AnyBinder, Binder, Index, Label, Name};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sort {
	Prop,
	Set,
	Type(u32),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Literal {
	Nat(u64),
	String(Rc<str>),
	Array(Rc<[Literal]>),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Recursion {
	Fixpoint,
	CoFixpoint,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CaseInfo {
	pub inductive: Name,
	pub parameters: usize,
}

// The type is scoped outside the group; the body sees every member of the group.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FixMember {
	pub label: Label,
	pub ty: Term,
	pub body: Term,
	pub recursive_argument: usize,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Term {
	// Variables.
	Bound(Index),
	Free(Name),

	// Sorts.
	Sort(Sort),

	// Globals.
	Constant(Name),
	Inductive(Name),
	Constructor {
		inductive: Name,
		index: usize,
	},

	// Dependent functions.
	Apply {
		callee: Box<Self>,
		arguments: Vec<Self>,
	},
	Product {
		domain: Box<Self>,
		codomain: Binder<Box<Self>>,
	},
	Lambda {
		domain: Box<Self>,
		body: Binder<Box<Self>>,
	},

	// Let-expressions.
	Let {
		ty: Box<Self>,
		argument: Box<Self>,
		tail: Binder<Box<Self>>,
	},

	// Placeholders, filled in after synthesis.
	Hole {
		ty: Box<Self>,
	},

	// Records.
	Project {
		record: Name,
		parameters: usize,
		field: usize,
		scrutinee: Box<Self>,
	},

	// Pattern dispatch.
	Case {
		info: CaseInfo,
		scrutinee: Box<Self>,
		motive: AnyBinder<Box<Self>>,
		branches: Vec<AnyBinder<Self>>,
	},

	// Recursion.
	Fix {
		recursion: Recursion,
		members: Vec<FixMember>,
		index: usize,
	},

	// Literals.
	Literal(Literal),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TermKind {
	Bound,
	Free,
	Sort,
	Constant,
	Inductive,
	Constructor,
	Apply,
	Product,
	Lambda,
	Let,
	Hole,
	Project,
	Case,
	Fix,
	Literal,
}

impl fmt::Display for TermKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Bound => "bound variable",
			Self::Free => "free variable",
			Self::Sort => "sort",
			Self::Constant => "constant",
			Self::Inductive => "inductive type",
			Self::Constructor => "constructor",
			Self::Apply => "application",
			Self::Product => "product",
			Self::Lambda => "lambda",
			Self::Let => "let-expression",
			Self::Hole => "hole",
			Self::Project => "projection",
			Self::Case => "case split",
			Self::Fix => "fixpoint",
			Self::Literal => "literal",
		};
		write!(f, "{name}")
	}
}

impl Term {
	pub fn kind(&self) -> TermKind {
		match self {
			Self::Bound(_) => TermKind::Bound,
			Self::Free(_) => TermKind::Free,
			Self::Sort(_) => TermKind::Sort,
			Self::Constant(_) => TermKind::Constant,
			Self::Inductive(_) => TermKind::Inductive,
			Self::Constructor { .. } => TermKind::Constructor,
			Self::Apply { .. } => TermKind::Apply,
			Self::Product { .. } => TermKind::Product,
			Self::Lambda { .. } => TermKind::Lambda,
			Self::Let { .. } => TermKind::Let,
			Self::Hole { .. } => TermKind::Hole,
			Self::Project { .. } => TermKind::Project,
			Self::Case { .. } => TermKind::Case,
			Self::Fix { .. } => TermKind::Fix,
			Self::Literal(_) => TermKind::Literal,
		}
	}

	/// Applies `callee` to `arguments`, merging nested spines and dropping empty applications.
	pub fn apply(callee: Self, arguments: impl IntoIterator<Item = Self>) -> Self {
		let mut arguments = arguments.into_iter().peekable();
		if arguments.peek().is_none() {
			return callee;
		}
		match callee {
			Self::Apply { callee, arguments: mut prefix } => {
				prefix.extend(arguments);
				Self::Apply { callee, arguments: prefix }
			}
			callee => Self::Apply { callee: callee.into(), arguments: arguments.collect() },
		}
	}

	pub fn nat(n: u64) -> Self { Self::Literal(Literal::Nat(n)) }

	pub fn string(s: &str) -> Self { Self::Literal(Literal::String(s.into())) }

	/// Splits an application into its head and arguments.
	pub fn spine(&self) -> (&Self, &[Self]) {
		match self {
			Self::Apply { callee, arguments } => (callee, arguments),
			head => (head, &[]),
		}
	}

	/// Returns the inductive type heading this term, with its arguments.
	pub fn as_inductive(&self) -> Option<(Name, &[Self])> {
		match self.spine() {
			(Self::Inductive(name), arguments) => Some((*name, arguments)),
			_ => None,
		}
	}
}
