use std::rc::Rc;

use crate::{
	common::{Index, Name},
	document::Document,
	ir::syntax::{FixMember, Term},
};

/// Operations implemented natively by the evaluator.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Primitive {
	// Label, precedence, list of rendered arguments.
	RenderApplication,
	// Precedence, value.
	RenderNat,
	RenderString,
}

impl Primitive {
	pub fn arity(self) -> usize {
		match self {
			Self::RenderApplication => 3,
			Self::RenderNat | Self::RenderString => 2,
		}
	}
}

#[derive(Clone, Debug)]
pub enum Value {
	// Types are erased.
	Type,

	// Functions.
	Closure(Rc<Closure>),
	Fixpoint(Rc<Fixpoint>),
	Primitive(Primitive, Vec<Self>),

	// Constructor applications, parameters included.
	Construct { inductive: Name, index: usize, arguments: Vec<Self> },

	// Literals.
	Nat(u64),
	String(Rc<str>),
	Array(Rc<[Self]>),
	Document(Document),
}

#[derive(Clone, Debug)]
pub struct Closure {
	pub locals: Locals,
	pub body: Term,
}

#[derive(Clone, Debug)]
pub struct Fixpoint {
	pub locals: Locals,
	pub members: Rc<[FixMember]>,
	pub index: usize,
}

/// Values of the enclosing binders; the last one is index zero.
#[derive(Clone, Default, Debug)]
pub struct Locals(Vec<Value>);

impl Locals {
	pub fn lookup(&self, Index(index): Index) -> Option<&Value> {
		self.0.len().checked_sub(index + 1).and_then(|level| self.0.get(level))
	}

	pub fn with(&self, values: impl IntoIterator<Item = Value>) -> Self {
		let mut locals = self.clone();
		locals.0.extend(values);
		locals
	}

	pub fn len(&self) -> usize { self.0.len() }

	pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
