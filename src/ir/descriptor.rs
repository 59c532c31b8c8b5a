use std::{collections::HashMap, rc::Rc};

use lasso::Rodeo;

use crate::{
	common::{Label, Name},
	ir::{
		semantics::Primitive,
		syntax::{Sort, Term},
	},
	prelude::Prelude,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Finiteness {
	Inductive,
	// A single non-recursive constructor with named fields.
	Record,
	CoInductive,
}

// The type lives under one binder for each earlier entry (and for whatever the telescope extends).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Entry {
	pub label: Label,
	pub ty: Term,
}

impl Entry {
	pub fn new(label: Label, ty: Term) -> Self { Self { label, ty } }
}

pub type Telescope = Vec<Entry>;

#[derive(Clone, Debug)]
pub struct ConstructorDescriptor {
	pub name: Name,
	// Scoped under the parameters of the type.
	pub arguments: Telescope,
	// Scoped under the parameters and the arguments.
	pub indices: Vec<Term>,
}

#[derive(Clone, Debug)]
pub struct TypeDescriptor {
	pub name: Name,
	pub parameters: Telescope,
	// Scoped under the parameters.
	pub indices: Telescope,
	pub sort: Sort,
	pub finiteness: Finiteness,
	pub constructors: Vec<ConstructorDescriptor>,
	// Every type declared in the same mutual block, including this one.
	pub group: Box<[Name]>,
}

impl TypeDescriptor {
	/// Decides whether any constructor argument mentions the type itself.
	pub fn is_recursive(&self) -> bool {
		self.constructors
			.iter()
			.flat_map(|constructor| constructor.arguments.iter())
			.any(|argument| argument.ty.mentions_inductive(self.name))
	}

	/// Decides whether the parameter at `index` ranges over types, and so takes a printer.
	pub fn is_type_parameter(&self, index: usize) -> bool {
		matches!(self.parameters.get(index), Some(Entry { ty: Term::Sort(_), .. }))
	}
}

#[derive(Clone, Debug)]
pub enum Definition {
	Term(Term),
	Primitive(Primitive),
}

#[derive(Clone, Debug)]
pub enum Global {
	Inductive(Rc<TypeDescriptor>),
	Constructor { inductive: Name, index: usize },
	Constant(Rc<Definition>),
}

/// Global declarations visible to derivation and evaluation.
pub struct Environment {
	globals: HashMap<Name, Global>,
	prelude: Prelude,
}

impl Environment {
	/// Creates an environment holding only the prelude.
	pub fn new(interner: &mut Rodeo) -> Self {
		let prelude = Prelude::new(interner);
		let mut environment = Self { globals: HashMap::new(), prelude };
		for descriptor in environment.prelude.inductives() {
			environment.declare(descriptor);
		}
		for (name, definition) in environment.prelude.constants() {
			environment.define(name, definition);
		}
		environment
	}

	pub fn prelude(&self) -> &Prelude { &self.prelude }

	pub fn lookup(&self, name: Name) -> Option<&Global> { self.globals.get(&name) }

	pub fn contains(&self, name: Name) -> bool { self.globals.contains_key(&name) }

	pub fn inductive(&self, name: Name) -> Option<&TypeDescriptor> {
		match self.globals.get(&name)? {
			Global::Inductive(descriptor) => Some(descriptor),
			_ => None,
		}
	}

	pub fn constructor(&self, inductive: Name, index: usize) -> Option<&ConstructorDescriptor> {
		self.inductive(inductive)?.constructors.get(index)
	}

	pub fn definition(&self, name: Name) -> Option<&Definition> {
		match self.globals.get(&name)? {
			Global::Constant(definition) => Some(definition),
			_ => None,
		}
	}

	/// Adds a type and its constructors; callers check for clashes beforehand.
	pub fn declare(&mut self, descriptor: TypeDescriptor) {
		for (index, constructor) in descriptor.constructors.iter().enumerate() {
			self.globals.insert(constructor.name, Global::Constructor { inductive: descriptor.name, index });
		}
		self.globals.insert(descriptor.name, Global::Inductive(Rc::new(descriptor)));
	}

	pub fn define(&mut self, name: Name, definition: Definition) {
		self.globals.insert(name, Global::Constant(Rc::new(definition)));
	}

	/// Splits an applied type into its family (the head applied to its parameters) and its indices.
	pub fn split_family<'t>(&self, ty: &'t Term) -> (Term, &'t [Term]) {
		if let Some((name, arguments)) = ty.as_inductive() {
			if let Some(descriptor) = self.inductive(name) {
				let parameters = descriptor.parameters.len().min(arguments.len());
				let (parameters, indices) = arguments.split_at(parameters);
				return (Term::apply(Term::Inductive(name), parameters.iter().cloned()), indices);
			}
		}
		(ty.clone(), &[])
	}
}
