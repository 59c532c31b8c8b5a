use lasso::Rodeo;

use crate::{
	common::{bind, Index, Name},
	ir::{
		descriptor::{ConstructorDescriptor, Definition, Entry, Finiteness, TypeDescriptor},
		semantics::Primitive,
		syntax::{Sort, Term},
	},
};

/// Names the derivation engine and the evaluator rely on.
#[derive(Clone, Debug)]
pub struct Prelude {
	// The rendering capability: `Repr A := Build_Repr { repr : Nat -> A -> Doc }`.
	pub repr: Name,
	pub build_repr: Name,
	pub repr_field: Name,

	pub doc: Name,
	pub nat: Name,
	pub string: Name,

	pub list: Name,
	pub nil: Name,
	pub cons: Name,

	pub render_application: Name,
	pub render_nat: Name,
	pub render_string: Name,

	pub repr_nat: Name,
	pub repr_string: Name,

	type_variable: Name,
	head: Name,
	tail: Name,
}

impl Prelude {
	pub fn new(interner: &mut Rodeo) -> Self {
		let mut name = |s: &str| interner.get_or_intern(s);
		Self {
			repr: name("Repr"),
			build_repr: name("Build_Repr"),
			repr_field: name("repr"),
			doc: name("Doc"),
			nat: name("Nat"),
			string: name("String"),
			list: name("list"),
			nil: name("nil"),
			cons: name("cons"),
			render_application: name("render_constructor_application"),
			render_nat: name("render_nat"),
			render_string: name("render_string"),
			repr_nat: name("repr_Nat"),
			repr_string: name("repr_String"),
			type_variable: name("A"),
			head: name("head"),
			tail: name("tail"),
		}
	}

	pub fn build_repr(&self) -> Term { Term::Constructor { inductive: self.repr, index: 0 } }

	/// The capability type `Repr family`.
	pub fn repr_of(&self, family: Term) -> Term { Term::apply(Term::Inductive(self.repr), [family]) }

	/// Projects the rendering function out of a dictionary.
	pub fn project_repr(&self, dictionary: Term) -> Term {
		Term::Project { record: self.repr, parameters: 1, field: 0, scrutinee: dictionary.into() }
	}

	/// Builds a `list Doc` literal from rendered documents.
	pub fn document_list(&self, documents: Vec<Term>) -> Term {
		let doc = Term::Inductive(self.doc);
		documents.into_iter().rev().fold(
			Term::apply(Term::Constructor { inductive: self.list, index: 0 }, [doc.clone()]),
			|tail, head| Term::apply(Term::Constructor { inductive: self.list, index: 1 }, [doc.clone(), head, tail]),
		)
	}

	pub(crate) fn inductives(&self) -> Vec<TypeDescriptor> {
		let opaque = |name| TypeDescriptor {
			name,
			parameters: Vec::new(),
			indices: Vec::new(),
			sort: Sort::Type(0),
			finiteness: Finiteness::Inductive,
			constructors: Vec::new(),
			group: [name].into(),
		};
		let ty = Term::Sort(Sort::Type(0));
		let arrow = |domain: Term, codomain: Term| Term::Product {
			domain: domain.into(),
			codomain: bind([None], codomain.lift(1, 0)),
		};

		vec![
			opaque(self.doc),
			opaque(self.nat),
			opaque(self.string),
			TypeDescriptor {
				name: self.list,
				parameters: vec![Entry::new(Some(self.type_variable), ty.clone())],
				indices: Vec::new(),
				sort: Sort::Type(0),
				finiteness: Finiteness::Inductive,
				constructors: vec![
					ConstructorDescriptor { name: self.nil, arguments: Vec::new(), indices: Vec::new() },
					ConstructorDescriptor {
						name: self.cons,
						arguments: vec![
							Entry::new(Some(self.head), Term::Bound(Index(0))),
							Entry::new(
								Some(self.tail),
								Term::apply(Term::Inductive(self.list), [Term::Bound(Index(1))]),
							),
						],
						indices: Vec::new(),
					},
				],
				group: [self.list].into(),
			},
			TypeDescriptor {
				name: self.repr,
				parameters: vec![Entry::new(Some(self.type_variable), ty)],
				indices: Vec::new(),
				sort: Sort::Type(0),
				finiteness: Finiteness::Record,
				constructors: vec![ConstructorDescriptor {
					name: self.build_repr,
					arguments: vec![Entry::new(
						Some(self.repr_field),
						arrow(
							Term::Inductive(self.nat),
							arrow(Term::Bound(Index(0)), Term::Inductive(self.doc)),
						),
					)],
					indices: Vec::new(),
				}],
				group: [self.repr].into(),
			},
		]
	}

	pub(crate) fn constants(&self) -> Vec<(Name, Definition)> {
		let instance = |ty: Name, render: Name| {
			Definition::Term(Term::apply(self.build_repr(), [Term::Inductive(ty), Term::Constant(render)]))
		};
		vec![
			(self.render_application, Definition::Primitive(Primitive::RenderApplication)),
			(self.render_nat, Definition::Primitive(Primitive::RenderNat)),
			(self.render_string, Definition::Primitive(Primitive::RenderString)),
			(self.repr_nat, instance(self.nat, self.render_nat)),
			(self.repr_string, instance(self.string, self.render_string)),
		]
	}

	/// The instances every session starts with, as `(type, instance)` pairs.
	pub fn instances(&self) -> [(Name, Name); 2] { [(self.nat, self.repr_nat), (self.string, self.repr_string)] }
}
