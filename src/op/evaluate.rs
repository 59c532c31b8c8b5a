use std::rc::Rc;

use thiserror::Error;

use crate::{
	document::{constructor_application, text, Document},
	ir::{
		descriptor::{Definition, Environment},
		semantics::{Closure, Fixpoint, Locals, Primitive, Value},
		syntax::{Literal, Term},
	},
};

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum EvaluationError {
	#[error("index {0} is not bound")]
	UnboundIndex(usize),
	#[error("cannot evaluate a term with free variables")]
	FreeVariable,
	#[error("cannot evaluate an unresolved capability")]
	UnresolvedHole,
	#[error("case split is stuck on a {0}")]
	StuckCase(&'static str),
	#[error("projection is stuck on a {0}")]
	StuckProjection(&'static str),
	#[error("applied a {0}, which is not a function")]
	NotAFunction(&'static str),
	#[error("no definition for a constant")]
	UnknownConstant,
	#[error("primitive {0:?} received arguments of the wrong shape")]
	PrimitiveMismatch(Primitive),
	#[error("expected a document, found a {0}")]
	NotADocument(&'static str),
}

impl Value {
	fn describe(&self) -> &'static str {
		match self {
			Self::Type => "type",
			Self::Closure(_) | Self::Fixpoint(_) | Self::Primitive(..) => "function",
			Self::Construct { .. } => "constructor application",
			Self::Nat(_) => "number",
			Self::String(_) => "string",
			Self::Array(_) => "array",
			Self::Document(_) => "document",
		}
	}
}

/// A call-by-value evaluator for closed terms over a fixed environment.
pub struct Evaluator<'e> {
	environment: &'e Environment,
}

impl<'e> Evaluator<'e> {
	pub fn new(environment: &'e Environment) -> Self { Self { environment } }

	pub fn evaluate(&self, term: &Term) -> Result<Value, EvaluationError> { self.evaluate_in(term, &Locals::default()) }

	/// Evaluates `term` to a document.
	pub fn document(&self, term: &Term) -> Result<Document, EvaluationError> {
		match self.evaluate(term)? {
			Value::Document(document) => Ok(document),
			value => Err(EvaluationError::NotADocument(value.describe())),
		}
	}

	pub fn evaluate_in(&self, term: &Term, locals: &Locals) -> Result<Value, EvaluationError> {
		use Term as T;
		Ok(match term {
			// Variables.
			T::Bound(index) => locals.lookup(*index).cloned().ok_or(EvaluationError::UnboundIndex(index.0))?,
			T::Free(_) => return Err(EvaluationError::FreeVariable),

			// Types.
			T::Sort(_) | T::Product { .. } | T::Inductive(_) => Value::Type,

			// Globals.
			T::Constant(name) => match self.environment.definition(*name) {
				Some(Definition::Term(term)) => self.evaluate(term)?,
				Some(Definition::Primitive(primitive)) => Value::Primitive(*primitive, Vec::new()),
				None => return Err(EvaluationError::UnknownConstant),
			},
			T::Constructor { inductive, index } =>
				Value::Construct { inductive: *inductive, index: *index, arguments: Vec::new() },

			// Functions.
			T::Apply { callee, arguments } => {
				let callee = self.evaluate_in(callee, locals)?;
				let arguments =
					arguments.iter().map(|argument| self.evaluate_in(argument, locals)).collect::<Result<_, _>>()?;
				self.apply(callee, arguments)?
			}
			T::Lambda { body, .. } =>
				Value::Closure(Rc::new(Closure { locals: locals.clone(), body: (*body.body).clone() })),
			T::Let { argument, tail, .. } => {
				let argument = self.evaluate_in(argument, locals)?;
				self.evaluate_in(&tail.body, &locals.with([argument]))?
			}

			T::Hole { .. } => return Err(EvaluationError::UnresolvedHole),

			// Records.
			T::Project { parameters, field, scrutinee, .. } => match self.evaluate_in(scrutinee, locals)? {
				Value::Construct { arguments, .. } => arguments
					.get(parameters + field)
					.cloned()
					.ok_or(EvaluationError::StuckProjection("partial constructor application"))?,
				value => return Err(EvaluationError::StuckProjection(value.describe())),
			},

			// Pattern dispatch.
			T::Case { info, scrutinee, branches, .. } => match self.evaluate_in(scrutinee, locals)? {
				Value::Construct { inductive, index, arguments } if inductive == info.inductive => {
					let branch = branches.get(index).ok_or(EvaluationError::StuckCase("missing branch"))?;
					let fields = arguments.get(info.parameters..).unwrap_or_default();
					if fields.len() != branch.arity() {
						return Err(EvaluationError::StuckCase("partial constructor application"));
					}
					self.evaluate_in(&branch.body, &locals.with(fields.iter().cloned()))?
				}
				value => return Err(EvaluationError::StuckCase(value.describe())),
			},

			// Recursion.
			T::Fix { members, index, .. } => Value::Fixpoint(Rc::new(Fixpoint {
				locals: locals.clone(),
				members: members.as_slice().into(),
				index: *index,
			})),

			T::Literal(literal) => literal_value(literal),
		})
	}

	pub fn apply(&self, callee: Value, arguments: Vec<Value>) -> Result<Value, EvaluationError> {
		let mut callee = callee;
		let mut arguments = arguments.into_iter();
		while let Some(argument) = arguments.next() {
			callee = match callee {
				Value::Closure(closure) => self.evaluate_in(&closure.body, &closure.locals.with([argument]))?,
				Value::Fixpoint(fixpoint) => {
					let unfolded = self.unfold(&fixpoint)?;
					self.apply(unfolded, vec![argument])?
				}
				Value::Primitive(primitive, mut collected) => {
					collected.push(argument);
					if collected.len() == primitive.arity() {
						self.run(primitive, collected)?
					} else {
						Value::Primitive(primitive, collected)
					}
				}
				Value::Construct { inductive, index, arguments: mut fields } => {
					fields.push(argument);
					Value::Construct { inductive, index, arguments: fields }
				}
				Value::Type => Value::Type,
				value => return Err(EvaluationError::NotAFunction(value.describe())),
			};
		}
		Ok(callee)
	}

	// Every member of the group sees the whole group; member `i` of `n` is index `n - 1 - i`.
	fn unfold(&self, fixpoint: &Fixpoint) -> Result<Value, EvaluationError> {
		let group = (0..fixpoint.members.len()).map(|index| {
			Value::Fixpoint(Rc::new(Fixpoint { locals: fixpoint.locals.clone(), members: fixpoint.members.clone(), index }))
		});
		let member = fixpoint.members.get(fixpoint.index).ok_or(EvaluationError::UnboundIndex(fixpoint.index))?;
		self.evaluate_in(&member.body, &fixpoint.locals.with(group))
	}

	fn run(&self, primitive: Primitive, arguments: Vec<Value>) -> Result<Value, EvaluationError> {
		let mismatch = || EvaluationError::PrimitiveMismatch(primitive);
		let document = match (primitive, arguments.as_slice()) {
			(Primitive::RenderApplication, [Value::String(label), Value::Nat(precedence), documents]) =>
				constructor_application(label, self.documents(documents).ok_or_else(mismatch)?, *precedence),
			(Primitive::RenderNat, [Value::Nat(_), Value::Nat(n)]) => text(n.to_string()),
			(Primitive::RenderString, [Value::Nat(_), Value::String(s)]) => text(format!("{s:?}")),
			_ => return Err(mismatch()),
		};
		Ok(Value::Document(document))
	}

	// Reads a `list Doc` value built from the prelude constructors.
	fn documents(&self, mut list: &Value) -> Option<Vec<Document>> {
		let prelude = self.environment.prelude();
		let mut documents = Vec::new();
		loop {
			match list {
				Value::Construct { inductive, index: 0, .. } if *inductive == prelude.list => return Some(documents),
				Value::Construct { inductive, index: 1, arguments } if *inductive == prelude.list =>
					match arguments.as_slice() {
						[_, Value::Document(head), tail] => {
							documents.push(head.clone());
							list = tail;
						}
						_ => return None,
					},
				_ => return None,
			}
		}
	}
}

fn literal_value(literal: &Literal) -> Value {
	match literal {
		Literal::Nat(n) => Value::Nat(*n),
		Literal::String(s) => Value::String(s.clone()),
		Literal::Array(elements) => Value::Array(elements.iter().map(literal_value).collect()),
	}
}

#[cfg(test)]
mod tests {
	use lasso::Rodeo;

	use super::*;
	use crate::{
		common::{any_bind, bind, Index, Label},
		ir::syntax::CaseInfo,
	};

	#[test]
	fn beta_reduces_under_let() {
		let mut interner = Rodeo::new();
		let environment = Environment::new(&mut interner);
		// let y := 4 in (fun x => x) y
		let nat = Term::Inductive(environment.prelude().nat);
		let identity = Term::Lambda { domain: nat.clone().into(), body: bind([None], Term::Bound(Index(0))) };
		let term = Term::Let {
			ty: nat.into(),
			argument: Term::nat(4).into(),
			tail: bind([None], Term::apply(identity, [Term::Bound(Index(0))])),
		};
		assert!(matches!(Evaluator::new(&environment).evaluate(&term), Ok(Value::Nat(4))));
	}

	#[test]
	fn render_primitive_builds_documents() {
		let mut interner = Rodeo::new();
		let environment = Environment::new(&mut interner);
		let prelude = environment.prelude();
		let rendered = Term::apply(Term::Constant(prelude.render_nat), [Term::nat(0), Term::nat(3)]);
		let term = Term::apply(
			Term::Constant(prelude.render_application),
			[Term::string("Some"), Term::nat(11), prelude.document_list(vec![rendered])],
		);
		let document = Evaluator::new(&environment).document(&term).map(|document| document.render(80));
		assert_eq!(document, Ok("(Some 3)".to_owned()));
	}

	#[test]
	fn case_skips_parameters() {
		let mut interner = Rodeo::new();
		let environment = Environment::new(&mut interner);
		let prelude = environment.prelude();
		let unnamed: Label = None;
		// match cons Nat 1 (nil Nat) with nil => 0 | cons h t => h end
		let list = Term::apply(
			Term::Constructor { inductive: prelude.list, index: 1 },
			[
				Term::Inductive(prelude.nat),
				Term::nat(1),
				Term::apply(Term::Constructor { inductive: prelude.list, index: 0 }, [Term::Inductive(prelude.nat)]),
			],
		);
		let term = Term::Case {
			info: CaseInfo { inductive: prelude.list, parameters: 1 },
			scrutinee: list.into(),
			motive: any_bind([unnamed], Term::Inductive(prelude.nat)),
			branches: vec![any_bind([unnamed; 0], Term::nat(0)), any_bind([unnamed; 2], Term::Bound(Index(1)))],
		};
		assert!(matches!(Evaluator::new(&environment).evaluate(&term), Ok(Value::Nat(1))));
	}

	#[test]
	fn holes_do_not_evaluate() {
		let mut interner = Rodeo::new();
		let environment = Environment::new(&mut interner);
		let hole = Term::Hole { ty: Term::Inductive(environment.prelude().doc).into() };
		assert_eq!(Evaluator::new(&environment).evaluate(&hole).err(), Some(EvaluationError::UnresolvedHole));
	}
}
