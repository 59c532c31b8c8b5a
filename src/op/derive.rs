use std::fmt;

use lasso::Rodeo;
use thiserror::Error;
use tracing::debug;

use crate::{
	common::Name,
	document::APPLICATION_PRECEDENCE,
	ir::{
		descriptor::{ConstructorDescriptor, Environment, Finiteness, Global, TypeDescriptor},
		syntax::{CaseInfo, Term},
	},
	op::context::NamedContext,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shape {
	Mutual,
	CoInductive,
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Mutual => write!(f, "mutually inductive"),
			Self::CoInductive => write!(f, "coinductive"),
		}
	}
}

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum DerivationError {
	#[error("`{0}` does not denote an inductive type")]
	NotAnInductive(String),
	#[error("nothing named `{0}` is declared")]
	LookupFailure(String),
	#[error("cannot derive a printer for the {shape} type `{name}`")]
	UnsupportedShape { name: String, shape: Shape },
	#[error("no capability of type `{0}` is in scope")]
	PlaceholderUnresolved(String),
	#[error("`{0}` already has a printer")]
	DuplicateInstance(String),
}

/// The synthesized rendering function, before packaging.
#[derive(Clone, Debug)]
pub struct FunctionDescriptor {
	pub ty: Term,
	pub body: Term,
	pub is_fixpoint: bool,
}

impl FunctionDescriptor {
	/// Unfolds the recursion once: the self reference becomes `stub` and the let-bound self capability
	/// is inlined, leaving the dispatch under the signature lambdas.
	pub fn specialize(&self, stub: &Term) -> Term {
		let Term::Fix { members, index, .. } = &self.body else { return self.body.clone() };
		let Some(member) = members.get(*index) else { return self.body.clone() };
		inline_capability(&member.body.substitute_at(std::slice::from_ref(stub), 0))
	}
}

fn inline_capability(term: &Term) -> Term {
	match term {
		Term::Lambda { domain, body } =>
			Term::Lambda { domain: domain.clone(), body: body.map_ref(|body| inline_capability(body)) },
		Term::Let { argument, tail, .. } => tail.body.substitute_at(std::slice::from_ref(&**argument), 0),
		_ => term.clone(),
	}
}

/// A packaged but unresolved capability dictionary.
#[derive(Clone, Debug)]
pub struct Derivation {
	pub inductive: Name,
	// The constant the dictionary is registered under.
	pub name: Name,
	pub function: FunctionDescriptor,
	pub ty: Term,
	pub dictionary: Term,
}

/// Looks up the descriptor of `name` and checks that a printer can be derived for it.
pub fn describe<'e>(
	environment: &'e Environment,
	interner: &Rodeo,
	name: Name,
) -> Result<&'e TypeDescriptor, DerivationError> {
	let display = || interner.resolve(&name).to_owned();
	let descriptor = match environment.lookup(name) {
		Some(Global::Inductive(descriptor)) => &**descriptor,
		Some(_) => return Err(DerivationError::NotAnInductive(display())),
		None => return Err(DerivationError::LookupFailure(display())),
	};
	if descriptor.finiteness == Finiteness::CoInductive {
		return Err(DerivationError::UnsupportedShape { name: display(), shape: Shape::CoInductive });
	}
	if descriptor.group.len() > 1 {
		return Err(DerivationError::UnsupportedShape { name: display(), shape: Shape::Mutual });
	}
	Ok(descriptor)
}

/// Synthesizes the printer of an inductive type and packages it as a `Repr` dictionary whose
/// capability holes are still open.
pub fn derive(environment: &Environment, interner: &mut Rodeo, inductive: Name) -> Result<Derivation, DerivationError> {
	let descriptor = describe(environment, interner, inductive)?;
	let recursive = descriptor.is_recursive();
	debug!(
		inductive = interner.resolve(&inductive),
		constructors = descriptor.constructors.len(),
		recursive,
		"deriving printer"
	);

	let name = interner.get_or_intern(format!("repr_{}", interner.resolve(&inductive)));
	let mut engine = Engine::new(environment, interner, descriptor);
	let function = engine.function(recursive);
	let dictionary = engine.package(&function);
	Ok(Derivation { inductive, name, function, ty: engine.dictionary_type(), dictionary })
}

/// Synthesizes the raw rendering function alone, with or without a self reference.
pub fn derive_function(
	environment: &Environment,
	interner: &mut Rodeo,
	descriptor: &TypeDescriptor,
	self_reference: bool,
) -> FunctionDescriptor {
	Engine::new(environment, interner, descriptor).function(self_reference)
}

struct Signature {
	parameters: Vec<Name>,
	indices: Vec<Name>,
	// One `Repr p` for each type parameter `p`; value parameters take none.
	dictionaries: Vec<Name>,
	precedence: Name,
	subject: Name,
}

impl Signature {
	fn all(&self) -> Vec<Name> {
		let mut names = self.parameters.clone();
		names.extend(&self.indices);
		names.extend(&self.dictionaries);
		names.extend([self.precedence, self.subject]);
		names
	}
}

fn free(names: &[Name]) -> impl Iterator<Item = Term> + '_ { names.iter().map(|&name| Term::Free(name)) }

struct Engine<'e, 'i> {
	environment: &'e Environment,
	descriptor: &'e TypeDescriptor,
	context: NamedContext<'i>,
	signature: Signature,
	// The type applied to its parameters.
	family: Term,
}

impl<'e, 'i> Engine<'e, 'i> {
	fn new(environment: &'e Environment, interner: &'i mut Rodeo, descriptor: &'e TypeDescriptor) -> Self {
		let prelude = environment.prelude();
		let mut context = NamedContext::new(interner);

		let parameters = context.extend_telescope(&descriptor.parameters, &[], "A");
		let indices = context.extend_telescope(&descriptor.indices, &parameters, "i");
		let family = Term::apply(Term::Inductive(descriptor.name), free(&parameters));
		let dictionaries = (parameters.iter().enumerate())
			.filter(|&(index, _)| descriptor.is_type_parameter(index))
			.map(|(_, &parameter)| context.extend("inst", prelude.repr_of(Term::Free(parameter))))
			.collect();
		let precedence = context.extend("prec", Term::Inductive(prelude.nat));
		let subject = context.extend("v", Term::apply(family.clone(), free(&indices)));

		Self {
			environment,
			descriptor,
			context,
			signature: Signature { parameters, indices, dictionaries, precedence, subject },
			family,
		}
	}

	fn function(&mut self, recursive: bool) -> FunctionDescriptor {
		let signature = self.signature.all();
		let ty = self.context.pi(&signature, Term::Inductive(self.environment.prelude().doc));

		if !recursive {
			let dispatch = self.dispatch();
			return FunctionDescriptor { body: self.context.lambdas(&signature, dispatch), ty, is_fixpoint: false };
		}

		let mark = self.context.len();
		let self_reference = self.context.extend("rec", ty.clone());
		let capability = self.capability(Term::Free(self_reference));
		let self_capability =
			self.context.define("self", self.environment.prelude().repr_of(self.family.clone()), capability);
		let dispatch = self.dispatch();
		let body = self.context.lambdas(&signature, self.context.let_in(&[self_capability], dispatch));
		let body = self.context.fixpoint(self_reference, signature.len() - 1, body);
		self.context.truncate(mark);
		FunctionDescriptor { ty, body, is_fixpoint: true }
	}

	// `Build_Repr F (fun indices prec v => function params indices dicts prec v)`
	fn capability(&mut self, function: Term) -> Term {
		let environment = self.environment;
		let prelude = environment.prelude();
		let mark = self.context.len();

		let mut bound = self.context.extend_telescope(&self.descriptor.indices, &self.signature.parameters, "i");
		let indices = bound.clone();
		bound.push(self.context.extend("prec", Term::Inductive(prelude.nat)));
		bound.push(self.context.extend("v", Term::apply(self.family.clone(), free(&indices))));

		let arguments = free(&self.signature.parameters)
			.chain(free(&indices))
			.chain(free(&self.signature.dictionaries))
			.chain(free(&bound[indices.len()..]));
		let field = self.context.lambdas(&bound, Term::apply(function, arguments.collect::<Vec<_>>()));
		self.context.truncate(mark);
		Term::apply(prelude.build_repr(), [self.family.clone(), field])
	}

	fn dispatch(&mut self) -> Term {
		let environment = self.environment;
		let descriptor = self.descriptor;
		let prelude = environment.prelude();

		let mark = self.context.len();
		let mut motive = self.context.extend_telescope(&descriptor.indices, &self.signature.parameters, "i");
		motive.push(self.context.extend("v", Term::apply(self.family.clone(), free(&motive))));
		self.context.truncate(mark);

		let branches = descriptor.constructors.iter().map(|constructor| self.branch(constructor)).collect();
		NamedContext::case(
			CaseInfo { inductive: descriptor.name, parameters: descriptor.parameters.len() },
			Term::Free(self.signature.subject),
			(motive, Term::Inductive(prelude.doc)),
			branches,
		)
	}

	fn branch(&mut self, constructor: &ConstructorDescriptor) -> (Vec<Name>, Term) {
		let environment = self.environment;
		let prelude = environment.prelude();

		let mark = self.context.len();
		let arguments = self.context.extend_telescope(&constructor.arguments, &self.signature.parameters, "a");
		let renderings = self
			.context
			.since(mark)
			.iter()
			.map(|declaration| render_argument(environment, declaration.name, &declaration.ty))
			.collect();
		self.context.truncate(mark);

		let label = self.context.interner().resolve(&constructor.name).to_owned();
		let body = Term::apply(
			Term::Constant(prelude.render_application),
			[Term::string(&label), Term::Free(self.signature.precedence), prelude.document_list(renderings)],
		);
		(arguments, body)
	}

	fn package(&mut self, function: &FunctionDescriptor) -> Term {
		let field = self.capability(function.body.clone());
		self.context.lambdas(&self.dictionary_binders(), field)
	}

	fn dictionary_type(&self) -> Term {
		self.context.pi(&self.dictionary_binders(), self.environment.prelude().repr_of(self.family.clone()))
	}

	fn dictionary_binders(&self) -> Vec<Name> {
		let mut names = self.signature.parameters.clone();
		names.extend(&self.signature.dictionaries);
		names
	}
}

// `(?[Repr F]).repr indices 11 argument`, where `argument : F indices`.
fn render_argument(environment: &Environment, argument: Name, ty: &Term) -> Term {
	let prelude = environment.prelude();
	let (family, indices) = environment.split_family(ty);
	let capability = Term::Hole { ty: prelude.repr_of(family).into() };
	Term::apply(
		prelude.project_repr(capability),
		indices.iter().cloned().chain([Term::nat(APPLICATION_PRECEDENCE + 1), Term::Free(argument)]),
	)
}
