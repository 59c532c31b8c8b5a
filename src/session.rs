use lasso::Rodeo;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
	common::Name,
	ir::{
		descriptor::{Definition, Environment},
		presyntax::{Command, Expression, ParsedCommand, ParsedProgram, Range},
		syntax::Term,
	},
	op::{
		declare::{DeclarationError, DeclarationErrorKind, Declarer},
		derive::{derive, describe, Derivation, DerivationError},
		evaluate::{EvaluationError, Evaluator},
		resolve::resolve,
	},
	registry::{Instance, Locality, Registry},
};

pub const DEFAULT_WIDTH: usize = 80;

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum CommandErrorKind {
	#[error("declaration error: {0}")]
	Declaration(#[from] DeclarationErrorKind),
	#[error("derivation error: {0}")]
	Derivation(#[from] DerivationError),
	#[error("evaluation error: {0}")]
	Evaluation(#[from] EvaluationError),
	#[error("check failed: expected `{expected}`, rendered `{found}`")]
	CheckFailed { expected: String, found: String },
}

impl CommandErrorKind {
	pub fn at(self, range: Range) -> CommandError { CommandError { range, kind: self } }
}

#[derive(Clone, Debug)]
pub struct CommandError {
	pub range: Range,
	pub kind: CommandErrorKind,
}

impl From<DeclarationError> for CommandError {
	fn from(error: DeclarationError) -> Self { CommandErrorKind::from(error.kind).at(error.range) }
}

/// A derived printer after resolution and registration.
#[derive(Clone, Debug)]
pub struct Registration {
	pub derivation: Derivation,
	// The dictionary with every capability hole filled.
	pub dictionary: Term,
	pub locality: Locality,
}

#[derive(Clone, Debug)]
pub enum Outcome {
	Declared(Vec<Name>),
	Derived(Registration),
	Shown(String),
	Checked(String),
}

/// The host side of derivation: it owns the declarations, registers printers, and renders values.
pub struct Session {
	interner: Rodeo,
	environment: Environment,
	registry: Registry,
	width: usize,
}

impl Default for Session {
	fn default() -> Self { Self::new() }
}

impl Session {
	pub fn new() -> Self {
		let mut interner = Rodeo::new();
		let environment = Environment::new(&mut interner);
		let mut registry = Registry::new();
		for (inductive, constant) in environment.prelude().instances() {
			registry.register(Instance { inductive, constant, locality: Locality::Global });
		}
		Self { interner, environment, registry, width: DEFAULT_WIDTH }
	}

	pub fn with_width(self, width: usize) -> Self { Self { width, ..self } }

	pub fn interner(&self) -> &Rodeo { &self.interner }

	pub fn interner_mut(&mut self) -> &mut Rodeo { &mut self.interner }

	pub fn environment(&self) -> &Environment { &self.environment }

	pub fn registry(&self) -> &Registry { &self.registry }

	/// Runs every command in order, stopping at the first failure. The program is one scope, so
	/// its local printers are dropped when it ends, whether or not it succeeded.
	pub fn run(&mut self, program: &ParsedProgram) -> Result<Vec<Outcome>, CommandError> {
		let outcomes = program.commands.iter().map(|command| self.execute(command)).collect();
		self.registry.close_scope();
		outcomes
	}

	pub fn execute(&mut self, ParsedCommand { range, command }: &ParsedCommand) -> Result<Outcome, CommandError> {
		match command {
			Command::Declare { finiteness, block } => {
				let descriptors = Declarer::new(&self.environment, &mut self.interner).block(*finiteness, block)?;
				let names = descriptors.iter().map(|descriptor| descriptor.name).collect();
				for descriptor in descriptors {
					debug!(name = self.interner.resolve(&descriptor.name), "declared");
					self.environment.declare(descriptor);
				}
				Ok(Outcome::Declared(names))
			}
			Command::Derive { name, locality } =>
				self.derive_instance(*name, *locality)
					.map(Outcome::Derived)
					.map_err(|error| CommandErrorKind::from(error).at(*range)),
			Command::Show { expression, ty } => Ok(Outcome::Shown(self.show(expression, ty)?)),
			Command::Check { expression, ty, expected } => {
				let found = self.show(expression, ty)?;
				if &found != expected {
					return Err(CommandErrorKind::CheckFailed { expected: expected.clone(), found }.at(*range));
				}
				Ok(Outcome::Checked(found))
			}
		}
	}

	/// Derives, resolves and registers the printer of `inductive`. Nothing is registered unless
	/// every step succeeds.
	pub fn derive_instance(&mut self, inductive: Name, locality: Locality) -> Result<Registration, DerivationError> {
		describe(&self.environment, &self.interner, inductive)?;
		if self.registry.find(inductive).is_some() {
			return Err(DerivationError::DuplicateInstance(self.interner.resolve(&inductive).to_owned()));
		}

		let derivation = derive(&self.environment, &mut self.interner, inductive)?;
		if self.environment.contains(derivation.name) {
			return Err(DerivationError::DuplicateInstance(self.interner.resolve(&inductive).to_owned()));
		}
		let dictionary = resolve(&derivation.dictionary, &self.environment, &self.registry, &self.interner)?;

		self.environment.define(derivation.name, Definition::Term(dictionary.clone()));
		self.registry.register(Instance { inductive, constant: derivation.name, locality });
		info!(
			inductive = self.interner.resolve(&inductive),
			instance = self.interner.resolve(&derivation.name),
			%locality,
			"registered printer"
		);
		Ok(Registration { derivation, dictionary, locality })
	}

	/// Renders the value of `term` at `ty` through the printer resolved for `ty`.
	pub fn render(&self, term: &Term, ty: &Term) -> Result<String, CommandErrorKind> {
		let prelude = self.environment.prelude();
		let (family, indices) = self.environment.split_family(ty);
		let capability = Term::Hole { ty: prelude.repr_of(family).into() };
		let call = Term::apply(
			prelude.project_repr(capability),
			indices.iter().cloned().chain([Term::nat(0), term.clone()]),
		);
		let call = resolve(&call, &self.environment, &self.registry, &self.interner)?;
		let document = Evaluator::new(&self.environment).document(&call)?;
		Ok(document.render(self.width))
	}

	fn show(&mut self, expression: &Expression, ty: &Expression) -> Result<String, CommandError> {
		let declarer = Declarer::new(&self.environment, &mut self.interner);
		let term = declarer.term(expression)?;
		let ty_term = declarer.term(ty)?;
		self.render(&term, &ty_term).map_err(|kind| kind.at((expression.range.0, ty.range.1)))
	}
}
