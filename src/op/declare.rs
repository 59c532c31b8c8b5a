use lasso::Rodeo;
use thiserror::Error;

use crate::{
	common::{bind, Binder, Name},
	ir::{
		descriptor::{ConstructorDescriptor, Entry, Environment, Finiteness, Global, Telescope, TypeDescriptor},
		presyntax::{Expression, ParsedBinder, ParsedConstructor, ParsedInductive, Preterm, Range},
		syntax::{Sort, Term},
	},
};

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum DeclarationErrorKind {
	#[error("`{0}` is not in scope")]
	NotInScope(String),
	#[error("`{0}` is already declared")]
	AlreadyDeclared(String),
	#[error("the arity of `{0}` must end in a sort")]
	InvalidArity(String),
	#[error("constructor `{0}` must build `{1}` applied to its parameters and indices")]
	InvalidConstructorResult(String, String),
	#[error("record `{0}` cannot refer to itself")]
	RecursiveRecord(String),
}

impl DeclarationErrorKind {
	pub fn at(self, range: Range) -> DeclarationError { DeclarationError { range, kind: self } }
}

#[derive(Clone, Debug)]
pub struct DeclarationError {
	pub range: Range,
	pub kind: DeclarationErrorKind,
}

/// Resolves parsed declarations and expressions against an environment.
pub struct Declarer<'a> {
	environment: &'a Environment,
	interner: &'a Rodeo,
	// Stands in for unnamed binders, which no identifier can refer to.
	anonymous: Name,
	// Types of the block being declared.
	block: Vec<Name>,
}

impl<'a> Declarer<'a> {
	pub fn new(environment: &'a Environment, interner: &'a mut Rodeo) -> Self {
		let anonymous = interner.get_or_intern_static("_");
		Self { environment, interner, anonymous, block: Vec::new() }
	}

	fn display(&self, name: Name) -> String { self.interner.resolve(&name).to_owned() }

	/// Resolves a closed expression into a term.
	pub fn term(&self, expression: &Expression) -> Result<Term, DeclarationError> {
		self.expression(expression, &mut Vec::new())
	}

	// Locals are kept as free names; binders abstract them on the way out.
	fn expression(&self, expression: &Expression, locals: &mut Vec<Name>) -> Result<Term, DeclarationError> {
		Ok(match &expression.preterm {
			Preterm::Variable(name) => self.variable(*name, locals).ok_or_else(|| {
				DeclarationErrorKind::NotInScope(self.display(*name)).at(expression.range)
			})?,
			Preterm::Sort(sort) => Term::Sort(*sort),
			Preterm::Number(n) => Term::nat(*n),
			Preterm::String(s) => Term::string(s),
			Preterm::Call { callee, arguments } => Term::apply(
				self.expression(callee, locals)?,
				arguments.iter().map(|argument| self.expression(argument, locals)).collect::<Result<Vec<_>, _>>()?,
			),
			Preterm::Arrow { domain, codomain } => Term::Product {
				domain: self.expression(domain, locals)?.into(),
				codomain: bind([None], self.expression(codomain, locals)?.lift(1, 0)),
			},
			Preterm::Pi { parameters, codomain } => self.binding(parameters, codomain, locals, |domain, codomain| {
				Term::Product { domain: domain.into(), codomain }
			})?,
			Preterm::Lambda { parameters, body } =>
				self.binding(parameters, body, locals, |domain, body| Term::Lambda { domain: domain.into(), body })?,
		})
	}

	fn variable(&self, name: Name, locals: &[Name]) -> Option<Term> {
		if locals.contains(&name) {
			return Some(Term::Free(name));
		}
		if self.block.contains(&name) {
			return Some(Term::Inductive(name));
		}
		Some(match self.environment.lookup(name)? {
			Global::Inductive(_) => Term::Inductive(name),
			Global::Constructor { inductive, index } => Term::Constructor { inductive: *inductive, index: *index },
			Global::Constant(_) => Term::Constant(name),
		})
	}

	fn binding(
		&self,
		parameters: &[ParsedBinder],
		body: &Expression,
		locals: &mut Vec<Name>,
		wrap: impl Fn(Term, Binder<Box<Term>>) -> Term,
	) -> Result<Term, DeclarationError> {
		let len = locals.len();
		let mut domains = Vec::with_capacity(parameters.len());
		for parameter in parameters {
			domains.push(self.expression(&parameter.ty, locals)?);
			locals.push(parameter.name);
		}
		let body = self.expression(body, locals);
		locals.truncate(len);
		Ok(parameters.iter().zip(domains).rev().fold(body?, |body, (parameter, domain)| {
			wrap(domain, bind([Some(parameter.name)], body.abstract_over(&[parameter.name])))
		}))
	}

	// Each entry is abstracted over `scope` and the entries before it; `scope` ends up extended
	// with the names of the telescope.
	fn telescope(&self, binders: &[ParsedBinder], scope: &mut Vec<Name>) -> Result<Telescope, DeclarationError> {
		binders
			.iter()
			.map(|binder| {
				let ty = self.expression(&binder.ty, scope)?;
				let entry = Entry::new(Some(binder.name), ty.abstract_over(&innermost_first(scope)));
				scope.push(binder.name);
				Ok(entry)
			})
			.collect()
	}

	// Splits `forall indices, sort` into the index telescope and the sort.
	fn arity(&self, inductive: &ParsedInductive, scope: &mut Vec<Name>) -> Result<(Telescope, Sort), DeclarationError> {
		let mut indices = Vec::new();
		let mut arity = &inductive.arity;
		loop {
			match &arity.preterm {
				Preterm::Sort(sort) => return Ok((indices, *sort)),
				Preterm::Arrow { domain, codomain } => {
					let ty = self.expression(domain, scope)?;
					indices.push(Entry::new(None, ty.abstract_over(&innermost_first(scope))));
					scope.push(self.anonymous);
					arity = &**codomain;
				}
				Preterm::Pi { parameters, codomain } => {
					indices.extend(self.telescope(parameters, scope)?);
					arity = &**codomain;
				}
				_ => return Err(DeclarationErrorKind::InvalidArity(self.display(inductive.name)).at(arity.range)),
			}
		}
	}

	fn constructor(
		&self,
		inductive: &ParsedInductive,
		parameters: &[Name],
		index_count: usize,
		constructor: &ParsedConstructor,
	) -> Result<ConstructorDescriptor, DeclarationError> {
		let mut scope = parameters.to_vec();
		let arguments = self.telescope(&constructor.arguments, &mut scope)?;
		let invalid = |range| {
			DeclarationErrorKind::InvalidConstructorResult(self.display(constructor.name), self.display(inductive.name))
				.at(range)
		};

		let indices = match &constructor.result {
			None if index_count == 0 => Vec::new(),
			None => return Err(invalid(constructor.range)),
			Some(result) => {
				let term = self.expression(result, &mut scope.clone())?;
				let Some((head, applied)) = term.as_inductive() else { return Err(invalid(result.range)) };
				let (actual_parameters, indices) = applied.split_at(parameters.len().min(applied.len()));
				let applied_to_parameters = actual_parameters.len() == parameters.len()
					&& actual_parameters.iter().zip(parameters).all(|(argument, &name)| *argument == Term::Free(name));
				if head != inductive.name || !applied_to_parameters || indices.len() != index_count {
					return Err(invalid(result.range));
				}
				indices.iter().map(|index| index.abstract_over(&innermost_first(&scope))).collect()
			}
		};
		Ok(ConstructorDescriptor { name: constructor.name, arguments, indices })
	}

	fn fresh(&self, name: Name, range: Range, taken: &mut Vec<Name>) -> Result<(), DeclarationError> {
		if self.environment.contains(name) || taken.contains(&name) {
			return Err(DeclarationErrorKind::AlreadyDeclared(self.display(name)).at(range));
		}
		taken.push(name);
		Ok(())
	}

	/// Resolves a block of types declared together into their descriptors.
	pub fn block(
		&mut self,
		finiteness: Finiteness,
		block: &[ParsedInductive],
	) -> Result<Vec<TypeDescriptor>, DeclarationError> {
		let mut taken = Vec::new();
		for inductive in block {
			self.fresh(inductive.name, inductive.range, &mut taken)?;
			for constructor in &inductive.constructors {
				self.fresh(constructor.name, constructor.range, &mut taken)?;
			}
		}

		self.block = block.iter().map(|inductive| inductive.name).collect();
		let descriptors = block.iter().map(|inductive| self.inductive(finiteness, inductive)).collect();
		self.block.clear();
		descriptors
	}

	fn inductive(&self, finiteness: Finiteness, inductive: &ParsedInductive) -> Result<TypeDescriptor, DeclarationError> {
		let mut scope = Vec::new();
		let parameters = self.telescope(&inductive.parameters, &mut scope)?;
		let parameter_names = scope.clone();
		let (indices, sort) = self.arity(inductive, &mut scope)?;
		let constructors = inductive
			.constructors
			.iter()
			.map(|constructor| self.constructor(inductive, &parameter_names, indices.len(), constructor))
			.collect::<Result<Vec<_>, _>>()?;

		let descriptor = TypeDescriptor {
			name: inductive.name,
			parameters,
			indices,
			sort,
			finiteness,
			constructors,
			group: self.block.clone().into(),
		};
		if finiteness == Finiteness::Record && descriptor.is_recursive() {
			return Err(DeclarationErrorKind::RecursiveRecord(self.display(inductive.name)).at(inductive.range));
		}
		Ok(descriptor)
	}
}

fn innermost_first(scope: &[Name]) -> Vec<Name> { scope.iter().rev().copied().collect() }
