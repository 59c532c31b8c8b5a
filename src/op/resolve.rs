use lasso::Resolver;
use tracing::trace;

use crate::{
	common::{Index, Label},
	ir::{descriptor::Environment, syntax::Term},
	op::{derive::DerivationError, unparse::pretty_print_under},
	registry::Registry,
};

/// Fills every capability hole of `term` with a dictionary, or fails without producing anything.
///
/// A hole `Repr F` is filled by the innermost enclosing binder of that type, and otherwise by the
/// registered printer of `F`'s type constructor applied to `F`'s parameters and to the dictionaries
/// of those that are types.
pub fn resolve(
	term: &Term,
	environment: &Environment,
	registry: &Registry,
	interner: &impl Resolver,
) -> Result<Term, DerivationError> {
	Search { environment, registry, interner, scope: Vec::new() }.term(term)
}

struct Search<'a, R> {
	environment: &'a Environment,
	registry: &'a Registry,
	interner: &'a R,
	// Labels and types of the enclosing binders, outermost first; types are unknown for case binders.
	scope: Vec<(Label, Option<Term>)>,
}

impl<'a, R: Resolver> Search<'a, R> {
	fn under<T>(
		&mut self,
		binders: impl IntoIterator<Item = (Label, Option<Term>)>,
		f: impl FnOnce(&mut Self) -> T,
	) -> T {
		let len = self.scope.len();
		self.scope.extend(binders);
		let result = f(self);
		self.scope.truncate(len);
		result
	}

	fn term(&mut self, term: &Term) -> Result<Term, DerivationError> {
		use Term as T;
		Ok(match term {
			T::Hole { ty } => self.hole(ty)?,
			T::Product { domain, codomain } => T::Product {
				domain: self.term(domain)?.into(),
				codomain: self.under([(codomain.parameter(), Some((**domain).clone()))], |this| {
					codomain.try_map_ref(|body| this.term(body))
				})?,
			},
			T::Lambda { domain, body } => T::Lambda {
				domain: self.term(domain)?.into(),
				body: self.under([(body.parameter(), Some((**domain).clone()))], |this| {
					body.try_map_ref(|body| this.term(body))
				})?,
			},
			T::Let { ty, argument, tail } => T::Let {
				ty: self.term(ty)?.into(),
				argument: self.term(argument)?.into(),
				tail: self.under([(tail.parameter(), Some((**ty).clone()))], |this| {
					tail.try_map_ref(|body| this.term(body))
				})?,
			},
			T::Case { info, scrutinee, motive, branches } => T::Case {
				info: *info,
				scrutinee: self.term(scrutinee)?.into(),
				motive: self.under(unknown(&motive.parameters), |this| motive.try_map_ref(|body| this.term(body)))?,
				branches: branches
					.iter()
					.map(|branch| {
						self.under(unknown(&branch.parameters), |this| branch.try_map_ref(|body| this.term(body)))
					})
					.collect::<Result<_, _>>()?,
			},
			T::Fix { members, .. } => {
				let binders = members.iter().map(|member| (member.label, Some(member.ty.clone()))).collect::<Vec<_>>();
				let mut resolved = term.clone();
				if let T::Fix { members: resolved_members, .. } = &mut resolved {
					for member in resolved_members.iter_mut() {
						member.ty = self.term(&member.ty)?;
						member.body = self.under(binders.clone(), |this| this.term(&member.body))?;
					}
				}
				resolved
			}
			_ => term.try_map_one_with_binders(&(), |_| (), |_, child| self.term(child))?,
		})
	}

	fn hole(&mut self, ty: &Term) -> Result<Term, DerivationError> {
		let depth = self.scope.len();
		for index in 0..depth {
			if let (_, Some(local)) = &self.scope[depth - index - 1] {
				if local.lift(index + 1, 0) == *ty {
					trace!(index, "capability found in scope");
					return Ok(Term::Bound(Index(index)));
				}
			}
		}
		self.instance(ty)
	}

	fn instance(&mut self, ty: &Term) -> Result<Term, DerivationError> {
		let (environment, registry, interner) = (self.environment, self.registry, self.interner);
		let prelude = environment.prelude();

		let family = match ty.as_inductive() {
			Some((repr, [family])) if repr == prelude.repr => family,
			_ => return Err(self.unresolved(ty)),
		};
		let Some((inductive, parameters)) = family.as_inductive() else { return Err(self.unresolved(ty)) };
		let descriptor =
			environment.inductive(inductive).filter(|descriptor| descriptor.parameters.len() == parameters.len());
		let (Some(descriptor), Some(instance)) = (descriptor, registry.find(inductive)) else {
			return Err(self.unresolved(ty));
		};
		trace!(instance = interner.resolve(&instance.constant), "capability found in registry");

		// Only type parameters take a dictionary.
		let mut arguments = parameters.to_vec();
		for (index, parameter) in parameters.iter().enumerate() {
			if descriptor.is_type_parameter(index) {
				arguments.push(self.hole(&prelude.repr_of(parameter.clone()))?);
			}
		}
		Ok(Term::apply(Term::Constant(instance.constant), arguments))
	}

	// Names the binders the hole sits under after their labels.
	fn unresolved(&self, ty: &Term) -> DerivationError {
		let labels = self.scope.iter().map(|(label, _)| *label).collect::<Vec<_>>();
		DerivationError::PlaceholderUnresolved(pretty_print_under(ty, &labels, self.interner, self.environment))
	}
}

fn unknown(labels: &[Label]) -> Vec<(Label, Option<Term>)> { labels.iter().map(|&label| (label, None)).collect() }
