use lasso::Rodeo;

use crate::{
	common::{any_bind, bind, Index, Label, Name},
	ir::{
		descriptor::Entry,
		syntax::{CaseInfo, FixMember, Recursion, Term},
	},
};

#[derive(Clone, Debug)]
pub struct Declaration {
	pub name: Name,
	pub ty: Term,
	// Present for let-bound entries.
	pub value: Option<Term>,
}

/// A capture-avoiding sequence of named binders, outermost first.
///
/// Types and values are kept in the named view: they mention earlier entries as free names.
pub struct NamedContext<'i> {
	interner: &'i mut Rodeo,
	declarations: Vec<Declaration>,
}

impl<'i> NamedContext<'i> {
	pub fn new(interner: &'i mut Rodeo) -> Self { Self { interner, declarations: Vec::new() } }

	pub fn len(&self) -> usize { self.declarations.len() }

	pub fn is_empty(&self) -> bool { self.declarations.is_empty() }

	pub fn interner(&mut self) -> &mut Rodeo { self.interner }

	/// Forgets every declaration past the first `len`.
	pub fn truncate(&mut self, len: usize) { self.declarations.truncate(len) }

	/// The declarations made after the context had length `len`.
	pub fn since(&self, len: usize) -> &[Declaration] { &self.declarations[len..] }

	fn declaration(&self, name: Name) -> Option<(usize, &Declaration)> {
		self.declarations.iter().enumerate().rev().find(|(_, declaration)| declaration.name == name)
	}

	fn is_taken(&self, candidate: &str) -> bool {
		self.interner.get(candidate).is_some_and(|name| self.declaration(name).is_some())
	}

	// Tries `hint`, then `hint0`, `hint1`, and so on.
	fn fresh(&mut self, hint: &str) -> Name {
		let mut candidate = hint.to_owned();
		let mut suffix = 0usize;
		while self.is_taken(&candidate) {
			candidate = format!("{hint}{suffix}");
			suffix += 1;
		}
		self.interner.get_or_intern(candidate)
	}

	fn hint(&self, label: Label, fallback: &str) -> String {
		label.map_or_else(|| fallback.to_owned(), |name| self.interner.resolve(&name).to_owned())
	}

	/// Declares a fresh variable of type `ty`, named after `hint` where possible.
	pub fn extend(&mut self, hint: &str, ty: Term) -> Name {
		let name = self.fresh(hint);
		self.declarations.push(Declaration { name, ty, value: None });
		name
	}

	pub fn extend_labelled(&mut self, label: Label, fallback: &str, ty: Term) -> Name {
		let hint = self.hint(label, fallback);
		self.extend(&hint, ty)
	}

	/// Declares a fresh let-bound variable.
	pub fn define(&mut self, hint: &str, ty: Term, value: Term) -> Name {
		let name = self.fresh(hint);
		self.declarations.push(Declaration { name, ty, value: Some(value) });
		name
	}

	/// Declares one variable per entry of a telescope whose types live under binders for `prefix`
	/// followed by the earlier entries.
	pub fn extend_telescope(&mut self, telescope: &[Entry], prefix: &[Name], fallback: &str) -> Vec<Name> {
		let mut scope = prefix.to_vec();
		let mut names = Vec::with_capacity(telescope.len());
		for entry in telescope {
			let outer = scope.iter().rev().copied().collect::<Vec<_>>();
			let name = self.extend_labelled(entry.label, fallback, entry.ty.instantiate(&outer));
			scope.push(name);
			names.push(name);
		}
		names
	}

	/// Yields the declared type of `name` and the index it has at the end of the context.
	pub fn lookup(&self, name: Name) -> Option<(&Term, Index)> {
		let (position, declaration) = self.declaration(name)?;
		Some((&declaration.ty, Index(self.len() - position - 1)))
	}

	pub fn value(&self, name: Name) -> Option<&Term> { self.declaration(name)?.1.value.as_ref() }

	fn declared(&self, name: Name) -> Term {
		// Builders are only handed names this context allocated.
		self.declaration(name).map_or(Term::Free(name), |(_, declaration)| declaration.ty.clone())
	}

	/// Builds `forall names, body`, the first name outermost.
	pub fn pi(&self, names: &[Name], body: Term) -> Term {
		names.iter().rev().fold(body, |codomain, &name| Term::Product {
			domain: self.declared(name).into(),
			codomain: bind([Some(name)], codomain.abstract_over(&[name])),
		})
	}

	/// Builds `fun names => body`, the first name outermost.
	pub fn lambdas(&self, names: &[Name], body: Term) -> Term {
		names.iter().rev().fold(body, |body, &name| Term::Lambda {
			domain: self.declared(name).into(),
			body: bind([Some(name)], body.abstract_over(&[name])),
		})
	}

	/// Wraps `body` in the let-bindings of `names`, which must have been declared with [`Self::define`].
	pub fn let_in(&self, names: &[Name], body: Term) -> Term {
		names.iter().rev().fold(body, |tail, &name| Term::Let {
			ty: self.declared(name).into(),
			argument: self.value(name).cloned().unwrap_or(Term::Free(name)).into(),
			tail: bind([Some(name)], tail.abstract_over(&[name])),
		})
	}

	/// Closes `body` over `self_name` as a single recursive function.
	pub fn fixpoint(&self, self_name: Name, recursive_argument: usize, body: Term) -> Term {
		Term::Fix {
			recursion: Recursion::Fixpoint,
			members: vec![FixMember {
				label: Some(self_name),
				ty: self.declared(self_name),
				body: body.abstract_over(&[self_name]),
				recursive_argument,
			}],
			index: 0,
		}
	}

	/// Assembles a case split; the motive and each branch bind their names, the last one innermost.
	pub fn case(
		info: CaseInfo,
		scrutinee: Term,
		(motive_names, motive): (Vec<Name>, Term),
		branches: Vec<(Vec<Name>, Term)>,
	) -> Term {
		let close = |names: &[Name], body: Term| {
			let innermost_first = names.iter().rev().copied().collect::<Vec<_>>();
			let labels = names.iter().map(|&name| Some(name)).collect::<Vec<Label>>();
			(labels, body.abstract_over(&innermost_first))
		};
		let (labels, motive) = close(&motive_names, motive);
		Term::Case {
			info,
			scrutinee: scrutinee.into(),
			motive: any_bind(labels, motive),
			branches: branches
				.into_iter()
				.map(|(names, body)| {
					let (labels, body) = close(&names, body);
					any_bind(labels, body)
				})
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ir::syntax::Sort;

	fn set() -> Term { Term::Sort(Sort::Set) }

	#[test]
	fn fresh_names_avoid_the_context() {
		let mut interner = Rodeo::new();
		let mut context = NamedContext::new(&mut interner);
		let x = context.extend("x", set());
		let x0 = context.extend("x", set());
		let x1 = context.extend("x", set());
		assert_eq!(context.interner().resolve(&x), "x");
		assert_eq!(context.interner().resolve(&x0), "x0");
		assert_eq!(context.interner().resolve(&x1), "x1");
		assert_eq!(context.lookup(x).map(|(_, index)| index), Some(Index(2)));
		assert_eq!(context.lookup(x1).map(|(_, index)| index), Some(Index(0)));
	}

	#[test]
	fn truncation_frees_names() {
		let mut interner = Rodeo::new();
		let mut context = NamedContext::new(&mut interner);
		let mark = context.len();
		let a = context.extend("a", set());
		context.truncate(mark);
		assert_eq!(context.extend("a", set()), a);
	}

	#[test]
	fn telescope_entries_see_earlier_entries() {
		let mut interner = Rodeo::new();
		let mut context = NamedContext::new(&mut interner);
		let a = context.extend("A", Term::Sort(Sort::Type(0)));
		// (n : A) (v : n) under the prefix [A].
		let telescope = [Entry::new(None, Term::Bound(Index(0))), Entry::new(None, Term::Bound(Index(0)))];
		let names = context.extend_telescope(&telescope, &[a], "t");
		assert_eq!(context.lookup(names[0]).map(|(ty, _)| ty.clone()), Some(Term::Free(a)));
		assert_eq!(context.lookup(names[1]).map(|(ty, _)| ty.clone()), Some(Term::Free(names[0])));
	}

	#[test]
	fn dependent_product_abstracts_in_order() {
		let mut interner = Rodeo::new();
		let mut context = NamedContext::new(&mut interner);
		let a = context.extend("A", Term::Sort(Sort::Type(0)));
		let x = context.extend("x", Term::Free(a));
		let pi = context.pi(&[a, x], Term::Free(a));
		let Term::Product { domain, codomain } = &pi else { panic!() };
		assert_eq!(**domain, Term::Sort(Sort::Type(0)));
		let Term::Product { domain, codomain: inner } = &*codomain.body else { panic!() };
		assert_eq!(**domain, Term::Bound(Index(0)));
		assert_eq!(*inner.body, Term::Bound(Index(1)));
		assert!(pi.is_closed());
	}

	#[test]
	fn fixpoint_sees_itself() {
		let mut interner = Rodeo::new();
		let mut context = NamedContext::new(&mut interner);
		let f = context.extend("f", set());
		let x = context.extend("x", set());
		let body = context.lambdas(&[x], Term::apply(Term::Free(f), [Term::Free(x)]));
		let Term::Fix { members, .. } = context.fixpoint(f, 0, body) else { panic!() };
		let Term::Lambda { body, .. } = &members[0].body else { panic!() };
		assert_eq!(*body.body, Term::apply(Term::Bound(Index(1)), [Term::Bound(Index(0))]));
	}

	#[test]
	fn case_branches_abstract_independently() {
		let mut interner = Rodeo::new();
		let t = interner.get_or_intern("T");
		let mut context = NamedContext::new(&mut interner);
		let s = context.extend("s", Term::Inductive(t));
		let a = context.extend("a", set());
		let b = context.extend("b", set());
		let case = NamedContext::case(
			CaseInfo { inductive: t, parameters: 0 },
			Term::Free(s),
			(vec![b], set()),
			vec![(vec![a, b], Term::Free(a)), (vec![b], Term::Free(b))],
		);
		let Term::Case { branches, .. } = &case else { panic!() };
		assert_eq!(branches[0].body, Term::Bound(Index(1)));
		assert_eq!(branches[1].body, Term::Bound(Index(0)));
		assert!(!case.is_closed());
	}
}
