use crate::{
	common::{Index, Name},
	ir::syntax::Term,
};

impl Term {
	/// Replaces each free occurrence of `names[i]` with a reference to the bound index `i`.
	pub fn abstract_over(&self, names: &[Name]) -> Term { self.abstract_over_at(names, 0) }

	/// Replaces each free occurrence of `names[i]` with the bound index `depth + i`, where `depth`
	/// counts the binders crossed on the way down.
	pub fn abstract_over_at(&self, names: &[Name], depth: usize) -> Term {
		match self {
			Term::Free(name) => match names.iter().position(|candidate| candidate == name) {
				Some(position) => Term::Bound(Index(depth + position)),
				None => self.clone(),
			},
			_ => self.map_one_with_binders(&depth, |depth| depth + 1, |depth, child| {
				child.abstract_over_at(names, *depth)
			}),
		}
	}

	/// Replaces each bound index `i` with the free name `names[i]`.
	pub fn instantiate(&self, names: &[Name]) -> Term { self.instantiate_at(names, 0) }

	pub fn instantiate_at(&self, names: &[Name], depth: usize) -> Term {
		let substitution = names.iter().map(|name| Term::Free(*name)).collect::<Vec<_>>();
		self.substitute_at(&substitution, depth)
	}

	/// Simultaneously substitutes `substitution[i]` for the index `depth + i`.
	///
	/// Indices past the substituted range lose the binders they skipped, so opening a binder
	/// keeps references to outer binders intact.
	pub fn substitute_at(&self, substitution: &[Term], depth: usize) -> Term {
		match self {
			Term::Bound(Index(index)) if *index < depth => self.clone(),
			Term::Bound(Index(index)) => match substitution.get(index - depth) {
				Some(term) => term.lift(depth, 0),
				None => Term::Bound(Index(index - substitution.len())),
			},
			_ => self.map_one_with_binders(&depth, |depth| depth + 1, |depth, child| {
				child.substitute_at(substitution, *depth)
			}),
		}
	}

	/// Shifts every bound index at or above `cutoff` up by `amount`.
	pub fn lift(&self, amount: usize, cutoff: usize) -> Term {
		if amount == 0 {
			return self.clone();
		}
		match self {
			Term::Bound(Index(index)) if *index >= cutoff => Term::Bound(Index(index + amount)),
			_ => self.map_one_with_binders(&cutoff, |cutoff| cutoff + 1, |cutoff, child| child.lift(amount, *cutoff)),
		}
	}

	/// Decides whether `name` occurs free.
	pub fn mentions(&self, name: Name) -> bool {
		match self {
			Term::Free(candidate) => *candidate == name,
			_ => self.children().into_iter().any(|(_, child)| child.mentions(name)),
		}
	}

	/// Decides whether the inductive type `name` occurs anywhere.
	pub fn mentions_inductive(&self, name: Name) -> bool {
		match self {
			Term::Inductive(candidate) => *candidate == name,
			_ => self.children().into_iter().any(|(_, child)| child.mentions_inductive(name)),
		}
	}

	/// Decides whether any bound index refers past `depth` enclosing binders.
	pub fn has_loose_bound(&self, depth: usize) -> bool {
		match self {
			Term::Bound(Index(index)) => *index >= depth,
			_ => self.children().into_iter().any(|(binders, child)| child.has_loose_bound(depth + binders)),
		}
	}

	/// Decides whether the binder `index` levels out is referenced.
	pub fn references(&self, Index(index): Index) -> bool {
		match self {
			Term::Bound(Index(candidate)) => *candidate == index,
			_ => self.children().into_iter().any(|(binders, child)| child.references(Index(index + binders))),
		}
	}

	/// A closed term has no dangling indices and no free names.
	pub fn is_closed(&self) -> bool { !self.has_loose_bound(0) && !self.has_free_name() }

	fn has_free_name(&self) -> bool {
		match self {
			Term::Free(_) => true,
			_ => self.children().into_iter().any(|(_, child)| child.has_free_name()),
		}
	}
}

#[cfg(test)]
mod tests {
	use lasso::Rodeo;

	use super::*;
	use crate::{common::bind, ir::syntax::Sort};

	fn lambda(label: Name, body: Term) -> Term {
		Term::Lambda { domain: Term::Sort(Sort::Set).into(), body: bind([Some(label)], body) }
	}

	#[test]
	fn abstraction_counts_intervening_binders() {
		let mut interner = Rodeo::new();
		let [x, y, z] = ["x", "y", "z"].map(|s| interner.get_or_intern(s));
		// fun z => fun z => x y
		let term = lambda(z, lambda(z, Term::apply(Term::Free(x), [Term::Free(y)])));
		let abstracted = term.abstract_over(&[x, y]);
		let Term::Lambda { body, .. } = &abstracted else { panic!() };
		let Term::Lambda { body, .. } = &*body.body else { panic!() };
		assert_eq!(*body.body, Term::apply(Term::Bound(Index(2)), [Term::Bound(Index(3))]));
	}

	#[test]
	fn instantiation_inverts_abstraction() {
		let mut interner = Rodeo::new();
		let [x, y, z] = ["x", "y", "z"].map(|s| interner.get_or_intern(s));
		let term = lambda(z, Term::apply(Term::Free(y), [Term::Free(x), Term::Free(z)]));
		assert_eq!(term.abstract_over(&[x, y]).instantiate(&[x, y]), term);
		assert_eq!(term.abstract_over_at(&[y], 4).instantiate_at(&[y], 4), term);
	}

	#[test]
	fn opening_lowers_outer_references() {
		let mut interner = Rodeo::new();
		let x = interner.get_or_intern("x");
		// Under two binders: index 0 is opened to `x`, index 1 moves down to 0.
		let body = Term::apply(Term::Bound(Index(0)), [Term::Bound(Index(1))]);
		assert_eq!(body.instantiate(&[x]), Term::apply(Term::Free(x), [Term::Bound(Index(0))]));
	}

	#[test]
	fn lifting_skips_captured_indices() {
		let mut interner = Rodeo::new();
		let x = interner.get_or_intern("x");
		let term = lambda(x, Term::apply(Term::Bound(Index(0)), [Term::Bound(Index(1))]));
		let lifted = term.lift(2, 0);
		assert_eq!(lifted, lambda(x, Term::apply(Term::Bound(Index(0)), [Term::Bound(Index(3))])));
		assert!(lifted.has_loose_bound(0));
		assert!(!lambda(x, Term::Bound(Index(0))).has_loose_bound(0));
	}
}
