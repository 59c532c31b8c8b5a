use std::convert::Infallible;

use crate::ir::syntax::{FixMember, Term};

fn lift_by<A: Clone>(acc: &A, lift: &impl Fn(&A) -> A, times: usize) -> A {
	(0..times).fold(acc.clone(), |acc, _| lift(&acc))
}

impl Term {
	/// Rebuilds this node with `f` applied to each immediate child.
	pub fn map_one(&self, mut f: impl FnMut(&Term) -> Term) -> Term {
		self.map_one_with_binders(&(), |_| (), |_, child| f(child))
	}

	/// Like [`Term::map_one`], but each child receives `acc` lifted once per binder it sits under.
	pub fn map_one_with_binders<A: Clone>(
		&self,
		acc: &A,
		lift: impl Fn(&A) -> A,
		mut f: impl FnMut(&A, &Term) -> Term,
	) -> Term {
		match self.try_map_one_with_binders(acc, lift, |acc, child| Ok::<_, Infallible>(f(acc, child))) {
			Ok(term) => term,
			Err(never) => match never {},
		}
	}

	pub fn try_map_one_with_binders<A: Clone, E>(
		&self,
		acc: &A,
		lift: impl Fn(&A) -> A,
		mut f: impl FnMut(&A, &Term) -> Result<Term, E>,
	) -> Result<Term, E> {
		use Term as T;
		Ok(match self {
			T::Bound(_)
			| T::Free(_)
			| T::Sort(_)
			| T::Constant(_)
			| T::Inductive(_)
			| T::Constructor { .. }
			| T::Literal(_) => self.clone(),

			T::Apply { callee, arguments } => T::Apply {
				callee: f(acc, callee)?.into(),
				arguments: arguments.iter().map(|argument| f(acc, argument)).collect::<Result<_, _>>()?,
			},
			T::Product { domain, codomain } => T::Product {
				domain: f(acc, domain)?.into(),
				codomain: codomain.try_map_ref(|body| f(&lift(acc), body))?,
			},
			T::Lambda { domain, body } =>
				T::Lambda { domain: f(acc, domain)?.into(), body: body.try_map_ref(|body| f(&lift(acc), body))? },
			T::Let { ty, argument, tail } => T::Let {
				ty: f(acc, ty)?.into(),
				argument: f(acc, argument)?.into(),
				tail: tail.try_map_ref(|body| f(&lift(acc), body))?,
			},
			T::Hole { ty } => T::Hole { ty: f(acc, ty)?.into() },
			T::Project { record, parameters, field, scrutinee } => T::Project {
				record: *record,
				parameters: *parameters,
				field: *field,
				scrutinee: f(acc, scrutinee)?.into(),
			},
			T::Case { info, scrutinee, motive, branches } => T::Case {
				info: *info,
				scrutinee: f(acc, scrutinee)?.into(),
				motive: motive.try_map_ref(|body| f(&lift_by(acc, &lift, motive.arity()), body))?,
				branches: branches
					.iter()
					.map(|branch| branch.try_map_ref(|body| f(&lift_by(acc, &lift, branch.arity()), body)))
					.collect::<Result<_, _>>()?,
			},
			T::Fix { recursion, members, index } => {
				let inner = lift_by(acc, &lift, members.len());
				T::Fix {
					recursion: *recursion,
					members: members
						.iter()
						.map(|member| {
							Ok::<_, E>(FixMember {
								label: member.label,
								ty: f(acc, &member.ty)?,
								body: f(&inner, &member.body)?,
								recursive_argument: member.recursive_argument,
							})
						})
						.collect::<Result<_, _>>()?,
					index: *index,
				}
			}
		})
	}

	/// Lists the immediate children of this node, each with the number of binders it sits under.
	pub fn children(&self) -> Vec<(usize, &Term)> {
		use Term as T;
		match self {
			T::Bound(_)
			| T::Free(_)
			| T::Sort(_)
			| T::Constant(_)
			| T::Inductive(_)
			| T::Constructor { .. }
			| T::Literal(_) => Vec::new(),

			T::Apply { callee, arguments } =>
				std::iter::once((0, &**callee)).chain(arguments.iter().map(|argument| (0, argument))).collect(),
			T::Product { domain, codomain: body } | T::Lambda { domain, body } =>
				vec![(0, &**domain), (1, &*body.body)],
			T::Let { ty, argument, tail } => vec![(0, &**ty), (0, &**argument), (1, &*tail.body)],
			T::Hole { ty } => vec![(0, &**ty)],
			T::Project { scrutinee, .. } => vec![(0, &**scrutinee)],
			T::Case { scrutinee, motive, branches, .. } => [(0, &**scrutinee), (motive.arity(), &*motive.body)]
				.into_iter()
				.chain(branches.iter().map(|branch| (branch.arity(), &branch.body)))
				.collect(),
			T::Fix { members, .. } => members
				.iter()
				.map(|member| (0, &member.ty))
				.chain(members.iter().map(|member| (members.len(), &member.body)))
				.collect(),
		}
	}
}
