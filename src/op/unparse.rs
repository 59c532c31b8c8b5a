use std::fmt::{self, Write};

use lasso::Resolver;

use crate::{
	common::{Index, Label},
	ir::{
		descriptor::Environment,
		syntax::{Literal, Recursion, Sort, Term},
	},
};

/// Prints a term, naming bound variables after their binders.
pub fn print(term: &Term, f: &mut impl Write, interner: &impl Resolver, environment: &Environment) -> fmt::Result {
	Printer { interner, environment, names: Vec::new() }.term(term, f)
}

pub fn pretty_print(term: &Term, interner: &impl Resolver, environment: &Environment) -> String {
	pretty_print_under(term, &[], interner, environment)
}

/// Prints a term whose loose indices refer to binders labelled `names`, the last one innermost.
pub fn pretty_print_under(term: &Term, names: &[Label], interner: &impl Resolver, environment: &Environment) -> String {
	let mut string = String::new();
	// Writing to a string cannot fail.
	let _ = Printer { interner, environment, names: names.to_vec() }.term(term, &mut string);
	string
}

struct Printer<'a, R> {
	interner: &'a R,
	environment: &'a Environment,
	names: Vec<Label>,
}

impl<'a, R: Resolver> Printer<'a, R> {
	fn label(&self, label: Label) -> &'a str { label.map_or("_", |name| self.interner.resolve(&name)) }

	fn bound(&self, Index(index): Index, f: &mut dyn Write) -> fmt::Result {
		match self.names.len().checked_sub(index + 1).and_then(|level| self.names[level]) {
			Some(name) => write!(f, "{}", self.interner.resolve(&name)),
			None => write!(f, "#{index}"),
		}
	}

	fn under(
		&mut self,
		labels: &[Label],
		f: &mut dyn Write,
		print: impl FnOnce(&mut Self, &mut dyn Write) -> fmt::Result,
	) -> fmt::Result {
		let len = self.names.len();
		self.names.extend(labels);
		let result = print(self, f);
		self.names.truncate(len);
		result
	}

	fn term(&mut self, term: &Term, f: &mut dyn Write) -> fmt::Result {
		match term {
			Term::Product { domain, codomain } =>
				if codomain.parameter().is_none() || !codomain.body.references(Index(0)) {
					self.spine(domain, f)?;
					write!(f, " -> ")?;
					self.under(&codomain.parameters, f, |this, f| this.term(&codomain.body, f))
				} else {
					write!(f, "forall ({} : ", self.label(codomain.parameter()))?;
					self.term(domain, f)?;
					write!(f, "), ")?;
					self.under(&codomain.parameters, f, |this, f| this.term(&codomain.body, f))
				},
			Term::Lambda { domain, body } => {
				write!(f, "fun ({} : ", self.label(body.parameter()))?;
				self.term(domain, f)?;
				write!(f, ") => ")?;
				self.under(&body.parameters, f, |this, f| this.term(&body.body, f))
			}
			Term::Let { ty, argument, tail } => {
				write!(f, "let {} : ", self.label(tail.parameter()))?;
				self.term(ty, f)?;
				write!(f, " := ")?;
				self.term(argument, f)?;
				write!(f, " in ")?;
				self.under(&tail.parameters, f, |this, f| this.term(&tail.body, f))
			}
			Term::Case { info, scrutinee, motive, branches } => {
				write!(f, "match ")?;
				self.term(scrutinee, f)?;
				write!(f, " return ")?;
				self.under(&motive.parameters, f, |this, f| this.term(&motive.body, f))?;
				write!(f, " with")?;
				for (index, branch) in branches.iter().enumerate() {
					write!(f, " | ")?;
					match self.environment.constructor(info.inductive, index) {
						Some(constructor) => write!(f, "{}", self.interner.resolve(&constructor.name))?,
						None => write!(f, "{}#{index}", self.interner.resolve(&info.inductive))?,
					}
					for &parameter in branch.parameters.iter() {
						write!(f, " {}", self.label(parameter))?;
					}
					write!(f, " => ")?;
					self.under(&branch.parameters, f, |this, f| this.term(&branch.body, f))?;
				}
				write!(f, " end")
			}
			Term::Fix { recursion, members, index } => {
				write!(f, "{}", if *recursion == Recursion::Fixpoint { "fix" } else { "cofix" })?;
				let labels = members.iter().map(|member| member.label).collect::<Vec<_>>();
				for (position, member) in members.iter().enumerate() {
					if position > 0 {
						write!(f, " with")?;
					}
					write!(f, " {} : ", self.label(member.label))?;
					self.term(&member.ty, f)?;
					write!(f, " := ")?;
					self.under(&labels, f, |this, f| this.term(&member.body, f))?;
				}
				if members.len() > 1 {
					write!(f, " for {}", self.label(members.get(*index).and_then(|member| member.label)))?;
				}
				Ok(())
			}
			_ => self.spine(term, f),
		}
	}

	fn spine(&mut self, term: &Term, f: &mut dyn Write) -> fmt::Result {
		match term {
			Term::Apply { callee, arguments } => {
				self.spine(callee, f)?;
				for argument in arguments {
					write!(f, " ")?;
					self.atom(argument, f)?;
				}
				Ok(())
			}
			_ => self.atom(term, f),
		}
	}

	fn atom(&mut self, term: &Term, f: &mut dyn Write) -> fmt::Result {
		match term {
			Term::Bound(index) => self.bound(*index, f),
			Term::Free(name) | Term::Constant(name) | Term::Inductive(name) =>
				write!(f, "{}", self.interner.resolve(name)),
			Term::Sort(Sort::Prop) => write!(f, "Prop"),
			Term::Sort(Sort::Set) => write!(f, "Set"),
			Term::Sort(Sort::Type(0)) => write!(f, "Type"),
			Term::Sort(Sort::Type(level)) => write!(f, "Type@{{{level}}}"),
			Term::Constructor { inductive, index } => match self.environment.constructor(*inductive, *index) {
				Some(constructor) => write!(f, "{}", self.interner.resolve(&constructor.name)),
				None => write!(f, "{}#{index}", self.interner.resolve(inductive)),
			},
			Term::Literal(literal) => print_literal(literal, f),
			Term::Hole { ty } => {
				write!(f, "?[")?;
				self.term(ty, f)?;
				write!(f, "]")
			}
			Term::Project { record, field, scrutinee, .. } => {
				self.atom(scrutinee, f)?;
				let label = self
					.environment
					.constructor(*record, 0)
					.and_then(|constructor| constructor.arguments.get(*field))
					.and_then(|entry| entry.label);
				match label {
					Some(label) => write!(f, ".{}", self.interner.resolve(&label)),
					None => write!(f, ".{field}"),
				}
			}
			_ => {
				write!(f, "(")?;
				self.term(term, f)?;
				write!(f, ")")
			}
		}
	}
}

fn print_literal(literal: &Literal, f: &mut dyn Write) -> fmt::Result {
	match literal {
		Literal::Nat(n) => write!(f, "{n}"),
		Literal::String(s) => write!(f, "{s:?}"),
		Literal::Array(elements) => {
			write!(f, "[")?;
			for (position, element) in elements.iter().enumerate() {
				if position > 0 {
					write!(f, "; ")?;
				}
				print_literal(element, f)?;
			}
			write!(f, "]")
		}
	}
}
