use lasso::Rodeo;
use reprise::{
	ir::{
		descriptor::Environment,
		presyntax::Command,
		source::lex,
		syntax::{Literal, Term},
	},
	op::{
		declare::{DeclarationErrorKind, Declarer},
		derive::{derive_function, DerivationError, Shape},
		parse::parse,
	},
	registry::Locality,
	session::{CommandErrorKind, Outcome, Session},
};

use crate::common::{run_in, run_source};

const LIST: &str = "inductive List (A : Type) : Type := Nil | Cons (x : A) (xs : List A).";

fn declare(environment: &mut Environment, interner: &mut Rodeo, source: &str) {
	let lexed_source = lex(source).ok().expect(source);
	let program = parse(&lexed_source, interner).expect(source);
	for command in program.commands {
		let Command::Declare { finiteness, block } = command.command else { panic!("{source}") };
		let descriptors = Declarer::new(environment, interner).block(finiteness, &block).map_err(|e| e.kind).unwrap();
		for descriptor in descriptors {
			environment.declare(descriptor);
		}
	}
}

fn dispatch(term: &Term) -> &Term {
	match term {
		Term::Lambda { body, .. } => dispatch(&body.body),
		Term::Let { tail, .. } => dispatch(&tail.body),
		Term::Fix { members, index, .. } => dispatch(&members[*index].body),
		_ => term,
	}
}

fn branch_labels(term: &Term) -> Vec<(String, usize)> {
	let Term::Case { branches, .. } = dispatch(term) else { panic!("no dispatch in {term:?}") };
	branches
		.iter()
		.map(|branch| match &branch.body {
			Term::Apply { arguments, .. } => match arguments.first() {
				Some(Term::Literal(Literal::String(label))) => (label.to_string(), branch.arity()),
				_ => panic!("unlabelled branch"),
			},
			_ => panic!("branch is not a rendering"),
		})
		.collect()
}

fn leading_binders(mut ty: &Term) -> usize {
	let mut count = 0;
	while let Term::Product { codomain, .. } = ty {
		count += 1;
		ty = &*codomain.body;
	}
	count
}

fn has_hole(term: &Term) -> bool {
	matches!(term, Term::Hole { .. }) || term.children().into_iter().any(|(_, child)| has_hole(child))
}

#[test]
fn branches_follow_constructor_order() {
	let mut interner = Rodeo::new();
	let mut environment = Environment::new(&mut interner);
	declare(&mut environment, &mut interner, "inductive Letter : Type := A | B | C.");
	declare(&mut environment, &mut interner, LIST);

	let letter = environment.inductive(interner.get_or_intern("Letter")).unwrap();
	let function = derive_function(&environment, &mut interner, letter, false);
	assert_eq!(branch_labels(&function.body), vec![("A".to_owned(), 0), ("B".to_owned(), 0), ("C".to_owned(), 0)]);

	let list = environment.inductive(interner.get_or_intern("List")).unwrap();
	let function = derive_function(&environment, &mut interner, list, list.is_recursive());
	assert_eq!(branch_labels(&function.body), vec![("Nil".to_owned(), 0), ("Cons".to_owned(), 2)]);
}

#[test]
fn recursion_is_detected() {
	let mut session = Session::new();
	run_in(&mut session, &format!("{LIST}\ninductive Box (A : Type) : Type := MkBox (x : A).\nderive List.\nderive Box."))
		.map_err(|e| e.kind)
		.unwrap();
	let list = session.interner().get("List").unwrap();
	let boxed = session.interner().get("Box").unwrap();
	assert!(session.environment().inductive(list).unwrap().is_recursive());
	assert!(!session.environment().inductive(boxed).unwrap().is_recursive());

	let mut session = Session::new();
	let outcomes = run_in(&mut session, &format!("{LIST}\nderive List.")).map_err(|e| e.kind).unwrap();
	let Some(Outcome::Derived(registration)) = outcomes.last() else { panic!() };
	assert!(registration.derivation.function.is_fixpoint);
}

#[test]
fn depth_one_specialization_matches_plain_dispatch() {
	let mut interner = Rodeo::new();
	let mut environment = Environment::new(&mut interner);
	declare(&mut environment, &mut interner, LIST);
	let list = environment.inductive(interner.get_or_intern("List")).unwrap();

	let recursive = derive_function(&environment, &mut interner, list, true);
	let plain = derive_function(&environment, &mut interner, list, false);
	assert!(recursive.is_fixpoint);
	assert!(!plain.is_fixpoint);
	assert_eq!(recursive.ty, plain.ty);
	assert_eq!(recursive.specialize(&Term::nat(0)), plain.body);
}

#[test]
fn rejection_is_side_effect_free() {
	let (mut session, result) = run_source(
		"coinductive Stream (A : Type) : Type := SCons (x : A) (xs : Stream A).\n\
		 inductive Even : Type := E0 | ES (o : Odd) with Odd : Type := OS (e : Even).\n\
		 inductive Opaque : Type := Hidden.\n\
		 inductive Wrap : Type := MkWrap (o : Opaque).",
	);
	result.map_err(|e| e.kind).unwrap();
	let registered = session.registry().len();

	for (name, shape) in [("Stream", Shape::CoInductive), ("Even", Shape::Mutual), ("Odd", Shape::Mutual)] {
		let inductive = session.interner().get(name).unwrap();
		for locality in [Locality::Local, Locality::Global, Locality::Export] {
			let error = session.derive_instance(inductive, locality).unwrap_err();
			assert_eq!(error, DerivationError::UnsupportedShape { name: name.to_owned(), shape });
		}
	}

	let wrap = session.interner().get("Wrap").unwrap();
	let error = session.derive_instance(wrap, Locality::Global).unwrap_err();
	assert_eq!(error, DerivationError::PlaceholderUnresolved("Repr Opaque".to_owned()));

	assert_eq!(session.registry().len(), registered);
	for instance in ["repr_Stream", "repr_Even", "repr_Odd", "repr_Wrap"] {
		let bound = session.interner().get(instance).is_some_and(|name| session.environment().contains(name));
		assert!(!bound, "{instance}");
	}
}

#[test]
fn lookup_errors() {
	let (mut session, result) = run_source("inductive Letter : Type := A | B.\nderive Letter.");
	result.map_err(|e| e.kind).unwrap();

	let missing = session.interner_mut().get_or_intern("Missing");
	assert_eq!(session.derive_instance(missing, Locality::Global).unwrap_err(), DerivationError::LookupFailure("Missing".to_owned()));
	let constructor = session.interner().get("A").unwrap();
	assert_eq!(session.derive_instance(constructor, Locality::Global).unwrap_err(), DerivationError::NotAnInductive("A".to_owned()));
	let letter = session.interner().get("Letter").unwrap();
	assert_eq!(session.derive_instance(letter, Locality::Global).unwrap_err(), DerivationError::DuplicateInstance("Letter".to_owned()));
	let nat = session.environment().prelude().nat;
	assert_eq!(session.derive_instance(nat, Locality::Global).unwrap_err(), DerivationError::DuplicateInstance("Nat".to_owned()));
}

#[test]
fn recursive_capability_comes_from_scope() {
	let (session, result) = run_source(&format!("{LIST}\nderive List."));
	let outcomes = result.map_err(|e| e.kind).unwrap();
	let Some(Outcome::Derived(registration)) = outcomes.last() else { panic!() };
	assert!(has_hole(&registration.derivation.dictionary));
	assert!(!has_hole(&registration.dictionary));
	assert!(registration.dictionary.is_closed());

	let list = session.interner().get("List").unwrap();
	assert_eq!(session.registry().find(list).map(|instance| instance.constant), Some(registration.derivation.name));
	assert_eq!(session.interner().resolve(&registration.derivation.name), "repr_List");
}

#[test]
fn local_printers_end_with_their_program() {
	let mut session = Session::new();
	run_in(&mut session, "inductive Unit : Type := tt.\nderive Unit local.\ncheck tt : Unit = \"tt\".")
		.map_err(|e| e.kind)
		.unwrap();
	let unit = session.interner().get("Unit").unwrap();
	assert!(session.registry().find(unit).is_none());

	let error = run_in(&mut session, "show tt : Unit.").unwrap_err();
	assert!(matches!(error.kind, CommandErrorKind::Derivation(DerivationError::PlaceholderUnresolved(_))));
}

#[test]
fn exported_printers_are_listed() {
	let (session, result) =
		run_source("inductive Pair (A B : Type) : Type := MkPair (x : A) (y : B).\nderive Pair export.");
	result.map_err(|e| e.kind).unwrap();
	let exported = session.registry().exported().map(|instance| instance.constant).collect::<Vec<_>>();
	assert_eq!(exported, vec![session.interner().get("repr_Pair").unwrap()]);
}

#[test]
fn failed_checks_report_the_rendering() {
	let (_, result) = run_source(&format!("{LIST}\nderive List.\ncheck Cons Nat 1 (Nil Nat) : List Nat = \"Cons 1\"."));
	let error = result.unwrap_err();
	assert_eq!(error.kind, CommandErrorKind::CheckFailed { expected: "Cons 1".to_owned(), found: "Cons 1 Nil".to_owned() });
}

#[test]
fn narrow_widths_break_applications() {
	let mut session = Session::new().with_width(8);
	let outcomes = run_in(
		&mut session,
		"inductive Pair (A B : Type) : Type := MkPair (x : A) (y : B).\nderive Pair.\nshow MkPair Nat Nat 1000 2000 : Pair Nat Nat.",
	)
	.map_err(|e| e.kind)
	.unwrap();
	let Some(Outcome::Shown(rendered)) = outcomes.last() else { panic!() };
	assert_eq!(rendered, "MkPair\n  1000\n  2000");
}

#[test]
fn value_parameters_take_no_printer() {
	let (mut session, result) = run_source(
		"inductive Tagged (n : Nat) : Type := Tag (x : Nat).\nderive Tagged.\n\
		 inductive Dep (A : Type) (a : A) : Type := MkDep (x : A).\nderive Dep.",
	);
	let outcomes = result.map_err(|e| e.kind).unwrap();
	let [_, Outcome::Derived(tagged), _, Outcome::Derived(dep)] = &outcomes[..] else { panic!("{outcomes:?}") };
	assert_eq!(leading_binders(&tagged.derivation.ty), 1);
	assert_eq!(leading_binders(&dep.derivation.ty), 3);

	let outcomes = run_in(&mut session, "show Tag 3 5 : Tagged 3.\nshow MkDep Nat 1 2 : Dep Nat 1.")
		.map_err(|e| e.kind)
		.unwrap();
	let rendered = outcomes
		.iter()
		.map(|outcome| match outcome {
			Outcome::Shown(rendered) => rendered.as_str(),
			_ => panic!("{outcome:?}"),
		})
		.collect::<Vec<_>>();
	assert_eq!(rendered, vec!["Tag 5", "MkDep 2"]);
}

#[test]
fn unresolved_holes_name_their_binders() {
	let (mut session, result) =
		run_source(&format!("{LIST}\ninductive Nest (A : Type) : Type := NNil | NCons (x : A) (xs : Nest (List A))."));
	result.map_err(|e| e.kind).unwrap();
	let nest = session.interner().get("Nest").unwrap();
	let error = session.derive_instance(nest, Locality::Global).unwrap_err();
	let DerivationError::PlaceholderUnresolved(message) = &error else { panic!("{error:?}") };
	assert_eq!(message, "Repr (Nest (List A))");
	assert!(!message.contains('#'));
}

#[test]
fn declaration_errors_point_at_the_offending_expression() {
	for (source, kind, culprit) in [
		(
			"inductive Bad : Type := MkBad : Nat.",
			DeclarationErrorKind::InvalidConstructorResult("MkBad".to_owned(), "Bad".to_owned()),
			"Nat",
		),
		("show Missing : Nat.", DeclarationErrorKind::NotInScope("Missing".to_owned()), "Missing"),
	] {
		let (_, result) = run_source(source);
		let error = result.unwrap_err();
		assert_eq!(error.kind, CommandErrorKind::Declaration(kind));
		let lexed_source = lex(source).ok().expect(source);
		let (start, end) = (lexed_source.range(error.range.0).0, lexed_source.range(error.range.1 - 1).1);
		assert_eq!(&source[start..end], culprit);
	}
}
