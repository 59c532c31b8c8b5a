use lasso::Rodeo;
use proptest::{prelude::*, sample::subsequence};
use reprise::{
	common::{bind, Index, Name},
	ir::syntax::{Sort, Term},
};

const POOL: usize = 5;

// Terms over a pool of names, converted to the locally-nameless form the way binders are built.
#[derive(Clone, Debug)]
enum Named {
	Variable(usize),
	Sort,
	Apply(Box<Named>, Box<Named>),
	Lambda(usize, Box<Named>, Box<Named>),
	Product(usize, Box<Named>, Box<Named>),
}

fn named() -> impl Strategy<Value = Named> {
	let leaf = prop_oneof![(0..POOL).prop_map(Named::Variable), Just(Named::Sort)];
	leaf.prop_recursive(4, 32, 2, |inner| {
		prop_oneof![
			(inner.clone(), inner.clone()).prop_map(|(f, a)| Named::Apply(f.into(), a.into())),
			(0..POOL, inner.clone(), inner.clone()).prop_map(|(x, d, b)| Named::Lambda(x, d.into(), b.into())),
			(0..POOL, inner.clone(), inner).prop_map(|(x, d, b)| Named::Product(x, d.into(), b.into())),
		]
	})
}

fn build(named: &Named, names: &[Name]) -> Term {
	match named {
		Named::Variable(x) => Term::Free(names[*x]),
		Named::Sort => Term::Sort(Sort::Type(0)),
		Named::Apply(f, a) => Term::apply(build(f, names), [build(a, names)]),
		Named::Lambda(x, domain, body) => Term::Lambda {
			domain: build(domain, names).into(),
			body: bind([Some(names[*x])], build(body, names).abstract_over(&[names[*x]])),
		},
		Named::Product(x, domain, codomain) => Term::Product {
			domain: build(domain, names).into(),
			codomain: bind([Some(names[*x])], build(codomain, names).abstract_over(&[names[*x]])),
		},
	}
}

fn pool() -> Vec<Name> {
	let mut interner = Rodeo::new();
	(0..POOL).map(|i| interner.get_or_intern(format!("x{i}"))).collect()
}

proptest! {
	#[test]
	fn instantiate_inverts_abstract(
		named in named(),
		chosen in subsequence((0..POOL).collect::<Vec<_>>(), 0..=POOL),
	) {
		let names = pool();
		let term = build(&named, &names);
		let chosen = chosen.into_iter().map(|i| names[i]).collect::<Vec<_>>();
		prop_assert_eq!(term.abstract_over(&chosen).instantiate(&chosen), term);
	}

	#[test]
	fn abstracted_index_counts_binders(depth in 0..8usize, position in 0..POOL) {
		let names = pool();
		let mut term = Term::Free(names[position]);
		for _ in 0..depth {
			term = Term::Lambda { domain: Term::Sort(Sort::Prop).into(), body: bind([None], term) };
		}

		let mut abstracted = term.abstract_over(&names);
		for _ in 0..depth {
			let Term::Lambda { body, .. } = abstracted else { panic!("lost a binder") };
			abstracted = *body.body;
		}
		prop_assert_eq!(abstracted, Term::Bound(Index(depth + position)));
	}
}
