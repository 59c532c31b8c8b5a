use lasso::Rodeo;
use peg::error::ParseError;

use crate::{
	common::Name,
	ir::{
		descriptor::Finiteness,
		presyntax::{Command, Expression, ParsedBinder, ParsedCommand, ParsedConstructor, ParsedInductive, ParsedProgram, Preterm},
		source::{unescape, Keyword, LexedSource, Token},
		syntax::Sort,
	},
	registry::Locality,
};

/// Parses a lexed declaration file, interning every identifier.
pub fn parse(source: &LexedSource, interner: &mut Rodeo) -> Result<ParsedProgram, ParseError<usize>> {
	let mut parser = Parser { source: source.source, ranges: &source.ranges, interner };
	declarations::program(&source.tokens, &mut parser)
}

pub struct Parser<'s, 'i> {
	source: &'s str,
	ranges: &'s [(usize, usize)],
	interner: &'i mut Rodeo,
}

impl<'s, 'i> Parser<'s, 'i> {
	fn span(&self, token_index: usize) -> &'s str {
		let (start, end) = self.ranges[token_index];
		&self.source[start..end]
	}

	fn identifier(&mut self, token_index: usize) -> Name {
		let span = self.span(token_index);
		self.interner.get_or_intern(span)
	}

	fn number(&self, token_index: usize) -> Option<u64> { self.span(token_index).parse::<u64>().ok() }

	fn string(&self, token_index: usize) -> String { unescape(self.span(token_index)) }
}

fn share(names: Vec<Name>, range: (usize, usize), ty: Expression) -> Vec<ParsedBinder> {
	names.into_iter().map(|name| ParsedBinder { range, name, ty: ty.clone() }).collect()
}

peg::parser! {
  grammar declarations(parser: &mut Parser) for [Token] {
		rule _ = [Token::Whitespace]*

		rule identifier() -> Name
			= pos:position!() [Token::Identifier] {parser.identifier(pos)}

		rule number() -> u64
			= pos:position!() [Token::Number] {? parser.number(pos).ok_or("number") }

		rule string() -> String
			= pos:position!() [Token::String] {parser.string(pos)}

		// `(x y : T)` binds both names at the same type.
		rule binder() -> Vec<ParsedBinder>
			= init:position!() [Token::ParenL] _ names:(identifier() ++ _) _ [Token::Colon] _ ty:expression() _ [Token::ParenR] fini:position!()
				{share(names, (init, fini), ty)}

		rule binders() -> Vec<ParsedBinder>
			= groups:(binder() ** _) {groups.into_iter().flatten().collect()}

		rule binders1() -> Vec<ParsedBinder>
			= groups:(binder() ++ _) {groups.into_iter().flatten().collect()}

		rule atom() -> Expression
			= [Token::ParenL] _ expression:expression() _ [Token::ParenR] {expression}
			/ init:position!() preterm:(
				  name:identifier() {Preterm::Variable(name)}
				/ [Token::Keyword(Keyword::Prop)] {Preterm::Sort(Sort::Prop)}
				/ [Token::Keyword(Keyword::Set)] {Preterm::Sort(Sort::Set)}
				/ [Token::Keyword(Keyword::Type)] {Preterm::Sort(Sort::Type(0))}
				/ n:number() {Preterm::Number(n)}
				/ s:string() {Preterm::String(s)}
			) fini:position!() {preterm.at((init, fini))}

		#[cache]
		rule spine() -> Expression
			= init:position!() callee:atom() arguments:(_ a:atom() {a})+ fini:position!()
				{Preterm::Call { callee: callee.into(), arguments }.at((init, fini))}
			/ atom()

		rule expression() -> Expression
			= init:position!() preterm:(
				  [Token::Keyword(Keyword::Forall)] _ parameters:binders1() _ [Token::Comma] _ codomain:expression()
					{Preterm::Pi { parameters, codomain: codomain.into() }}
				/ [Token::Keyword(Keyword::Fun)] _ parameters:binders1() _ [Token::DoubleArrow] _ body:expression()
					{Preterm::Lambda { parameters, body: body.into() }}
				/ domain:spine() _ [Token::Arrow] _ codomain:expression()
					{Preterm::Arrow { domain: domain.into(), codomain: codomain.into() }}
			) fini:position!() {preterm.at((init, fini))}
			/ spine()

		// Declarations.
		rule constructor() -> ParsedConstructor
			= init:position!() name:identifier() _ arguments:binders() result:(_ [Token::Colon] _ e:expression() {e})? fini:position!()
				{ParsedConstructor { range: (init, fini), name, arguments, result }}

		rule inductive() -> ParsedInductive
			= init:position!() name:identifier() _ parameters:binders() _ [Token::Colon] _ arity:expression() _ [Token::ColonEqual] _
				([Token::Pipe] _)? constructors:(constructor() ** (_ [Token::Pipe] _)) fini:position!()
				{ParsedInductive { range: (init, fini), name, parameters, arity, constructors }}

		rule field() -> ParsedBinder
			= init:position!() name:identifier() _ [Token::Colon] _ ty:expression() fini:position!()
				{ParsedBinder { range: (init, fini), name, ty }}

		rule record() -> ParsedInductive
			= init:position!() name:identifier() _ parameters:binders() _ [Token::Colon] _ arity:expression() _ [Token::ColonEqual] _
				constructor_init:position!() constructor:identifier() _ [Token::CurlyL] _ fields:(field() ** (_ [Token::Semi] _)) _ ([Token::Semi] _)? [Token::CurlyR] fini:position!()
				{
					let constructor = ParsedConstructor { range: (constructor_init, fini), name: constructor, arguments: fields, result: None };
					ParsedInductive { range: (init, fini), name, parameters, arity, constructors: vec![constructor] }
				}

		rule block() -> Vec<ParsedInductive>
			= inductive() ++ (_ [Token::Keyword(Keyword::With)] _)

		// Commands.
		rule locality() -> Locality
			= [Token::Keyword(Keyword::Local)] {Locality::Local}
			/ [Token::Keyword(Keyword::Global)] {Locality::Global}
			/ [Token::Keyword(Keyword::Export)] {Locality::Export}

		rule command() -> ParsedCommand
			= init:position!() command:(
				  [Token::Keyword(Keyword::Inductive)] _ block:block()
					{Command::Declare { finiteness: Finiteness::Inductive, block }}
				/ [Token::Keyword(Keyword::CoInductive)] _ block:block()
					{Command::Declare { finiteness: Finiteness::CoInductive, block }}
				/ [Token::Keyword(Keyword::Record)] _ record:record()
					{Command::Declare { finiteness: Finiteness::Record, block: vec![record] }}
				/ [Token::Keyword(Keyword::Derive)] _ name:identifier() locality:(_ l:locality() {l})?
					{Command::Derive { name, locality: locality.unwrap_or_default() }}
				/ [Token::Keyword(Keyword::Show)] _ expression:expression() _ [Token::Colon] _ ty:expression()
					{Command::Show { expression, ty }}
				/ [Token::Keyword(Keyword::Check)] _ expression:expression() _ [Token::Colon] _ ty:expression() _ [Token::Equal] _ expected:string()
					{Command::Check { expression, ty, expected }}
			) _ [Token::Period] fini:position!() {ParsedCommand { range: (init, fini), command }}

		pub rule program() -> ParsedProgram
			= _ commands:(command() ** _) _ {ParsedProgram { commands }}
  }
}
