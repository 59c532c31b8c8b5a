pub mod context;
pub mod declare;
pub mod derive;
pub mod evaluate;
pub mod nameless;
pub mod parse;
pub mod resolve;
pub mod traverse;
pub mod unparse;
