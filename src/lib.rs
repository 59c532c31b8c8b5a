pub mod common;
pub mod document;
pub mod ir;
pub mod op;
pub mod prelude;
pub mod registry;
pub mod report;
pub mod session;
