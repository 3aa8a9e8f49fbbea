//! Parsing assembly source and laying it out in memory (the first translation pass).

pub mod ast;
pub mod parser;
pub mod program;
pub mod token;

pub use self::program::{Cell, Program, VectorDeclaration};
