//! Quark Parser Module
//!
//! Builds the nested block tree from the scanner's flat token stream.

mod ast;
mod sexpr_parser;

pub use ast::{Block, Element, Node};
pub use sexpr_parser::SExprParser;
