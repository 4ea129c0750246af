use std::num::IntErrorKind;

use super::ast::{Block, Element, Node};
use crate::error::{Error, Result};
use crate::lexer::Token;

/// An opened block waiting for its closing bracket
struct OpenBlock {
    nodes: Vec<Node>,
    /// The opening bracket, for error context
    opened_by: Token,
}

/// S-expression tree builder for Quark
///
/// Maintains the current insertion list as the top of a stack of open
/// blocks. Opening brackets push a fresh block, closing brackets fold the
/// current block into its parent.
pub struct SExprParser {
    tokens: Vec<Token>,
    current: usize,
}

impl SExprParser {
    /// Creates a new tree builder over scanned tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        SExprParser { tokens, current: 0 }
    }

    /// Parses the tokens into the root block
    pub fn parse(&mut self) -> Result<Block> {
        self.current = 0;
        let mut root: Vec<Node> = Vec::new();
        let mut open: Vec<OpenBlock> = Vec::new();

        while let Some(token) = self.advance() {
            if token.is_opening() {
                open.push(OpenBlock {
                    nodes: Vec::new(),
                    opened_by: token,
                });
            } else if token.is_closing() {
                let finished = open.pop().ok_or_else(|| Error::StructuralMismatch {
                    line: token.line,
                    column: token.column,
                    bracket: token.lexeme.chars().next().unwrap_or(')'),
                })?;
                let block = Node::Block(Block::new(finished.nodes));
                match open.last_mut() {
                    Some(parent) => parent.nodes.push(block),
                    None => root.push(block),
                }
            } else {
                let leaf = Node::Element(classify(&token.lexeme));
                match open.last_mut() {
                    Some(parent) => parent.nodes.push(leaf),
                    None => root.push(leaf),
                }
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(Error::malformed(
                unclosed.opened_by.line,
                unclosed.opened_by.column,
                format!("unclosed '{}'", unclosed.opened_by.lexeme),
            ));
        }

        Ok(Block::new(root))
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned();
        if token.is_some() {
            self.current += 1;
        }
        token
    }
}

/// Classifies value-token text as a string, number or word leaf
fn classify(text: &str) -> Element {
    if text.starts_with('"') {
        let mut chars = text.chars();
        chars.next();
        if text.len() > 1 {
            chars.next_back();
        }
        return Element::String(chars.as_str().to_string());
    }
    match text.parse::<i64>() {
        Ok(n) => Element::Number(n),
        Err(e) => {
            if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) {
                tracing::debug!(literal = text, "integer literal out of range, read as word");
            }
            Element::Word(text.to_string())
        }
    }
}
