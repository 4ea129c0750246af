use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed leaf of the syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Element {
    /// String literal with the quotes stripped
    String(String),
    /// Base-10 integer literal
    Number(i64),
    /// Anything else: keywords, operators, identifiers
    Word(String),
}

impl Element {
    /// Returns the leaf's value as text (no quotes for strings)
    pub fn text(&self) -> String {
        match self {
            Element::String(s) | Element::Word(s) => s.clone(),
            Element::Number(n) => n.to_string(),
        }
    }

    /// Returns the word if this leaf is a `Word`
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Element::Word(w) => Some(w),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Element::String(s) => write!(f, "\"{}\"", s),
            Element::Number(n) => write!(f, "{}", n),
            Element::Word(w) => write!(f, "{}", w),
        }
    }
}

/// A tree node: either a leaf or a nested block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Leaf
    Element(Element),
    /// Bracketed group
    Block(Block),
}

impl Node {
    /// Shorthand for a word leaf
    pub fn word(w: impl Into<String>) -> Self {
        Node::Element(Element::Word(w.into()))
    }

    /// Returns the leaf if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Block(_) => None,
        }
    }

    /// Returns the block if this node is one
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(b) => Some(b),
            Node::Element(_) => None,
        }
    }

    /// Returns the word if this node is a word leaf
    pub fn as_word(&self) -> Option<&str> {
        self.as_element().and_then(Element::as_word)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Element(e) => write!(f, "{}", e),
            Node::Block(b) => write!(f, "{}", b),
        }
    }
}

/// Ordered group of nodes
///
/// A block whose members are all blocks is a *sequence* (a body of forms);
/// any other block is a single form `(operator operand...)`. The empty block
/// counts as a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block {
    /// Members in source order
    pub nodes: Vec<Node>,
}

impl Block {
    /// Creates a block from its members
    pub fn new(nodes: Vec<Node>) -> Self {
        Block { nodes }
    }

    /// True when every member is itself a block
    pub fn is_sequence(&self) -> bool {
        self.nodes.iter().all(|n| matches!(n, Node::Block(_)))
    }

    /// First member of a form
    pub fn head(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Members after the head
    pub fn args(&self) -> &[Node] {
        self.nodes.get(1..).unwrap_or(&[])
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the block has no members
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over the members
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", node)?;
        }
        write!(f, ")")
    }
}
