use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::parser::Node;

/// Lists nested deeper than this render as `[...]`
const MAX_RENDER_DEPTH: usize = 64;

/// Runtime value representation
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value (`none`)
    None,
    /// Boolean value
    Boolean(bool),
    /// 64-bit integer value
    Integer(i64),
    /// String value
    String(String),
    /// Ordered list of shared values
    List(Vec<ValueCell>),
    /// Function value
    ///
    /// Carries no captured frame: names in the body resolve against
    /// whatever frames are active when it is called.
    Function {
        /// Formal parameter names
        params: Vec<String>,
        /// Body evaluated on each call
        body: Arc<Node>,
    },
}

impl Value {
    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Function { .. } => "Function",
        }
    }

    /// Returns true if the value is truthy in a condition
    ///
    /// Lists are truthy even when empty; functions have no scalar and are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            Value::List(_) => true,
            Value::Function { .. } => false,
        }
    }

    /// True for function values
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function { .. })
    }

    /// Raw text of the value as `print` shows it (strings unquoted)
    pub fn render(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Lists flattened to comma-joined text, the way a list reads when
    /// compared or concatenated with a scalar
    pub fn join_text(&self) -> String {
        self.join_depth(0)
    }

    fn join_depth(&self, depth: usize) -> String {
        match self {
            Value::List(_) if depth >= MAX_RENDER_DEPTH => String::new(),
            Value::List(items) => items
                .iter()
                .map(|item| match &*item.borrow() {
                    Value::None | Value::Function { .. } => String::new(),
                    inner => inner.join_depth(depth + 1),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.render(),
        }
    }

    fn fmt_depth(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(_) if depth >= MAX_RENDER_DEPTH => write!(f, "[...]"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.borrow().fmt_depth(f, depth + 1)?;
                }
                write!(f, "]")
            }
            // Functions have no printable scalar
            Value::Function { .. } => write!(f, "none"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_depth(f, 0)
    }
}

/// A shared, mutable value object
///
/// Bindings, list slots and function arguments all hold cells. Cloning a
/// cell aliases it; [`ValueCell::assign`] overwrites the contents so every
/// alias observes the update.
#[derive(Clone)]
pub struct ValueCell(Rc<RefCell<Value>>);

impl ValueCell {
    /// Wraps a value in a fresh cell
    pub fn new(value: Value) -> Self {
        ValueCell(Rc::new(RefCell::new(value)))
    }

    /// A fresh cell holding `None`
    pub fn none() -> Self {
        ValueCell::new(Value::None)
    }

    /// Borrows the contents
    pub fn borrow(&self) -> Ref<'_, Value> {
        self.0.borrow()
    }

    /// Clones the contents out of the cell
    pub fn get(&self) -> Value {
        self.0.borrow().clone()
    }

    /// Replaces the contents in place
    pub fn replace(&self, value: Value) {
        *self.0.borrow_mut() = value;
    }

    /// Copies `source`'s contents into this cell in place
    pub fn assign(&self, source: &ValueCell) {
        let value = source.get();
        self.replace(value);
    }

    /// True when both cells are the same object
    pub fn ptr_eq(&self, other: &ValueCell) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Value> for ValueCell {
    fn from(value: Value) -> Self {
        ValueCell::new(value)
    }
}

impl PartialEq for ValueCell {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.borrow() == *other.borrow()
    }
}

impl fmt::Debug for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&*self.borrow(), f)
    }
}

impl fmt::Display for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&*self.borrow(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: Vec<Value>) -> Value {
        Value::List(items.into_iter().map(ValueCell::new).collect())
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(Value::Integer(-3).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::String("0".to_string()).is_truthy());
        assert!(Value::List(Vec::new()).is_truthy());
        assert!(!Value::Function {
            params: vec![],
            body: Arc::new(Node::word("x")),
        }
        .is_truthy());
    }

    #[test]
    fn test_assign_is_seen_through_aliases() {
        let original = ValueCell::new(Value::Integer(1));
        let alias = original.clone();

        original.assign(&ValueCell::new(Value::String("two".to_string())));

        assert_eq!(alias.get(), Value::String("two".to_string()));
        assert!(alias.ptr_eq(&original));
    }

    #[test]
    fn test_assign_from_itself() {
        let cell = ValueCell::new(Value::Integer(7));
        cell.assign(&cell.clone());
        assert_eq!(cell.get(), Value::Integer(7));
    }

    #[test]
    fn test_render_and_display() {
        let value = list(vec![
            Value::Integer(1),
            Value::String("a".to_string()),
            Value::None,
        ]);
        assert_eq!(value.to_string(), "[1, \"a\", none]");
        assert_eq!(Value::String("plain".to_string()).render(), "plain");
        assert_eq!(Value::Boolean(true).render(), "true");
    }

    #[test]
    fn test_join_text() {
        let value = list(vec![
            Value::Integer(1),
            list(vec![Value::Integer(2), Value::Integer(3)]),
            Value::String("x".to_string()),
        ]);
        assert_eq!(value.join_text(), "1,2,3,x");
    }

    #[test]
    fn test_self_containing_list_renders() {
        let slot = ValueCell::new(Value::Integer(0));
        let outer = ValueCell::new(Value::List(vec![slot.clone()]));
        slot.assign(&outer);

        assert!(outer.to_string().contains("[...]"));
    }
}
