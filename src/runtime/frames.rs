use std::collections::HashMap;

use crate::runtime::ValueCell;

/// One level of bindings
type Frame = HashMap<String, ValueCell>;

/// Stack of binding frames with dynamic scoping
///
/// Lookups walk every active frame from the most recently pushed down to
/// the global one, so a function body sees its caller's locals.
#[derive(Debug, Clone)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    /// Creates a stack holding only the global frame
    pub fn new() -> Self {
        FrameStack {
            frames: vec![Frame::new()],
        }
    }

    /// Pushes an empty frame
    pub fn push(&mut self) {
        self.frames.push(Frame::new());
        tracing::trace!(depth = self.frames.len(), "frame pushed");
    }

    /// Pops the most recent frame; the global frame is never removed
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        tracing::trace!(depth = self.frames.len(), "frame popped");
    }

    /// Drops frames until `depth` remain (never below the global frame)
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth.max(1));
    }

    /// Binds `name` in the top frame, replacing any binding it already has there
    pub fn declare(&mut self, name: impl Into<String>, value: ValueCell) {
        if let Some(top) = self.frames.last_mut() {
            top.insert(name.into(), value);
        }
    }

    /// Resolves `name`; the most recently pushed binding wins
    pub fn lookup(&self, name: &str) -> Option<ValueCell> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .cloned()
    }

    /// Checks if any active frame binds `name`
    pub fn exists(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.contains_key(name))
    }

    /// Returns the number of active frames (1 for the global frame alone)
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns the flattened view of all bindings, later frames shadowing earlier
    pub fn snapshot(&self) -> HashMap<String, ValueCell> {
        let mut result = HashMap::new();
        for frame in &self.frames {
            for (k, v) in frame {
                result.insert(k.clone(), v.clone());
            }
        }
        result
    }
}

impl Default for FrameStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Value;

    fn int(n: i64) -> ValueCell {
        ValueCell::new(Value::Integer(n))
    }

    #[test]
    fn test_basic_declare_and_lookup() {
        let mut frames = FrameStack::new();
        frames.declare("x", int(42));

        assert_eq!(frames.lookup("x").unwrap().get(), Value::Integer(42));
        assert!(frames.lookup("undefined").is_none());
    }

    #[test]
    fn test_shadowing() {
        let mut frames = FrameStack::new();
        frames.declare("x", int(10));

        frames.push();
        frames.declare("x", ValueCell::new(Value::String("shadowed".to_string())));
        assert_eq!(
            frames.lookup("x").unwrap().get(),
            Value::String("shadowed".to_string())
        );

        frames.pop();
        assert_eq!(frames.lookup("x").unwrap().get(), Value::Integer(10));
    }

    #[test]
    fn test_declare_writes_top_frame_only() {
        let mut frames = FrameStack::new();
        frames.push();
        frames.declare("y", int(1));
        assert!(frames.exists("y"));

        frames.pop();
        assert!(!frames.exists("y"));
    }

    #[test]
    fn test_redeclare_in_same_frame_replaces() {
        let mut frames = FrameStack::new();
        frames.declare("x", int(1));
        frames.declare("x", int(2));
        assert_eq!(frames.lookup("x").unwrap().get(), Value::Integer(2));
    }

    #[test]
    fn test_global_frame_survives_pop() {
        let mut frames = FrameStack::new();
        frames.declare("g", int(1));
        frames.pop();
        frames.pop();

        assert_eq!(frames.depth(), 1);
        assert!(frames.exists("g"));
    }

    #[test]
    fn test_truncate_restores_depth() {
        let mut frames = FrameStack::new();
        frames.push();
        frames.push();
        frames.push();
        frames.truncate(2);
        assert_eq!(frames.depth(), 2);

        frames.truncate(0);
        assert_eq!(frames.depth(), 1);
    }

    #[test]
    fn test_snapshot_matches_lookup() {
        let mut frames = FrameStack::new();
        frames.declare("x", int(1));
        frames.declare("y", int(2));
        frames.push();
        frames.declare("x", int(3));

        let snapshot = frames.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["x"].get(), Value::Integer(3));
        assert_eq!(snapshot["y"].get(), Value::Integer(2));
    }
}
