use std::io::Write;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::lexer::SExprScanner;
use crate::parser::{Block, Element, Node, SExprParser};
use crate::runtime::operators::{self, ArithmeticOp, ComparisonOp};
use crate::runtime::{EvaluatorConfig, FrameStack, Value, ValueCell};

/// Outcome of evaluating one node
///
/// `Return` is the signal raised by `return`: sequences and loops stop and
/// hand it upward unchanged until a function call (or the program) catches it.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Ordinary result
    Value(ValueCell),
    /// Early exit carrying the returned value
    Return(ValueCell),
}

impl Flow {
    /// The carried value, whichever variant
    pub fn into_value(self) -> ValueCell {
        match self {
            Flow::Value(v) | Flow::Return(v) => v,
        }
    }

    /// True for a return signal
    pub fn is_return(&self) -> bool {
        matches!(self, Flow::Return(_))
    }

    fn none() -> Self {
        Flow::Value(ValueCell::none())
    }
}

/// Unwraps an operand's value, handing a return signal straight upward
macro_rules! operand {
    ($flow:expr) => {
        match $flow? {
            Flow::Value(v) => v,
            signal @ Flow::Return(_) => return Ok(signal),
        }
    };
}

/// Where a `set` writes
#[derive(Debug)]
enum AssignTarget {
    /// A named binding, mutated in place
    Name(String),
    /// An existing value object (a list slot), mutated in place
    Cell(ValueCell),
    /// A position inside the string bound to a name
    Index(IndexDescriptor),
}

/// Indexed assignment target that did not resolve to a stored value
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexDescriptor {
    variable: String,
    index: usize,
}

/// Tree-walking evaluator for Quark
///
/// Special forms:
/// - `(let name value)` - Declare in the current frame
/// - `(set target value)` - Mutate a binding, list slot or string position
/// - `(fn (params) body)` - Function value
/// - `(if cond then else)` - Conditional
/// - `(return value)` - Early exit from the enclosing call
/// - `(while cond body)` - Loop
/// - `(list items...)` / `(index owner i)` - Lists and indexing
/// - `(print args...)` - Write raw values to the output sink
pub struct QuarkEvaluator {
    /// Binding frames
    frames: FrameStack,
    /// Sink for `print`
    output: Box<dyn Write>,
    /// Limits
    config: EvaluatorConfig,
}

impl QuarkEvaluator {
    /// Creates a new evaluator printing to stdout
    ///
    /// Limits come from the environment (see [`EvaluatorConfig::from_env`]).
    pub fn new() -> Self {
        Self::with_config(EvaluatorConfig::from_env())
    }

    /// Creates a new evaluator with custom limits
    pub fn with_config(config: EvaluatorConfig) -> Self {
        QuarkEvaluator {
            frames: FrameStack::new(),
            output: Box::new(std::io::stdout()),
            config,
        }
    }

    /// Replaces the `print` sink
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Active frames
    pub fn frames(&self) -> &FrameStack {
        &self.frames
    }

    /// Scans, parses and executes source text
    pub fn eval_str(&mut self, source: &str) -> Result<Value> {
        let tokens = SExprScanner::new(source).scan_tokens()?;
        let program = SExprParser::new(tokens).parse()?;
        self.execute(&program)
    }

    /// Execute a parsed program
    ///
    /// Top-level members run in one program frame. A return signal ends the
    /// run with its value; otherwise the last member's value is the result.
    /// Frames are restored on every exit, so nothing leaks between runs.
    pub fn execute(&mut self, program: &Block) -> Result<Value> {
        tracing::debug!(members = program.len(), "executing program");
        let depth = self.frames.depth();
        self.frames.push();
        let result = self.execute_members(program);
        self.frames.truncate(depth);
        if let Err(e) = &result {
            tracing::debug!(error = %e, "program failed");
        }
        result.map(|cell| cell.get())
    }

    fn execute_members(&mut self, program: &Block) -> Result<ValueCell> {
        let mut last = ValueCell::none();
        for node in program.iter() {
            match self.evaluate(node)? {
                Flow::Return(v) => return Ok(v),
                Flow::Value(v) => last = v,
            }
        }
        Ok(last)
    }

    /// Evaluate a single node
    pub fn evaluate(&mut self, node: &Node) -> Result<Flow> {
        match node {
            Node::Element(element) => Ok(Flow::Value(self.coerce(element))),
            Node::Block(block) if block.is_sequence() => self.eval_sequence(block),
            Node::Block(block) => self.eval_form(block),
        }
    }

    /// Turns a leaf into a value
    ///
    /// Bound words yield the bound object itself, except that functions are
    /// only reachable as call heads and read as `None` here.
    fn coerce(&self, element: &Element) -> ValueCell {
        match element {
            Element::Word(w) if w == "none" => ValueCell::none(),
            Element::Word(w) => match self.frames.lookup(w) {
                Some(cell) if cell.borrow().is_function() => ValueCell::none(),
                Some(cell) => cell,
                None => ValueCell::none(),
            },
            Element::String(s) => ValueCell::new(Value::String(s.clone())),
            Element::Number(n) => ValueCell::new(Value::Integer(*n)),
        }
    }

    fn eval_sequence(&mut self, block: &Block) -> Result<Flow> {
        self.frames.push();
        let result = self.eval_members(block);
        self.frames.pop();
        result
    }

    fn eval_members(&mut self, block: &Block) -> Result<Flow> {
        for node in block.iter() {
            let flow = self.evaluate(node)?;
            if flow.is_return() {
                return Ok(flow);
            }
        }
        Ok(Flow::none())
    }

    /// Evaluates `args[i]`, or `None` when absent
    fn eval_arg(&mut self, args: &[Node], i: usize) -> Result<Flow> {
        match args.get(i) {
            Some(node) => self.evaluate(node),
            None => Ok(Flow::none()),
        }
    }

    fn eval_form(&mut self, block: &Block) -> Result<Flow> {
        let args = block.args();
        let head = match block.head() {
            Some(Node::Element(element)) => element,
            Some(other) => {
                return Err(Error::UnrecognizedExpression {
                    expression: other.to_string(),
                })
            }
            None => return Ok(Flow::none()),
        };

        let word = match head {
            Element::Word(w) => w.as_str(),
            literal => return Ok(Flow::Value(self.coerce(literal))),
        };

        match word {
            "let" => self.eval_let(args),
            "set" => self.eval_set(args),
            "fn" => self.eval_fn(args),
            "if" => self.eval_if(args),
            "return" => self.eval_return(args),
            "while" => self.eval_while(args),
            "list" => self.eval_list(args),
            "import" => self.eval_import(args),
            "index" => self.eval_index(args),
            "print" => self.eval_print(args),
            _ => {
                if let Some(op) = ComparisonOp::from_word(word) {
                    return self.eval_comparison(op, args);
                }
                if let Some(op) = ArithmeticOp::from_word(word) {
                    return self.eval_arithmetic(op, args);
                }
                match self.frames.lookup(word) {
                    Some(cell) if cell.borrow().is_function() => {
                        self.call_function(word, &cell, args)
                    }
                    Some(cell) => Ok(Flow::Value(cell)),
                    None => Err(Error::UnrecognizedExpression {
                        expression: word.to_string(),
                    }),
                }
            }
        }
    }

    /// (let name value) - Declare in the current frame
    fn eval_let(&mut self, args: &[Node]) -> Result<Flow> {
        let name = match args.first() {
            Some(node) => target_name(node)?,
            None => {
                return Err(Error::InvalidAssignmentTarget {
                    target: "(let)".to_string(),
                })
            }
        };
        let value = operand!(self.eval_arg(args, 1));
        self.frames.declare(name, value);
        Ok(Flow::none())
    }

    /// (set target value) - Mutate in place
    fn eval_set(&mut self, args: &[Node]) -> Result<Flow> {
        let target = match args.first() {
            Some(node) => self.resolve_target(node)?,
            None => {
                return Err(Error::InvalidAssignmentTarget {
                    target: "(set)".to_string(),
                })
            }
        };

        match target {
            AssignTarget::Name(name) => {
                let cell = self.lookup_declared(&name)?;
                let value = operand!(self.eval_arg(args, 1));
                cell.assign(&value);
            }
            AssignTarget::Cell(cell) => {
                let value = operand!(self.eval_arg(args, 1));
                cell.assign(&value);
            }
            AssignTarget::Index(descriptor) => {
                let owner = self.lookup_declared(&descriptor.variable)?;
                let value = operand!(self.eval_arg(args, 1)).get();
                splice_into(&owner, descriptor.index, &value);
            }
        }
        Ok(Flow::none())
    }

    fn lookup_declared(&self, name: &str) -> Result<ValueCell> {
        self.frames
            .lookup(name)
            .ok_or_else(|| Error::UndefinedVariable {
                name: name.to_string(),
            })
    }

    /// Resolves the first argument of `set`
    ///
    /// `(index owner i)` names the stored list slot when there is one;
    /// otherwise it becomes a position inside the owner variable.
    fn resolve_target(&mut self, node: &Node) -> Result<AssignTarget> {
        if let Node::Block(form) = node {
            if form.len() == 3 && form.head().and_then(Node::as_word) == Some("index") {
                let owner_node = &form.nodes[1];
                let owner = self.evaluate(owner_node)?.into_value();
                let index = self.evaluate(&form.nodes[2])?.into_value();

                if let Some(slot) = list_slot(&owner, &index) {
                    return Ok(AssignTarget::Cell(slot));
                }
                if let (Some(variable), Some(index)) =
                    (owner_node.as_word(), as_position(&index.borrow()))
                {
                    return Ok(AssignTarget::Index(IndexDescriptor {
                        variable: variable.to_string(),
                        index,
                    }));
                }
                return Err(Error::InvalidAssignmentTarget {
                    target: node.to_string(),
                });
            }
        }
        target_name(node).map(AssignTarget::Name)
    }

    /// (fn (params) body) - Function value, no frame captured
    fn eval_fn(&mut self, args: &[Node]) -> Result<Flow> {
        let params = match args.first() {
            Some(Node::Block(params)) => params
                .iter()
                .map(|param| {
                    param
                        .as_word()
                        .map(str::to_string)
                        .ok_or_else(|| Error::InvalidParameter {
                            name: param.to_string(),
                        })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(Error::InvalidParameter {
                    name: other.to_string(),
                })
            }
            None => Vec::new(),
        };
        let body = args
            .get(1)
            .cloned()
            .unwrap_or_else(|| Node::Block(Block::default()));

        Ok(Flow::Value(ValueCell::new(Value::Function {
            params,
            body: Arc::new(body),
        })))
    }

    /// (if cond then else)
    fn eval_if(&mut self, args: &[Node]) -> Result<Flow> {
        let condition = operand!(self.eval_arg(args, 0));
        let truthy = condition.borrow().is_truthy();
        if truthy {
            self.eval_arg(args, 1)
        } else {
            self.eval_arg(args, 2)
        }
    }

    /// (return value) - Raise the return signal
    fn eval_return(&mut self, args: &[Node]) -> Result<Flow> {
        let value = operand!(self.eval_arg(args, 0));
        Ok(Flow::Return(value))
    }

    /// (while cond body)
    fn eval_while(&mut self, args: &[Node]) -> Result<Flow> {
        let mut iterations: usize = 0;

        loop {
            let condition = operand!(self.eval_arg(args, 0));
            if !condition.borrow().is_truthy() {
                break;
            }

            iterations += 1;
            if let Some(limit) = self.config.max_iterations {
                if iterations > limit {
                    return Err(Error::TooManyIterations { limit });
                }
            }
            tracing::trace!(iteration = iterations, "loop iteration");

            let flow = self.eval_arg(args, 1)?;
            if flow.is_return() {
                return Ok(flow);
            }
        }

        Ok(Flow::none())
    }

    /// (list items...)
    fn eval_list(&mut self, args: &[Node]) -> Result<Flow> {
        let mut items = Vec::with_capacity(args.len());
        for arg in args {
            items.push(operand!(self.evaluate(arg)));
        }
        Ok(Flow::Value(ValueCell::new(Value::List(items))))
    }

    /// (import path) - Module resolution is not available; does nothing
    fn eval_import(&mut self, args: &[Node]) -> Result<Flow> {
        if let Some(path) = args.first() {
            tracing::debug!(path = %path, "import ignored");
        }
        Ok(Flow::none())
    }

    /// (index owner i) - Character of a string or slot of a list
    fn eval_index(&mut self, args: &[Node]) -> Result<Flow> {
        let owner = operand!(self.eval_arg(args, 0));
        let index = operand!(self.eval_arg(args, 1));

        let result = list_slot(&owner, &index)
            .or_else(|| char_at(&owner, &index))
            .unwrap_or_else(|| {
                tracing::debug!(owner = owner.borrow().type_name(), "index unresolved");
                ValueCell::none()
            });
        Ok(Flow::Value(result))
    }

    fn eval_comparison(&mut self, op: ComparisonOp, args: &[Node]) -> Result<Flow> {
        let left = operand!(self.eval_arg(args, 0));
        let right = operand!(self.eval_arg(args, 1));
        let result = operators::compare(op, &left, &right);
        Ok(Flow::Value(ValueCell::new(Value::Boolean(result))))
    }

    fn eval_arithmetic(&mut self, op: ArithmeticOp, args: &[Node]) -> Result<Flow> {
        let left = operand!(self.eval_arg(args, 0));
        let right = operand!(self.eval_arg(args, 1));
        let result = operators::arithmetic(op, &left, &right);
        if result == Value::None {
            tracing::debug!(
                op = ?op,
                left = left.borrow().type_name(),
                right = right.borrow().type_name(),
                "arithmetic produced none"
            );
        }
        Ok(Flow::Value(ValueCell::new(result)))
    }

    /// (print args...) - Raw values, space separated, one line
    fn eval_print(&mut self, args: &[Node]) -> Result<Flow> {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            let value = operand!(self.evaluate(arg));
            parts.push(value.borrow().render());
        }
        writeln!(self.output, "{}", parts.join(" ")).map_err(|e| Error::OutputFailed {
            message: e.to_string(),
        })?;
        Ok(Flow::none())
    }

    /// Calls a function value bound to `name`
    ///
    /// Actuals are evaluated in the caller's scope, then bound to the formals
    /// in a fresh frame. The body's return signal ends here.
    fn call_function(&mut self, name: &str, function: &ValueCell, args: &[Node]) -> Result<Flow> {
        let (params, body) = match &*function.borrow() {
            Value::Function { params, body } => (params.clone(), Arc::clone(body)),
            other => {
                return Err(Error::UnrecognizedExpression {
                    expression: format!("{} ({})", name, other.type_name()),
                })
            }
        };
        tracing::debug!(function = name, params = params.len(), "calling function");

        let mut actuals = Vec::with_capacity(params.len());
        for i in 0..params.len() {
            actuals.push(operand!(self.eval_arg(args, i)));
        }

        self.frames.push();
        for (param, value) in params.into_iter().zip(actuals) {
            self.frames.declare(param, value);
        }
        let result = self.evaluate(&body);
        self.frames.pop();

        Ok(Flow::Value(result?.into_value()))
    }
}

impl Default for QuarkEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Name written by `let` or a plain `set`
fn target_name(node: &Node) -> Result<String> {
    node.as_word()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidAssignmentTarget {
            target: node.to_string(),
        })
}

/// Non-negative integer index
fn as_position(index: &Value) -> Option<usize> {
    match index {
        Value::Integer(n) => usize::try_from(*n).ok(),
        _ => None,
    }
}

/// The stored slot of `owner` at `index`, when `owner` is a list
fn list_slot(owner: &ValueCell, index: &ValueCell) -> Option<ValueCell> {
    let position = as_position(&index.borrow())?;
    match &*owner.borrow() {
        Value::List(items) => items.get(position).cloned(),
        _ => None,
    }
}

/// Character of `owner` at `index` as a fresh string, when `owner` is a string
fn char_at(owner: &ValueCell, index: &ValueCell) -> Option<ValueCell> {
    let position = as_position(&index.borrow())?;
    match &*owner.borrow() {
        Value::String(s) => s
            .chars()
            .nth(position)
            .map(|c| ValueCell::new(Value::String(c.to_string()))),
        _ => None,
    }
}

/// Writes `value`'s text into the string held by `owner` at `index`
///
/// A string value overwrites as many characters as it has; other values are
/// inserted. Positions past the end append. Non-string owners are untouched.
fn splice_into(owner: &ValueCell, index: usize, value: &Value) {
    let spliced = match &*owner.borrow() {
        Value::String(current) => {
            let mut chars: Vec<char> = current.chars().collect();
            let text = value.render();
            let replaced = match value {
                Value::String(s) => s.chars().count(),
                _ => 0,
            };
            let start = index.min(chars.len());
            let end = (start + replaced).min(chars.len());
            chars.splice(start..end, text.chars());
            chars.into_iter().collect::<String>()
        }
        other => {
            tracing::debug!(owner = other.type_name(), index, "indexed set ignored");
            return;
        }
    };
    owner.replace(Value::String(spliced));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::CapturedOutput;

    fn eval(source: &str) -> Result<Value> {
        QuarkEvaluator::new()
            .with_output(CapturedOutput::new())
            .eval_str(source)
    }

    fn eval_with_output(source: &str) -> (Result<Value>, Vec<String>) {
        let capture = CapturedOutput::new();
        let mut evaluator = QuarkEvaluator::new().with_output(capture.clone());
        let result = evaluator.eval_str(source);
        (result, capture.lines())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("(+ 1 2)").unwrap(), Value::Integer(3));
        assert_eq!(eval("(* (- 10 4) (/ 9 3))").unwrap(), Value::Integer(18));
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("\"hi\"").unwrap(), Value::String("hi".to_string()));
        assert_eq!(eval("42").unwrap(), Value::Integer(42));
        assert_eq!(eval("none").unwrap(), Value::None);
        assert_eq!(eval("unbound").unwrap(), Value::None);
        assert_eq!(eval("").unwrap(), Value::None);
    }

    #[test]
    fn test_literal_head_is_returned_unchanged() {
        assert_eq!(eval("(7 ignored)").unwrap(), Value::Integer(7));
        assert_eq!(eval("(\"s\")").unwrap(), Value::String("s".to_string()));
    }

    #[test]
    fn test_let_and_set() {
        assert_eq!(eval("(let x 1) (set x 2) x").unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_set_is_seen_through_alias() {
        let source = "(let x 1) (let y x) (set x 2) y";
        assert_eq!(eval(source).unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_set_undeclared_fails() {
        let err = eval("(set nope 1)").unwrap_err();
        assert_eq!(
            err,
            Error::UndefinedVariable {
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_set_invalid_target() {
        assert!(matches!(
            eval("(set 5 1)"),
            Err(Error::InvalidAssignmentTarget { .. })
        ));
        assert!(matches!(
            eval("(set (list 1) 1)"),
            Err(Error::InvalidAssignmentTarget { .. })
        ));
    }

    #[test]
    fn test_if() {
        assert_eq!(
            eval("(if (< 1 2) \"yes\" \"no\")").unwrap(),
            Value::String("yes".to_string())
        );
        assert_eq!(
            eval("(if (> 1 2) \"yes\" \"no\")").unwrap(),
            Value::String("no".to_string())
        );
        assert_eq!(eval("(if 0 1)").unwrap(), Value::None);
    }

    #[test]
    fn test_sequence_pushes_frame() {
        let source = "(let x 1) ((let x 2)) x";
        assert_eq!(eval(source).unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_sequence_without_return_is_none() {
        assert_eq!(eval("((+ 1 2) (+ 3 4))").unwrap(), Value::None);
    }

    #[test]
    fn test_function_call() {
        let source = "(let double (fn (n) (* n 2))) (double 21)";
        assert_eq!(eval(source).unwrap(), Value::Integer(42));
    }

    #[test]
    fn test_function_bare_reference_is_none() {
        let source = "(let f (fn (n) (* n 2))) f";
        assert_eq!(eval(source).unwrap(), Value::None);
        let source = "(let f (fn (n) (* n 2))) (let g f) g";
        assert_eq!(eval(source).unwrap(), Value::None);
    }

    #[test]
    fn test_recursive_factorial() {
        let source = "
            (let fact (fn (n) (
              (if (<= n 1)
                (return 1)
                (return (* n (fact (- n 1)))))
            )))
            (fact 5)";
        assert_eq!(eval(source).unwrap(), Value::Integer(120));
    }

    #[test]
    fn test_missing_arguments_bind_none() {
        let source = "(let f (fn (a b) ((return b)))) (f 1)";
        assert_eq!(eval(source).unwrap(), Value::None);
    }

    #[test]
    fn test_dynamic_scope_sees_caller_locals() {
        let source = "
            (let peek (fn () ((return secret))))
            (let caller (fn () ((let secret 7) (return (peek)))))
            (caller)";
        assert_eq!(eval(source).unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_argument_aliases_caller_variable() {
        let source = "
            (let bump (fn (v) ((set v (+ v 1)))))
            (let n 1)
            (bump n)
            n";
        assert_eq!(eval(source).unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_while_counts_iterations() {
        let source = "
            (let i 0)
            (let runs 0)
            (while (< i 5) ((set i (+ i 1)) (set runs (+ runs 1))))
            (list i runs)";
        let result = eval(source).unwrap();
        let Value::List(items) = &result else {
            panic!("expected list, got {:?}", result);
        };
        assert_eq!(items[0].get(), Value::Integer(5));
        assert_eq!(items[1].get(), Value::Integer(5));
    }

    #[test]
    fn test_return_escapes_loop_and_function() {
        let source = "
            (let find (fn (limit) (
              (let i 0)
              (while (< i limit) (
                (if (= i 3) (return (* i 10)))
                (set i (+ i 1))
              ))
              (return -1)
            )))
            (find 10)";
        assert_eq!(eval(source).unwrap(), Value::Integer(30));
    }

    #[test]
    fn test_frames_balanced_after_return() {
        let mut evaluator = QuarkEvaluator::new().with_output(CapturedOutput::new());
        evaluator
            .eval_str("(let f (fn () ((((return 1)))))) (f)")
            .unwrap();
        assert_eq!(evaluator.frames().depth(), 1);
    }

    #[test]
    fn test_frames_restored_after_error() {
        let mut evaluator = QuarkEvaluator::new().with_output(CapturedOutput::new());
        let result = evaluator.eval_str("(let f (fn () ((nonsense)))) ((f))");
        assert!(result.is_err());
        assert_eq!(evaluator.frames().depth(), 1);
        assert!(!evaluator.frames().exists("f"));
    }

    #[test]
    fn test_top_level_return_ends_program() {
        let (result, output) = eval_with_output("(print 1) (return 2) (print 3)");
        assert_eq!(result.unwrap(), Value::Integer(2));
        assert_eq!(output, vec!["1"]);
    }

    #[test]
    fn test_list_and_index() {
        assert_eq!(eval("(index (list 1 2 3) 1)").unwrap(), Value::Integer(2));
        assert_eq!(eval("(index (list 1 2 3) 9)").unwrap(), Value::None);
        assert_eq!(eval("(index \"hello\" 1)").unwrap(), Value::String("e".to_string()));
        assert_eq!(eval("(index 5 0)").unwrap(), Value::None);
    }

    #[test]
    fn test_index_function_is_none() {
        let source = "(let f (fn () (1))) (index f 0)";
        assert_eq!(eval(source).unwrap(), Value::None);
    }

    #[test]
    fn test_set_list_slot_in_place() {
        let source = "(let xs (list 1 2 3)) (set (index xs 1) 20) (index xs 1)";
        assert_eq!(eval(source).unwrap(), Value::Integer(20));
    }

    #[test]
    fn test_set_string_position_splices() {
        let source = "(let s \"hello\") (set (index s 0) \"J\") s";
        assert_eq!(eval(source).unwrap(), Value::String("Jello".to_string()));

        let source = "(let s \"ab\") (set (index s 9) \"c\") s";
        assert_eq!(eval(source).unwrap(), Value::String("abc".to_string()));

        let source = "(let s \"ab\") (set (index s 1) 7) s";
        assert_eq!(eval(source).unwrap(), Value::String("a7b".to_string()));
    }

    #[test]
    fn test_set_out_of_range_list_slot_is_ignored() {
        let source = "(let xs (list 1)) (set (index xs 5) 2) xs";
        assert_eq!(
            eval(source).unwrap(),
            Value::List(vec![ValueCell::new(Value::Integer(1))])
        );
    }

    #[test]
    fn test_print_raw_values() {
        let (result, output) =
            eval_with_output("(print \"sum:\" (+ 1 2) (= 1 1) none (list 1 \"a\"))");
        assert_eq!(result.unwrap(), Value::None);
        assert_eq!(output, vec!["sum: 3 true none [1, \"a\"]"]);
    }

    #[test]
    fn test_print_survives_later_failure() {
        let (result, output) = eval_with_output("(print \"before\") (boom)");
        assert!(result.is_err());
        assert_eq!(output, vec!["before"]);
    }

    #[test]
    fn test_unrecognized_expression() {
        let err = eval("(frobnicate 1 2)").unwrap_err();
        assert_eq!(
            err,
            Error::UnrecognizedExpression {
                expression: "frobnicate".to_string()
            }
        );
        assert!(matches!(
            eval("((+ 1 2) 3)"),
            Err(Error::UnrecognizedExpression { .. })
        ));
    }

    #[test]
    fn test_bound_head_returns_value() {
        assert_eq!(eval("(let x 9) (x)").unwrap(), Value::Integer(9));
    }

    #[test]
    fn test_import_is_noop() {
        assert_eq!(eval("(import \"lib/math.qrk\") 1").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_invalid_parameter() {
        assert!(matches!(
            eval("(fn (a 1) a)"),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_iteration_limit() {
        let config = EvaluatorConfig::default().with_max_iterations(3);
        let mut evaluator = QuarkEvaluator::with_config(config).with_output(CapturedOutput::new());
        let err = evaluator
            .eval_str("(let i 0) (while 1 (set i (+ i 1)))")
            .unwrap_err();
        assert_eq!(err, Error::TooManyIterations { limit: 3 });

        assert_eq!(
            evaluator
                .eval_str("(let i 0) (while (< i 3) (set i (+ i 1))) i")
                .unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn test_no_leakage_between_runs() {
        let mut evaluator = QuarkEvaluator::new().with_output(CapturedOutput::new());
        evaluator.eval_str("(let x 1)").unwrap();
        assert_eq!(evaluator.eval_str("x").unwrap(), Value::None);
    }
}
