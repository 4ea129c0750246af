/// Environment-driven evaluator limits
///
/// Kept in its own test binary: the variable is process-wide, so nothing
/// else may run while it is set.
use quark::runtime::config::MAX_ITERATIONS_ENV;
use quark::{CapturedOutput, Error, EvaluatorConfig, QuarkEvaluator, Value};

const SPIN: &str = "(let i 0) (while (< i 10) (set i (+ i 1))) i";

fn run_spin() -> quark::Result<Value> {
    QuarkEvaluator::new()
        .with_output(CapturedOutput::new())
        .eval_str(SPIN)
}

#[test]
fn test_max_iterations_from_environment() {
    std::env::set_var(MAX_ITERATIONS_ENV, "4");
    assert_eq!(
        EvaluatorConfig::from_env(),
        EvaluatorConfig::default().with_max_iterations(4)
    );
    assert_eq!(run_spin().unwrap_err(), Error::TooManyIterations { limit: 4 });
    assert_eq!(
        quark::run("(let x 0) (while 1 (set x 1))").unwrap_err(),
        Error::TooManyIterations { limit: 4 }
    );

    std::env::set_var(MAX_ITERATIONS_ENV, "not-a-number");
    assert_eq!(EvaluatorConfig::from_env(), EvaluatorConfig::default());
    assert_eq!(run_spin().unwrap(), Value::Integer(10));

    std::env::set_var(MAX_ITERATIONS_ENV, " 20 ");
    assert_eq!(run_spin().unwrap(), Value::Integer(10));

    std::env::remove_var(MAX_ITERATIONS_ENV);
    assert_eq!(EvaluatorConfig::from_env().max_iterations, None);
    assert_eq!(run_spin().unwrap(), Value::Integer(10));
}
