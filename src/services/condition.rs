//! # Condition evaluation.
//!
//! [`ConditionOperator`] is the seam the registry evaluates rule conditions
//! through. [`ComparisonOperator`] is the built-in implementation: a small
//! comparison language over the event arguments.
//!
//! ## Grammar
//! ```text
//! expr    := and ( ("or" | "||") and )*
//! and     := term ( ("and" | "&&") term )*
//! term    := "(" expr ")" | field op literal
//! op      := "==" | "!=" | ">" | ">=" | "<" | "<="
//! literal := number | "string" | 'string' | true | false | null
//! field   := name ( "." name )*          (dots walk into nested objects)
//! ```
//!
//! `number` is a JSON number (`1e-3` included). Parentheses nest at most
//! 32 deep. A field missing from the arguments compares as `null`. Ordering
//! operators apply to two numbers or two strings; any other pairing is
//! unsatisfied.

use std::cmp::Ordering;

use chumsky::extra;
use chumsky::prelude::*;
use serde_json::Value;

use crate::error::ConditionError;
use crate::events::Arguments;

/// Evaluates condition expressions against event arguments.
pub trait ConditionOperator: Send + Sync + 'static {
    /// Returns whether `arguments` satisfy `condition`.
    fn satisfy(&self, condition: &str, arguments: &Arguments) -> Result<bool, ConditionError>;

    /// Checks `condition` without evaluating it. Called when a rule is attached.
    fn validate(&self, condition: &str) -> Result<(), ConditionError> {
        let _ = condition;
        Ok(())
    }
}

/// Built-in comparison language, see the module docs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComparisonOperator;

impl ConditionOperator for ComparisonOperator {
    fn satisfy(&self, condition: &str, arguments: &Arguments) -> Result<bool, ConditionError> {
        Ok(parse(condition)?.eval(arguments))
    }

    fn validate(&self, condition: &str) -> Result<(), ConditionError> {
        parse(condition).map(|_| ())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug)]
enum Expr {
    Or(Vec<Expr>),
    And(Vec<Expr>),
    Cmp {
        path: Vec<String>,
        op: Op,
        value: Value,
    },
}

impl Expr {
    fn eval(&self, args: &Arguments) -> bool {
        match self {
            Expr::Or(items) => items.iter().any(|e| e.eval(args)),
            Expr::And(items) => items.iter().all(|e| e.eval(args)),
            Expr::Cmp { path, op, value } => {
                let actual = lookup(args, path).unwrap_or(&Value::Null);
                compare(actual, *op, value)
            }
        }
    }
}

fn lookup<'a>(args: &'a Arguments, path: &[String]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(args.get(first)?, |value, segment| value.get(segment.as_str()))
}

fn compare(actual: &Value, op: Op, expected: &Value) -> bool {
    match op {
        Op::Eq => loosely_equal(actual, expected),
        Op::Ne => !loosely_equal(actual, expected),
        Op::Gt | Op::Ge | Op::Lt | Op::Le => {
            let Some(ord) = order(actual, expected) else {
                return false;
            };
            match op {
                Op::Gt => ord == Ordering::Greater,
                Op::Ge => ord != Ordering::Less,
                Op::Lt => ord == Ordering::Less,
                _ => ord != Ordering::Greater,
            }
        }
    }
}

// 1 == 1.0
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Deepest parenthesis nesting accepted in one expression.
const MAX_NESTING: usize = 32;

type Extra<'src> = extra::Err<Rich<'src, char>>;

fn parse(condition: &str) -> Result<Expr, ConditionError> {
    if condition.trim().is_empty() {
        return Err(ConditionError::Empty);
    }
    check_nesting(condition)?;

    expression()
        .parse(condition)
        .into_result()
        .map_err(|errs| match errs.first() {
            Some(err) => ConditionError::Syntax {
                position: err.span().start,
                reason: err.reason().to_string(),
            },
            None => ConditionError::Syntax {
                position: 0,
                reason: "invalid condition".to_string(),
            },
        })
}

// The parser recurses once per parenthesis, so depth is bounded before parsing.
fn check_nesting(condition: &str) -> Result<(), ConditionError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in condition.char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(ConditionError::Syntax {
                        position: offset,
                        reason: "nesting too deep".to_string(),
                    });
                }
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn expression<'src>() -> impl Parser<'src, &'src str, Expr, Extra<'src>> {
    recursive(|expr| {
        let term = expr
            .delimited_by(just('(').padded(), just(')').padded())
            .or(comparison().padded());

        let all = term
            .separated_by(and_kw().padded())
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|items| join(items, Expr::And));

        all.separated_by(or_kw().padded())
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|items| join(items, Expr::Or))
    })
    .padded()
    .then_ignore(end())
}

fn join(mut items: Vec<Expr>, group: fn(Vec<Expr>) -> Expr) -> Expr {
    match items.len() {
        1 => items.remove(0),
        _ => group(items),
    }
}

fn comparison<'src>() -> impl Parser<'src, &'src str, Expr, Extra<'src>> + Clone {
    field()
        .then(op().padded())
        .then(literal())
        .map(|((path, op), value)| Expr::Cmp { path, op, value })
        .labelled("comparison like x > 5")
}

/// Dotted field path: `node.type`.
fn field<'src>() -> impl Parser<'src, &'src str, Vec<String>, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_alphanumeric() || matches!(*c, '_' | '-'))
                .repeated(),
        )
        .to_slice()
        .map(|s: &str| s.to_string())
        .separated_by(just('.'))
        .at_least(1)
        .collect::<Vec<_>>()
        .labelled("field name")
}

fn op<'src>() -> impl Parser<'src, &'src str, Op, Extra<'src>> + Clone {
    choice((
        just("==").to(Op::Eq),
        just("!=").to(Op::Ne),
        just(">=").to(Op::Ge),
        just("<=").to(Op::Le),
        just(">").to(Op::Gt),
        just("<").to(Op::Lt),
    ))
    .labelled("comparison operator")
}

fn literal<'src>() -> impl Parser<'src, &'src str, Value, Extra<'src>> + Clone {
    choice((
        number(),
        quoted('"').or(quoted('\'')).map(Value::String),
        kw("true").to(Value::Bool(true)),
        kw("false").to(Value::Bool(false)),
        kw("null").to(Value::Null),
    ))
    .labelled("literal")
}

/// JSON number: `-12`, `0.5`, `1e-3`, `2E+2`.
fn number<'src>() -> impl Parser<'src, &'src str, Value, Extra<'src>> + Clone {
    let frac = just('.').then(text::digits(10));
    let exp = one_of("eE")
        .then(one_of("+-").or_not())
        .then(text::digits(10));

    just('-')
        .or_not()
        .then(text::int(10))
        .then(frac.or_not())
        .then(exp.or_not())
        .to_slice()
        .try_map(|s: &str, span| {
            s.parse::<serde_json::Number>()
                .map(Value::Number)
                .map_err(|_| Rich::custom(span, "invalid number"))
        })
        .labelled("number")
}

/// Quoted string; a backslash takes the next character literally.
fn quoted<'src>(quote: char) -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(move |c: &char| *c != quote && *c != '\\')
        .or(just('\\').ignore_then(any()))
        .repeated()
        .collect::<String>()
        .delimited_by(just(quote), just(quote))
        .labelled("string literal")
}

fn and_kw<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    kw("and").or(kw("AND")).or(just("&&").ignored())
}

fn or_kw<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    kw("or").or(kw("OR")).or(just("||").ignored())
}

fn kw<'src>(keyword: &'static str) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    text::keyword::<&str, _, Extra<'src>>(keyword).ignored()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => Arguments::new(),
        }
    }

    fn check(condition: &str, arguments: Value) -> bool {
        ComparisonOperator
            .satisfy(condition, &args(arguments))
            .unwrap()
    }

    #[test]
    fn test_numeric_comparison() {
        assert!(check("x > 5", json!({"x": 10})));
        assert!(!check("x > 5", json!({"x": 3})));
        assert!(check("x >= 5", json!({"x": 5})));
        assert!(check("x == 5", json!({"x": 5.0})));
        assert!(check("x < -1.5", json!({"x": -2})));
        assert!(check("x > 1e-3", json!({"x": 0.01})));
        assert!(check("x == 2E+2", json!({"x": 200})));
        assert!(!check("x < 2.5e1", json!({"x": 30})));
    }

    #[test]
    fn test_strings_and_keywords() {
        assert!(check("status == \"published\"", json!({"status": "published"})));
        assert!(check("status != 'draft'", json!({"status": "published"})));
        assert!(check("visible == true", json!({"visible": true})));
        assert!(check("lang < \"en\"", json!({"lang": "de"})));
    }

    #[test]
    fn test_missing_field_is_null() {
        assert!(check("x == null", json!({})));
        assert!(check("x != 5", json!({})));
        assert!(!check("x > 5", json!({})));
        assert!(!check("x == 5", json!({})));
    }

    #[test]
    fn test_mismatched_types_do_not_order() {
        assert!(!check("x > 5", json!({"x": "10"})));
        assert!(!check("x < 5", json!({"x": "10"})));
    }

    #[test]
    fn test_boolean_combinators() {
        let a = json!({"x": 10, "y": 1});
        assert!(check("x > 5 and y == 1", a.clone()));
        assert!(!check("x > 5 && y == 2", a.clone()));
        assert!(check("x > 50 or y == 1", a.clone()));
        assert!(check("y == 2 || x == 10 and y == 1", a.clone()));
        assert!(!check("(y == 2 || x == 10) and y == 3", a));
    }

    #[test]
    fn test_nested_path() {
        assert!(check("node.type == \"page\"", json!({"node": {"type": "page"}})));
        assert!(!check("node.type == \"page\"", json!({"node": "page"})));
    }

    #[test]
    fn test_validate_reports_syntax_errors() {
        let op = ComparisonOperator;
        assert!(op.validate("x > 5").is_ok());
        assert_eq!(op.validate("   "), Err(ConditionError::Empty));
        for bad in ["x >", "x 5", "> 5", "x > 5 and", "(x > 5", "x = 5", "x > 'open"] {
            let err = op.validate(bad).unwrap_err();
            assert_eq!(err.as_label(), "condition_syntax", "input {bad:?}");
        }
        for bad in ["x > 1e", "x > 01", "x > -", "x > 1.e3"] {
            assert!(op.validate(bad).is_err(), "input {bad:?}");
        }
    }

    #[test]
    fn test_nesting_limit() {
        let op = ComparisonOperator;
        let nested = |depth: usize| format!("{}x > 1{}", "(".repeat(depth), ")".repeat(depth));

        assert!(op.validate(&nested(MAX_NESTING)).is_ok());
        assert!(check(&nested(MAX_NESTING), json!({"x": 2})));

        let err = op.validate(&nested(MAX_NESTING + 1)).unwrap_err();
        assert_eq!(
            err,
            ConditionError::Syntax {
                position: MAX_NESTING,
                reason: "nesting too deep".to_string(),
            }
        );

        let err = op.validate(&nested(200_000)).unwrap_err();
        assert_eq!(err.as_label(), "condition_syntax");
    }

    #[test]
    fn test_parentheses_inside_strings_do_not_nest() {
        let deep = format!("name == \"{}\"", "(".repeat(100));
        assert!(ComparisonOperator.validate(&deep).is_ok());
    }
}
