//! Accelerated integer backend
//!
//! A restricted evaluator for expressions made only of unsigned integer
//! literals, `+`, `-`, `*` and parentheses. It converts the infix token list
//! to postfix and runs it on a stack, with no AST and no scope. Anything
//! outside that subset is reported as a fault so the caller can fall back.

use std::sync::Arc;
use thiserror::Error;

/// Failures of an accelerated backend. These never reach formula callers.
#[derive(Debug, Error)]
pub enum AccelError {
    /// The backend is not present or has been switched off
    #[error("accelerated backend unavailable: {0}")]
    Unavailable(String),

    /// The backend could not evaluate the expression
    #[error("accelerated backend fault: {0}")]
    Fault(String),
}

/// A restricted, faster evaluation path for plain integer expressions
pub trait Accelerator: Send + Sync {
    /// Backend name, for diagnostics
    fn name(&self) -> &str;

    /// Evaluate an expression to an integer
    fn compute(&self, expression: &str) -> Result<i64, AccelError>;
}

/// The accelerator compiled into this crate, if the `accel` feature is enabled
pub fn native() -> Option<Arc<dyn Accelerator>> {
    if cfg!(feature = "accel") {
        Some(Arc::new(IntegerAccelerator))
    } else {
        None
    }
}

/// Built-in integer accelerator
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerAccelerator;

impl Accelerator for IntegerAccelerator {
    fn name(&self) -> &str {
        "integer"
    }

    fn compute(&self, expression: &str) -> Result<i64, AccelError> {
        let infix = tokenize(expression)?;
        let postfix = to_postfix(infix)?;
        run(&postfix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Operand(i64),
    Add,
    Sub,
    Mul,
    Open,
    Close,
}

impl Token {
    fn priority(self) -> u8 {
        match self {
            Token::Add | Token::Sub => 1,
            Token::Mul => 2,
            _ => 0,
        }
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, AccelError> {
    let bytes = expression.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'0'..=b'9' => {
                let mut value: i64 = 0;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(i64::from(bytes[i] - b'0')))
                        .ok_or_else(|| AccelError::Fault("integer literal overflow".into()))?;
                    i += 1;
                }
                tokens.push(Token::Operand(value));
                continue;
            }
            b'+' => tokens.push(Token::Add),
            b'-' => tokens.push(Token::Sub),
            b'(' => tokens.push(Token::Open),
            b')' => tokens.push(Token::Close),
            b'*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    return Err(AccelError::Fault("unsupported operator '**'".into()));
                }
                tokens.push(Token::Mul);
            }
            b' ' | b'\t' => {}
            _ => {
                let c = expression[i..].chars().next().unwrap_or('?');
                return Err(AccelError::Fault(format!("unsupported character '{}'", c)));
            }
        }
        i += 1;
    }
    Ok(tokens)
}

fn to_postfix(infix: Vec<Token>) -> Result<Vec<Token>, AccelError> {
    let mut output = Vec::with_capacity(infix.len());
    let mut operators: Vec<Token> = Vec::new();
    for token in infix {
        match token {
            Token::Operand(_) => output.push(token),
            Token::Open => operators.push(token),
            Token::Close => loop {
                match operators.pop() {
                    Some(Token::Open) => break,
                    Some(op) => output.push(op),
                    None => return Err(AccelError::Fault("unbalanced ')'".into())),
                }
            },
            _ => {
                while let Some(&top) = operators.last() {
                    if top.priority() < token.priority() {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push(token);
            }
        }
    }
    while let Some(op) = operators.pop() {
        if op == Token::Open {
            return Err(AccelError::Fault("unbalanced '('".into()));
        }
        output.push(op);
    }
    Ok(output)
}

fn run(postfix: &[Token]) -> Result<i64, AccelError> {
    let mut stack: Vec<i64> = Vec::new();
    for token in postfix {
        if let Token::Operand(value) = token {
            stack.push(*value);
            continue;
        }
        let (b, a) = match (stack.pop(), stack.pop()) {
            (Some(b), Some(a)) => (b, a),
            _ => return Err(AccelError::Fault("missing operand".into())),
        };
        let result = match token {
            Token::Add => a.checked_add(b),
            Token::Sub => a.checked_sub(b),
            Token::Mul => a.checked_mul(b),
            _ => None,
        };
        stack.push(result.ok_or_else(|| AccelError::Fault("integer overflow".into()))?);
    }
    match stack.as_slice() {
        [value] => Ok(*value),
        _ => Err(AccelError::Fault("malformed expression".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(expression: &str) -> Result<i64, AccelError> {
        IntegerAccelerator.compute(expression)
    }

    #[test]
    fn test_compute_basic() {
        assert_eq!(compute("1+1").unwrap(), 2);
        assert_eq!(compute("2*3+4").unwrap(), 10);
        assert_eq!(compute("2*(3+4)").unwrap(), 14);
        assert_eq!(compute("10-3-2").unwrap(), 5);
        assert_eq!(compute("(2*3+2*4+3*4)*2").unwrap(), 52);
    }

    #[test]
    fn test_compute_unsupported_is_fault() {
        assert!(matches!(compute("2**3"), Err(AccelError::Fault(_))));
        assert!(matches!(compute("a*b"), Err(AccelError::Fault(_))));
        assert!(matches!(compute("7%2"), Err(AccelError::Fault(_))));
        assert!(matches!(compute("-2*3"), Err(AccelError::Fault(_))));
        assert!(matches!(compute("(1+2"), Err(AccelError::Fault(_))));
        assert!(matches!(compute(""), Err(AccelError::Fault(_))));
    }

    #[test]
    fn test_compute_overflow_is_fault() {
        assert!(matches!(
            compute("9223372036854775807+1"),
            Err(AccelError::Fault(_))
        ));
    }
}
