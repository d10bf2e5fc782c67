//! Expression evaluator
//!
//! Evaluates expression ASTs against a [`Scope`]. This is the general backend:
//! it handles every operator, decimals, and calls into extensions.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::extension::{Extension, Scope};
use crate::number::Number;

/// Evaluate an expression
pub fn evaluate(expr: &Expr, scope: &Scope) -> FormulaResult<Number> {
    match expr {
        // === Literals ===
        Expr::Integer(n) => Ok(Number::Integer(*n)),
        Expr::Decimal(d) => Ok(Number::Decimal(*d)),

        // === Names ===
        Expr::Name(name) => match scope.get(name) {
            Some(Extension::Constant(value)) => Ok(*value),
            Some(Extension::Function(_)) => Err(FormulaError::Evaluation(format!(
                "'{}' is a function and must be called",
                name
            ))),
            None => Err(FormulaError::UnknownName(name.clone())),
        },

        // === Operators ===
        Expr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, scope),

        Expr::UnaryOp { op, operand } => {
            let value = evaluate(operand, scope)?;
            match op {
                UnaryOperator::Negate => value.neg(),
                UnaryOperator::Plus => Ok(value),
            }
        }

        // === Calls ===
        Expr::Call { name, args } => evaluate_call(name, args, scope),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &Expr,
    right: &Expr,
    scope: &Scope,
) -> FormulaResult<Number> {
    // Evaluate operands first
    let l = evaluate(left, scope)?;
    let r = evaluate(right, scope)?;

    match op {
        BinaryOperator::Add => l.add(r),
        BinaryOperator::Subtract => l.sub(r),
        BinaryOperator::Multiply => l.mul(r),
        BinaryOperator::Divide => l.div(r),
        BinaryOperator::FloorDivide => l.floor_div(r),
        BinaryOperator::Modulo => l.rem(r),
        BinaryOperator::Power => l.pow(r),
    }
}

/// Evaluate a call of a scope-bound function
fn evaluate_call(name: &str, args: &[Expr], scope: &Scope) -> FormulaResult<Number> {
    let function = match scope.get(name) {
        Some(Extension::Function(function)) => function,
        Some(Extension::Constant(_)) => {
            return Err(FormulaError::Evaluation(format!(
                "'{}' is a constant and is not callable",
                name
            )))
        }
        None => return Err(FormulaError::UnknownFunction(name.to_string())),
    };

    // Evaluate arguments
    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        evaluated_args.push(evaluate(arg, scope)?);
    }

    // Call the function
    function(&evaluated_args)
}
