//! Expression Abstract Syntax Tree types

use rust_decimal::Decimal;

/// Expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // === Literals ===
    /// Integer literal
    Integer(i64),
    /// Literal with a fractional part or exponent
    Decimal(Decimal),

    // === Names ===
    /// Symbol looked up in the evaluation scope
    Name(String),

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },

    // === Function call ===
    Call { name: String, args: Vec<Expr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
}

impl Expr {
    /// Whether any `/` or `//` appears in the tree
    pub fn has_division(&self) -> bool {
        self.any(&|e| {
            matches!(
                e,
                Expr::BinaryOp {
                    op: BinaryOperator::Divide | BinaryOperator::FloorDivide,
                    ..
                }
            )
        })
    }

    /// Whether any non-integer literal appears in the tree
    pub fn has_decimal_literal(&self) -> bool {
        self.any(&|e| matches!(e, Expr::Decimal(_)))
    }

    fn any(&self, pred: &dyn Fn(&Expr) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Expr::BinaryOp { left, right, .. } => left.any(pred) || right.any(pred),
            Expr::UnaryOp { operand, .. } => operand.any(pred),
            Expr::Call { args, .. } => args.iter().any(|a| a.any(pred)),
            Expr::Integer(_) | Expr::Decimal(_) | Expr::Name(_) => false,
        }
    }
}
