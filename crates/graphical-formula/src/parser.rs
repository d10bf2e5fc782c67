//! Expression parser
//!
//! A recursive descent parser for arithmetic expressions with Python-style
//! operator precedence.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse an expression string into an AST
///
/// # Example
/// ```rust
/// use graphical_formula::parse_expression;
///
/// let ast = parse_expression("(a+b)*h/2").unwrap();
/// let ast = parse_expression("cos(sin(1))").unwrap();
/// let ast = parse_expression("2**-1 // 3 % 4").unwrap();
/// ```
pub fn parse_expression(expression: &str) -> FormulaResult<Expr> {
    let mut parser = ExprParser::new(expression.trim());
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected token after expression: {:?}",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Integer(i64),
    Decimal(Decimal),

    // Names
    Identifier(String),

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    // Unscannable input, with a description
    Invalid(String),

    // End of input
    Eof,
}

/// Deepest nesting of parentheses, calls and unary operators accepted
pub const MAX_NESTING_DEPTH: usize = 200;

/// Tallest syntax tree accepted, counting operator chains as well as nesting
pub const MAX_TREE_HEIGHT: usize = 1000;

/// Expression parser
struct ExprParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Option<Token>,
    depth: usize,
    height: usize,
}

impl<'a> ExprParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: None,
            depth: 0,
            height: 0,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        self.skip_whitespace();
        self.current_token = Some(self.scan_token());
    }

    fn scan_token(&mut self) -> Token {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Token::Eof,
        };

        match c {
            '+' => {
                self.advance();
                return Token::Plus;
            }
            '-' => {
                self.advance();
                return Token::Minus;
            }
            '*' => {
                self.advance();
                if self.peek_char() == Some('*') {
                    self.advance();
                    return Token::DoubleStar;
                }
                return Token::Star;
            }
            '/' => {
                self.advance();
                if self.peek_char() == Some('/') {
                    self.advance();
                    return Token::DoubleSlash;
                }
                return Token::Slash;
            }
            '%' => {
                self.advance();
                return Token::Percent;
            }
            ',' => {
                self.advance();
                return Token::Comma;
            }
            '(' => {
                self.advance();
                return Token::LeftParen;
            }
            ')' => {
                self.advance();
                return Token::RightParen;
            }
            _ => {}
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Identifier
        if c.is_alphabetic() || c == '_' {
            let start = self.pos;
            while self
                .peek_char()
                .map_or(false, |c| c.is_alphanumeric() || c == '_')
            {
                self.advance();
            }
            return Token::Identifier(self.input[start..self.pos].to_string());
        }

        self.advance();
        Token::Invalid(format!("invalid character '{}'", c))
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        let mut is_decimal = false;
        let mut has_exponent = false;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            is_decimal = true;
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            let digits_at = match self.peek_char_at(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self
                .peek_char_at(digits_at)
                .map_or(false, |c| c.is_ascii_digit())
            {
                is_decimal = true;
                has_exponent = true;
                for _ in 0..digits_at {
                    self.advance();
                }
                while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let num_str = &self.input[start..self.pos];
        if !is_decimal {
            // Past i64 the literal is still exact as a decimal
            return match num_str.parse::<i64>() {
                Ok(n) => Token::Integer(n),
                Err(_) => match Decimal::from_str(num_str) {
                    Ok(d) => Token::Decimal(d),
                    Err(_) => Token::Invalid(format!("number literal out of range: {}", num_str)),
                },
            };
        }

        let normalized = format!("0{}", num_str);
        let parsed = if has_exponent {
            Decimal::from_scientific(&normalized)
        } else {
            Decimal::from_str(normalized.trim_end_matches('.'))
        };
        match parsed {
            Ok(d) => Token::Decimal(d),
            Err(e) => Token::Invalid(format!("invalid number '{}': {}", num_str, e)),
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token();
        token
    }

    /// Account for one more level of the syntax tree
    fn grow(&mut self) -> FormulaResult<()> {
        if self.height >= MAX_TREE_HEIGHT {
            return Err(FormulaError::Parse(format!(
                "expression more than {} operations deep",
                MAX_TREE_HEIGHT
            )));
        }
        self.height += 1;
        Ok(())
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume();
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /, //, %
    // 3. Unary: -, +
    // 4. Exponentiation: ** (right associative, binds tighter than a unary
    //    operator on its left: -2**2 == -(2**2))
    // 5. Primary: literals, names, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<Expr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        let height = self.height;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            self.grow()?;
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.height = height;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;
        let height = self.height;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                Token::DoubleSlash => BinaryOperator::FloorDivide,
                Token::Percent => BinaryOperator::Modulo,
                _ => break,
            };

            self.consume();
            self.grow()?;
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.height = height;
        Ok(left)
    }

    // Every recursive path passes through here, so this bounds the stack
    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(FormulaError::Parse(format!(
                "expression nested more than {} levels deep",
                MAX_NESTING_DEPTH
            )));
        }
        self.grow()?;
        self.depth += 1;
        let result = self.parse_signed();
        self.depth -= 1;
        self.height -= 1;
        result
    }

    fn parse_signed(&mut self) -> FormulaResult<Expr> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_power(),
        };

        self.consume();
        let operand = self.parse_unary()?;
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> FormulaResult<Expr> {
        let left = self.parse_primary()?;

        if matches!(self.current_token(), Token::DoubleStar) {
            self.consume();
            let right = self.parse_unary()?; // Right associative
            return Ok(Expr::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.current_token().clone() {
            Token::Integer(n) => {
                self.consume();
                Ok(Expr::Integer(n))
            }

            Token::Decimal(d) => {
                self.consume();
                Ok(Expr::Decimal(d))
            }

            Token::LeftParen => {
                self.consume();
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::Identifier(name) => {
                self.consume();
                // Check if it's a function call
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Ok(Expr::Name(name))
                }
            }

            Token::Invalid(message) => Err(FormulaError::Parse(message)),

            Token::Eof => Err(FormulaError::Parse("Unexpected end of expression".into())),

            other => Err(FormulaError::Parse(format!("Unexpected token: {:?}", other))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<Expr> {
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();

        // Parse arguments
        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_expression()?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume();
                args.push(self.parse_expression()?);
            }
        }

        self.expect(&Token::RightParen)?;

        Ok(Expr::Call { name, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_expression("42").unwrap(), Expr::Integer(42));
        assert_eq!(
            parse_expression("3.14").unwrap(),
            Expr::Decimal(Decimal::from_str("3.14").unwrap())
        );
        assert_eq!(
            parse_expression("1e3").unwrap(),
            Expr::Decimal(Decimal::from(1000))
        );
        assert_eq!(
            parse_expression(".5").unwrap(),
            Expr::Decimal(Decimal::from_str("0.5").unwrap())
        );
    }

    #[test]
    fn test_parse_precedence() {
        let ast = parse_expression("1+2*3").unwrap();
        if let Expr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Add);
            assert_eq!(*left, Expr::Integer(1));
            assert!(matches!(
                *right,
                Expr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_power_binds_tighter_than_negation() {
        let ast = parse_expression("-2**2").unwrap();
        if let Expr::UnaryOp { op, operand } = ast {
            assert_eq!(op, UnaryOperator::Negate);
            assert!(matches!(
                *operand,
                Expr::BinaryOp {
                    op: BinaryOperator::Power,
                    ..
                }
            ));
        } else {
            panic!("Expected UnaryOp");
        }
    }

    #[test]
    fn test_parse_power_right_associative() {
        let ast = parse_expression("2**3**2").unwrap();
        if let Expr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Power);
            assert_eq!(*left, Expr::Integer(2));
            assert!(matches!(*right, Expr::BinaryOp { .. }));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_floor_division_and_modulo() {
        let ast = parse_expression("7 // 2 % 3").unwrap();
        if let Expr::BinaryOp { op, left, .. } = ast {
            assert_eq!(op, BinaryOperator::Modulo);
            assert!(matches!(
                *left,
                Expr::BinaryOp {
                    op: BinaryOperator::FloorDivide,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_function_call() {
        let ast = parse_expression("cos(sin(a), 2)").unwrap();
        if let Expr::Call { name, args } = ast {
            assert_eq!(name, "cos");
            assert_eq!(args.len(), 2);
            assert!(matches!(&args[0], Expr::Call { .. }));
        } else {
            panic!("Expected Call");
        }
    }

    #[test]
    fn test_parse_unicode_identifier() {
        assert_eq!(
            parse_expression("圆周率").unwrap(),
            Expr::Name("圆周率".into())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("1+").is_err());
        assert!(parse_expression("(1+2").is_err());
        assert!(parse_expression("1 2").is_err());
        assert!(parse_expression("2 ^ 3").is_err());
        assert!(parse_expression("99999999999999999999").is_err());
    }

    #[test]
    fn test_inspection() {
        assert!(parse_expression("a*h/2").unwrap().has_division());
        assert!(parse_expression("7//2").unwrap().has_division());
        assert!(!parse_expression("(a+b)*2").unwrap().has_division());
        assert!(parse_expression("r*2.0").unwrap().has_decimal_literal());
        assert!(!parse_expression("f(1, 2)").unwrap().has_decimal_literal());
    }

    #[test]
    fn test_parse_integer_beyond_i64() {
        assert_eq!(
            parse_expression("10000000000000000000").unwrap(),
            Expr::Decimal(Decimal::from_str("10000000000000000000").unwrap())
        );
        let ast = parse_expression("99999999999999999999+1").unwrap();
        assert!(ast.has_decimal_literal());
        assert!(matches!(
            parse_expression("1000000000000000000000000000000000"),
            Err(FormulaError::Parse(ref message)) if message.contains("out of range")
        ));
    }

    #[test]
    fn test_parse_nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_expression(&nested(50)).is_ok());
        assert!(matches!(
            parse_expression(&nested(10_000)),
            Err(FormulaError::Parse(ref message)) if message.contains("nested")
        ));

        let signs = format!("{}1", "-".repeat(10_000));
        assert!(matches!(parse_expression(&signs), Err(FormulaError::Parse(_))));

        let calls = format!("{}1{}", "f(".repeat(10_000), ")".repeat(10_000));
        assert!(matches!(parse_expression(&calls), Err(FormulaError::Parse(_))));
    }

    #[test]
    fn test_parse_operator_chain_limit() {
        let sum = |terms: usize| vec!["1"; terms].join("+");
        assert!(parse_expression(&sum(500)).is_ok());
        assert!(matches!(
            parse_expression(&sum(100_000)),
            Err(FormulaError::Parse(ref message)) if message.contains("deep")
        ));

        let product = vec!["2"; 100_000].join("*");
        assert!(matches!(parse_expression(&product), Err(FormulaError::Parse(_))));
    }
}
