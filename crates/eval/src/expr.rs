//! Token expression parser and evaluator.
//!
//! Precedence, lowest first:
//!
//! | level | operators |
//! |---|---|
//! | 1 | `OR` |
//! | 2 | `AND` |
//! | 3 | prefix `NOT` |
//! | 4 | `EQ NEQ LT LTE GT GTE IN NIN` (non-associative) |
//! | 5 | `+ -` |
//! | 6 | `* /` |
//! | 7 | unary `-` |
//!
//! Primaries are parenthesized expressions, `TRUE`/`FALSE`, decimal
//! literals (`12.5`, `100<EUR>` for an amount), ISO dates, the functions
//! `FLOOR CEIL ROUND MIN MAX`, and identifiers. An identifier bound in
//! the evaluation scope reads its value; an unbound one is a symbol, so
//! `EntityType EQ Micro` compares against the text `Micro`.

use std::str::FromStr;

use rust_decimal::Decimal;
use time::macros::format_description;
use time::Date;

use crate::numeric::{self, ArithOp, CompareOp};
use crate::types::{Bindings, EvalErrorKind, Value};

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Ident(String),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(Box<Expr>, CompareOp, Box<Expr>),
    Arith(Box<Expr>, ArithOp, Box<Expr>),
    Call(Function, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Floor,
    Ceil,
    Round,
    Min,
    Max,
}

impl Function {
    fn from_token(token: &str) -> Option<Function> {
        match token {
            "FLOOR" => Some(Function::Floor),
            "CEIL" => Some(Function::Ceil),
            "ROUND" => Some(Function::Round),
            "MIN" => Some(Function::Min),
            "MAX" => Some(Function::Max),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            Function::Floor | Function::Ceil | Function::Round => 1,
            Function::Min | Function::Max => 2,
        }
    }
}

const RESERVED: &[&str] = &["AND", "OR", "NOT", "(", ")", ","];

/// Parse a full token sequence into an expression.
pub fn parse(tokens: &[String]) -> Result<Expr, EvalErrorKind> {
    if tokens.is_empty() {
        return Err(EvalErrorKind::Syntax("empty expression".to_string()));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if let Some(tok) = parser.peek() {
        return Err(EvalErrorKind::Syntax(format!(
            "unexpected token '{}' at position {}",
            tok, parser.pos
        )));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(|s| s.as_str())
    }

    fn advance(&mut self) -> Option<&'a str> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &str) -> Result<(), EvalErrorKind> {
        match self.advance() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => Err(EvalErrorKind::Syntax(format!(
                "expected '{}', found '{}'",
                expected, tok
            ))),
            None => Err(EvalErrorKind::Syntax(format!(
                "expected '{}', found end of expression",
                expected
            ))),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, EvalErrorKind> {
        let mut left = self.parse_and()?;
        while self.peek() == Some("OR") {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, EvalErrorKind> {
        let mut left = self.parse_not()?;
        while self.peek() == Some("AND") {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, EvalErrorKind> {
        if self.peek() == Some("NOT") {
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, EvalErrorKind> {
        let left = self.parse_additive()?;
        if let Some(op) = self.peek().and_then(CompareOp::from_token) {
            self.advance();
            let right = self.parse_additive()?;
            return Ok(Expr::Compare(Box::new(left), op, Box::new(right)));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalErrorKind> {
        let mut left = self.parse_term()?;
        while let Some(op @ (ArithOp::Add | ArithOp::Sub)) = self.peek().and_then(ArithOp::from_token)
        {
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Arith(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, EvalErrorKind> {
        let mut left = self.parse_unary()?;
        while let Some(op @ (ArithOp::Mul | ArithOp::Div)) = self.peek().and_then(ArithOp::from_token)
        {
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Arith(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalErrorKind> {
        if self.peek() == Some("-") {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalErrorKind> {
        let tok = self
            .advance()
            .ok_or_else(|| EvalErrorKind::Syntax("unexpected end of expression".to_string()))?;

        if tok == "(" {
            let inner = self.parse_or()?;
            self.expect(")")?;
            return Ok(inner);
        }

        if let Some(func) = Function::from_token(tok) {
            if self.peek() == Some("(") {
                return self.parse_call(func);
            }
        }

        if tok.eq_ignore_ascii_case("TRUE") {
            return Ok(Expr::Literal(Value::Bool(true)));
        }
        if tok.eq_ignore_ascii_case("FALSE") {
            return Ok(Expr::Literal(Value::Bool(false)));
        }

        if let Some(value) = parse_number_literal(tok) {
            return Ok(Expr::Literal(value));
        }
        if let Some(date) = parse_date_literal(tok) {
            return Ok(Expr::Literal(Value::Date(date)));
        }

        if RESERVED.contains(&tok)
            || CompareOp::from_token(tok).is_some()
            || ArithOp::from_token(tok).is_some()
        {
            return Err(EvalErrorKind::Syntax(format!("unexpected token '{}'", tok)));
        }
        if self.peek() == Some("(") {
            return Err(EvalErrorKind::UnknownFunction(tok.to_string()));
        }

        Ok(Expr::Ident(tok.to_string()))
    }

    fn parse_call(&mut self, func: Function) -> Result<Expr, EvalErrorKind> {
        self.expect("(")?;
        let mut args = vec![self.parse_or()?];
        while self.peek() == Some(",") {
            self.advance();
            args.push(self.parse_or()?);
        }
        self.expect(")")?;
        if args.len() != func.arity() {
            return Err(EvalErrorKind::Syntax(format!(
                "{:?} takes {} argument(s), got {}",
                func,
                func.arity(),
                args.len()
            )));
        }
        Ok(Expr::Call(func, args))
    }
}

/// Parse `12`, `-3.5` or `100<EUR>`.
pub fn parse_number_literal(tok: &str) -> Option<Value> {
    if let Some(open) = tok.find('<') {
        let currency = tok[open + 1..].strip_suffix('>')?;
        let amount = Decimal::from_str(&tok[..open]).ok()?;
        if currency.is_empty() {
            return None;
        }
        return Some(Value::Amount {
            amount,
            currency: currency.to_string(),
        });
    }
    Decimal::from_str(tok).ok().map(Value::Number)
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date_literal(tok: &str) -> Option<Date> {
    Date::parse(tok, format_description!("[year]-[month]-[day]")).ok()
}

/// Evaluate an expression tree against bound variables.
pub fn eval(expr: &Expr, vars: &Bindings) -> Result<Value, EvalErrorKind> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),

        Expr::Ident(name) => Ok(vars
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::Text(name.clone()))),

        Expr::Neg(operand) => numeric::negate(&eval(operand, vars)?),

        Expr::Not(operand) => Ok(Value::Bool(!eval(operand, vars)?.as_bool()?)),

        Expr::And(left, right) => {
            if !eval(left, vars)?.as_bool()? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval(right, vars)?.as_bool()?))
        }

        Expr::Or(left, right) => {
            if eval(left, vars)?.as_bool()? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval(right, vars)?.as_bool()?))
        }

        Expr::Compare(left, op, right) => {
            let l = eval(left, vars)?;
            let r = eval(right, vars)?;
            Ok(Value::Bool(numeric::compare_values(&l, *op, &r)?))
        }

        Expr::Arith(left, op, right) => {
            let l = eval(left, vars)?;
            let r = eval(right, vars)?;
            numeric::eval_arith(&l, *op, &r)
        }

        Expr::Call(func, args) => {
            let values = args
                .iter()
                .map(|a| eval(a, vars))
                .collect::<Result<Vec<_>, _>>()?;
            match (func, values.as_slice()) {
                (Function::Floor, [v]) => numeric::round_with(v, Decimal::floor),
                (Function::Ceil, [v]) => numeric::round_with(v, Decimal::ceil),
                (Function::Round, [v]) => numeric::round_with(v, numeric::round_half_even),
                (Function::Min, [a, b]) => pick(a, b, true),
                (Function::Max, [a, b]) => pick(a, b, false),
                _ => Err(EvalErrorKind::Syntax(format!(
                    "{:?} called with {} argument(s)",
                    func,
                    values.len()
                ))),
            }
        }
    }
}

fn pick(a: &Value, b: &Value, min: bool) -> Result<Value, EvalErrorKind> {
    let a_less = numeric::compare_values(a, CompareOp::Lt, b)?;
    if a_less == min {
        Ok(a.clone())
    } else {
        Ok(b.clone())
    }
}
