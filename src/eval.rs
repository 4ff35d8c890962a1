use crate::error::{ShellError, ShellResult};
use crate::objects::ShellObject;
use crate::variables::Variables;
use log::trace;
use std::cmp::Ordering;

/// True when every character of `text` may appear in an expression.
///
/// Lines containing anything else are never handed to the evaluator.
pub fn looks_like_expression(text: &str) -> bool {
    !text.is_empty()
        && text.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '_' | '.' | '+' | '-' | '*' | '/' | '%' | '(' | ')' | '\'' | '"' | '!' | '='
                        | '<' | '>'
                )
        })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(ShellObject),
    Str(String),
    Word(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    LParen,
    RParen,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

fn tokenize(src: &str) -> ShellResult<Vec<Token>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => {
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let mut is_float = false;
                if i < chars.len() && chars[i] == '.' {
                    is_float = true;
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                if text == "." {
                    return Err(ShellError::parse("unexpected '.'"));
                }
                tokens.push(Token::Number(number_literal(&text, is_float)?));
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != quote {
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(ShellError::parse("unterminated string literal"));
                }
                tokens.push(Token::Str(chars[start..end].iter().collect()));
                i = end + 1;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
            }
            '=' | '!' | '<' | '>' => {
                let followed_by_eq = chars.get(i + 1) == Some(&'=');
                let token = match (c, followed_by_eq) {
                    ('=', true) => Token::EqEq,
                    ('!', true) => Token::NotEq,
                    ('<', true) => Token::Le,
                    ('>', true) => Token::Ge,
                    ('!', false) => Token::Bang,
                    ('<', false) => Token::Lt,
                    ('>', false) => Token::Gt,
                    _ => return Err(ShellError::parse("assignment is not an expression")),
                };
                i += if followed_by_eq { 2 } else { 1 };
                tokens.push(token);
            }
            '+' | '-' | '*' | '/' | '%' | '(' | ')' => {
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
                i += 1;
            }
            other => {
                return Err(ShellError::parse(format!("unexpected character '{}'", other)));
            }
        }
    }

    Ok(tokens)
}

fn number_literal(text: &str, is_float: bool) -> ShellResult<ShellObject> {
    if !is_float {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(ShellObject::Integer(i));
        }
    }
    text.parse::<f64>()
        .map(ShellObject::Float)
        .map_err(|e| ShellError::parse(format!("invalid number '{}': {}", text, e)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Is,
    IsNot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

/// Parsed form of a single expression line.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(ShellObject),
    Variable(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `a < b <= c` keeps every operand so each is evaluated once
    Compare(Box<Expr>, Vec<(CompareOp, Expr)>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Deepest expression tree the parser will build. Counts brackets, unary
/// prefixes and each step of an operator chain.
pub const MAX_EXPRESSION_DEPTH: usize = 200;

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    variables: &'a Variables,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, variables: &'a Variables) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            variables,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    /// Keywords only count when no variable of the same name is bound.
    fn is_keyword_at(&self, pos: usize, keyword: &str) -> bool {
        matches!(self.tokens.get(pos), Some(Token::Word(w)) if w == keyword && !self.variables.contains(w))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword_at(self.pos, keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> ShellResult<()> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(ShellError::parse("expression nested too deeply"));
        }
        Ok(())
    }

    fn parse(mut self) -> ShellResult<Expr> {
        let expr = self.parse_or()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(ShellError::parse(format!("unexpected token {:?}", token))),
        }
    }

    fn parse_or(&mut self) -> ShellResult<Expr> {
        let depth = self.depth;
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            self.descend()?;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_and(&mut self) -> ShellResult<Expr> {
        let depth = self.depth;
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            self.descend()?;
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_not(&mut self) -> ShellResult<Expr> {
        if self.eat_keyword("not") {
            self.descend()?;
            let operand = self.parse_not()?;
            self.depth -= 1;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ShellResult<Expr> {
        let depth = self.depth;
        let first = self.parse_sum()?;
        let mut rest = Vec::new();

        loop {
            let op = if self.is_keyword_at(self.pos, "is") {
                if self.is_keyword_at(self.pos + 1, "not") {
                    self.pos += 1;
                    CompareOp::IsNot
                } else {
                    CompareOp::Is
                }
            } else {
                match self.peek() {
                    Some(Token::EqEq) => CompareOp::Eq,
                    Some(Token::NotEq) => CompareOp::Ne,
                    Some(Token::Lt) => CompareOp::Lt,
                    Some(Token::Le) => CompareOp::Le,
                    Some(Token::Gt) => CompareOp::Gt,
                    Some(Token::Ge) => CompareOp::Ge,
                    _ => break,
                }
            };
            self.pos += 1;
            self.descend()?;
            rest.push((op, self.parse_sum()?));
        }
        self.depth = depth;

        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), rest))
        }
    }

    fn parse_sum(&mut self) -> ShellResult<Expr> {
        let depth = self.depth;
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            self.descend()?;
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_term(&mut self) -> ShellResult<Expr> {
        let depth = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.pos += 1;
            self.descend()?;
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_unary(&mut self) -> ShellResult<Expr> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Bang) => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        self.pos += 1;
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> ShellResult<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Literal(n)),
            Some(Token::Str(s)) => Ok(Expr::Literal(ShellObject::String(s))),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(ShellError::parse("expected ')'")),
                }
            }
            Some(Token::Word(word)) => {
                if self.variables.contains(&word) {
                    return Ok(Expr::Variable(word));
                }
                match word.as_str() {
                    "True" => Ok(Expr::Literal(ShellObject::Boolean(true))),
                    "False" => Ok(Expr::Literal(ShellObject::Boolean(false))),
                    "and" | "or" | "not" | "is" => {
                        Err(ShellError::parse(format!("unexpected keyword '{}'", word)))
                    }
                    _ => Ok(Expr::Variable(word)),
                }
            }
            Some(token) => Err(ShellError::parse(format!("unexpected token {:?}", token))),
            None => Err(ShellError::parse("unexpected end of expression")),
        }
    }
}

/// Parse `src` against the given bindings.
pub fn parse_expression(src: &str, variables: &Variables) -> ShellResult<Expr> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ShellError::parse("empty expression"));
    }
    Parser::new(tokens, variables).parse()
}

pub struct EvaluationEngine<'a> {
    variables: &'a Variables,
}

impl<'a> EvaluationEngine<'a> {
    pub fn new(variables: &'a Variables) -> Self {
        Self { variables }
    }

    /// Evaluate an expression string
    pub fn evaluate_expression(&self, expr_str: &str) -> ShellResult<ShellObject> {
        let expr = parse_expression(expr_str, self.variables)?;
        trace!("parsed {:?}", expr);
        self.evaluate_expr(&expr)
    }

    pub fn evaluate_expr(&self, expr: &Expr) -> ShellResult<ShellObject> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(name) => self
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| ShellError::lookup(name.as_str())),
            Expr::Unary(op, operand) => {
                let value = self.evaluate_expr(operand)?;
                self.evaluate_unary(*op, value)
            }
            Expr::Binary(op, left, right) => {
                let left = self.evaluate_expr(left)?;
                let right = self.evaluate_expr(right)?;
                match op {
                    BinaryOp::Add => self.add_objects(left, right),
                    BinaryOp::Sub => self.sub_objects(left, right),
                    BinaryOp::Mul => self.mul_objects(left, right),
                    BinaryOp::Div => self.div_objects(left, right),
                    BinaryOp::Rem => self.rem_objects(left, right),
                }
            }
            Expr::Compare(first, rest) => {
                let mut left = self.evaluate_expr(first)?;
                for (op, right_expr) in rest {
                    let right = self.evaluate_expr(right_expr)?;
                    if !self.compare_objects(*op, &left, &right)? {
                        return Ok(ShellObject::Boolean(false));
                    }
                    left = right;
                }
                Ok(ShellObject::Boolean(true))
            }
            Expr::And(left, right) => {
                let left = self.evaluate_expr(left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate_expr(right)
            }
            Expr::Or(left, right) => {
                let left = self.evaluate_expr(left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate_expr(right)
            }
        }
    }

    fn evaluate_unary(&self, op: UnaryOp, operand: ShellObject) -> ShellResult<ShellObject> {
        match op {
            UnaryOp::Not => Ok(ShellObject::Boolean(!operand.is_truthy())),
            UnaryOp::Neg => match operand {
                ShellObject::Float(f) => Ok(ShellObject::Float(-f)),
                ref other => match other.as_i64() {
                    Some(i) => Ok(i
                        .checked_neg()
                        .map(ShellObject::Integer)
                        .unwrap_or(ShellObject::Float(-(i as f64)))),
                    None => Err(ShellError::type_error("numeric", other.type_name())),
                },
            },
            UnaryOp::Plus => match operand {
                ShellObject::Float(_) | ShellObject::Integer(_) => Ok(operand),
                ShellObject::Boolean(b) => Ok(ShellObject::Integer(i64::from(b))),
                ShellObject::String(_) => {
                    Err(ShellError::type_error("numeric", operand.type_name()))
                }
            },
        }
    }

    /// Integer arithmetic when both sides are integral, float otherwise.
    fn numeric_op(
        &self,
        symbol: &str,
        left: &ShellObject,
        right: &ShellObject,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> ShellResult<ShellObject> {
        if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
            if let Some(result) = int_op(a, b) {
                return Ok(ShellObject::Integer(result));
            }
        }
        match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => Ok(ShellObject::Float(float_op(a, b))),
            _ => Err(ShellError::type_error(
                "numeric operands",
                format!("{} {} {}", left.type_name(), symbol, right.type_name()),
            )),
        }
    }

    fn add_objects(&self, left: ShellObject, right: ShellObject) -> ShellResult<ShellObject> {
        match (&left, &right) {
            (ShellObject::String(a), ShellObject::String(b)) => {
                Ok(ShellObject::String(format!("{}{}", a, b)))
            }
            _ => self.numeric_op("+", &left, &right, i64::checked_add, |a, b| a + b),
        }
    }

    fn sub_objects(&self, left: ShellObject, right: ShellObject) -> ShellResult<ShellObject> {
        self.numeric_op("-", &left, &right, i64::checked_sub, |a, b| a - b)
    }

    fn mul_objects(&self, left: ShellObject, right: ShellObject) -> ShellResult<ShellObject> {
        self.numeric_op("*", &left, &right, i64::checked_mul, |a, b| a * b)
    }

    fn div_objects(&self, left: ShellObject, right: ShellObject) -> ShellResult<ShellObject> {
        match (left.as_f64(), right.as_f64()) {
            (Some(_), Some(b)) if b == 0.0 => Err(ShellError::eval("division by zero")),
            (Some(a), Some(b)) => Ok(ShellObject::Float(a / b)),
            _ => Err(ShellError::type_error(
                "numeric operands",
                format!("{} / {}", left.type_name(), right.type_name()),
            )),
        }
    }

    fn rem_objects(&self, left: ShellObject, right: ShellObject) -> ShellResult<ShellObject> {
        if right.as_f64() == Some(0.0) {
            return Err(ShellError::eval("modulo by zero"));
        }
        self.numeric_op("%", &left, &right, i64::checked_rem, |a, b| a % b)
    }

    fn compare_objects(
        &self,
        op: CompareOp,
        left: &ShellObject,
        right: &ShellObject,
    ) -> ShellResult<bool> {
        match op {
            CompareOp::Eq => Ok(self.eq_objects(left, right)),
            CompareOp::Ne => Ok(!self.eq_objects(left, right)),
            CompareOp::Is => Ok(self.identical_objects(left, right)),
            CompareOp::IsNot => Ok(!self.identical_objects(left, right)),
            CompareOp::Lt => Ok(self.order_objects(left, right)? == Some(Ordering::Less)),
            CompareOp::Le => Ok(matches!(
                self.order_objects(left, right)?,
                Some(Ordering::Less | Ordering::Equal)
            )),
            CompareOp::Gt => Ok(self.order_objects(left, right)? == Some(Ordering::Greater)),
            CompareOp::Ge => Ok(matches!(
                self.order_objects(left, right)?,
                Some(Ordering::Greater | Ordering::Equal)
            )),
        }
    }

    /// Value equality; booleans compare as numbers, strings only to strings.
    fn eq_objects(&self, left: &ShellObject, right: &ShellObject) -> bool {
        match (left, right) {
            (ShellObject::String(a), ShellObject::String(b)) => a == b,
            (ShellObject::String(_), _) | (_, ShellObject::String(_)) => false,
            _ => match (left.as_i64(), right.as_i64()) {
                (Some(a), Some(b)) => a == b,
                _ => left.as_f64() == right.as_f64(),
            },
        }
    }

    /// Identity for primitives: same kind and equal value.
    fn identical_objects(&self, left: &ShellObject, right: &ShellObject) -> bool {
        match (left, right) {
            (ShellObject::Boolean(a), ShellObject::Boolean(b)) => a == b,
            (ShellObject::String(a), ShellObject::String(b)) => a == b,
            _ if left.is_number() && right.is_number() => self.eq_objects(left, right),
            _ => false,
        }
    }

    fn order_objects(
        &self,
        left: &ShellObject,
        right: &ShellObject,
    ) -> ShellResult<Option<Ordering>> {
        match (left, right) {
            (ShellObject::String(a), ShellObject::String(b)) => Ok(Some(a.cmp(b))),
            _ => match (left.as_i64(), right.as_i64()) {
                (Some(a), Some(b)) => Ok(Some(a.cmp(&b))),
                _ => match (left.as_f64(), right.as_f64()) {
                    (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
                    _ => Err(ShellError::type_error(
                        "comparable types",
                        format!("{} and {}", left.type_name(), right.type_name()),
                    )),
                },
            },
        }
    }
}
