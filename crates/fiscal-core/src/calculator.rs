//! Calculator
//!
//! Evaluates the arithmetic typed on the calculator screen. Expressions are
//! tokenized, parsed by recursive descent and evaluated; nothing is handed to
//! a general-purpose interpreter.
//!
//! Grammar:
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := '-' factor | '+' factor | number | '(' expr ')'
//! ```

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Expressão vazia")]
    Empty,

    #[error("Caractere inesperado '{0}' na posição {1}")]
    UnexpectedChar(char, usize),

    #[error("Expressão incompleta")]
    UnexpectedEnd,

    #[error("Símbolo inesperado: {0}")]
    UnexpectedToken(String),

    #[error("Divisão por zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => {}
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' | '×' => tokens.push(Token::Star),
            '/' | '÷' => tokens.push(Token::Slash),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '0'..='9' | '.' | ',' => {
                let start = i;
                while i + 1 < chars.len() && matches!(chars[i + 1], '0'..='9' | '.' | ',') {
                    i += 1;
                }
                let literal: String = chars[start..=i]
                    .iter()
                    .map(|&c| if c == ',' { '.' } else { c })
                    .collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| CalcError::UnexpectedToken(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            other => return Err(CalcError::UnexpectedChar(other, i)),
        }
        i += 1;
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::Plus) => self.factor(),
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(CalcError::UnexpectedToken(other.to_string())),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(other) => Err(CalcError::UnexpectedToken(other.to_string())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(input: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(CalcError::UnexpectedToken(extra.to_string()));
    }
    Ok(value)
}

/// Result as shown on the display: up to 10 decimals, trailing zeros dropped,
/// comma as decimal mark
pub fn format_result(value: f64) -> String {
    let fixed = format!("{:.10}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    let trimmed = if trimmed == "-0" { "0" } else { trimmed };
    trimmed.replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2 + 3 * 4"), Ok(14.0));
        assert_eq!(evaluate("(2 + 3) * 4"), Ok(20.0));
        assert_eq!(evaluate("10 - 4 - 3"), Ok(3.0));
    }

    #[test]
    fn test_decimal_comma_and_unary_minus() {
        assert_eq!(evaluate("1,5 * 2"), Ok(3.0));
        assert_eq!(evaluate("-(2 + 1)"), Ok(-3.0));
        assert_eq!(evaluate("1000 × 18 ÷ 100"), Ok(180.0));
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate(""), Err(CalcError::Empty));
        assert_eq!(evaluate("1 / 0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("2 +"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(CalcError::UnexpectedEnd));
        assert!(matches!(evaluate("alert(1)"), Err(CalcError::UnexpectedChar('a', 0))));
        assert!(matches!(evaluate("1 2"), Err(CalcError::UnexpectedToken(_))));
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(3.0), "3");
        assert_eq!(format_result(0.1 + 0.2), "0,3");
        assert_eq!(format_result(-2.5), "-2,5");
    }
}
