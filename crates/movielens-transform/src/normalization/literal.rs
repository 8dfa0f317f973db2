//! Parser for Python-style literal expressions.
//!
//! Handles the subset that appears in the metadata export: lists, tuples,
//! dicts, sets, quoted strings (single, double, raw), integers, floats, and
//! the `None`/`True`/`False` constants. The result is the equivalent JSON
//! value; tuples and sets become arrays and non-string dict keys are
//! stringified.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Containers nested deeper than this are rejected, as `serde_json` does.
const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid literal at offset {offset}: {message}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Parse a complete literal expression.
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        chars: input.char_indices().collect(),
        pos: 0,
        len: input.len(),
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    len: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, ch)| ch)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, ch)| ch)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or(self.len, |&(offset, _)| offset)
    }

    fn error(&self, message: &str) -> LiteralError {
        LiteralError {
            offset: self.offset(),
            message: message.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        self.skip_whitespace();
        if self.bump() == Some(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_whitespace();
        if matches!(self.peek(), Some('[' | '(' | '{')) {
            if self.depth >= MAX_DEPTH {
                return Err(self.error("nesting too deep"));
            }
            self.depth += 1;
            let value = self.container();
            self.depth -= 1;
            return value;
        }
        self.scalar()
    }

    fn container(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some('(') => self.tuple_or_group(),
            Some('{') => self.dict_or_set(),
            _ => {
                self.pos += 1;
                self.sequence(']').map(Value::Array)
            }
        }
    }

    fn scalar(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some('\'' | '"') => self.strings(),
            Some('r' | 'R' | 'u' | 'U') if matches!(self.peek_at(1), Some('\'' | '"')) => {
                self.strings()
            }
            Some(ch) if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.') => self.number(),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.constant(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Comma-separated values up to `close`, trailing comma allowed.
    fn sequence(&mut self, close: char) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => {}
                Some(ch) if ch == close => return Ok(items),
                _ => return Err(self.error(&format!("expected ',' or '{close}'"))),
            }
        }
    }

    fn tuple_or_group(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1;
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.value()?;
        self.skip_whitespace();
        match self.bump() {
            Some(')') => Ok(first),
            Some(',') => {
                let mut items = vec![first];
                items.extend(self.sequence(')')?);
                Ok(Value::Array(items))
            }
            _ => Err(self.error("expected ',' or ')'")),
        }
    }

    fn dict_or_set(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1;
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Value::Object(Map::new()));
        }
        let first = self.value()?;
        self.skip_whitespace();
        if self.peek() != Some(':') {
            // A set literal.
            let mut items = vec![first];
            match self.bump() {
                Some('}') => return Ok(Value::Array(items)),
                Some(',') => {
                    items.extend(self.sequence('}')?);
                    return Ok(Value::Array(items));
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
        let mut map = Map::new();
        let mut key = first;
        loop {
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key_string(key), value);
            self.skip_whitespace();
            match self.bump() {
                Some('}') => return Ok(Value::Object(map)),
                Some(',') => {
                    self.skip_whitespace();
                    if self.peek() == Some('}') {
                        self.pos += 1;
                        return Ok(Value::Object(map));
                    }
                    key = self.value()?;
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<Value, LiteralError> {
        let mut text = self.string()?;
        loop {
            self.skip_whitespace();
            let next_is_string = match self.peek() {
                Some('\'' | '"') => true,
                Some('r' | 'R' | 'u' | 'U') => matches!(self.peek_at(1), Some('\'' | '"')),
                _ => false,
            };
            if !next_is_string {
                return Ok(Value::String(text));
            }
            text.push_str(&self.string()?);
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let mut raw = false;
        if let Some(prefix @ ('r' | 'R' | 'u' | 'U')) = self.peek() {
            raw = matches!(prefix, 'r' | 'R');
            self.pos += 1;
        }
        let Some(quote) = self.bump() else {
            return Err(self.error("expected string"));
        };
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(ch) if ch == quote => return Ok(text),
                Some('\\') if raw => {
                    text.push('\\');
                    if let Some(next) = self.bump() {
                        text.push(next);
                    }
                }
                Some('\\') => self.escape(&mut text)?,
                Some(ch) => text.push(ch),
            }
        }
    }

    fn escape(&mut self, text: &mut String) -> Result<(), LiteralError> {
        let Some(ch) = self.bump() else {
            return Err(self.error("unterminated escape"));
        };
        match ch {
            '\n' => {}
            '\\' | '\'' | '"' => text.push(ch),
            'n' => text.push('\n'),
            't' => text.push('\t'),
            'r' => text.push('\r'),
            '0' => text.push('\0'),
            'a' => text.push('\u{07}'),
            'b' => text.push('\u{08}'),
            'f' => text.push('\u{0c}'),
            'v' => text.push('\u{0b}'),
            'x' => text.push(self.hex_escape(2)?),
            'u' => text.push(self.hex_escape(4)?),
            'U' => text.push(self.hex_escape(8)?),
            other => {
                // Unknown escapes keep their backslash.
                text.push('\\');
                text.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .bump()
                .and_then(|ch| ch.to_digit(16))
                .ok_or_else(|| self.error("invalid hex escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut negative = false;
        while let Some(sign @ ('-' | '+')) = self.peek() {
            if sign == '-' {
                negative = !negative;
            }
            self.pos += 1;
            self.skip_whitespace();
        }
        let digits_start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_'))
            || (matches!(self.peek(), Some('-' | '+'))
                && matches!(self.chars.get(self.pos.wrapping_sub(1)), Some((_, 'e' | 'E'))))
        {
            self.pos += 1;
        }
        let body: String = self.chars[digits_start..self.pos]
            .iter()
            .map(|&(_, ch)| ch)
            .filter(|&ch| ch != '_')
            .collect();
        if body.is_empty() {
            self.pos = start;
            return Err(self.error("expected number"));
        }
        if let Ok(integer) = body.parse::<i64>() {
            let integer = if negative { -integer } else { integer };
            return Ok(Value::Number(Number::from(integer)));
        }
        let is_float_text = body
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '-' | '+'));
        let float = if is_float_text {
            body.parse::<f64>().ok()
        } else {
            None
        };
        float
            .map(|value| if negative { -value } else { value })
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| {
                self.pos = start;
                self.error("invalid number")
            })
    }

    fn constant(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos]
            .iter()
            .map(|&(_, ch)| ch)
            .collect();
        match word.as_str() {
            "None" => Ok(Value::Null),
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            _ => {
                self.pos = start;
                Err(self.error("names are not literals"))
            }
        }
    }
}

fn key_string(key: Value) -> String {
    match key {
        Value::String(text) => text,
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}
