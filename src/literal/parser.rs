//! Recursive-descent evaluator for array literal files.
//!
//! Only constant expressions are accepted: arrays (`[...]` and `array(...)`),
//! strings, numbers, `true`/`false`/`null` and `.` concatenation. Anything
//! that would need a runtime (variables, calls, constants) is rejected.

use serde_json::{
    Map,
    Number,
    Value,
};

use super::ParseError;
use crate::Translations;

const OPEN_TAG: &str = "<?php";
const CLOSE_TAG: &str = "?>";

/// Evaluates the array literal returned by a group file.
///
/// Integer keys are stored in their decimal string form; bare entries get
/// the next free integer index.
///
/// # Examples
/// ```
/// use chained_translator::literal::parse;
///
/// let translations = parse("<?php\n\nreturn ['welcome' => 'Hello', 'nav' => ['home' => 'Home']];").unwrap();
/// assert_eq!(translations["welcome"], "Hello");
/// assert_eq!(translations["nav"]["home"], "Home");
/// ```
pub fn parse(source: &str) -> Result<Translations, ParseError> {
    Parser { source, pos: 0 }.parse_file()
}

/// Cursor over the file contents.
struct Parser<'a> {
    /// Complete file contents
    source: &'a str,
    /// Byte offset of the cursor
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        self.source.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        let Some(head) = rest.get(..keyword.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(keyword) {
            return false;
        }
        let followed_by_ident = rest
            .get(keyword.len()..)
            .and_then(|tail| tail.chars().next())
            .is_some_and(is_ident_char);
        if followed_by_ident {
            return false;
        }
        self.pos += keyword.len();
        true
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        self.source.get(start..self.pos).unwrap_or_default()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(self.source, self.pos, message)
    }

    fn expect(&mut self, token: &str) -> Result<(), ParseError> {
        self.skip_trivia()?;
        if self.eat(token) { Ok(()) } else { Err(self.error(format!("expected `{token}`"))) }
    }

    /// Skips whitespace and `//`, `#` and `/* */` comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = self.rest();
            if self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            } else if rest.starts_with("//") || (rest.starts_with('#') && !rest.starts_with("#[")) {
                // a line comment ends at the newline or at a close tag
                while let Some(c) = self.peek() {
                    if c == '\n' || self.rest().starts_with(CLOSE_TAG) {
                        break;
                    }
                    self.bump();
                }
            } else if rest.starts_with("/*") {
                let Some(end) = rest.get(2..).and_then(|body| body.find("*/")) else {
                    return Err(self.error("unterminated comment"));
                };
                self.pos += end + 4;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_file(&mut self) -> Result<Translations, ParseError> {
        self.skip_trivia()?;
        if self.eat(OPEN_TAG) && !self.peek().is_none_or(char::is_whitespace) {
            return Err(self.error("expected whitespace after the open tag"));
        }
        self.skip_trivia()?;

        while self.eat_keyword("declare") {
            self.expect("(")?;
            let Some(end) = self.rest().find(')') else {
                return Err(self.error("unterminated declare directive"));
            };
            self.pos += end + 1;
            self.expect(";")?;
            self.skip_trivia()?;
        }

        if !self.eat_keyword("return") {
            return Err(self.error("expected `return`"));
        }
        self.skip_trivia()?;
        let start = self.pos;
        let value = self.parse_expression()?;
        self.expect(";")?;

        self.skip_trivia()?;
        if self.eat(CLOSE_TAG) {
            self.skip_trivia()?;
        }
        if self.peek().is_some() {
            return Err(self.error("unexpected content after the return statement"));
        }

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ParseError::at(self.source, start, "the file must return an array")),
        }
    }

    fn parse_expression(&mut self) -> Result<Value, ParseError> {
        let mut value = self.parse_term()?;
        loop {
            self.skip_trivia()?;
            if !self.rest().starts_with('.') || self.rest().starts_with("..") {
                return Ok(value);
            }
            let start = self.pos;
            self.bump();
            let right = self.parse_term()?;
            let left = self.concat_operand(&value, start)?;
            let right = self.concat_operand(&right, start)?;
            value = Value::String(left + &right);
        }
    }

    fn concat_operand(&self, value: &Value, offset: usize) -> Result<String, ParseError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(true) => Ok("1".to_string()),
            Value::Bool(false) | Value::Null => Ok(String::new()),
            Value::Array(_) | Value::Object(_) => {
                Err(ParseError::at(self.source, offset, "cannot concatenate an array"))
            }
        }
    }

    fn parse_term(&mut self) -> Result<Value, ParseError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('[') => {
                self.bump();
                self.parse_array_body(']')
            }
            Some('\'') => {
                self.bump();
                self.parse_single_quoted().map(Value::String)
            }
            Some('"') => {
                self.bump();
                self.parse_double_quoted().map(Value::String)
            }
            Some('<') if self.rest().starts_with("<<<") => {
                self.pos += 3;
                self.parse_heredoc().map(Value::String)
            }
            Some('(') => {
                self.bump();
                let value = self.parse_expression()?;
                self.expect(")")?;
                Ok(value)
            }
            Some(c) if c == '-' || c == '+' || c.is_ascii_digit() => self.parse_number(),
            Some('.') if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.parse_number()
            }
            Some(c) if is_ident_start(c) => self.parse_identifier(),
            Some(c) => Err(self.error(format!("unexpected character `{c}`"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_identifier(&mut self) -> Result<Value, ParseError> {
        if self.eat_keyword("array") {
            self.expect("(")?;
            return self.parse_array_body(')');
        }
        if self.eat_keyword("true") {
            return Ok(Value::Bool(true));
        }
        if self.eat_keyword("false") {
            return Ok(Value::Bool(false));
        }
        if self.eat_keyword("null") {
            return Ok(Value::Null);
        }
        Err(self.error("only literal values are allowed"))
    }

    fn parse_array_body(&mut self, close: char) -> Result<Value, ParseError> {
        let mut map = Map::new();
        let mut next_index: i64 = 0;
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(close) {
                self.bump();
                return Ok(Value::Object(map));
            }

            let start = self.pos;
            let first = self.parse_expression()?;
            self.skip_trivia()?;
            let (key, value) = if self.eat("=>") {
                (self.array_key(&first, start)?, self.parse_expression()?)
            } else {
                (next_index.to_string(), first)
            };

            if let Ok(index) = key.parse::<i64>()
                && index.to_string() == key
                && index >= next_index
            {
                next_index = index.saturating_add(1);
            }
            map.insert(key, value);

            self.skip_trivia()?;
            if self.eat(",") {
                continue;
            }
            if self.peek() == Some(close) {
                self.bump();
                return Ok(Value::Object(map));
            }
            return Err(self.error(format!("expected `,` or `{close}`")));
        }
    }

    fn array_key(&self, key: &Value, offset: usize) -> Result<String, ParseError> {
        match key {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(match (n.as_i64(), n.as_f64()) {
                (Some(int), _) => int.to_string(),
                (None, Some(float)) => float.trunc().to_string(),
                (None, None) => n.to_string(),
            }),
            Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            Value::Null => Ok(String::new()),
            Value::Array(_) | Value::Object(_) => {
                Err(ParseError::at(self.source, offset, "illegal array key type"))
            }
        }
    }

    fn parse_single_quoted(&mut self) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.peek() {
                    Some(c @ ('\\' | '\'')) => {
                        self.bump();
                        out.push(c);
                    }
                    _ => out.push('\\'),
                },
                Some('\'') => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_double_quoted(&mut self) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some(c) => self.push_interpolated(c, &mut out)?,
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    /// Pushes `c`, read from a double-quoted or heredoc body, onto `out`.
    fn push_interpolated(&mut self, c: char, out: &mut String) -> Result<(), ParseError> {
        match c {
            '\\' => self.parse_escape(out),
            '$' if self.peek().is_some_and(|c| is_ident_start(c) || c == '{') => {
                Err(self.error("variable interpolation is not allowed"))
            }
            '{' if self.peek() == Some('$') => {
                Err(self.error("variable interpolation is not allowed"))
            }
            c => {
                out.push(c);
                Ok(())
            }
        }
    }

    /// Parses a heredoc or nowdoc after its `<<<`.
    ///
    /// The closing label may be indented; that indentation is removed from
    /// every body line. Nowdoc bodies (`<<<'LABEL'`) are taken verbatim.
    fn parse_heredoc(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.take_while(|c| c == ' ' || c == '\t');
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.bump();
                Some(q)
            }
            _ => None,
        };
        let label = self.take_while(is_ident_char);
        if label.is_empty() || label.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.error("expected a heredoc label"));
        }
        if let Some(q) = quote
            && self.bump() != Some(q)
        {
            return Err(self.error("unterminated heredoc label"));
        }
        if !self.eat("\n") && !self.eat("\r\n") {
            return Err(self.error("expected a newline after the heredoc label"));
        }

        let body_start = self.pos;
        let mut line_start = body_start;
        loop {
            let rest = self.source.get(line_start..).unwrap_or_default();
            let line = rest.split('\n').next().unwrap_or_default();
            let marker = line.trim_start_matches([' ', '\t']);
            let closes = marker
                .strip_prefix(label)
                .is_some_and(|tail| !tail.chars().next().is_some_and(is_ident_char));
            if closes {
                let indent = line.len() - marker.len();
                let raw = self.source.get(body_start..line_start).unwrap_or_default();
                let raw =
                    raw.strip_suffix('\n').map_or(raw, |r| r.strip_suffix('\r').unwrap_or(r));
                self.pos = line_start + indent + label.len();
                let body = self.dedent(raw, indent, body_start)?;
                if quote == Some('\'') {
                    return Ok(body);
                }
                return self.unescape_heredoc(&body, body_start);
            }
            if line.len() == rest.len() {
                return Err(ParseError::at(self.source, start, "unterminated heredoc"));
            }
            line_start += line.len() + 1;
        }
    }

    /// Strips `indent` leading blanks from every line of `raw`.
    fn dedent(&self, raw: &str, indent: usize, offset: usize) -> Result<String, ParseError> {
        let mut lines = Vec::new();
        for line in raw.split('\n') {
            match line.get(..indent) {
                Some(prefix) if prefix.chars().all(|c| c == ' ' || c == '\t') => {
                    lines.push(line.get(indent..).unwrap_or_default());
                }
                _ if line.trim().is_empty() => lines.push(""),
                _ => {
                    return Err(ParseError::at(self.source, offset, "invalid heredoc body indentation"));
                }
            }
        }
        Ok(lines.join("\n"))
    }

    /// Resolves escapes in a heredoc body. Errors are reported at `offset`.
    fn unescape_heredoc(&self, body: &str, offset: usize) -> Result<String, ParseError> {
        let mut inner = Parser { source: body, pos: 0 };
        let mut out = String::new();
        while let Some(c) = inner.bump() {
            // `\"` is not an escape outside double quotes
            if c == '\\' && inner.peek() == Some('"') {
                out.push(c);
                continue;
            }
            inner
                .push_interpolated(c, &mut out)
                .map_err(|error| ParseError::at(self.source, offset, error.message))?;
        }
        Ok(out)
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        let simple = match self.peek() {
            Some('n') => Some('\n'),
            Some('t') => Some('\t'),
            Some('r') => Some('\r'),
            Some('v') => Some('\u{0B}'),
            Some('e') => Some('\u{1B}'),
            Some('f') => Some('\u{0C}'),
            Some('\\') => Some('\\'),
            Some('$') => Some('$'),
            Some('"') => Some('"'),
            _ => None,
        };
        if let Some(c) = simple {
            self.bump();
            out.push(c);
            return Ok(());
        }

        match self.peek() {
            Some('0'..='7') => {
                let mut digits = String::new();
                while digits.len() < 3 && self.peek().is_some_and(|c| c.is_digit(8)) {
                    digits.extend(self.bump());
                }
                self.push_byte_escape(out, &digits, 8)
            }
            Some('x') if self.peek_nth(1).is_some_and(|c| c.is_ascii_hexdigit()) => {
                self.bump();
                let mut digits = String::new();
                while digits.len() < 2 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    digits.extend(self.bump());
                }
                self.push_byte_escape(out, &digits, 16)
            }
            Some('u') if self.peek_nth(1) == Some('{') => {
                self.pos += 2;
                let digits = self.take_while(|c| c.is_ascii_hexdigit());
                let c = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32);
                match (c, self.eat("}")) {
                    (Some(c), true) => {
                        out.push(c);
                        Ok(())
                    }
                    _ => Err(self.error("invalid unicode escape")),
                }
            }
            _ => {
                out.push('\\');
                Ok(())
            }
        }
    }

    fn push_byte_escape(&self, out: &mut String, digits: &str, radix: u32) -> Result<(), ParseError> {
        match u8::from_str_radix(digits, radix) {
            Ok(byte) if byte.is_ascii() => {
                out.push(char::from(byte));
                Ok(())
            }
            _ => Err(self.error("byte escapes outside ASCII are not supported")),
        }
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        let negative = self.eat("-");
        if !negative {
            self.eat("+");
        }
        self.skip_trivia()?;

        if let Some(radix) = self.radix_prefix() {
            self.pos += 2;
            let digits = self.take_while(|c| c.is_digit(radix) || c == '_').replace('_', "");
            if self.peek().is_some_and(is_ident_char) {
                return Err(self.error("invalid numeric literal"));
            }
            return integer_in_radix(&digits, radix, negative)
                .ok_or_else(|| ParseError::at(self.source, start, "invalid number"));
        }

        let digits_start = self.pos;
        self.take_while(|c| c.is_ascii_digit() || c == '_');
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.take_while(|c| c.is_ascii_digit() || c == '_');
            is_float = true;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_digit = match self.peek_nth(1) {
                Some('+' | '-') => self.peek_nth(2),
                other => other,
            };
            if exponent_digit.is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                self.take_while(|c| c.is_ascii_digit());
                is_float = true;
            }
        }

        let digits = self.source.get(digits_start..self.pos).unwrap_or_default().replace('_', "");
        if digits.is_empty() {
            return Err(ParseError::at(self.source, start, "expected a number"));
        }

        // `0755` is octal; `0.5` and `01e3` stay decimal
        if !is_float && digits.len() > 1 && digits.starts_with('0') {
            return integer_in_radix(&digits, 8, negative)
                .ok_or_else(|| ParseError::at(self.source, start, "invalid octal literal"));
        }
        let text = if negative { format!("-{digits}") } else { digits };

        // integer overflow falls back to a float, as the host runtime does
        if !is_float && let Ok(int) = text.parse::<i64>() {
            return Ok(Value::from(int));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| ParseError::at(self.source, start, "invalid number"))
    }

    /// Radix of a `0x`, `0b` or `0o` prefix followed by a digit of that radix.
    fn radix_prefix(&self) -> Option<u32> {
        if self.peek() != Some('0') {
            return None;
        }
        let radix = match self.peek_nth(1)? {
            'x' | 'X' => 16,
            'b' | 'B' => 2,
            'o' | 'O' => 8,
            _ => return None,
        };
        self.peek_nth(2).filter(|c| c.is_digit(radix)).map(|_| radix)
    }
}

/// Integer value of `digits` in `radix`.
///
/// Values outside `i64` become floats, as the host runtime does. Returns
/// `None` when a digit is out of range.
#[allow(clippy::float_arithmetic)]
fn integer_in_radix(digits: &str, radix: u32, negative: bool) -> Option<Value> {
    let magnitude = u128::from_str_radix(digits, radix).ok();
    let int = magnitude.and_then(|m| {
        let m = i128::try_from(m).ok()?;
        i64::try_from(if negative { -m } else { m }).ok()
    });
    if let Some(int) = int {
        return Some(Value::from(int));
    }

    let magnitude = digits
        .chars()
        .try_fold(0_f64, |acc, c| Some(acc.mul_add(f64::from(radix), f64::from(c.to_digit(radix)?))))?;
    Number::from_f64(if negative { -magnitude } else { magnitude }).map(Value::Number)
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

const fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}
