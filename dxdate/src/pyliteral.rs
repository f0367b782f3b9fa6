//! Python-literal annotation cells to strict JSON.
//!
//! Real-data exports store annotations as Python `repr` output rather than
//! JSON:
//!
//! ```text
//! [{'parsed': datetime.date(2019, 4, 18), 'original': '18/04/19', 'start': 7}]
//!                     │
//!                     ▼
//! [{"parsed":"2019-04-18","original":"18/04/19","start":7}]
//! ```
//!
//! Supported literals: lists, tuples (emitted as arrays), dicts, single- or
//! double-quoted strings with backslash escapes, integers, floats, `True`,
//! `False`, `None`. Dict keys are stringified the way `json.dumps` does.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Number, Value};

use crate::{Error, Result};

static PY_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"datetime\.date\((\d+),\s*(\d+),\s*(\d+)\)").expect("valid regex")
});

/// Rewrite a Python-literal string as JSON.
///
/// Empty or absent input yields `"[]"`, as does anything that fails to
/// parse (with a warning).
///
/// ```rust
/// use dxdate::transform_python_to_json;
///
/// let json = transform_python_to_json("[{'label': 'flu', 'start': 3}]");
/// assert_eq!(json, r#"[{"label":"flu","start":3}]"#);
/// assert_eq!(transform_python_to_json(None), "[]");
/// ```
pub fn transform_python_to_json<'a>(input: impl Into<Option<&'a str>>) -> String {
    let Some(input) = input.into().filter(|s| !s.trim().is_empty()) else {
        return "[]".to_string();
    };

    let cleaned = PY_DATE.replace_all(input, |caps: &Captures<'_>| {
        let field = |i: usize| caps[i].parse::<u64>().unwrap_or(0);
        format!("\"{:04}-{:02}-{:02}\"", field(1), field(2), field(3))
    });

    match parse_python_literal(&cleaned).and_then(|v| Ok(serde_json::to_string(&v)?)) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to parse Python-style string: {}", e);
            "[]".to_string()
        }
    }
}

/// Parse a single Python literal expression into a JSON value.
///
/// # Errors
///
/// Returns [`Error::Parse`] on malformed input or trailing content.
pub fn parse_python_literal(input: &str) -> Result<Value> {
    let mut parser = Parser::new(input);
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing content"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, msg: &str) -> Error {
        Error::parse(format!("{msg} at position {}", self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            _ => Err(self.error(&format!("expected '{want}'"))),
        }
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_ws();
        match self.peek() {
            Some('[') => {
                self.pos += 1;
                Ok(Value::Array(self.sequence(']')?.0))
            }
            Some('(') => {
                self.pos += 1;
                let (mut items, trailing_comma) = self.sequence(')')?;
                // `(x)` is just a parenthesized value, `(x,)` is a tuple.
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Value::Array(items))
                }
            }
            Some('{') => {
                self.pos += 1;
                self.dict()
            }
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                Ok(Value::String(self.string(q)?))
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if c.is_alphabetic() => self.keyword(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Comma-separated values up to `close`. Returns the items and whether
    /// the last item was followed by a comma.
    fn sequence(&mut self, close: char) -> Result<(Vec<Value>, bool)> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok((items, trailing_comma));
            }
            if !items.is_empty() && !trailing_comma {
                return Err(self.error("expected ','"));
            }
            items.push(self.value()?);
            self.skip_ws();
            trailing_comma = self.peek() == Some(',');
            if trailing_comma {
                self.pos += 1;
            }
        }
    }

    fn dict(&mut self) -> Result<Value> {
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }
            let key = dict_key(self.value()?).ok_or_else(|| self.error("unsupported dict key"))?;
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<()> {
        match self.bump() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some('x') => out.push(self.hex_char(2)?),
            Some('u') => out.push(self.hex_char(4)?),
            Some('U') => out.push(self.hex_char(8)?),
            // Unknown escapes are kept verbatim.
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => return Err(self.error("unterminated escape")),
        }
        Ok(())
    }

    fn hex_char(&mut self, digits: usize) -> Result<char> {
        let end = self.pos + digits;
        let hex: String = self.chars.get(self.pos..end).unwrap_or_default().iter().collect();
        if hex.len() != digits {
            return Err(self.error("truncated escape"));
        }
        self.pos = end;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error("invalid escape"))
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_'))
            || (matches!(self.peek(), Some('-' | '+'))
                && matches!(self.chars.get(self.pos - 1), Some('e' | 'E')))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        let text = text.strip_prefix('+').unwrap_or(&text);

        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| Error::parse(format!("invalid number '{text}' at position {start}")))
    }

    fn keyword(&mut self) -> Result<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            _ => Err(Error::parse(format!(
                "malformed literal '{word}' at position {start}"
            ))),
        }
    }
}

fn dict_key(key: Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_datetime_rewrite() {
        let input = "[{'parsed': datetime.date(2019, 4, 18), 'original': '18/04/19', 'start': 7}]";
        let out: Value = serde_json::from_str(&transform_python_to_json(input)).unwrap();
        assert_eq!(
            out,
            json!([{"parsed": "2019-04-18", "original": "18/04/19", "start": 7}])
        );
    }

    #[test]
    fn test_empty_and_invalid() {
        assert_eq!(transform_python_to_json(""), "[]");
        assert_eq!(transform_python_to_json("   "), "[]");
        assert_eq!(transform_python_to_json(None), "[]");
        assert_eq!(transform_python_to_json("nan"), "[]");
        assert_eq!(transform_python_to_json("[{'a': 1"), "[]");
        assert_eq!(transform_python_to_json("[1, 2] extra"), "[]");
        assert_eq!(transform_python_to_json("os.system('x')"), "[]");
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            parse_python_literal("[True, False, None, -3, 2.5, 1e3]").unwrap(),
            json!([true, false, null, -3, 2.5, 1000.0])
        );
        assert_eq!(parse_python_literal("('a', 1)").unwrap(), json!(["a", 1]));
        assert_eq!(parse_python_literal("('a',)").unwrap(), json!(["a"]));
        assert_eq!(parse_python_literal("('a')").unwrap(), json!("a"));
        assert_eq!(parse_python_literal("()").unwrap(), json!([]));
        assert_eq!(parse_python_literal("[1, 2,]").unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            parse_python_literal(r#"'it\'s "fine"\n'"#).unwrap(),
            json!("it's \"fine\"\n")
        );
        assert_eq!(parse_python_literal(r"'\x41é'").unwrap(), json!("Aé"));
        assert_eq!(parse_python_literal(r#""a'b""#).unwrap(), json!("a'b"));
    }

    #[test]
    fn test_dict_keys_stringified() {
        assert_eq!(
            parse_python_literal("{1: 'a', None: 'b', True: 'c'}").unwrap(),
            json!({"1": "a", "null": "b", "true": "c"})
        );
        assert!(parse_python_literal("{(1, 2): 'a'}").is_err());
    }

    #[test]
    fn test_annotation_list() {
        let out = transform_python_to_json("[{'label': 'asthma', 'start': 10}, {'label': 'copd', 'start': 40}]");
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[1]["label"], "copd");
        assert_eq!(v[1]["start"], 40);
    }
}
