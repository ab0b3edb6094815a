//! JSON value, parser, and writer
//!
//! Request bodies carry nested objects and arrays, so the claims-style
//! field splitter is not enough here; this is a small recursive-descent
//! parser over a borrowed byte cursor, plus a writer on `Display`.

use std::fmt;

/// A JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum Json {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

impl Json {
    /// Parse a JSON document
    pub fn parse(input: &str) -> Result<Json, String> {
        let mut parser = Parser {
            bytes: input.as_bytes(),
            pos: 0,
        };
        parser.skip_whitespace();
        let value = parser.parse_value()?;
        parser.skip_whitespace();
        if parser.pos != parser.bytes.len() {
            return Err("Trailing characters after JSON value".into());
        }
        Ok(value)
    }

    // Constructors

    /// A string value
    pub fn str(value: impl Into<String>) -> Json {
        Json::String(value.into())
    }

    /// An integer value
    pub fn int(value: impl Into<i64>) -> Json {
        Json::Number(value.into() as f64)
    }

    /// An optional string; `None` becomes null
    pub fn opt_str(value: Option<impl Into<String>>) -> Json {
        value.map(Json::str).unwrap_or(Json::Null)
    }

    /// An optional integer; `None` becomes null
    pub fn opt_int(value: Option<impl Into<i64>>) -> Json {
        value.map(Json::int).unwrap_or(Json::Null)
    }

    /// An object from key/value pairs
    pub fn obj(fields: Vec<(&str, Json)>) -> Json {
        Json::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    // Accessors

    /// Object field lookup
    pub fn get(&self, key: &str) -> Option<&Json> {
        match self {
            Json::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Json::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Json::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value (whole numbers only)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Json::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    /// Array items
    pub fn as_array(&self) -> Option<&[Json]> {
        match self {
            Json::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Json::Null)
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Json::Null => write!(f, "null"),
            Json::Bool(b) => write!(f, "{}", b),
            Json::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Json::String(s) => write!(f, "\"{}\"", escape(s)),
            Json::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Json::Object(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "\"{}\":{}", escape(key), value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), String> {
        match self.bump() {
            Some(b) if b == expected => Ok(()),
            Some(b) => Err(format!("Expected '{}', found '{}'", expected as char, b as char)),
            None => Err(format!("Expected '{}', found end of input", expected as char)),
        }
    }

    fn parse_value(&mut self) -> Result<Json, String> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => Ok(Json::String(self.parse_string()?)),
            Some(b't') => self.parse_literal("true", Json::Bool(true)),
            Some(b'f') => self.parse_literal("false", Json::Bool(false)),
            Some(b'n') => self.parse_literal("null", Json::Null),
            Some(b) if b == b'-' || b.is_ascii_digit() => self.parse_number(),
            Some(b) => Err(format!("Unexpected character '{}'", b as char)),
            None => Err("Unexpected end of input".into()),
        }
    }

    fn parse_object(&mut self) -> Result<Json, String> {
        self.expect(b'{')?;
        let mut fields = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Json::Object(fields));
        }

        loop {
            self.skip_whitespace();
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(b':')?;
            let value = self.parse_value()?;
            fields.push((key, value));

            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b'}') => return Ok(Json::Object(fields)),
                _ => return Err("Expected ',' or '}' in object".into()),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Json, String> {
        self.expect(b'[')?;
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Json::Array(items));
        }

        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b']') => return Ok(Json::Array(items)),
                _ => return Err("Expected ',' or ']' in array".into()),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, String> {
        self.expect(b'"')?;
        let mut out = String::new();

        loop {
            match self.bump() {
                Some(b'"') => return Ok(out),
                Some(b'\\') => match self.bump() {
                    Some(b'"') => out.push('"'),
                    Some(b'\\') => out.push('\\'),
                    Some(b'/') => out.push('/'),
                    Some(b'n') => out.push('\n'),
                    Some(b'r') => out.push('\r'),
                    Some(b't') => out.push('\t'),
                    Some(b'b') => out.push('\u{0008}'),
                    Some(b'f') => out.push('\u{000C}'),
                    Some(b'u') => {
                        let mut code = 0u32;
                        for _ in 0..4 {
                            let b = self.bump().ok_or("Truncated unicode escape")?;
                            let digit = (b as char)
                                .to_digit(16)
                                .ok_or("Invalid unicode escape")?;
                            code = code * 16 + digit;
                        }
                        out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    }
                    _ => return Err("Invalid escape sequence".into()),
                },
                Some(b) if b < 0x80 => out.push(b as char),
                Some(b) => {
                    // Re-assemble multi-byte UTF-8 from the raw input
                    let start = self.pos - 1;
                    let len = utf8_len(b);
                    let end = start + len;
                    let slice = self
                        .bytes
                        .get(start..end)
                        .ok_or("Truncated UTF-8 sequence")?;
                    let s = std::str::from_utf8(slice).map_err(|_| "Invalid UTF-8")?;
                    out.push_str(s);
                    self.pos = end;
                }
                None => return Err("Unterminated string".into()),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Json, String> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'E' || b == b'+' || b == b'-')
        {
            self.pos += 1;
        }

        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| "Invalid number")?;
        text.parse::<f64>()
            .map(Json::Number)
            .map_err(|_| format!("Invalid number: {}", text))
    }

    fn parse_literal(&mut self, literal: &str, value: Json) -> Result<Json, String> {
        let end = self.pos + literal.len();
        if self.bytes.get(self.pos..end) == Some(literal.as_bytes()) {
            self.pos = end;
            Ok(value)
        } else {
            Err(format!("Invalid literal, expected '{}'", literal))
        }
    }
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(Json::parse("null").unwrap(), Json::Null);
        assert_eq!(Json::parse("true").unwrap(), Json::Bool(true));
        assert_eq!(Json::parse("42").unwrap(), Json::Number(42.0));
        assert_eq!(Json::parse("-3.5").unwrap(), Json::Number(-3.5));
        assert_eq!(Json::parse("\"hi\"").unwrap(), Json::str("hi"));
    }

    #[test]
    fn test_parse_nested() {
        let doc = r#"{"name":"Island","start_week":2,"invite_user_ids":["a","b"],"flag":false}"#;
        let json = Json::parse(doc).unwrap();

        assert_eq!(json.get("name").and_then(Json::as_str), Some("Island"));
        assert_eq!(json.get("start_week").and_then(Json::as_i64), Some(2));
        assert_eq!(json.get("flag").and_then(Json::as_bool), Some(false));
        let ids = json.get("invite_user_ids").and_then(Json::as_array).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].as_str(), Some("a"));
    }

    #[test]
    fn test_parse_escapes_and_unicode() {
        let json = Json::parse(r#""line\none \"two\" A""#).unwrap();
        assert_eq!(json.as_str(), Some("line\none \"two\" A"));

        let emoji = Json::parse("\"tiki 🏝️\"").unwrap();
        assert_eq!(emoji.as_str(), Some("tiki 🏝️"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Json::parse("").is_err());
        assert!(Json::parse("{").is_err());
        assert!(Json::parse("[1,]").is_err());
        assert!(Json::parse("{\"a\":1} trailing").is_err());
        assert!(Json::parse("'single'").is_err());
    }

    #[test]
    fn test_write_roundtrip() {
        let value = Json::obj(vec![
            ("detail", Json::str("Pool not found")),
            ("week", Json::int(3)),
            ("winners", Json::Array(vec![Json::str("a"), Json::str("b")])),
            ("none", Json::Null),
        ]);

        let text = value.to_string();
        assert_eq!(
            text,
            r#"{"detail":"Pool not found","week":3,"winners":["a","b"],"none":null}"#
        );
        assert_eq!(Json::parse(&text).unwrap(), value);
    }

    #[test]
    fn test_write_escapes() {
        let value = Json::str("say \"hi\"\n");
        assert_eq!(value.to_string(), r#""say \"hi\"\n""#);
    }

    #[test]
    fn test_whole_numbers_have_no_decimal_point() {
        assert_eq!(Json::Number(5.0).to_string(), "5");
        assert_eq!(Json::Number(5.5).to_string(), "5.5");
    }
}
