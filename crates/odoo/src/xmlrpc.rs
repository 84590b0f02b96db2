//! Minimal XML-RPC wire codec.
//!
//! Covers exactly the subset of XML-RPC the Odoo external API speaks for
//! `authenticate` and `execute_kw`: scalar types, `<struct>`, `<array>`,
//! `<nil/>` and `<fault>` responses. Requests are built with string
//! concatenation; responses are parsed with a small tag reader.

use std::fmt::Write as _;

use thiserror::Error;

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `<nil/>`
    Nil,
    /// `<boolean>`
    Bool(bool),
    /// `<int>` / `<i4>` / `<i8>`
    Int(i64),
    /// `<double>`
    Double(f64),
    /// `<string>` (or untyped text)
    Str(String),
    /// `<array>`
    Array(Vec<Value>),
    /// `<struct>` (member order preserved)
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// Integer view of this value, if it is an `Int`.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Whether the value is the boolean `false` or the integer `0`.
    ///
    /// Odoo's `authenticate` returns boolean `false` instead of a uid when
    /// credentials are rejected.
    #[must_use]
    pub const fn is_falsy(&self) -> bool {
        matches!(self, Self::Bool(false) | Self::Int(0))
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Nil,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Double(n.as_f64().unwrap_or(0.0)), Self::Int),
            serde_json::Value::String(s) => Self::Str(s.clone()),
            serde_json::Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => Self::from(map),
        }
    }
}

impl From<&serde_json::Map<String, serde_json::Value>> for Value {
    fn from(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self::Struct(
            map.iter()
                .map(|(k, v)| (k.clone(), Self::from(v)))
                .collect(),
        )
    }
}

/// A parsed `<methodResponse>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `<params>` with a single return value.
    Success(Value),
    /// `<fault>` raised by server-side business logic.
    Fault { code: i32, message: String },
}

/// XML-RPC decoding failure.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Encode a `<methodCall>` document.
#[must_use]
pub fn encode_request(method: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    escape_into(&mut out, method);
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param><value>");
        write_value(&mut out, param);
        out.push_str("</value></param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Parse a `<methodResponse>` document.
pub fn parse_response(xml: &str) -> Result<Response, ParseError> {
    let mut reader = Reader::new(xml);
    reader.expect_open("methodResponse")?;
    match reader.next_tag()? {
        Tag::Open(n) if n == "params" => {
            reader.expect_open("param")?;
            reader.expect_open("value")?;
            let value = reader.parse_value()?;
            Ok(Response::Success(value))
        }
        Tag::Open(n) if n == "fault" => {
            reader.expect_open("value")?;
            let value = reader.parse_value()?;
            let Value::Struct(members) = value else {
                return Err(ParseError("fault body is not a struct".into()));
            };
            let mut code = 0;
            let mut message = String::new();
            for (name, val) in members {
                match (name.as_str(), val) {
                    ("faultCode", Value::Int(c)) => {
                        code = i32::try_from(c).unwrap_or(i32::MAX);
                    }
                    ("faultString", Value::Str(s)) => message = s,
                    _ => {}
                }
            }
            Ok(Response::Fault { code, message })
        }
        _ => Err(ParseError(
            "expected <params> or <fault> in method response".into(),
        )),
    }
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Nil => out.push_str("<nil/>"),
        Value::Bool(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", i32::from(*b));
        }
        Value::Int(i) => {
            let _ = write!(out, "<int>{i}</int>");
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{d}</double>");
        }
        Value::Str(s) => {
            out.push_str("<string>");
            escape_into(out, s);
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                out.push_str("<value>");
                write_value(out, item);
                out.push_str("</value>");
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                escape_into(out, name);
                out.push_str("</name><value>");
                write_value(out, member);
                out.push_str("</value></member>");
            }
            out.push_str("</struct>");
        }
    }
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(i) = rest.find('&') {
        out.push_str(&rest[..i]);
        rest = &rest[i..];
        let Some(end) = rest.find(';') else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..end];
        let replacement = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|h| u32::from_str_radix(h, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                .and_then(char::from_u32),
        };
        match replacement {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug)]
enum Tag<'a> {
    Open(&'a str),
    Close(&'a str),
    Empty(&'a str),
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn err(&self, msg: &str) -> ParseError {
        ParseError(format!("{msg} at byte {}", self.pos))
    }

    fn skip_ws(&mut self) {
        let rest = &self.src.as_bytes()[self.pos..];
        self.pos += rest
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
    }

    /// Next tag, skipping the XML declaration and comments.
    fn next_tag(&mut self) -> Result<Tag<'a>, ParseError> {
        loop {
            self.skip_ws();
            let rest = &self.src[self.pos..];
            if !rest.starts_with('<') {
                return Err(self.err("expected tag"));
            }
            let end = rest.find('>').ok_or_else(|| self.err("unterminated tag"))?;
            let inner = &rest[1..end];
            self.pos += end + 1;
            if inner.starts_with('?') || inner.starts_with('!') {
                continue;
            }
            if let Some(name) = inner.strip_prefix('/') {
                return Ok(Tag::Close(name.trim()));
            }
            if let Some(body) = inner.strip_suffix('/') {
                let name = body.split_whitespace().next().unwrap_or("");
                return Ok(Tag::Empty(name));
            }
            let name = inner.split_whitespace().next().unwrap_or("");
            return Ok(Tag::Open(name));
        }
    }

    fn expect_open(&mut self, name: &str) -> Result<(), ParseError> {
        match self.next_tag()? {
            Tag::Open(n) if n == name => Ok(()),
            other => Err(self.err(&format!("expected <{name}>, found {other:?}"))),
        }
    }

    fn expect_close(&mut self, name: &str) -> Result<(), ParseError> {
        match self.next_tag()? {
            Tag::Close(n) if n == name => Ok(()),
            other => Err(self.err(&format!("expected </{name}>, found {other:?}"))),
        }
    }

    /// Raw character data up to the next tag. Text cannot contain a literal
    /// `<`, so scanning for it is safe.
    fn text_until_tag(&mut self) -> &'a str {
        let rest = &self.src[self.pos..];
        let end = rest.find('<').unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Parse the contents of a `<value>` the reader is positioned inside of,
    /// consuming the closing `</value>`.
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let text = self.text_until_tag();
        match self.next_tag()? {
            // Untyped value: the text itself is a string.
            Tag::Close(n) if n == "value" => Ok(Value::Str(unescape(text))),
            Tag::Empty(n) if n == "nil" => {
                self.expect_close("value")?;
                Ok(Value::Nil)
            }
            Tag::Empty(n) if n == "string" => {
                self.expect_close("value")?;
                Ok(Value::Str(String::new()))
            }
            Tag::Open(name) => {
                let value = self.parse_typed(name)?;
                self.expect_close("value")?;
                Ok(value)
            }
            other => Err(self.err(&format!("unexpected {other:?} in value"))),
        }
    }

    fn parse_typed(&mut self, name: &'a str) -> Result<Value, ParseError> {
        match name {
            "int" | "i4" | "i8" => {
                let text = self.text_until_tag();
                self.expect_close(name)?;
                let i = text
                    .trim()
                    .parse()
                    .map_err(|_| self.err(&format!("invalid integer {text:?}")))?;
                Ok(Value::Int(i))
            }
            "boolean" => {
                let text = self.text_until_tag();
                self.expect_close(name)?;
                let t = text.trim();
                Ok(Value::Bool(t == "1" || t.eq_ignore_ascii_case("true")))
            }
            "double" => {
                let text = self.text_until_tag();
                self.expect_close(name)?;
                let d = text
                    .trim()
                    .parse()
                    .map_err(|_| self.err(&format!("invalid double {text:?}")))?;
                Ok(Value::Double(d))
            }
            "string" => {
                let text = self.text_until_tag();
                self.expect_close(name)?;
                Ok(Value::Str(unescape(text)))
            }
            // Odoo timestamps; surfaced as plain strings.
            "dateTime.iso8601" => {
                let text = self.text_until_tag();
                self.expect_close(name)?;
                Ok(Value::Str(text.trim().to_string()))
            }
            "array" => {
                self.expect_open("data")?;
                let mut items = Vec::new();
                loop {
                    match self.next_tag()? {
                        Tag::Open(n) if n == "value" => items.push(self.parse_value()?),
                        Tag::Close(n) if n == "data" => break,
                        other => return Err(self.err(&format!("unexpected {other:?} in array"))),
                    }
                }
                self.expect_close("array")?;
                Ok(Value::Array(items))
            }
            "struct" => {
                let mut members = Vec::new();
                loop {
                    match self.next_tag()? {
                        Tag::Close(n) if n == "struct" => break,
                        Tag::Open(n) if n == "member" => {
                            self.expect_open("name")?;
                            let member_name = unescape(self.text_until_tag());
                            self.expect_close("name")?;
                            self.expect_open("value")?;
                            let value = self.parse_value()?;
                            self.expect_close("member")?;
                            members.push((member_name, value));
                        }
                        other => return Err(self.err(&format!("unexpected {other:?} in struct"))),
                    }
                }
                Ok(Value::Struct(members))
            }
            other => Err(self.err(&format!("unsupported value type <{other}>"))),
        }
    }
}
