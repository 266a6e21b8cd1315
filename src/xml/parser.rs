//! XML document parser producing the attribute-wrapped JSON tree.
//!
//! The conversion is schema-agnostic: every attribute lands in the
//! reserved `"$"` slot, every child element is appended to an ordered
//! list under its tag name even when it occurs once, and an element with
//! neither attributes nor element children collapses to its text content.

use serde_json::{Map, Value};

use crate::error::{OsmError, Result};

/// Reserved field holding an element's attribute map.
pub const ATTR_KEY: &str = "$";
/// Reserved field holding significant text of a mixed element.
pub const TEXT_KEY: &str = "_text";

/// Convert an XML document into its JSON tree.
///
/// The result is a single-key object `{ root_name: [root_value] }`; the
/// root obeys the same list-wrapping rule as every other child. Malformed
/// input fails with [`OsmError::XmlParse`].
pub fn parse_document(input: &str) -> Result<Value> {
    let mut parser = DocParser::new(input);
    parser.skip_misc()?;
    let (name, value) = parser.parse_element()?;
    parser.skip_misc()?;
    if !parser.at_end() {
        return Err(parser.error("trailing content after document element"));
    }

    let mut doc = Map::new();
    doc.insert(name, Value::Array(vec![value]));
    Ok(Value::Object(doc))
}

struct DocParser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DocParser<'a> {
    fn new(src: &'a str) -> Self {
        DocParser {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> OsmError {
        OsmError::XmlParse {
            message: message.into(),
            offset: self.pos,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.bytes[self.pos..].starts_with(prefix.as_bytes())
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}", byte as char)))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    /// Skip past `marker`, failing if it never occurs.
    fn skip_past(&mut self, marker: &str) -> Result<()> {
        match find_from(self.bytes, self.pos, marker.as_bytes()) {
            Some(at) => {
                self.pos = at + marker.len();
                Ok(())
            }
            None => Err(self.error(format!("unterminated section, expected {marker:?}"))),
        }
    }

    /// Skip whitespace, the prolog, comments and DOCTYPE between elements.
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.skip_past("?>")?;
            } else if self.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if self.starts_with("<!") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    /// Skip a `<!DOCTYPE ...>` declaration, including an internal subset.
    fn skip_doctype(&mut self) -> Result<()> {
        let mut depth = 0usize;
        while let Some(byte) = self.peek() {
            self.pos += 1;
            match byte {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error("unterminated DOCTYPE declaration"))
    }

    /// Read a tag or attribute name. Names end at whitespace, `=`, `/`,
    /// `>` or `?`; anything else, multi-byte characters included, is part
    /// of the name.
    fn read_name(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            match byte {
                b' ' | b'\t' | b'\r' | b'\n' | b'=' | b'/' | b'>' | b'?' | b'<' => break,
                _ => self.pos += 1,
            }
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse_attributes(&mut self) -> Result<Map<String, Value>> {
        let mut attrs = Map::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'/' | b'>') | None => return Ok(attrs),
                _ => {}
            }
            let name = self.read_name()?;
            self.skip_whitespace();
            self.expect(b'=')?;
            self.skip_whitespace();
            let quote = match self.peek() {
                Some(q @ (b'"' | b'\'')) => q,
                _ => return Err(self.error(format!("attribute {name} value must be quoted"))),
            };
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(|b| b != quote) {
                self.pos += 1;
            }
            if self.at_end() {
                return Err(self.error(format!("unterminated value for attribute {name}")));
            }
            let value = unescape(&self.src[start..self.pos], start)?;
            self.pos += 1;
            attrs.insert(name, Value::String(value));
        }
    }

    fn parse_element(&mut self) -> Result<(String, Value)> {
        self.expect(b'<')?;
        let name = self.read_name()?;
        let attrs = self.parse_attributes()?;

        if self.starts_with("/>") {
            self.pos += 2;
            return Ok((name, build_value(attrs, Map::new(), "")));
        }
        self.expect(b'>')?;

        let mut children: Map<String, Value> = Map::new();
        let mut text = String::new();
        loop {
            if self.at_end() {
                return Err(self.error(format!("unexpected end of input inside <{name}>")));
            }
            if self.starts_with("</") {
                self.pos += 2;
                let closing = self.read_name()?;
                if closing != name {
                    return Err(self.error(format!("mismatched closing tag </{closing}>, expected </{name}>")));
                }
                self.skip_whitespace();
                self.expect(b'>')?;
                break;
            } else if self.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if self.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let start = self.pos;
                self.skip_past("]]>")?;
                text.push_str(&self.src[start..self.pos - "]]>".len()]);
            } else if self.starts_with("<?") {
                self.skip_past("?>")?;
            } else if self.peek() == Some(b'<') {
                let (child_name, child_value) = self.parse_element()?;
                let slot = children
                    .entry(child_name)
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = slot {
                    items.push(child_value);
                }
            } else {
                let start = self.pos;
                while self.peek().is_some_and(|b| b != b'<') {
                    self.pos += 1;
                }
                text.push_str(&unescape(&self.src[start..self.pos], start)?);
            }
        }

        Ok((name, build_value(attrs, children, &text)))
    }
}

fn build_value(attrs: Map<String, Value>, children: Map<String, Value>, text: &str) -> Value {
    let text = text.trim();
    if attrs.is_empty() && children.is_empty() {
        return Value::String(text.to_string());
    }
    let mut obj = Map::new();
    if !attrs.is_empty() {
        obj.insert(ATTR_KEY.to_string(), Value::Object(attrs));
    }
    for (name, list) in children {
        obj.insert(name, list);
    }
    if !text.is_empty() {
        obj.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    }
    Value::Object(obj)
}

fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|at| from + at)
}

/// Expand entity and character references in text or attribute content.
fn unescape(raw: &str, offset: usize) -> Result<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut consumed = 0usize;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after.find(';').ok_or_else(|| OsmError::XmlParse {
            message: "unterminated entity reference".into(),
            offset: offset + consumed + amp,
        })?;
        let entity = &after[..semi];
        let expanded = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => char_reference(entity).ok_or_else(|| OsmError::XmlParse {
                message: format!("unknown entity &{entity};"),
                offset: offset + consumed + amp,
            })?,
        };
        out.push(expanded);
        consumed += amp + 1 + semi + 1;
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn char_reference(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code)
}
