use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Lt,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A boolean condition `left <op> right` evaluated server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleQuery {
    pub left: String,
    pub operator: Operator,
    pub right: String,
}

impl OracleQuery {
    pub fn new(left: impl Into<String>, operator: Operator, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            operator,
            right: right.into(),
        }
    }

    /// Compare `left` with a quoted literal. The literal opens a quote that the
    /// application's own trailing quote closes, so `5` is written as `'5`.
    pub fn against_literal(left: impl Into<String>, operator: Operator, value: impl fmt::Display) -> Self {
        Self::new(left, operator, quoted(value))
    }

    /// `<anchor>' and <left><op><right>`
    pub fn to_payload(&self, anchor: &str) -> String {
        format!("{}' and {}{}{}", anchor, self.left, self.operator, self.right)
    }
}

pub fn quoted(value: impl fmt::Display) -> String {
    format!("'{}", value)
}

/// Parse the literal written by [`quoted`] back into a number.
pub fn unquote_number(right: &str) -> Option<i64> {
    right.strip_prefix('\'')?.parse().ok()
}
