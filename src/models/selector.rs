use std::fmt;
use serde::{Deserialize, Serialize};
use crate::errors::ChainError;

/// How the first stage takes over the victim account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BypassMethod {
    SqlInjection,
    TokenSpray,
}

/// Remote code execution technique used by the final stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RceVariant {
    TemplateInjection,
    MaliciousUpload,
    Deserialization,
}

impl RceVariant {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::TemplateInjection => "SSTI",
            Self::MaliciousUpload => "Image Upload Bypass",
            Self::Deserialization => "PHP Deserialization",
        }
    }
}

impl fmt::Display for RceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemplateInjection => write!(f, "template-injection"),
            Self::MaliciousUpload => write!(f, "malicious-upload"),
            Self::Deserialization => write!(f, "deserialization"),
        }
    }
}

/// Chain number 1..=6 picking the bypass method and the RCE variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChainSelector(u8);

impl ChainSelector {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(value: u8) -> Result<Self, ChainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ChainError::InvalidTarget(format!(
                "Chain must be between {} and {}, got {}",
                Self::MIN, Self::MAX, value
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn bypass(&self) -> BypassMethod {
        if self.0 < 4 {
            BypassMethod::SqlInjection
        } else {
            BypassMethod::TokenSpray
        }
    }

    pub fn rce_variant(&self) -> RceVariant {
        match self.0 % 3 {
            1 => RceVariant::TemplateInjection,
            2 => RceVariant::MaliciousUpload,
            _ => RceVariant::Deserialization,
        }
    }

    /// e.g. "SQLi -> XSS -> SSTI"
    pub fn describe(&self) -> String {
        let bypass = match self.bypass() {
            BypassMethod::SqlInjection => "SQLi",
            BypassMethod::TokenSpray => "Token Spray",
        };
        format!("{} -> XSS -> {}", bypass, self.rce_variant().short_name())
    }

    pub fn all() -> impl Iterator<Item = ChainSelector> {
        (Self::MIN..=Self::MAX).map(ChainSelector)
    }
}

impl Default for ChainSelector {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for ChainSelector {
    type Error = ChainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChainSelector> for u8 {
    fn from(selector: ChainSelector) -> u8 {
        selector.0
    }
}

impl fmt::Display for ChainSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_bounds() {
        assert!(ChainSelector::new(0).is_err());
        assert!(ChainSelector::new(7).is_err());
        assert!(ChainSelector::new(1).is_ok());
        assert!(ChainSelector::new(6).is_ok());
    }

    #[test]
    fn test_rce_variant_by_selector() {
        let variants: Vec<RceVariant> = ChainSelector::all().map(|s| s.rce_variant()).collect();
        assert_eq!(variants, vec![
            RceVariant::TemplateInjection,
            RceVariant::MaliciousUpload,
            RceVariant::Deserialization,
            RceVariant::TemplateInjection,
            RceVariant::MaliciousUpload,
            RceVariant::Deserialization,
        ]);
    }

    #[test]
    fn test_bypass_by_selector() {
        for s in ChainSelector::all() {
            let expected = if s.value() <= 3 { BypassMethod::SqlInjection } else { BypassMethod::TokenSpray };
            assert_eq!(s.bypass(), expected);
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(ChainSelector::new(1).unwrap().describe(), "SQLi -> XSS -> SSTI");
        assert_eq!(ChainSelector::new(5).unwrap().describe(), "Token Spray -> XSS -> Image Upload Bypass");
        assert_eq!(ChainSelector::new(6).unwrap().describe(), "Token Spray -> XSS -> PHP Deserialization");
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<ChainSelector>("9").is_err());
        let parsed: ChainSelector = serde_json::from_str("3").unwrap();
        assert_eq!(parsed.value(), 3);
    }
}
