//! Stock index presets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Indexes whose constituents can be pulled from the index weight endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexCode {
    /// CSI 300
    #[default]
    Csi300,

    /// SSE 50
    Sse50,

    /// CSI 500
    Csi500,
}

impl IndexCode {
    /// Returns all presets.
    pub fn all() -> Vec<Self> {
        vec![Self::Csi300, Self::Sse50, Self::Csi500]
    }

    /// Returns the exchange code used by the data API.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Csi300 => "399300.SZ",
            Self::Sse50 => "000016.SH",
            Self::Csi500 => "000905.SH",
        }
    }

    /// Returns the index name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Csi300 => "CSI 300",
            Self::Sse50 => "SSE 50",
            Self::Csi500 => "CSI 500",
        }
    }

    /// Look up a preset by its exchange code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().into_iter().find(|i| i.code() == code)
    }
}

impl fmt::Display for IndexCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl FromStr for IndexCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        Self::from_code(&normalized)
            .or_else(|| match normalized.replace([' ', '-', '_'], "").as_str() {
                "CSI300" | "HS300" => Some(Self::Csi300),
                "SSE50" | "SZ50" => Some(Self::Sse50),
                "CSI500" | "ZZ500" => Some(Self::Csi500),
                _ => None,
            })
            .ok_or_else(|| format!("Unknown index: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_csi300() {
        assert_eq!(IndexCode::default().code(), "399300.SZ");
    }

    #[rstest]
    #[case("399300.SZ", IndexCode::Csi300)]
    #[case("399300.sz", IndexCode::Csi300)]
    #[case("hs300", IndexCode::Csi300)]
    #[case("CSI 500", IndexCode::Csi500)]
    #[case("000016.SH", IndexCode::Sse50)]
    fn test_parse(#[case] input: &str, #[case] expected: IndexCode) {
        assert_eq!(input.parse::<IndexCode>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("SPX".parse::<IndexCode>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(IndexCode::Csi300.to_string(), "CSI 300 (399300.SZ)");
    }
}
