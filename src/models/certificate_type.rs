use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of certificate being issued.
///
/// Selects which per-hackathon override set applies. Strings that don't name a
/// known kind parse to `Unknown` instead of failing, so new certificate kinds
/// introduced by upstream workflows still render with the shared defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CertificateType {
    #[default]
    Participant,
    Judge,
    Supervisor,
    Winner,
    Unknown,
}

impl CertificateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateType::Participant => "participant",
            CertificateType::Judge => "judge",
            CertificateType::Supervisor => "supervisor",
            CertificateType::Winner => "winner",
            CertificateType::Unknown => "unknown",
        }
    }

    /// Parse a certificate type, mapping unrecognised values to `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "participant" => CertificateType::Participant,
            "judge" => CertificateType::Judge,
            "supervisor" => CertificateType::Supervisor,
            "winner" => CertificateType::Winner,
            _ => CertificateType::Unknown,
        }
    }

    /// Whether a per-hackathon override record can exist for this type
    pub fn has_override_set(&self) -> bool {
        !matches!(self, CertificateType::Unknown)
    }
}

impl fmt::Display for CertificateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for CertificateType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for CertificateType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<CertificateType> for String {
    fn from(t: CertificateType) -> Self {
        t.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(CertificateType::parse("participant"), CertificateType::Participant);
        assert_eq!(CertificateType::parse("Judge"), CertificateType::Judge);
        assert_eq!(CertificateType::parse(" SUPERVISOR "), CertificateType::Supervisor);
        assert_eq!(CertificateType::parse("winner"), CertificateType::Winner);
    }

    #[test]
    fn test_parse_unrecognised_is_unknown() {
        assert_eq!(CertificateType::parse("mentor"), CertificateType::Unknown);
        assert_eq!(CertificateType::parse(""), CertificateType::Unknown);
    }

    #[test]
    fn test_default_is_participant() {
        assert_eq!(CertificateType::default(), CertificateType::Participant);
    }

    #[test]
    fn test_unknown_has_no_override_set() {
        assert!(CertificateType::Judge.has_override_set());
        assert!(!CertificateType::Unknown.has_override_set());
    }

    #[test]
    fn test_serde_roundtrip_uses_lowercase() {
        let json = serde_json::to_string(&CertificateType::Supervisor).unwrap();
        assert_eq!(json, "\"supervisor\"");

        let parsed: CertificateType = serde_json::from_str("\"sponsor\"").unwrap();
        assert_eq!(parsed, CertificateType::Unknown);
    }
}
