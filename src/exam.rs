//! Exam verticals the site publishes content for.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Error returned for a string naming no known exam.
#[derive(Debug, thiserror::Error)]
#[error("unknown exam key: {0}")]
pub struct UnknownExam(String);

/// The closed set of exam verticals.
///
/// The wire form is the kebab-case key, which doubles as the URL path segment
/// and matches the store's short codes case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExamKey {
    Cat,
    IbpsPo,
    SscCgl,
    UpscCse,
    Ctet,
    Nda,
    Jee,
    Neet,
    Gate,
    Clat,
    CaFoundation,
    CaIntermediate,
    CaFinal,
    CmaFoundation,
    CmaIntermediate,
    CmaFinal,
    CsFoundation,
    CsExecutive,
    CsProfessional,
}

impl ExamKey {
    /// Every exam vertical, in display order.
    pub const ALL: [Self; 19] = [
        Self::Cat,
        Self::IbpsPo,
        Self::SscCgl,
        Self::UpscCse,
        Self::Ctet,
        Self::Nda,
        Self::Jee,
        Self::Neet,
        Self::Gate,
        Self::Clat,
        Self::CaFoundation,
        Self::CaIntermediate,
        Self::CaFinal,
        Self::CmaFoundation,
        Self::CmaIntermediate,
        Self::CmaFinal,
        Self::CsFoundation,
        Self::CsExecutive,
        Self::CsProfessional,
    ];

    /// The kebab-case key used in URLs and store short codes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::IbpsPo => "ibps-po",
            Self::SscCgl => "ssc-cgl",
            Self::UpscCse => "upsc-cse",
            Self::Ctet => "ctet",
            Self::Nda => "nda",
            Self::Jee => "jee",
            Self::Neet => "neet",
            Self::Gate => "gate",
            Self::Clat => "clat",
            Self::CaFoundation => "ca-foundation",
            Self::CaIntermediate => "ca-intermediate",
            Self::CaFinal => "ca-final",
            Self::CmaFoundation => "cma-foundation",
            Self::CmaIntermediate => "cma-intermediate",
            Self::CmaFinal => "cma-final",
            Self::CsFoundation => "cs-foundation",
            Self::CsExecutive => "cs-executive",
            Self::CsProfessional => "cs-professional",
        }
    }
}

impl fmt::Display for ExamKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ExamKey {
    type Err = UnknownExam;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownExam(needle.to_string()))
    }
}
