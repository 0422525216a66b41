//! GICS sector labels.
//!
//! The workbook and the warehouse disagree on sector naming: sector tables are
//! keyed by numbered labels ("45 Information Technology") while universes and
//! benchmark constituents carry the bare name. This module is the single
//! mapping between the two.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NUMBERED_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*(.*?)\s*$").expect("valid GICS label regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GicsSector {
    Energy,
    Materials,
    Industrials,
    ConsumerDiscretionary,
    ConsumerStaples,
    HealthCare,
    Financials,
    InformationTechnology,
    CommunicationServices,
    Utilities,
    RealEstate,
}

impl GicsSector {
    pub const ALL: [GicsSector; 11] = [
        GicsSector::Energy,
        GicsSector::Materials,
        GicsSector::Industrials,
        GicsSector::ConsumerDiscretionary,
        GicsSector::ConsumerStaples,
        GicsSector::HealthCare,
        GicsSector::Financials,
        GicsSector::InformationTechnology,
        GicsSector::CommunicationServices,
        GicsSector::Utilities,
        GicsSector::RealEstate,
    ];

    pub fn code(&self) -> u8 {
        match self {
            GicsSector::Energy => 10,
            GicsSector::Materials => 15,
            GicsSector::Industrials => 20,
            GicsSector::ConsumerDiscretionary => 25,
            GicsSector::ConsumerStaples => 30,
            GicsSector::HealthCare => 35,
            GicsSector::Financials => 40,
            GicsSector::InformationTechnology => 45,
            GicsSector::CommunicationServices => 50,
            GicsSector::Utilities => 55,
            GicsSector::RealEstate => 60,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GicsSector::Energy => "Energy",
            GicsSector::Materials => "Materials",
            GicsSector::Industrials => "Industrials",
            GicsSector::ConsumerDiscretionary => "Consumer Discretionary",
            GicsSector::ConsumerStaples => "Consumer Staples",
            GicsSector::HealthCare => "Health Care",
            GicsSector::Financials => "Financials",
            GicsSector::InformationTechnology => "Information Technology",
            GicsSector::CommunicationServices => "Communication Services",
            GicsSector::Utilities => "Utilities",
            GicsSector::RealEstate => "Real Estate",
        }
    }

    /// Numbered label, e.g. "45 Information Technology"
    pub fn label(&self) -> String {
        format!("{} {}", self.code(), self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }
}

/// Split "45 Information Technology" into (Some("45"), "Information Technology").
/// Labels without a numeric prefix come back unchanged.
pub fn split_label(label: &str) -> (Option<&str>, &str) {
    match NUMBERED_LABEL.captures(label) {
        Some(caps) => {
            let code = caps.get(1).map(|m| m.as_str());
            let name = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            (code, name)
        }
        None => (None, label.trim()),
    }
}

/// Bare sector name of a possibly numbered label
pub fn strip_code(label: &str) -> &str {
    split_label(label).1
}

/// Numbered label for a bare sector name; unknown names pass through
pub fn numbered_label(name: &str) -> String {
    GicsSector::from_name(name)
        .map(|s| s.label())
        .unwrap_or_else(|| name.trim().to_string())
}
