//! Document kinds served by the generator routes.
//!
//! - `visa` - invitation letter for a visa application
//! - `itinerary` - guest list with the travel plan
//! - `undertaking-single` - undertaking letter for one traveller
//! - `undertaking-family` - undertaking letter covering family members
//! - `authorize` - authorization letter naming a representative

pub mod models;
pub mod samples;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One of the five fixed payload/template categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Visa,
    Itinerary,
    UndertakingSingle,
    UndertakingFamily,
    Authorize,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Visa,
        DocumentKind::Itinerary,
        DocumentKind::UndertakingSingle,
        DocumentKind::UndertakingFamily,
        DocumentKind::Authorize,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            DocumentKind::Visa => "visa",
            DocumentKind::Itinerary => "itinerary",
            DocumentKind::UndertakingSingle => "undertaking-single",
            DocumentKind::UndertakingFamily => "undertaking-family",
            DocumentKind::Authorize => "authorize",
        }
    }

    /// Route the kind is served on. The itinerary path keeps the
    /// historical `itenary` spelling clients already post to.
    pub fn route(self) -> &'static str {
        match self {
            DocumentKind::Visa => "/generate/visa/",
            DocumentKind::Itinerary => "/generate/itenary/",
            DocumentKind::UndertakingSingle => "/generate/undertaking/single/",
            DocumentKind::UndertakingFamily => "/generate/undertaking/family/",
            DocumentKind::Authorize => "/generate/authorize/",
        }
    }

    /// Name the template is registered under (and its file stem).
    pub fn template_name(self) -> &'static str {
        match self {
            DocumentKind::Visa => "visa",
            DocumentKind::Itinerary => "itinerary",
            DocumentKind::UndertakingSingle => "undertaking_single",
            DocumentKind::UndertakingFamily => "undertaking_family",
            DocumentKind::Authorize => "authorize",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Visa => "Visa Invitation Letter",
            DocumentKind::Itinerary => "Travel Itinerary",
            DocumentKind::UndertakingSingle => "Letter of Undertaking",
            DocumentKind::UndertakingFamily => "Letter of Undertaking (Family)",
            DocumentKind::Authorize => "Letter of Authorization",
        }
    }

    pub fn filename_stem(self) -> &'static str {
        match self {
            DocumentKind::Visa => "visa-letter",
            DocumentKind::Itinerary => "itinerary",
            DocumentKind::UndertakingSingle => "undertaking",
            DocumentKind::UndertakingFamily => "undertaking-family",
            DocumentKind::Authorize => "authorization",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for DocumentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        for kind in DocumentKind::ALL {
            assert_eq!(kind.slug().parse::<DocumentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind() {
        let err = "passport".parse::<DocumentKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown document kind 'passport'");
    }

    #[test]
    fn test_routes_are_unique() {
        let routes: std::collections::HashSet<_> =
            DocumentKind::ALL.iter().map(|k| k.route()).collect();
        assert_eq!(routes.len(), DocumentKind::ALL.len());
        assert_eq!(DocumentKind::Itinerary.route(), "/generate/itenary/");
    }
}
