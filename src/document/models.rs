//! Typed payloads, one per document kind.
//!
//! Routes hand the renderer a schema-validated `serde_json::Value`; the
//! renderer narrows it into one of these structs before filling a template.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::DocumentKind;

/// A payload that can be rendered into a letter.
pub trait Letter: DeserializeOwned + Serialize {
    const KIND: DocumentKind;

    /// Person the document is about, used for the download filename.
    fn subject(&self) -> &str;
}

/// Passport numbers and serials arrive either as strings or bare numbers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Identifier {
    Text(String),
    #[serde(deserialize_with = "whole_number")]
    Number(serde_json::Number),
}

/// Whole floats such as `43534.0` are kept as integers so they print as `43534`.
fn whole_number<'de, D>(deserializer: D) -> Result<serde_json::Number, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    let integral = number
        .as_f64()
        .filter(|f| number.is_f64() && f.fract() == 0.0 && f.abs() < 9.0e15)
        .map(|f| serde_json::Number::from(f as i64));
    Ok(integral.unwrap_or(number))
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Text(text) => f.write_str(text),
            Identifier::Number(number) => write!(f, "{number}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct VisaRequest {
    #[schema(example = "HelloLUEHUIG")]
    pub name: String,
    #[schema(example = "A3485G45")]
    pub passport: String,
    #[schema(example = "visiting")]
    pub purpose: String,
    #[schema(example = "Nepal")]
    pub guest_country: String,
}

impl Letter for VisaRequest {
    const KIND: DocumentKind = DocumentKind::Visa;

    fn subject(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Guest {
    #[schema(example = "Al-imam")]
    pub name: String,
    #[schema(value_type = String, example = "43534")]
    pub passport: Identifier,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ItineraryLeg {
    #[schema(example = "2024-05-01")]
    pub date: String,
    #[schema(example = "Airport")]
    pub from: String,
    #[schema(example = "Hotel Valentilo")]
    pub to: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ItineraryRequest {
    pub guests: Vec<Guest>,
    /// Travel plan rows. The field keeps the `itenary` spelling of the wire format.
    pub itenary: Vec<ItineraryLeg>,
}

impl Letter for ItineraryRequest {
    const KIND: DocumentKind = DocumentKind::Itinerary;

    fn subject(&self) -> &str {
        self.guests.first().map(|g| g.name.as_str()).unwrap_or("guests")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UndertakingSingleRequest {
    #[schema(example = "Nirob")]
    pub name: String,
}

impl Letter for UndertakingSingleRequest {
    const KIND: DocumentKind = DocumentKind::UndertakingSingle;

    fn subject(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct FamilyMember {
    #[schema(value_type = String, example = "1")]
    pub sl: Identifier,
    #[schema(example = "Imam")]
    pub name: String,
    #[schema(value_type = String, example = "23847")]
    pub number: Identifier,
    #[schema(example = "self")]
    pub remarks: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UndertakingFamilyRequest {
    #[schema(example = "Nirob")]
    pub name: String,
    pub array: Vec<FamilyMember>,
}

impl Letter for UndertakingFamilyRequest {
    const KIND: DocumentKind = DocumentKind::UndertakingFamily;

    fn subject(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AuthorizeRequest {
    #[schema(example = "Nirob")]
    pub client: String,
    #[schema(example = "D2786G#4")]
    pub client_passport_number: String,
    #[schema(example = "Imam")]
    pub authorizer: String,
    #[schema(example = "Self")]
    pub relationship: String,
    #[schema(example = "1924AD343")]
    pub authorizer_passport_number: String,
    #[schema(example = "email@mail.com")]
    pub contact: String,
    /// Name of the authorized visa agency.
    #[schema(example = "USA_MILITARY")]
    pub name_ava: String,
    /// Address of the authorized visa agency.
    #[schema(example = "SOME_WHERE_CLOSE")]
    pub address_ava: String,
}

impl Letter for AuthorizeRequest {
    const KIND: DocumentKind = DocumentKind::Authorize;

    fn subject(&self) -> &str {
        &self.client
    }
}
