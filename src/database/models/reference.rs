use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookup tables administrators maintain and profiles point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Field,
    Qualification,
    Region,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 3] = [
        ReferenceKind::Field,
        ReferenceKind::Qualification,
        ReferenceKind::Region,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            ReferenceKind::Field => "professional_fields",
            ReferenceKind::Qualification => "professional_qualifications",
            ReferenceKind::Region => "regions",
        }
    }

    /// Request field that carries identifiers of this kind.
    pub fn request_field(&self) -> &'static str {
        match self {
            ReferenceKind::Field => "profession",
            ReferenceKind::Qualification => "qualification",
            ReferenceKind::Region => "areas",
        }
    }

    /// Path segment used by the public listing endpoint.
    pub fn plural(&self) -> &'static str {
        match self {
            ReferenceKind::Field => "fields",
            ReferenceKind::Qualification => "qualifications",
            ReferenceKind::Region => "regions",
        }
    }

    pub fn from_plural(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.plural() == segment)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Field => "field",
            ReferenceKind::Qualification => "qualification",
            ReferenceKind::Region => "region",
        };
        f.write_str(name)
    }
}

impl FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "field" => Ok(ReferenceKind::Field),
            "qualification" => Ok(ReferenceKind::Qualification),
            "region" => Ok(ReferenceKind::Region),
            other => Err(format!(
                "unknown reference kind '{}' (expected field, qualification or region)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reference {
    pub id: i64,
    pub name: String,
}
