use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::ReferenceError;

/// High/Low classification of a single axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    High,
    Low,
}

impl Level {
    pub fn as_char(&self) -> char {
        match self {
            Level::High => 'H',
            Level::Low => 'L',
        }
    }
}

/// The eight leadership typology codes.
///
/// Letters are in axis order: sharing, interaction, growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeCode {
    Hhh,
    Hhl,
    Hlh,
    Hll,
    Lhh,
    Lhl,
    Llh,
    Lll,
}

impl TypeCode {
    pub const ALL: [TypeCode; 8] = [
        TypeCode::Hhh,
        TypeCode::Hhl,
        TypeCode::Hlh,
        TypeCode::Hll,
        TypeCode::Lhh,
        TypeCode::Lhl,
        TypeCode::Llh,
        TypeCode::Lll,
    ];

    pub fn from_levels(sharing: Level, interaction: Level, growth: Level) -> Self {
        use Level::{High as H, Low as L};
        match (sharing, interaction, growth) {
            (H, H, H) => TypeCode::Hhh,
            (H, H, L) => TypeCode::Hhl,
            (H, L, H) => TypeCode::Hlh,
            (H, L, L) => TypeCode::Hll,
            (L, H, H) => TypeCode::Lhh,
            (L, H, L) => TypeCode::Lhl,
            (L, L, H) => TypeCode::Llh,
            (L, L, L) => TypeCode::Lll,
        }
    }

    pub fn levels(&self) -> [Level; 3] {
        use Level::{High as H, Low as L};
        match self {
            TypeCode::Hhh => [H, H, H],
            TypeCode::Hhl => [H, H, L],
            TypeCode::Hlh => [H, L, H],
            TypeCode::Hll => [H, L, L],
            TypeCode::Lhh => [L, H, H],
            TypeCode::Lhl => [L, H, L],
            TypeCode::Llh => [L, L, H],
            TypeCode::Lll => [L, L, L],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCode::Hhh => "HHH",
            TypeCode::Hhl => "HHL",
            TypeCode::Hlh => "HLH",
            TypeCode::Hll => "HLL",
            TypeCode::Lhh => "LHH",
            TypeCode::Lhl => "LHL",
            TypeCode::Llh => "LLH",
            TypeCode::Lll => "LLL",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeCode {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s.trim())
            .ok_or_else(|| ReferenceError::UnknownTypeCode(s.to_string()))
    }
}

impl Serialize for TypeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Descriptive record shown for a typology code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeRecord {
    pub name: String,
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub cautions: Vec<String>,
}

/// Total mapping from every [`TypeCode`] to its record.
#[derive(Debug, Clone)]
pub struct TypologyTable {
    records: [TypeRecord; 8],
}

impl TypologyTable {
    /// Build the table from string-keyed records as found in reference files.
    ///
    /// Fails if any of the eight codes is missing or an unknown key is present.
    pub fn from_records(mut records: HashMap<String, TypeRecord>) -> Result<Self, ReferenceError> {
        if let Some(unknown) = records
            .keys()
            .find(|key| key.parse::<TypeCode>().is_err())
        {
            return Err(ReferenceError::UnknownTypeCode(unknown.clone()));
        }

        let mut ordered = Vec::with_capacity(TypeCode::ALL.len());
        let mut missing = Vec::new();
        for code in TypeCode::ALL {
            match records.remove(code.as_str()) {
                Some(record) => ordered.push(record),
                None => missing.push(code.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(ReferenceError::MissingTypeCodes(missing));
        }

        let records: [TypeRecord; 8] = ordered
            .try_into()
            .map_err(|_| ReferenceError::MissingTypeCodes(Vec::new()))?;

        Ok(Self { records })
    }

    pub fn get(&self, code: TypeCode) -> &TypeRecord {
        &self.records[code.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeCode, &TypeRecord)> {
        TypeCode::ALL.into_iter().zip(self.records.iter())
    }
}
