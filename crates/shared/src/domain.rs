use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(RequestGeneration);

impl RequestGeneration {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// One municipality as returned by the geographic provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommuneRecord {
    pub name: String,
    #[serde(default)]
    pub population: Option<u64>,
    /// INSEE code, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Provider fields the pipeline does not interpret.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl CommuneRecord {
    pub fn new(name: impl Into<String>, population: Option<u64>) -> Self {
        Self {
            name: name.into(),
            population,
            code: None,
            extra: Map::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartmentRef {
    pub code: String,
    pub name: String,
}

impl DepartmentRef {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// A reference carrying only a code, for departments unknown to the catalog.
    pub fn from_code(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.code.trim().is_empty()
    }
}

impl fmt::Display for DepartmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.code {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} - {}", self.code, self.name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Population,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Population => "population",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" | "nom" => Ok(SortField::Name),
            "population" | "pop" => Ok(SortField::Population),
            other => Err(format!(
                "unknown sort field '{other}' (expected 'name' or 'population')"
            )),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// +1 for ascending, -1 for descending.
    pub fn sign(self) -> i8 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        if self.sign() < 0 {
            ordering.reverse()
        } else {
            ordering
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Minimum population filter. `Empty` disables population filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    #[default]
    Empty,
    AtLeast(u64),
}

impl Threshold {
    /// Non-numeric and negative input map to `Empty`.
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<u64>()
            .map(Threshold::AtLeast)
            .unwrap_or(Threshold::Empty)
    }

    /// A record without a population only passes an empty threshold.
    pub fn admits(self, population: Option<u64>) -> bool {
        match self {
            Threshold::Empty => true,
            Threshold::AtLeast(min) => population.is_some_and(|value| value >= min),
        }
    }

    pub fn as_option(self) -> Option<u64> {
        match self {
            Threshold::Empty => None,
            Threshold::AtLeast(min) => Some(min),
        }
    }
}

impl From<Option<u64>> for Threshold {
    fn from(value: Option<u64>) -> Self {
        value.map(Threshold::AtLeast).unwrap_or(Threshold::Empty)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Empty => f.write_str("none"),
            Threshold::AtLeast(min) => write!(f, ">= {min}"),
        }
    }
}
