use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{domain::CommuneRecord, error::FetchError};

/// One entry of `GET /departements/{code}/communes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunePayload {
    pub nom: String,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<CommunePayload> for CommuneRecord {
    fn from(value: CommunePayload) -> Self {
        Self {
            name: value.nom,
            population: value.population,
            code: value.code,
            extra: value.extra,
        }
    }
}

/// Decodes a provider body. Anything other than an array of objects that each
/// carry `nom` is rejected.
pub fn decode_communes(body: &[u8]) -> Result<Vec<CommuneRecord>, FetchError> {
    let payload: Vec<CommunePayload> = serde_json::from_slice(body)?;
    Ok(payload.into_iter().map(CommuneRecord::from).collect())
}

/// One entry of a department catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentPayload {
    pub code: String,
    #[serde(alias = "nom")]
    pub name: String,
}
