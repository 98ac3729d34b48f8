use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::utils::naming::normalize_name;

/// One region of an import batch with the comuna names filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionBatch {
    pub region: String,
    pub comunas: Vec<String>,
}

impl RegionBatch {
    pub fn new(region: impl Into<String>, comunas: Vec<String>) -> Self {
        Self {
            region: region.into(),
            comunas,
        }
    }
}

/// Parse and validate the JSON `request` field of a bulk import.
///
/// The whole batch is rejected when any entry is malformed, so positional
/// image lists can never drift against a partially understood batch.
pub fn parse_batch(raw: &str) -> Result<Vec<RegionBatch>, AppError> {
    let batch: Vec<RegionBatch> = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid 'request' payload: {e}")))?;

    for entry in &batch {
        normalize_name(&entry.region, "región")?;
        for comuna in &entry.comunas {
            normalize_name(comuna, "comuna")?;
        }
    }

    Ok(batch)
}

/// Parse and validate the JSON array of comuna names sent to
/// `POST /region/{id}/comuna`.
pub fn parse_comuna_names(raw: &str) -> Result<Vec<String>, AppError> {
    let names: Vec<String> = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid 'request' payload: {e}")))?;
    for name in &names {
        normalize_name(name, "comuna")?;
    }
    Ok(names)
}

/// Outcome of a bulk import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub total_regions: usize,
    pub total_comunas: usize,
    pub repeated_regions: Vec<String>,
    pub repeated_comunas: Vec<String>,
}

impl ImportSummary {
    pub fn saved_regions(&self) -> usize {
        self.total_regions - self.repeated_regions.len()
    }

    pub fn saved_comunas(&self) -> usize {
        self.total_comunas - self.repeated_comunas.len()
    }
}

/// Body returned by the import endpoints.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ImportResponse {
    #[schema(example = "Se han guardado 2 comunas y 1 regiones")]
    pub respuesta: String,
    /// Comma-separated names that already existed.
    #[schema(example = "Santiago, Providencia")]
    pub comunas_repetidas: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Metropolitana")]
    pub regiones_repetidas: Option<String>,
}

impl ImportResponse {
    /// Summary of a full region + comuna import.
    pub fn batch(summary: &ImportSummary) -> Self {
        Self {
            respuesta: format!(
                "Se han guardado {} comunas y {} regiones",
                summary.saved_comunas(),
                summary.saved_regions()
            ),
            comunas_repetidas: summary.repeated_comunas.join(", "),
            regiones_repetidas: Some(summary.repeated_regions.join(", ")),
        }
    }

    /// Summary of a comuna-only import into an existing region.
    pub fn comunas(summary: &ImportSummary) -> Self {
        Self {
            respuesta: format!("Se han guardado {} comunas", summary.saved_comunas()),
            comunas_repetidas: summary.repeated_comunas.join(", "),
            regiones_repetidas: None,
        }
    }
}
