use std::collections::HashMap;

use crate::error::AppError;
use crate::models::import::RegionBatch;
use crate::models::upload::UploadedFile;
use crate::utils::naming::normalize_name;

/// Turn an uploaded `.csv` file into an import batch.
///
/// The extension is checked before anything is read.
pub fn batch_from_upload(file: &UploadedFile) -> Result<Vec<RegionBatch>, AppError> {
    if file.extension() != Some("csv") {
        return Err(AppError::InvalidFile);
    }
    parse_region_comunas(&file.data)
}

/// Parse a `region;comuna` CSV body (first line is a header) into region
/// groups.
///
/// Regions appear in first-seen order and each group keeps its comunas in
/// line order. Both fields are title-cased.
pub fn parse_region_comunas(bytes: &[u8]) -> Result<Vec<RegionBatch>, AppError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| AppError::Validation("El archivo no está codificado en UTF-8".into()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut groups: Vec<RegionBatch> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in reader.records() {
        let record = result.map_err(|e| AppError::Validation(format!("CSV inválido: {e}")))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let (Some(region), Some(comuna)) = (record.get(0), record.get(1)) else {
            return Err(AppError::Validation(format!(
                "Línea {line}: se esperaba 'región;comuna'"
            )));
        };
        let region = normalize_name(region, "región")?;
        let comuna = normalize_name(comuna, "comuna")?;

        let slot = *index.entry(region.clone()).or_insert_with(|| {
            groups.push(RegionBatch::new(region, Vec::new()));
            groups.len() - 1
        });
        groups[slot].comunas.push(comuna);
    }

    Ok(groups)
}
