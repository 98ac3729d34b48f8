use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{FromRequest, Multipart, Request};

use crate::error::AppError;
use crate::models::upload::UploadedFile;

/// A fully buffered `multipart/form-data` body.
///
/// Text parts are kept by name (last one wins). File parts are kept by name
/// in arrival order; a part with an empty file name becomes a `None` slot so
/// positional lists stay aligned. A trailing `[]` on a field name is ignored.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, String>,
    files: HashMap<String, Vec<Option<UploadedFile>>>,
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(normalize_field_name) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let data = field.bytes().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read '{name}': {e}"))
                    })?;
                    let slot = (!file_name.is_empty()).then(|| UploadedFile::new(file_name, data));
                    form.files.entry(name).or_default().push(slot);
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read '{name}': {e}"))
                    })?;
                    form.texts.insert(name, text);
                }
            }
        }

        Ok(form)
    }
}

fn normalize_field_name(name: &str) -> String {
    name.strip_suffix("[]").unwrap_or(name).to_string()
}

impl FormData {
    #[cfg(test)]
    pub fn insert_text(&mut self, name: &str, value: impl Into<String>) {
        self.texts.insert(name.to_string(), value.into());
    }

    #[cfg(test)]
    pub fn push_file(&mut self, name: &str, file: Option<UploadedFile>) {
        self.files.entry(name.to_string()).or_default().push(file);
    }

    /// A text field, `None` when absent or empty.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn require_text(&self, name: &str) -> Result<&str, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("Missing '{name}' field")))
    }

    /// Parse an optional text field, rejecting values that do not parse.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|_| AppError::Validation(format!("Invalid value for '{name}'")))
            })
            .transpose()
    }

    /// The first non-empty file part with the given name.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files
            .remove(name)
            .and_then(|files| files.into_iter().flatten().next())
    }

    /// Every file part with the given name, in arrival order.
    pub fn take_files(&mut self, name: &str) -> Vec<Option<UploadedFile>> {
        self.files.remove(name).unwrap_or_default()
    }
}
