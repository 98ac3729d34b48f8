use crate::error::AppError;

/// Maximum stored length of a region or comuna name, in characters.
pub const MAX_NAME_LEN: usize = 25;

/// Title-case a name.
///
/// An alphabetic character is upper-cased when it starts the string or
/// follows a non-alphabetic character; every other alphabetic character is
/// lower-cased. `"viña del mar"` becomes `"Viña Del Mar"` and `"o'higgins"`
/// becomes `"O'Higgins"`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Trim, check length and title-case a client-supplied name.
pub fn normalize_name(name: &str, what: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "El nombre de {what} debe tener entre 1 y {MAX_NAME_LEN} caracteres"
        )));
    }
    Ok(title_case(trimmed))
}
