use super::ApiError;

pub fn validate_anime_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid anime ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Parses the `page` query parameter. Absent or blank means page 1.
pub fn validate_page(page: Option<&str>) -> Result<i32, ApiError> {
    let Some(raw) = page.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(1);
    };

    match raw.parse::<i32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(ApiError::validation(format!(
            "Invalid page: {raw}. Page must be a positive integer"
        ))),
    }
}
