use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RatingsError {
    #[error("input is not a list of rating rows")]
    NotAList,

    #[error("rating row does not hold a numeric value")]
    InvalidValue,
}

/// Mean star rating over the raw rows returned by the stars-by-location
/// query, rounded to one decimal place. Each row is a single-element array
/// holding the rating; rows with extra columns contribute their first value.
/// An empty result set averages to 0.0 rather than erroring.
pub fn average_star_rating(rows: &Value) -> Result<f64, RatingsError> {
    let rows = rows.as_array().ok_or(RatingsError::NotAList)?;
    if rows.is_empty() {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for row in rows {
        let stars = row
            .as_array()
            .and_then(|row| row.first())
            .and_then(Value::as_f64)
            .ok_or(RatingsError::InvalidValue)?;
        total += stars;
    }

    let mean = total / rows.len() as f64;
    Ok((mean * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_a_list() {
        assert_eq!(average_star_rating(&json!(12)), Err(RatingsError::NotAList));
        assert_eq!(
            average_star_rating(&json!("stars")),
            Err(RatingsError::NotAList)
        );
    }

    #[test]
    fn test_invalid_row_value() {
        let rows = json!([["a"], [4.0], [6.0]]);
        assert_eq!(average_star_rating(&rows), Err(RatingsError::InvalidValue));
        let bare = json!([4.0, 6.0]);
        assert_eq!(average_star_rating(&bare), Err(RatingsError::InvalidValue));
    }

    #[test]
    fn test_empty_rows() {
        assert_eq!(average_star_rating(&json!([])), Ok(0.0));
    }

    #[test]
    fn test_mean() {
        let rows = json!([[8.0], [4.0], [6.0]]);
        assert_eq!(average_star_rating(&rows), Ok(6.0));
    }

    #[test]
    fn test_first_value_of_wide_row() {
        let rows = json!([[2.0, 4.0], [3.5], [5.0]]);
        assert_eq!(average_star_rating(&rows), Ok(3.5));
    }

    #[test]
    fn test_rounded_to_one_decimal() {
        let rows = json!([[3.7], [3.8], [3.8]]);
        assert_eq!(average_star_rating(&rows), Ok(3.8));
        let rows = json!([[1.0], [2.0]]);
        assert_eq!(average_star_rating(&rows), Ok(1.5));
    }
}
