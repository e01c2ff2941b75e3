//! Request validation for the tattoo endpoint.
//!
//! Every failure maps to one fixed client-facing message; checks run in a fixed
//! order and the first failure wins.

use crate::astrology::{life_path_number, zodiac_sign};
use crate::errors::AppError;
use crate::models::{GenerateTattooRequest, Personalization, TattooProfile};
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

pub const FIRST_NAME_ERROR: &str = "First name must be a non-empty string";
pub const LAST_NAME_ERROR: &str = "Last name must be a non-empty string";
pub const AGE_ERROR: &str = "Age must be a positive integer";
pub const MISSING_INPUT_ERROR: &str = "Missing input data";
pub const DATE_FORMAT_ERROR: &str = "Invalid date of birth format. Use dd/mm/yyyy";

/// Validates the request body and derives zodiac sign and life path number.
pub fn validate_request(request: &GenerateTattooRequest) -> Result<TattooProfile, AppError> {
    let first_name = non_empty_string(&request.first_name)
        .ok_or_else(|| AppError::BadRequest(FIRST_NAME_ERROR.to_string()))?;
    let last_name = non_empty_string(&request.last_name)
        .ok_or_else(|| AppError::BadRequest(LAST_NAME_ERROR.to_string()))?;
    let age = positive_integer(&request.age)
        .ok_or_else(|| AppError::BadRequest(AGE_ERROR.to_string()))?;

    let date_of_birth = match &request.date_of_birth {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(value) if !is_blank(value) => {
            return Err(AppError::BadRequest(DATE_FORMAT_ERROR.to_string()))
        }
        _ => return Err(AppError::BadRequest(MISSING_INPUT_ERROR.to_string())),
    };

    let birth_date = parse_date_of_birth(&date_of_birth)
        .ok_or_else(|| AppError::BadRequest(DATE_FORMAT_ERROR.to_string()))?;

    let zodiac_sign = zodiac_sign(birth_date.day(), birth_date.month()).ok_or_else(|| {
        AppError::InternalError(format!(
            "Unable to determine zodiac sign for {}",
            date_of_birth
        ))
    })?;

    Ok(TattooProfile {
        life_path_number: life_path_number(&date_of_birth),
        first_name,
        last_name,
        date_of_birth,
        age,
        zodiac_sign,
        personalization: Personalization::from_request(request),
    })
}

/// Parses `dd/mm/yyyy` into a calendar date.
///
/// Exactly three `/`-separated integers are required (surrounding whitespace per
/// part is tolerated, leading zeros are optional) and they must form a real date
/// with a year between 1 and 9999.
pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('/');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() || !(1..=9999).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn non_empty_string(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

// Values that count as "not supplied": null, "", 0, false, [] and {}.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

// JSON floats (35.0), booleans and strings are not integers.
fn positive_integer(value: &Option<Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64().filter(|age| *age > 0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astrology::ZodiacSign;
    use serde_json::json;

    fn request(body: Value) -> GenerateTattooRequest {
        serde_json::from_value(body).unwrap()
    }

    fn bad_request_message(result: Result<TattooProfile, AppError>) -> String {
        match result {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_request_derives_facts() {
        let profile = validate_request(&request(json!({
            "first_name": "John",
            "last_name": "Doe",
            "date_of_birth": "01/01/1990",
            "age": 35
        })))
        .unwrap();

        assert_eq!(profile.first_name, "John");
        assert_eq!(profile.zodiac_sign, ZodiacSign::Capricorn);
        assert_eq!(profile.life_path_number, 3);
        assert_eq!(profile.age, 35);
        assert_eq!(profile.personalization, Personalization::default());
    }

    #[test]
    fn test_names_must_be_non_empty_strings() {
        let msg = bad_request_message(validate_request(&request(json!({
            "first_name": "   ",
            "last_name": "Doe",
            "date_of_birth": "01/01/1990",
            "age": 35
        }))));
        assert_eq!(msg, FIRST_NAME_ERROR);

        let msg = bad_request_message(validate_request(&request(json!({
            "first_name": "John",
            "last_name": 7,
            "date_of_birth": "01/01/1990",
            "age": 35
        }))));
        assert_eq!(msg, LAST_NAME_ERROR);
    }

    #[test]
    fn test_age_must_be_positive_integer() {
        for age in [json!(0), json!(-5), json!(35.5), json!("35"), json!(true), Value::Null] {
            let msg = bad_request_message(validate_request(&request(json!({
                "first_name": "John",
                "last_name": "Doe",
                "date_of_birth": "01/01/1990",
                "age": age
            }))));
            assert_eq!(msg, AGE_ERROR);
        }
    }

    #[test]
    fn test_name_errors_win_over_age_errors() {
        let msg = bad_request_message(validate_request(&request(json!({
            "first_name": "",
            "age": -1
        }))));
        assert_eq!(msg, FIRST_NAME_ERROR);
    }

    #[test]
    fn test_missing_date_of_birth() {
        for body in [
            json!({"first_name": "John", "last_name": "Doe", "age": 35}),
            json!({"first_name": "John", "last_name": "Doe", "age": 35, "date_of_birth": ""}),
            json!({"first_name": "John", "last_name": "Doe", "age": 35, "date_of_birth": null}),
            json!({"first_name": "John", "last_name": "Doe", "age": 35, "date_of_birth": 0}),
            json!({"first_name": "John", "last_name": "Doe", "age": 35, "date_of_birth": false}),
            json!({"first_name": "John", "last_name": "Doe", "age": 35, "date_of_birth": []}),
        ] {
            let msg = bad_request_message(validate_request(&request(body)));
            assert_eq!(msg, MISSING_INPUT_ERROR);
        }
    }

    #[test]
    fn test_malformed_date_of_birth() {
        for dob in [
            json!("invalid_date"),
            json!("31/02/1990"),
            json!("1990-01-01"),
            json!("01/13/1990"),
            json!("01/01/1990/02"),
            json!("01/01/0"),
            json!(19900101),
            json!(true),
            json!(["01/01/1990"]),
        ] {
            let msg = bad_request_message(validate_request(&request(json!({
                "first_name": "John",
                "last_name": "Doe",
                "date_of_birth": dob,
                "age": 35
            }))));
            assert_eq!(msg, DATE_FORMAT_ERROR);
        }
    }

    #[test]
    fn test_parse_date_accepts_unpadded_parts() {
        assert_eq!(
            parse_date_of_birth("1/2/1990"),
            NaiveDate::from_ymd_opt(1990, 2, 1)
        );
        assert_eq!(
            parse_date_of_birth("29/02/2000"),
            NaiveDate::from_ymd_opt(2000, 2, 29)
        );
        assert_eq!(parse_date_of_birth("29/02/1900"), None);
    }
}
