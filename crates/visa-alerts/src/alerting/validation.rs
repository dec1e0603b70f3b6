//! Request validation
//!
//! Field constraints live here and nowhere else. Every check collects all
//! violations before failing so callers see the full list at once.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::models::{AlertFilter, AlertStatus, NewAlert, PageRequest, VisaType};

/// Label attached to rejected create payloads
pub const CREATE_LABEL: &str = "Validation failed";
/// Label attached to rejected status updates
pub const STATUS_UPDATE_LABEL: &str = "Invalid status update";
/// Label attached to rejected list queries
pub const LIST_QUERY_LABEL: &str = "Invalid query parameters";

/// Length bounds for a free-text field, counted in characters after trimming
#[derive(Debug, Clone, Copy)]
pub struct TextField {
    /// Payload key
    pub name: &'static str,
    /// Minimum length
    pub min: usize,
    /// Maximum length
    pub max: usize,
}

/// Destination country
pub const COUNTRY: TextField = TextField {
    name: "country",
    min: 2,
    max: 60,
};

/// Consulate city
pub const CITY: TextField = TextField {
    name: "city",
    min: 2,
    max: 100,
};

const VISA_TYPE: &str = "visaType";
const STATUS: &str = "status";

impl TextField {
    fn check(&self, value: Option<&Value>, errors: &mut Vec<String>) -> Option<String> {
        let name = self.name;
        let raw = match value {
            None | Some(Value::Null) => {
                errors.push(format!("\"{name}\" is required"));
                return None;
            }
            Some(Value::String(s)) => s.trim(),
            Some(_) => {
                errors.push(format!("\"{name}\" must be a string"));
                return None;
            }
        };

        let len = raw.chars().count();
        if len == 0 {
            errors.push(format!("\"{name}\" is not allowed to be empty"));
            None
        } else if len < self.min {
            errors.push(format!(
                "\"{name}\" length must be at least {} characters long",
                self.min
            ));
            None
        } else if len > self.max {
            errors.push(format!(
                "\"{name}\" length must be less than or equal to {} characters long",
                self.max
            ));
            None
        } else {
            Some(raw.to_string())
        }
    }
}

fn one_of<T: Copy>(all: &[T], name: impl Fn(T) -> &'static str) -> String {
    let names: Vec<&str> = all.iter().map(|v| name(*v)).collect();
    format!("[{}]", names.join(", "))
}

fn check_visa_type(value: Option<&Value>, errors: &mut Vec<String>) -> Option<VisaType> {
    match value {
        None | Some(Value::Null) => {
            errors.push(format!("\"{VISA_TYPE}\" is required"));
            None
        }
        Some(Value::String(s)) => s.parse().ok().or_else(|| {
            errors.push(format!(
                "\"{VISA_TYPE}\" must be one of {}",
                one_of(&VisaType::ALL, VisaType::as_str)
            ));
            None
        }),
        Some(_) => {
            errors.push(format!("\"{VISA_TYPE}\" must be a string"));
            None
        }
    }
}

fn check_status(value: Option<&Value>, errors: &mut Vec<String>) -> Option<AlertStatus> {
    match value {
        None | Some(Value::Null) => {
            errors.push(format!("\"{STATUS}\" is required"));
            None
        }
        Some(Value::String(s)) => parse_status(s, errors),
        Some(_) => {
            errors.push(format!("\"{STATUS}\" must be a string"));
            None
        }
    }
}

fn parse_status(s: &str, errors: &mut Vec<String>) -> Option<AlertStatus> {
    s.parse().ok().or_else(|| {
        errors.push(format!(
            "\"{STATUS}\" must be one of {}",
            one_of(&AlertStatus::ALL, AlertStatus::as_str)
        ));
        None
    })
}

fn as_object<'a>(body: &'a Value, label: &'static str) -> Result<&'a Map<String, Value>> {
    body.as_object().ok_or_else(|| {
        Error::validation(label, vec!["\"value\" must be of type object".to_string()])
    })
}

fn reject_unknown_keys(body: &Map<String, Value>, allowed: &[&str], errors: &mut Vec<String>) {
    errors.extend(
        body.keys()
            .filter(|k| !allowed.contains(&k.as_str()))
            .map(|k| format!("\"{k}\" is not allowed")),
    );
}

/// Validate a create payload into a [`NewAlert`].
///
/// `status` is not accepted here; new alerts always start `Active`.
pub fn validate_create(body: &Value) -> Result<NewAlert> {
    let body = as_object(body, CREATE_LABEL)?;
    let mut errors = Vec::new();

    let country = COUNTRY.check(body.get(COUNTRY.name), &mut errors);
    let city = CITY.check(body.get(CITY.name), &mut errors);
    let visa_type = check_visa_type(body.get(VISA_TYPE), &mut errors);
    reject_unknown_keys(body, &[COUNTRY.name, CITY.name, VISA_TYPE], &mut errors);

    match (country, city, visa_type) {
        (Some(country), Some(city), Some(visa_type)) if errors.is_empty() => Ok(NewAlert {
            country,
            city,
            visa_type,
        }),
        _ => Err(Error::validation(CREATE_LABEL, errors)),
    }
}

/// Validate a status update payload
pub fn validate_status_update(body: &Value) -> Result<AlertStatus> {
    let body = as_object(body, STATUS_UPDATE_LABEL)?;
    let mut errors = Vec::new();

    let status = check_status(body.get(STATUS), &mut errors);
    reject_unknown_keys(body, &[STATUS], &mut errors);

    match status {
        Some(status) if errors.is_empty() => Ok(status),
        _ => Err(Error::validation(STATUS_UPDATE_LABEL, errors)),
    }
}

/// Raw list query parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Country substring
    pub country: Option<String>,
    /// Status name
    pub status: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    /// Page size
    pub limit: Option<String>,
}

/// Page size bounds applied to list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Used when the caller gives no `limit`
    pub default_limit: u32,
    /// Larger requested limits are clamped to this
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn positive(name: &str, value: Option<&str>, errors: &mut Vec<String>) -> Option<u32> {
    let raw = non_empty(value)?;
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            errors.push(format!("\"{name}\" must be a positive integer"));
            None
        }
    }
}

/// Turn raw query parameters into a filter and a page window.
///
/// Empty parameters are treated as absent. Unknown status values are
/// rejected rather than silently matching nothing.
pub fn validate_list_query(query: &ListQuery, limits: PageLimits) -> Result<(AlertFilter, PageRequest)> {
    let mut errors = Vec::new();

    let country = non_empty(query.country.as_deref()).map(str::to_string);
    let status = non_empty(query.status.as_deref()).and_then(|s| parse_status(s, &mut errors));
    let page = positive("page", query.page.as_deref(), &mut errors).unwrap_or(1);
    let limit = positive("limit", query.limit.as_deref(), &mut errors)
        .unwrap_or(limits.default_limit)
        .min(limits.max_limit.max(1));

    if !errors.is_empty() {
        return Err(Error::validation(LIST_QUERY_LABEL, errors));
    }

    Ok((AlertFilter { country, status }, PageRequest { page, limit }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn details(err: Error) -> Vec<String> {
        match err {
            Error::Validation { details, .. } => details,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_accepts_valid_payload_and_trims() {
        let alert = validate_create(&json!({
            "country": "  Japan ",
            "city": "Tokyo",
            "visaType": "Tourist"
        }))
        .unwrap();

        assert_eq!(
            alert,
            NewAlert {
                country: "Japan".into(),
                city: "Tokyo".into(),
                visa_type: VisaType::Tourist,
            }
        );
    }

    #[test]
    fn create_reports_every_missing_field() {
        let err = validate_create(&json!({})).unwrap_err();
        assert_eq!(
            details(err),
            vec![
                "\"country\" is required",
                "\"city\" is required",
                "\"visaType\" is required",
            ]
        );
    }

    #[test]
    fn create_reports_bounds_and_enum_together() {
        let err = validate_create(&json!({
            "country": "F",
            "city": "x".repeat(101),
            "visaType": "Work"
        }))
        .unwrap_err();

        assert_eq!(
            details(err),
            vec![
                "\"country\" length must be at least 2 characters long",
                "\"city\" length must be less than or equal to 100 characters long",
                "\"visaType\" must be one of [Tourist, Business, Student]",
            ]
        );
    }

    #[test]
    fn create_rejects_caller_supplied_status() {
        let err = validate_create(&json!({
            "country": "Japan",
            "city": "Tokyo",
            "visaType": "Tourist",
            "status": "Booked"
        }))
        .unwrap_err();

        assert_eq!(details(err), vec!["\"status\" is not allowed"]);
    }

    #[rstest]
    #[case(json!(42), "\"country\" must be a string")]
    #[case(json!("   "), "\"country\" is not allowed to be empty")]
    #[case(json!("é".repeat(60)), "")]
    #[case(json!("é".repeat(61)), "\"country\" length must be less than or equal to 60 characters long")]
    fn country_constraints(#[case] country: Value, #[case] expected: &str) {
        let result = validate_create(&json!({
            "country": country,
            "city": "Paris",
            "visaType": "Student"
        }));

        if expected.is_empty() {
            assert!(result.is_ok());
        } else {
            assert_eq!(details(result.unwrap_err()), vec![expected]);
        }
    }

    #[test]
    fn create_rejects_non_object_body() {
        let err = validate_create(&json!(["Japan"])).unwrap_err();
        assert_eq!(details(err), vec!["\"value\" must be of type object"]);
    }

    #[rstest]
    #[case("Active", AlertStatus::Active)]
    #[case("Booked", AlertStatus::Booked)]
    #[case("Expired", AlertStatus::Expired)]
    fn status_update_accepts_each_variant(#[case] raw: &str, #[case] expected: AlertStatus) {
        assert_eq!(validate_status_update(&json!({ "status": raw })).unwrap(), expected);
    }

    #[rstest]
    #[case(json!({}), "\"status\" is required")]
    #[case(json!({ "status": "Pending" }), "\"status\" must be one of [Active, Booked, Expired]")]
    #[case(json!({ "status": 1 }), "\"status\" must be a string")]
    fn status_update_rejections(#[case] body: Value, #[case] expected: &str) {
        let err = validate_status_update(&body).unwrap_err();
        match err {
            Error::Validation { label, details } => {
                assert_eq!(label, STATUS_UPDATE_LABEL);
                assert_eq!(details, vec![expected]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn status_update_rejects_extra_fields() {
        let err = validate_status_update(&json!({ "status": "Booked", "city": "Rome" })).unwrap_err();
        assert_eq!(details(err), vec!["\"city\" is not allowed"]);
    }

    #[test]
    fn list_query_defaults() {
        let (filter, page) = validate_list_query(&ListQuery::default(), PageLimits::default()).unwrap();
        assert_eq!(filter, AlertFilter::default());
        assert_eq!(page, PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn list_query_treats_empty_values_as_absent() {
        let query = ListQuery {
            country: Some(String::new()),
            status: Some(String::new()),
            page: Some(String::new()),
            limit: None,
        };
        let (filter, page) = validate_list_query(&query, PageLimits::default()).unwrap();
        assert_eq!(filter, AlertFilter::default());
        assert_eq!(page.page, 1);
    }

    #[test]
    fn list_query_clamps_limit() {
        let query = ListQuery {
            limit: Some("5000".into()),
            ..ListQuery::default()
        };
        let (_, page) = validate_list_query(&query, PageLimits::default()).unwrap();
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn list_query_rejects_bad_values_together() {
        let query = ListQuery {
            country: Some("fra".into()),
            status: Some("Pending".into()),
            page: Some("0".into()),
            limit: Some("ten".into()),
        };
        let err = validate_list_query(&query, PageLimits::default()).unwrap_err();
        assert_eq!(
            details(err),
            vec![
                "\"status\" must be one of [Active, Booked, Expired]",
                "\"page\" must be a positive integer",
                "\"limit\" must be a positive integer",
            ]
        );
    }
}
