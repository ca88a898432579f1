//! Validation of incoming wait-time reports.
//!
//! Raw request bodies are checked here, before anything reaches the store or
//! the aggregator. Every problem found is reported, one entry per field.

use crate::store::{LineType, NewReport, MAX_WAIT_MINUTES};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A report as submitted by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub airport_id: String,
    /// JSON numbers arrive as floats; only whole values are accepted.
    pub wait_minutes: f64,
    #[serde(default)]
    pub line_type: Option<String>,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub checkpoint: Option<String>,
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A report that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid report: {}", join(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

fn join(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ReportRequest {
    /// Check every field and build a [`NewReport`].
    pub fn validate(self) -> Result<NewReport, ValidationError> {
        let mut fields = Vec::new();

        let airport_id = match Uuid::parse_str(self.airport_id.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                fields.push(FieldError::new("airportId", "must be a valid airport id"));
                None
            }
        };

        let wait_minutes = whole_minutes(self.wait_minutes);
        if wait_minutes.is_none() {
            fields.push(FieldError::new(
                "waitMinutes",
                format!("must be a whole number between 0 and {MAX_WAIT_MINUTES}"),
            ));
        }

        let line_type = match self.line_type.as_deref().map(str::trim) {
            None | Some("") => Some(LineType::default()),
            Some(raw) => match raw.parse::<LineType>() {
                Ok(line_type) => Some(line_type),
                Err(e) => {
                    fields.push(FieldError::new("lineType", e));
                    None
                }
            },
        };

        match (airport_id, wait_minutes, line_type) {
            (Some(airport_id), Some(wait_minutes), Some(line_type)) if fields.is_empty() => {
                Ok(NewReport {
                    airport_id,
                    wait_minutes,
                    terminal: normalize_label(self.terminal),
                    checkpoint: normalize_label(self.checkpoint),
                    line_type,
                })
            }
            _ => Err(ValidationError { fields }),
        }
    }
}

/// `12` and `12.0` are the same wait; `12.5`, negatives and NaN are not waits.
fn whole_minutes(value: f64) -> Option<u32> {
    let in_range = (0.0..=f64::from(MAX_WAIT_MINUTES)).contains(&value);
    (in_range && value.fract() == 0.0).then_some(value as u32)
}

/// Trim a free-text label; blank becomes `None`.
fn normalize_label(label: Option<String>) -> Option<String> {
    label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(wait_minutes: f64) -> ReportRequest {
        ReportRequest {
            airport_id: Uuid::new_v4().to_string(),
            wait_minutes,
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_request_defaults_to_standard() {
        let report = request(15.0).validate().unwrap();
        assert_eq!(report.wait_minutes, 15);
        assert_eq!(report.line_type, LineType::Standard);
        assert_eq!(report.terminal, None);
        assert_eq!(report.checkpoint, None);
    }

    #[test]
    fn test_wait_bounds() {
        assert!(request(0.0).validate().is_ok());
        assert!(request(300.0).validate().is_ok());

        let err = request(301.0).validate().unwrap_err();
        assert_eq!(err.fields.len(), 1);
        assert_eq!(err.fields[0].field, "waitMinutes");

        let err = request(-1.0).validate().unwrap_err();
        assert_eq!(err.fields[0].field, "waitMinutes");
    }

    #[test]
    fn test_whole_float_minutes_accepted() {
        assert_eq!(request(12.0).validate().unwrap().wait_minutes, 12);

        for bad in [12.5, 0.1, f64::NAN, f64::INFINITY] {
            let err = request(bad).validate().unwrap_err();
            assert_eq!(err.fields[0].field, "waitMinutes", "{bad}");
        }

        let req: ReportRequest = serde_json::from_str(&format!(
            r#"{{"airportId": "{}", "waitMinutes": 12.0}}"#,
            Uuid::nil()
        ))
        .unwrap();
        assert_eq!(req.validate().unwrap().wait_minutes, 12);
    }

    #[test]
    fn test_line_type_checked() {
        let mut req = request(10.0);
        req.line_type = Some("tsa_precheck".to_string());
        assert_eq!(req.validate().unwrap().line_type, LineType::TsaPrecheck);

        let mut req = request(10.0);
        req.line_type = Some("first_class".to_string());
        let err = req.validate().unwrap_err();
        assert_eq!(err.fields[0].field, "lineType");
    }

    #[test]
    fn test_blank_labels_become_none() {
        let mut req = request(10.0);
        req.terminal = Some("  Terminal 4 ".to_string());
        req.checkpoint = Some("   ".to_string());

        let report = req.validate().unwrap();
        assert_eq!(report.terminal.as_deref(), Some("Terminal 4"));
        assert_eq!(report.checkpoint, None);
    }

    #[test]
    fn test_all_field_errors_reported() {
        let req = ReportRequest {
            airport_id: "not-a-uuid".to_string(),
            wait_minutes: 999.0,
            line_type: Some("vip".to_string()),
            ..Default::default()
        };

        let err = req.validate().unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["airportId", "waitMinutes", "lineType"]);
        assert!(err.to_string().starts_with("invalid report: airportId"));
    }

    #[test]
    fn test_deserializes_camel_case() {
        let req: ReportRequest = serde_json::from_str(
            r#"{"airportId": "00000000-0000-0000-0000-000000000000", "waitMinutes": 7, "lineType": "clear"}"#,
        )
        .unwrap();
        let report = req.validate().unwrap();
        assert_eq!(report.airport_id, Uuid::nil());
        assert_eq!(report.line_type, LineType::Clear);
    }
}
