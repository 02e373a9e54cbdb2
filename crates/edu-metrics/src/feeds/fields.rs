use crate::dashboards::normalize::{date_from_epoch_millis, parse_amount, parse_date_lenient};
use chrono::NaiveDate;
use std::collections::HashMap;

// Header alias chains, first non-blank wins. The order reproduces the
// fallback chains the spreadsheet feeds have always been read with.
pub(crate) const CLIENT_ID: &[&str] = &["Client ID", "ClientID", "ID"];
pub(crate) const SPEND_AMOUNT: &[&str] = &["Amount Spent (NPR)", "Amount Spent", "Spend"];
pub(crate) const SPEND_PERIOD: &[&str] = &["Month", "Date"];
pub(crate) const SOURCE: &[&str] = &["Source"];
pub(crate) const DATE: &[&str] = &["Date"];
pub(crate) const STATUS_DATE: &[&str] = &["Status Date"];
pub(crate) const STAGE: &[&str] = &["Stage"];
pub(crate) const CURRENT_STAGE: &[&str] = &["Current Stage", "Stage"];
pub(crate) const STAGE_START: &[&str] = &["Stage Start Date"];
pub(crate) const STATUS: &[&str] = &["Status"];
pub(crate) const OUTCOME: &[&str] = &["Outcome"];
pub(crate) const VISA_OUTCOME: &[&str] = &["Visa Outcome"];
pub(crate) const LOSS_REASON: &[&str] = &["Loss Reason"];
pub(crate) const SALES_REP: &[&str] = &["Sales Rep"];
pub(crate) const CALL_REP: &[&str] = &["Rep"];
pub(crate) const STUDENT_NAME: &[&str] = &["Student Name", "Name"];

/// A cell as the feeds actually deliver it: spreadsheet columns flip
/// between text, numbers, booleans, and blanks row by row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl RawValue {
    /// Blank cells lose alias resolution: empty text, zero, `false`, and
    /// null all fall through to the next alias, matching how the feeds
    /// were consumed before this adapter existed.
    fn is_present(&self) -> bool {
        match self {
            RawValue::Text(text) => !text.is_empty(),
            RawValue::Number(n) => *n != 0.0 && !n.is_nan(),
            RawValue::Bool(b) => *b,
            RawValue::Null => false,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Text(text) => Some(text.clone()),
            RawValue::Number(n) => Some(format_number(*n)),
            RawValue::Bool(b) => Some(b.to_string()),
            RawValue::Null => None,
        }
    }

    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            RawValue::Text(text) => parse_date_lenient(text),
            RawValue::Number(n) => date_from_epoch_millis(*n as i64),
            _ => None,
        }
    }

    fn as_amount(&self) -> f64 {
        match self {
            RawValue::Text(text) => parse_amount(text),
            RawValue::Number(n) => *n,
            _ => 0.0,
        }
    }
}

/// Integral identifiers arrive as floats from dynamically typed parsers;
/// "10452.0" is not the client id anyone wrote down.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One feed row with its header heterogeneity still intact; the typed
/// accessors below are the only way values leave it.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawRow {
    values: HashMap<String, RawValue>,
}

impl RawRow {
    pub(crate) fn from_csv(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let values = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| {
                (
                    header.trim().to_string(),
                    RawValue::Text(cell.to_string()),
                )
            })
            .collect();
        Self { values }
    }

    pub(crate) fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let values = object
            .iter()
            .map(|(key, value)| {
                let raw = match value {
                    serde_json::Value::String(text) => RawValue::Text(text.clone()),
                    serde_json::Value::Number(n) => {
                        RawValue::Number(n.as_f64().unwrap_or(0.0))
                    }
                    serde_json::Value::Bool(b) => RawValue::Bool(*b),
                    serde_json::Value::Null => RawValue::Null,
                    // Nested structures have no column meaning; treat as blank.
                    _ => RawValue::Null,
                };
                (key.trim().to_string(), raw)
            })
            .collect();
        Self { values }
    }

    fn resolve(&self, aliases: &[&str]) -> Option<&RawValue> {
        aliases
            .iter()
            .filter_map(|alias| self.values.get(*alias))
            .find(|value| value.is_present())
    }

    pub(crate) fn text(&self, aliases: &[&str]) -> Option<String> {
        self.resolve(aliases).and_then(RawValue::as_text)
    }

    pub(crate) fn date(&self, aliases: &[&str]) -> Option<NaiveDate> {
        self.resolve(aliases).and_then(RawValue::as_date)
    }

    pub(crate) fn amount(&self, aliases: &[&str]) -> f64 {
        self.resolve(aliases)
            .map(RawValue::as_amount)
            .unwrap_or(0.0)
    }

    pub(crate) fn identifier(&self, aliases: &[&str]) -> Option<String> {
        self.text(aliases).filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_row(value: serde_json::Value) -> RawRow {
        let object = value.as_object().expect("fixture is an object").clone();
        RawRow::from_json(&object)
    }

    #[test]
    fn alias_chain_takes_first_non_blank() {
        let row = json_row(json!({
            "Client ID": "",
            "ClientID": "C-104",
            "ID": "ignored",
        }));
        assert_eq!(row.identifier(CLIENT_ID), Some("C-104".to_string()));
    }

    #[test]
    fn blank_everywhere_resolves_to_none() {
        let row = json_row(json!({ "Client ID": "", "ID": null }));
        assert_eq!(row.identifier(CLIENT_ID), None);
        assert_eq!(row.text(STUDENT_NAME), None);
    }

    #[test]
    fn integral_numeric_identifiers_lose_the_fraction_suffix() {
        let row = json_row(json!({ "ID": 10452.0 }));
        assert_eq!(row.identifier(CLIENT_ID), Some("10452".to_string()));
    }

    #[test]
    fn amounts_parse_from_text_and_numbers() {
        let row = json_row(json!({ "Amount Spent": "NPR 1,250" }));
        assert_eq!(row.amount(SPEND_AMOUNT), 1250.0);

        let row = json_row(json!({ "Spend": 900.5 }));
        assert_eq!(row.amount(SPEND_AMOUNT), 900.5);

        let row = json_row(json!({}));
        assert_eq!(row.amount(SPEND_AMOUNT), 0.0);
    }

    #[test]
    fn dates_parse_from_text_and_epoch_millis() {
        let row = json_row(json!({ "Date": "3/5/2024" }));
        assert_eq!(
            row.date(DATE),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );

        let row = json_row(json!({ "Date": 1709596800000i64 }));
        assert_eq!(
            row.date(DATE),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn current_stage_falls_back_to_plain_stage() {
        let row = json_row(json!({ "Stage": "GTE Review" }));
        assert_eq!(row.text(CURRENT_STAGE), Some("GTE Review".to_string()));

        let row = json_row(json!({ "Current Stage": "COE Request", "Stage": "old" }));
        assert_eq!(row.text(CURRENT_STAGE), Some("COE Request".to_string()));
    }
}
