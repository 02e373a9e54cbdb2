use super::fields::{self, RawRow};
use crate::dashboards::domain::{CallRecord, Channel, LeadRecord, SalesRecord, SpendRecord};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// Ingestion is the one boundary that can fail: transport hands us whole
/// payloads, and a payload that is not the advertised format is the
/// caller's problem to surface, not something to average into the metrics.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed returned an HTML document instead of CSV; check the export's sharing settings")]
    HtmlPayload,
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected {feed} payload shape: expected {expected}")]
    UnexpectedShape {
        feed: &'static str,
        expected: &'static str,
    },
    #[error("could not read feed file: {0}")]
    Io(#[from] std::io::Error),
}

/// A published-sheet permission error comes back as an HTML page with a
/// 200 status; catching it here beats parsing `<!DOCTYPE html>` as headers.
fn reject_html(payload: &str) -> Result<(), FeedError> {
    let head: String = payload.trim_start().chars().take(14).collect();
    if head.eq_ignore_ascii_case("<!doctype html") || payload.contains("<html") {
        return Err(FeedError::HtmlPayload);
    }
    Ok(())
}

fn csv_rows(payload: &str) -> Result<Vec<RawRow>, FeedError> {
    reject_html(payload)?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(payload.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(RawRow::from_csv(&headers, &record?));
    }
    Ok(rows)
}

fn channel_of(row: &RawRow) -> Channel {
    Channel::normalize(row.text(fields::SOURCE).as_deref())
}

/// Marketing spend CSV to canonical records. The period resolves through
/// `Month` first, then `Date`, once, here; the metrics modules never look
/// at headers again.
pub fn parse_spend_csv(payload: &str) -> Result<Vec<SpendRecord>, FeedError> {
    let records = csv_rows(payload)?
        .iter()
        .map(|row| SpendRecord {
            period: row.date(fields::SPEND_PERIOD),
            channel: channel_of(row),
            amount: row.amount(fields::SPEND_AMOUNT),
        })
        .collect();
    Ok(records)
}

/// Marketing leads CSV to canonical records.
pub fn parse_leads_csv(payload: &str) -> Result<Vec<LeadRecord>, FeedError> {
    let records = csv_rows(payload)?
        .iter()
        .map(|row| LeadRecord {
            date: row.date(fields::DATE),
            channel: channel_of(row),
            client_id: row.identifier(fields::CLIENT_ID),
            stage: row.text(fields::STAGE),
            student_name: row.text(fields::STUDENT_NAME),
        })
        .collect();
    Ok(records)
}

/// Pulls the row array out of a JSON feed payload, which may be bare or
/// wrapped under one of the given keys.
fn json_rows<'a>(
    payload: &'a Value,
    feed: &'static str,
    wrappers: &[&str],
    expected: &'static str,
) -> Result<&'a Vec<Value>, FeedError> {
    if let Some(rows) = payload.as_array() {
        return Ok(rows);
    }
    if let Some(object) = payload.as_object() {
        for key in wrappers {
            if let Some(rows) = object.get(*key).and_then(Value::as_array) {
                return Ok(rows);
            }
        }
    }
    Err(FeedError::UnexpectedShape { feed, expected })
}

fn object_rows<'a>(rows: &'a [Value], feed: &'static str) -> Vec<RawRow> {
    rows.iter()
        .filter_map(|row| match row.as_object() {
            Some(object) => Some(RawRow::from_json(object)),
            None => {
                warn!(feed, "skipping non-object row in feed payload");
                None
            }
        })
        .collect()
}

/// Call-center JSON (bare array, or wrapped under `data` / `result`) to
/// canonical records.
pub fn parse_call_center_json(payload: &Value) -> Result<Vec<CallRecord>, FeedError> {
    let rows = json_rows(
        payload,
        "call-center",
        &["data", "result"],
        "an array, or an object with a `data` or `result` array",
    )?;
    let records = object_rows(rows, "call-center")
        .iter()
        .map(|row| CallRecord {
            date: row.date(fields::DATE),
            channel: channel_of(row),
            client_id: row.identifier(fields::CLIENT_ID),
            status: row.text(fields::STATUS),
            stage: row.text(fields::STAGE),
            rep: row.text(fields::CALL_REP),
            visa_outcome: row.text(fields::VISA_OUTCOME),
            loss_reason: row.text(fields::LOSS_REASON),
            student_name: row.text(fields::STUDENT_NAME),
        })
        .collect();
    Ok(records)
}

/// Sales pipeline JSON (bare array, or wrapped under `sales`) to canonical
/// records.
pub fn parse_sales_json(payload: &Value) -> Result<Vec<SalesRecord>, FeedError> {
    let rows = json_rows(
        payload,
        "sales",
        &["sales"],
        "an array, or an object with a `sales` array",
    )?;
    let records = object_rows(rows, "sales")
        .iter()
        .map(|row| SalesRecord {
            date: row.date(fields::DATE),
            status_date: row.date(fields::STATUS_DATE),
            stage_start: row.date(fields::STAGE_START),
            channel: channel_of(row),
            client_id: row.identifier(fields::CLIENT_ID),
            outcome: row.text(fields::OUTCOME),
            visa_outcome: row.text(fields::VISA_OUTCOME),
            current_stage: row.text(fields::CURRENT_STAGE),
            rep: row.text(fields::SALES_REP),
            student_name: row.text(fields::STUDENT_NAME),
        })
        .collect();
    Ok(records)
}

pub fn load_spend_file(path: &Path) -> Result<Vec<SpendRecord>, FeedError> {
    parse_spend_csv(&std::fs::read_to_string(path)?)
}

pub fn load_leads_file(path: &Path) -> Result<Vec<LeadRecord>, FeedError> {
    parse_leads_csv(&std::fs::read_to_string(path)?)
}

pub fn load_call_center_file(path: &Path) -> Result<Vec<CallRecord>, FeedError> {
    let payload: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    parse_call_center_json(&payload)
}

pub fn load_sales_file(path: &Path) -> Result<Vec<SalesRecord>, FeedError> {
    let payload: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    parse_sales_json(&payload)
}
