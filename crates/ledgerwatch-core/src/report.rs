//! End-of-run reporting

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Explorer, Key};
use crate::monitor::RunSummary;

/// Status block for one key
pub fn render_status(explorer: &Explorer, key: &Key) -> String {
    format!(
        "request status via:  {}\n\
         - key:           {}\n\
         - name:          {}\n\
         - success:       {}\n\
         - value:         {}\n\
         - error message: {}\n",
        explorer.name,
        key.address,
        key.name,
        key.is_success(),
        key.value(),
        key.error_message(),
    )
}

/// Plain-text report: a status block for every failed key (every key
/// when `verbose`), then `Done`
pub fn render_text(explorer: &Explorer, summary: &RunSummary, verbose: bool) -> String {
    let mut out = String::new();

    for key in summary
        .results
        .iter()
        .filter(|key| verbose || !key.is_success())
    {
        out.push_str(&render_status(explorer, key));
    }

    out.push_str("Done\n");
    out
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    explorer: &'a str,
    host: Option<String>,
    results: Vec<KeyReport<'a>>,
}

#[derive(Debug, Serialize)]
struct KeyReport<'a> {
    address: &'a str,
    name: &'a str,
    success: bool,
    value: f64,
    error_message: String,
    alerted: bool,
    checked_at: Option<DateTime<Utc>>,
}

/// JSON report of every key
pub fn render_json(explorer: &Explorer, summary: &RunSummary) -> Result<String> {
    let report = JsonReport {
        explorer: &explorer.name,
        host: explorer.host(),
        results: summary
            .results
            .iter()
            .enumerate()
            .map(|(index, key)| KeyReport {
                address: &key.address,
                name: &key.name,
                success: key.is_success(),
                value: key.value(),
                error_message: key.error_message(),
                alerted: summary.is_alerted(index),
                checked_at: key.checked_at,
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}
