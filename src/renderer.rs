//! Turns a prediction response into what the user sees.
//!
//! Every response field is optional; rendering branches on presence and never
//! fails.

use crate::models::{PredictionResponse, ReasonRow, Scheme};
use serde::Serialize;
use std::fmt;

pub const PROBABILITY_UNAVAILABLE: &str = "unavailable";
pub const NO_ENTRIES: &str = "no entries";
pub const NO_MATCHING_SCHEMES: &str = "no matching schemes";
const SHAP_UNAVAILABLE: &str = "n/a";

/// Closed approve/reject outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    /// Only a prediction of exactly 1 approves.
    pub fn from_prediction(prediction: Option<f64>) -> Self {
        match prediction {
            Some(p) if p == 1.0 => Verdict::Approved,
            _ => Verdict::Rejected,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Approved => "Approved",
            Verdict::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonLine {
    pub feature: String,
    pub value: String,
    pub shap_value: String,
}

/// One explanation table, kept in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "rows")]
pub enum ReasonTable {
    NoEntries,
    Rows(Vec<ReasonLine>),
}

impl ReasonTable {
    pub fn rows(&self) -> &[ReasonLine] {
        match self {
            ReasonTable::NoEntries => &[],
            ReasonTable::Rows(rows) => rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeLine {
    pub name: String,
    pub description: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "schemes")]
pub enum SchemeList {
    NoMatchingSchemes,
    Schemes(Vec<SchemeLine>),
}

impl SchemeList {
    pub fn schemes(&self) -> &[SchemeLine] {
        match self {
            SchemeList::NoMatchingSchemes => &[],
            SchemeList::Schemes(schemes) => schemes,
        }
    }
}

/// Rendered prediction, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub verdict: Verdict,
    /// Percentage with one decimal, or `unavailable`.
    pub probability: String,
    pub harmful: ReasonTable,
    pub helpful: ReasonTable,
    pub schemes: SchemeList,
}

pub fn render(response: &PredictionResponse) -> DisplayModel {
    let reasons = response.reasons.as_ref();

    DisplayModel {
        verdict: Verdict::from_prediction(response.prediction),
        probability: format_probability(response.probability),
        harmful: reason_table(reasons.and_then(|r| r.harmful.as_deref())),
        helpful: reason_table(reasons.and_then(|r| r.helpful.as_deref())),
        schemes: scheme_list(response.schemes.as_deref()),
    }
}

pub fn format_probability(probability: Option<f64>) -> String {
    match probability {
        Some(p) if p.is_finite() => format!("{}%", to_fixed(p * 100.0, 1)),
        _ => PROBABILITY_UNAVAILABLE.to_string(),
    }
}

pub fn format_shap(shap_value: Option<f64>) -> String {
    match shap_value {
        Some(v) if v.is_finite() => to_fixed(v, 4),
        _ => SHAP_UNAVAILABLE.to_string(),
    }
}

/// Fixed-point text with exact halves rounded away from zero.
///
/// `{:.N}` rounds exact halves to even (`0.25` -> `0.2`); the web client shows `0.3`.
fn to_fixed(x: f64, digits: i32) -> String {
    let precision = digits as usize;
    let scale = 10f64.powi(digits);
    let scaled = x * scale;
    // Only multiples of 2^-(digits + 1) can sit exactly on a half
    let on_half = (x * 2f64.powi(digits + 1)).fract() == 0.0 && scaled.fract().abs() == 0.5;
    if on_half {
        format!("{:.*}", precision, scaled.round() / scale)
    } else {
        format!("{:.*}", precision, x)
    }
}

/// Feature value as text: strings unquoted, whole floats without a fraction,
/// everything else as JSON.
pub fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn reason_table(rows: Option<&[ReasonRow]>) -> ReasonTable {
    match rows {
        Some(rows) if !rows.is_empty() => ReasonTable::Rows(
            rows.iter()
                .map(|row| ReasonLine {
                    feature: row.feature.clone(),
                    value: format_value(&row.value),
                    shap_value: format_shap(row.shap_value),
                })
                .collect(),
        ),
        _ => ReasonTable::NoEntries,
    }
}

fn scheme_list(schemes: Option<&[Scheme]>) -> SchemeList {
    match schemes {
        Some(schemes) if !schemes.is_empty() => SchemeList::Schemes(
            schemes
                .iter()
                .map(|scheme| SchemeLine {
                    name: scheme.name.clone(),
                    description: scheme.description.clone(),
                    link: scheme.link.clone().filter(|link| !link.trim().is_empty()),
                })
                .collect(),
        ),
        _ => SchemeList::NoMatchingSchemes,
    }
}

impl DisplayModel {
    /// Single chat message explaining the decision.
    pub fn chat_summary(&self) -> String {
        let mut lines = vec![format!("Your loan application was {}.", self.verdict)];

        match self.verdict {
            Verdict::Rejected => {
                push_reasons(&mut lines, "Top reasons:", &self.harmful, |line| {
                    format!("- {}: {} (negative impact)", line.feature, line.value)
                });
                push_reasons(&mut lines, "Suggestions to improve:", &self.helpful, |line| {
                    format!("- Improve {} (current {})", line.feature, line.value)
                });
            }
            Verdict::Approved => {
                push_reasons(&mut lines, "Top supporting factors:", &self.helpful, |line| {
                    format!("- {}: {}", line.feature, line.value)
                });
            }
        }

        lines.push(format!("Approval probability: {}", self.probability));

        match &self.schemes {
            SchemeList::NoMatchingSchemes => {
                lines.push(format!("Recommended schemes: {}", NO_MATCHING_SCHEMES))
            }
            SchemeList::Schemes(schemes) => {
                let names: Vec<&str> = schemes.iter().map(|s| s.name.as_str()).collect();
                lines.push(format!("Recommended schemes: {}", names.join(", ")));
            }
        }

        lines.join("\n")
    }
}

fn push_reasons(
    lines: &mut Vec<String>,
    heading: &str,
    table: &ReasonTable,
    line: impl Fn(&ReasonLine) -> String,
) {
    match table {
        ReasonTable::NoEntries => lines.push(format!("{} {}", heading, NO_ENTRIES)),
        ReasonTable::Rows(rows) => {
            lines.push(heading.to_string());
            lines.extend(rows.iter().map(line));
        }
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, title: &str, table: &ReasonTable) -> fmt::Result {
    writeln!(f, "{}", title)?;
    match table {
        ReasonTable::NoEntries => writeln!(f, "  {}", NO_ENTRIES),
        ReasonTable::Rows(rows) => {
            let feature_width = rows
                .iter()
                .map(|r| r.feature.chars().count())
                .chain(std::iter::once("feature".len()))
                .max()
                .unwrap_or_default();
            let value_width = rows
                .iter()
                .map(|r| r.value.chars().count())
                .chain(std::iter::once("value".len()))
                .max()
                .unwrap_or_default();

            writeln!(
                f,
                "  {:<fw$}  {:<vw$}  {}",
                "feature",
                "value",
                "shap",
                fw = feature_width,
                vw = value_width
            )?;
            for row in rows {
                writeln!(
                    f,
                    "  {:<fw$}  {:<vw$}  {}",
                    row.feature,
                    row.value,
                    row.shap_value,
                    fw = feature_width,
                    vw = value_width
                )?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for DisplayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prediction:  {}", self.verdict)?;
        writeln!(f, "Probability: {}", self.probability)?;
        writeln!(f)?;
        write_table(f, "Top reasons (harmful):", &self.harmful)?;
        write_table(f, "Top supports (helpful):", &self.helpful)?;
        writeln!(f)?;
        writeln!(f, "Recommended schemes:")?;
        match &self.schemes {
            SchemeList::NoMatchingSchemes => writeln!(f, "  {}", NO_MATCHING_SCHEMES),
            SchemeList::Schemes(schemes) => {
                for scheme in schemes {
                    match &scheme.link {
                        Some(link) => writeln!(
                            f,
                            "  - {}: {} ({})",
                            scheme.name, scheme.description, link
                        )?,
                        None => writeln!(f, "  - {}: {}", scheme.name, scheme.description)?,
                    }
                }
                Ok(())
            }
        }
    }
}
