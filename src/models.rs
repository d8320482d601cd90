use crate::request_builder::coerce_number;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

// ============ Form Inputs ============

/// A numeric form field before coercion.
///
/// Form edits arrive as text; chat commands and defaults carry real numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericInput::Number(n) => write!(f, "{}", n),
            NumericInput::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Declares a closed set of form choices that still forwards unknown values verbatim.
macro_rules! choice_field {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// Value outside the declared set; the server decides what to do with it.
            Other(String),
        }

        impl $name {
            /// Declared values, in form order.
            pub const CHOICES: &'static [&'static str] = &[$($label),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Other(value) => value.as_str(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Other(_))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($label => $name::$variant,)+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_field! {
    /// Fuel used by the applicant's vehicle.
    FuelType { Electric => "Electric", Petrol => "Petrol", Diesel => "Diesel" }
}

choice_field! {
    /// Applicant's employment category.
    JobType { Govt => "Govt", Mnc => "MNC", SelfEmployed => "Self" }
}

choice_field! {
    /// Repayment status of previous loans.
    LoanHistory { Paid => "Paid", Ongoing => "Ongoing", NoHistory => "No History" }
}

/// Vehicle owned by the applicant. Sent to the server as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleType {
    Bike,
    Car,
}

impl VehicleType {
    pub fn code(self) -> f64 {
        match self {
            VehicleType::Bike => 0.0,
            VehicleType::Car => 1.0,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "bike" => Some(VehicleType::Bike),
            "car" => Some(VehicleType::Car),
            _ => None,
        }
    }
}

/// The manual-entry field set.
///
/// Missing keys fall back to the form defaults so that a partial chat command
/// (`predict: {"income": 60000}`) still describes a complete application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManualInputs {
    pub income: NumericInput,
    pub loan_amount: NumericInput,
    pub monthly_units: NumericInput,
    /// `bike`/`car` or their codes `0`/`1`.
    pub vehicle_type: NumericInput,
    pub fuel_type: FuelType,
    /// Expected range 0–20.
    pub eco_score: NumericInput,
    pub credit_score: NumericInput,
    pub job_type: JobType,
    pub loan_history: LoanHistory,
}

impl Default for ManualInputs {
    fn default() -> Self {
        Self {
            income: NumericInput::Number(60000.0),
            loan_amount: NumericInput::Number(20000.0),
            monthly_units: NumericInput::Number(300.0),
            vehicle_type: NumericInput::Number(VehicleType::Bike.code()),
            fuel_type: FuelType::Petrol,
            eco_score: NumericInput::Number(10.0),
            credit_score: NumericInput::Number(700.0),
            job_type: JobType::Govt,
            loan_history: LoanHistory::NoHistory,
        }
    }
}

// ============ Documents ============

/// A document selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a document from disk, inferring its content type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, content_type_for(path), bytes))
    }
}

/// Best-effort content type for an uploaded document.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Documents selected on the OCR form. At least one must be present to submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrInputs {
    /// Vehicle registration certificate.
    pub rc_image: Option<Attachment>,
    /// Electricity bill.
    pub bill_image: Option<Attachment>,
}

/// Multipart part a document is sent under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    RcImage,
    BillImage,
}

impl DocumentKind {
    pub fn field_name(self) -> &'static str {
        match self {
            DocumentKind::RcImage => "rc_image",
            DocumentKind::BillImage => "bill_image",
        }
    }
}

// ============ Requests ============

/// Manual inputs after numeric coercion; this is the `/predict` JSON body.
///
/// Non-finite numbers serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualPayload {
    pub income: f64,
    pub loan_amount: f64,
    pub monthly_units: f64,
    pub vehicle_type: f64,
    pub fuel_type: FuelType,
    pub eco_score: f64,
    pub credit_score: f64,
    pub job_type: JobType,
    pub loan_history: LoanHistory,
}

impl ManualPayload {
    /// Names of numeric fields that did not coerce to a finite number.
    pub fn non_finite_fields(&self) -> Vec<&'static str> {
        [
            ("income", self.income),
            ("loan_amount", self.loan_amount),
            ("monthly_units", self.monthly_units),
            ("vehicle_type", self.vehicle_type),
            ("eco_score", self.eco_score),
            ("credit_score", self.credit_score),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPart {
    pub kind: DocumentKind,
    pub attachment: Attachment,
}

/// `/predict_ocr` multipart body; never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrPayload {
    pub parts: Vec<DocumentPart>,
}

/// One canonical prediction request.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionRequest {
    Manual(ManualPayload),
    Ocr(OcrPayload),
}

impl PredictionRequest {
    /// Path of the endpoint that serves this request shape.
    pub fn endpoint(&self) -> &'static str {
        match self {
            PredictionRequest::Manual(_) => "/predict",
            PredictionRequest::Ocr(_) => "/predict_ocr",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

// ============ Responses ============

/// Prediction returned by the server. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// 1 approves; anything else rejects.
    #[serde(default, alias = "approval_class")]
    pub prediction: Option<f64>,
    /// Approval probability in 0.0–1.0.
    #[serde(
        default,
        alias = "approval_probability",
        deserialize_with = "lenient_number"
    )]
    pub probability: Option<f64>,
    #[serde(default)]
    pub reasons: Option<Reasons>,
    #[serde(default)]
    pub schemes: Option<Vec<Scheme>>,
}

/// SHAP attributions split by direction, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reasons {
    #[serde(default)]
    pub harmful: Option<Vec<ReasonRow>>,
    #[serde(default)]
    pub helpful: Option<Vec<ReasonRow>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasonRow {
    #[serde(default, deserialize_with = "lenient_text")]
    pub feature: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_number")]
    pub shap_value: Option<f64>,
}

/// A recommended support scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub link: Option<String>,
}

// Decoders for display-only item fields. None of them fail on an odd value.

/// `null` reads as empty text; numbers and booleans keep their JSON spelling.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_text(deserializer)?.unwrap_or_default())
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// Numbers pass through and numeric strings are coerced; anything else is absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(text) => Some(coerce_number(&text)).filter(|n| n.is_finite()),
        _ => None,
    })
}

/// Raw `/chat` body; `response` is accepted when `reply` is absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReplyBody {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Body of a non-success response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_choice_passes_through() {
        let fuel: FuelType = serde_json::from_value(json!("Hydrogen")).unwrap();
        assert_eq!(fuel, FuelType::Other("Hydrogen".to_string()));
        assert!(!fuel.is_known());
        assert_eq!(serde_json::to_value(&fuel).unwrap(), json!("Hydrogen"));

        let history: LoanHistory = serde_json::from_value(json!("No History")).unwrap();
        assert_eq!(history, LoanHistory::NoHistory);
        assert_eq!(JobType::from("MNC"), JobType::Mnc);
    }

    #[test]
    fn test_manual_inputs_partial_decode_uses_defaults() {
        let inputs: ManualInputs =
            serde_json::from_value(json!({"income": 45000, "fuel_type": "Electric"})).unwrap();
        assert_eq!(inputs.income, NumericInput::Number(45000.0));
        assert_eq!(inputs.fuel_type, FuelType::Electric);
        assert_eq!(inputs.credit_score, NumericInput::Number(700.0));
        assert_eq!(inputs.loan_history, LoanHistory::NoHistory);
    }

    #[test]
    fn test_manual_inputs_reject_unknown_fields() {
        let result = serde_json::from_value::<ManualInputs>(json!({"incme": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_finite_numbers_serialize_as_null() {
        let payload = ManualPayload {
            income: f64::NAN,
            loan_amount: 20000.0,
            monthly_units: 300.0,
            vehicle_type: 0.0,
            fuel_type: FuelType::Petrol,
            eco_score: 10.0,
            credit_score: f64::INFINITY,
            job_type: JobType::Govt,
            loan_history: LoanHistory::Paid,
        };
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["income"], serde_json::Value::Null);
        assert_eq!(body["loan_amount"], json!(20000.0));
        assert_eq!(payload.non_finite_fields(), vec!["income", "credit_score"]);
    }

    #[test]
    fn test_response_accepts_legacy_keys_and_missing_fields() {
        let resp: PredictionResponse = serde_json::from_value(json!({
            "approval_class": 1,
            "approval_probability": 0.91
        }))
        .unwrap();
        assert_eq!(resp.prediction, Some(1.0));
        assert_eq!(resp.probability, Some(0.91));
        assert!(resp.reasons.is_none());

        let empty: PredictionResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, PredictionResponse::default());
    }

    #[test]
    fn test_item_fields_tolerate_null_and_numeric_strings() {
        let resp: PredictionResponse = serde_json::from_value(json!({
            "prediction": 1,
            "probability": "0.9",
            "reasons": {
                "harmful": [{"feature": null, "value": 550, "shap_value": "-0.12"}],
                "helpful": [{"feature": "income", "shap_value": "abc"}]
            },
            "schemes": [{"name": "PM-KUSUM", "description": null, "link": null}]
        }))
        .unwrap();

        assert_eq!(resp.probability, Some(0.9));
        let reasons = resp.reasons.unwrap();
        let harmful = reasons.harmful.unwrap();
        assert_eq!(harmful[0].feature, "");
        assert_eq!(harmful[0].shap_value, Some(-0.12));
        assert_eq!(reasons.helpful.unwrap()[0].shap_value, None);

        let schemes = resp.schemes.unwrap();
        assert_eq!(schemes[0].name, "PM-KUSUM");
        assert_eq!(schemes[0].description, "");
        assert_eq!(schemes[0].link, None);
    }

    #[test]
    fn test_content_type_inference() {
        assert_eq!(content_type_for(Path::new("rc.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("bill.pdf")), "application/pdf");
        assert_eq!(
            content_type_for(Path::new("scan")),
            "application/octet-stream"
        );
    }
}
