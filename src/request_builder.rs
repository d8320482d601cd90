use crate::config::Capabilities;
use crate::errors::ClientError;
use crate::models::{
    DocumentKind, DocumentPart, ManualInputs, ManualPayload, NumericInput, OcrInputs, OcrPayload,
    PredictionRequest, VehicleType,
};

pub const NO_FILE_PROVIDED: &str = "no file provided";
pub const OCR_DISABLED: &str = "document upload is disabled";

/// Turns form values and document selections into canonical prediction requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBuilder {
    capabilities: Capabilities,
}

impl RequestBuilder {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    /// Coerces the numeric fields and copies the choice fields verbatim.
    ///
    /// Never fails: a value that is not a number is forwarded as NaN and left
    /// for the server to reject.
    pub fn build_manual_request(&self, inputs: &ManualInputs) -> PredictionRequest {
        let payload = ManualPayload {
            income: inputs.income.coerce(),
            loan_amount: inputs.loan_amount.coerce(),
            monthly_units: inputs.monthly_units.coerce(),
            vehicle_type: coerce_vehicle_type(&inputs.vehicle_type),
            fuel_type: inputs.fuel_type.clone(),
            eco_score: inputs.eco_score.coerce(),
            credit_score: inputs.credit_score.coerce(),
            job_type: inputs.job_type.clone(),
            loan_history: inputs.loan_history.clone(),
        };

        let non_finite = payload.non_finite_fields();
        if !non_finite.is_empty() {
            tracing::warn!("Forwarding non-numeric values for: {}", non_finite.join(", "));
        }

        PredictionRequest::Manual(payload)
    }

    /// Packages the selected documents as named multipart parts.
    pub fn build_ocr_request(&self, inputs: &OcrInputs) -> Result<PredictionRequest, ClientError> {
        if !self.capabilities.ocr_uploads {
            return Err(ClientError::Validation(OCR_DISABLED.to_string()));
        }

        let parts: Vec<DocumentPart> = [
            (DocumentKind::RcImage, &inputs.rc_image),
            (DocumentKind::BillImage, &inputs.bill_image),
        ]
        .into_iter()
        .filter_map(|(kind, attachment)| {
            attachment.as_ref().map(|attachment| DocumentPart {
                kind,
                attachment: attachment.clone(),
            })
        })
        .collect();

        if parts.is_empty() {
            return Err(ClientError::Validation(NO_FILE_PROVIDED.to_string()));
        }

        for part in &parts {
            validate_content_type(part)?;
        }

        Ok(PredictionRequest::Ocr(OcrPayload { parts }))
    }
}

impl NumericInput {
    /// Number this input stands for, NaN when it does not read as one.
    pub fn coerce(&self) -> f64 {
        match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(text) => coerce_number(text),
        }
    }
}

/// Reads form text the way the web form's `Number()` conversion does.
///
/// Blank text is 0; `0x` hex and `Infinity` are accepted; anything else that
/// is not a decimal literal is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0.0;
    }

    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }

    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // f64::from_str also takes "inf" and "nan", which are not numbers here
    if text
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }

    text.parse::<f64>().unwrap_or(f64::NAN)
}

// Same parser the multipart encoder applies when the request is sent.
fn validate_content_type(part: &DocumentPart) -> Result<(), ClientError> {
    let content_type = &part.attachment.content_type;
    reqwest::multipart::Part::bytes(Vec::new())
        .mime_str(content_type)
        .map(|_| ())
        .map_err(|e| {
            ClientError::Validation(format!(
                "invalid content type '{}' for {}: {}",
                content_type,
                part.kind.field_name(),
                e
            ))
        })
}

fn coerce_vehicle_type(input: &NumericInput) -> f64 {
    match input {
        NumericInput::Text(text) => VehicleType::from_label(text)
            .map(VehicleType::code)
            .unwrap_or_else(|| coerce_number(text)),
        number => number.coerce(),
    }
}
