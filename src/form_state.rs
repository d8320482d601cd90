use crate::models::{
    Attachment, DocumentKind, FuelType, JobType, LoanHistory, ManualInputs, NumericInput, OcrInputs,
};
use std::fmt;
use std::str::FromStr;

/// Editable fields of the manual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Income,
    LoanAmount,
    MonthlyUnits,
    VehicleType,
    FuelType,
    EcoScore,
    CreditScore,
    JobType,
    LoanHistory,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        FormField::Income,
        FormField::LoanAmount,
        FormField::MonthlyUnits,
        FormField::VehicleType,
        FormField::FuelType,
        FormField::EcoScore,
        FormField::CreditScore,
        FormField::JobType,
        FormField::LoanHistory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormField::Income => "income",
            FormField::LoanAmount => "loan_amount",
            FormField::MonthlyUnits => "monthly_units",
            FormField::VehicleType => "vehicle_type",
            FormField::FuelType => "fuel_type",
            FormField::EcoScore => "eco_score",
            FormField::CreditScore => "credit_score",
            FormField::JobType => "job_type",
            FormField::LoanHistory => "loan_history",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FormField::ALL
            .into_iter()
            .find(|field| field.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = FormField::ALL.iter().map(|f| f.name()).collect();
                format!("unknown field '{}' (expected one of: {})", wanted, names.join(", "))
            })
    }
}

/// Current values of the manual form and the documents picked for upload.
///
/// Edits are stored as entered; nothing is validated here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    inputs: ManualInputs,
    documents: OcrInputs,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: FormField, value: &str) {
        let inputs = &mut self.inputs;
        match field {
            FormField::Income => inputs.income = NumericInput::from(value),
            FormField::LoanAmount => inputs.loan_amount = NumericInput::from(value),
            FormField::MonthlyUnits => inputs.monthly_units = NumericInput::from(value),
            FormField::VehicleType => inputs.vehicle_type = NumericInput::from(value),
            FormField::FuelType => inputs.fuel_type = FuelType::from(value),
            FormField::EcoScore => inputs.eco_score = NumericInput::from(value),
            FormField::CreditScore => inputs.credit_score = NumericInput::from(value),
            FormField::JobType => inputs.job_type = JobType::from(value),
            FormField::LoanHistory => inputs.loan_history = LoanHistory::from(value),
        }
    }

    /// Picks (or replaces) the file for one document slot.
    pub fn select_document(&mut self, kind: DocumentKind, attachment: Attachment) {
        let slot = match kind {
            DocumentKind::RcImage => &mut self.documents.rc_image,
            DocumentKind::BillImage => &mut self.documents.bill_image,
        };
        *slot = Some(attachment);
    }

    pub fn clear_document(&mut self, kind: DocumentKind) {
        match kind {
            DocumentKind::RcImage => self.documents.rc_image = None,
            DocumentKind::BillImage => self.documents.bill_image = None,
        }
    }

    /// Restores the default field values and drops every file selection.
    pub fn reset(&mut self) {
        self.inputs = ManualInputs::default();
        self.documents = OcrInputs::default();
    }

    pub fn snapshot(&self) -> ManualInputs {
        self.inputs.clone()
    }

    pub fn documents(&self) -> OcrInputs {
        self.documents.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let inputs = FormState::new().snapshot();
        assert_eq!(inputs.income, NumericInput::Number(60000.0));
        assert_eq!(inputs.loan_amount, NumericInput::Number(20000.0));
        assert_eq!(inputs.monthly_units, NumericInput::Number(300.0));
        assert_eq!(inputs.vehicle_type, NumericInput::Number(0.0));
        assert_eq!(inputs.fuel_type, FuelType::Petrol);
        assert_eq!(inputs.eco_score, NumericInput::Number(10.0));
        assert_eq!(inputs.credit_score, NumericInput::Number(700.0));
        assert_eq!(inputs.job_type, JobType::Govt);
        assert_eq!(inputs.loan_history, LoanHistory::NoHistory);
    }

    #[test]
    fn test_set_is_field_local_and_reset_restores_defaults() {
        let mut form = FormState::new();
        form.set(FormField::Income, "45000");
        form.set(FormField::JobType, "Freelance");

        let inputs = form.snapshot();
        assert_eq!(inputs.income, NumericInput::Text("45000".to_string()));
        assert_eq!(inputs.job_type, JobType::Other("Freelance".to_string()));
        assert_eq!(inputs.loan_amount, NumericInput::Number(20000.0));

        form.reset();
        assert_eq!(form.snapshot(), ManualInputs::default());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut form = FormState::new();
        let before = form.snapshot();
        form.set(FormField::CreditScore, "550");
        assert_eq!(before.credit_score, NumericInput::Number(700.0));
    }

    #[test]
    fn test_document_selection() {
        let mut form = FormState::new();
        assert_eq!(form.documents(), OcrInputs::default());

        form.select_document(
            DocumentKind::BillImage,
            Attachment::new("bill.jpg", "image/jpeg", vec![1, 2, 3]),
        );
        let documents = form.documents();
        assert!(documents.rc_image.is_none());
        assert_eq!(documents.bill_image.unwrap().file_name, "bill.jpg");

        form.select_document(
            DocumentKind::RcImage,
            Attachment::new("rc.png", "image/png", vec![4]),
        );
        form.clear_document(DocumentKind::BillImage);
        assert!(form.documents().bill_image.is_none());
        assert!(form.documents().rc_image.is_some());

        form.reset();
        assert_eq!(form.documents(), OcrInputs::default());
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!("eco_score".parse::<FormField>(), Ok(FormField::EcoScore));
        assert!("ecoscore".parse::<FormField>().is_err());
    }
}
