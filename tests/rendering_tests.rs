/// Rendering tests over server-shaped JSON
use ecocred_client::core::models::PredictionResponse;
use ecocred_client::core::renderer::{render, ReasonTable, SchemeList, Verdict};
use serde_json::json;

fn parse(body: serde_json::Value) -> PredictionResponse {
    serde_json::from_value(body).unwrap()
}

#[test]
fn test_empty_response_renders_defaults() {
    let model = render(&parse(json!({})));

    assert_eq!(model.verdict, Verdict::Rejected);
    assert_eq!(model.probability, "unavailable");
    assert_eq!(model.harmful, ReasonTable::NoEntries);
    assert_eq!(model.helpful, ReasonTable::NoEntries);
    assert_eq!(model.schemes, SchemeList::NoMatchingSchemes);
}

#[test]
fn test_approved_response_with_harmful_reason() {
    let model = render(&parse(json!({
        "prediction": 1,
        "probability": 0.823,
        "reasons": {
            "harmful": [{"feature": "credit_score", "value": 550, "shap_value": -0.12}],
            "helpful": []
        },
        "schemes": []
    })));

    assert_eq!(model.verdict, Verdict::Approved);
    assert_eq!(model.probability, "82.3%");
    assert_eq!(model.harmful.rows().len(), 1);
    assert_eq!(model.harmful.rows()[0].feature, "credit_score");
    assert_eq!(model.harmful.rows()[0].value, "550");
    assert_eq!(model.harmful.rows()[0].shap_value, "-0.1200");
    assert_eq!(model.helpful, ReasonTable::NoEntries);
    assert_eq!(model.schemes, SchemeList::NoMatchingSchemes);

    let text = model.to_string();
    assert!(text.contains("Prediction:  Approved"));
    assert!(text.contains("Probability: 82.3%"));
    assert!(text.contains("no matching schemes"));
}

#[test]
fn test_legacy_keys_are_understood() {
    let model = render(&parse(json!({
        "approval_class": 1,
        "approval_probability": 0.5
    })));

    assert_eq!(model.verdict, Verdict::Approved);
    assert_eq!(model.probability, "50.0%");
}

#[test]
fn test_null_fields_render_like_missing_ones() {
    let model = render(&parse(json!({
        "prediction": null,
        "probability": null,
        "reasons": {"harmful": null, "helpful": [{"feature": "income", "value": "60000"}]},
        "schemes": null
    })));

    assert_eq!(model.verdict, Verdict::Rejected);
    assert_eq!(model.probability, "unavailable");
    assert_eq!(model.harmful, ReasonTable::NoEntries);
    assert_eq!(model.helpful.rows()[0].value, "60000");
    assert_eq!(model.helpful.rows()[0].shap_value, "n/a");
}

#[test]
fn test_display_model_serializes_for_json_output() {
    let model = render(&parse(json!({
        "prediction": 0,
        "probability": 0.2,
        "schemes": [{"name": "PM-KUSUM", "description": "Solar pumps."}]
    })));

    let value = serde_json::to_value(&model).unwrap();
    assert_eq!(value["verdict"], "Rejected");
    assert_eq!(value["probability"], "20.0%");
    assert_eq!(value["harmful"]["status"], "no_entries");
    assert_eq!(value["schemes"]["status"], "schemes");
    assert_eq!(value["schemes"]["schemes"][0]["name"], "PM-KUSUM");
}

#[test]
fn test_null_item_fields_render_blank() {
    let model = render(&parse(json!({
        "prediction": 1,
        "probability": 0.9,
        "reasons": {
            "harmful": [{"feature": null, "value": 550.0, "shap_value": null}],
            "helpful": []
        },
        "schemes": [{"name": "PM-KUSUM", "description": null, "link": "https://pmkusum.mnre.gov.in"}]
    })));

    assert_eq!(model.verdict, Verdict::Approved);
    assert_eq!(model.probability, "90.0%");
    let row = &model.harmful.rows()[0];
    assert_eq!(row.feature, "");
    assert_eq!(row.value, "550");
    assert_eq!(row.shap_value, "n/a");

    let scheme = &model.schemes.schemes()[0];
    assert_eq!(scheme.name, "PM-KUSUM");
    assert_eq!(scheme.description, "");
    assert_eq!(scheme.link.as_deref(), Some("https://pmkusum.mnre.gov.in"));
}

#[test]
fn test_probability_halves_round_up() {
    let model = render(&parse(json!({"prediction": 0, "probability": 0.0025})));
    assert_eq!(model.probability, "0.3%");
}
