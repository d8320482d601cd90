use crate::config::Capabilities;
use crate::errors::ClientError;
use crate::models::ManualInputs;
use regex::Regex;
use std::sync::LazyLock;

/// Shown when a `predict:` payload cannot be decoded.
pub const COMMAND_HINT: &str = r#"Invalid format. Try: predict: {"income":60000,"loan_amount":20000,"monthly_units":300,"vehicle_type":0,"fuel_type":"Petrol","eco_score":10,"credit_score":700,"job_type":"Govt","loan_history":"No History"}"#;

static COMMAND_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^predict:").expect("command prefix pattern is valid"));

/// What a chat submission turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatInput {
    /// Free text for the generic chat endpoint.
    Conversational(String),
    /// An inline manual prediction.
    Command(StructuredCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuredCommand {
    pub inputs: ManualInputs,
}

/// Splits chat text into conversation and `predict:` commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatCommandParser {
    capabilities: Capabilities,
}

impl ChatCommandParser {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    /// Classifies `text`. Only a malformed `predict:` payload is an error.
    pub fn parse(&self, text: &str) -> Result<ChatInput, ClientError> {
        let prefix = match COMMAND_PREFIX.find(text) {
            Some(prefix) if self.capabilities.chat_commands => prefix,
            _ => return Ok(ChatInput::Conversational(text.to_string())),
        };

        let payload = text[prefix.end()..].trim();
        match serde_json::from_str::<ManualInputs>(payload) {
            Ok(inputs) => {
                tracing::debug!("Decoded chat predict command: {:?}", inputs);
                Ok(ChatInput::Command(StructuredCommand { inputs }))
            }
            Err(e) => {
                tracing::warn!("Rejected chat predict command: {}", e);
                Err(ClientError::CommandParse {
                    hint: COMMAND_HINT.to_string(),
                    detail: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuelType, NumericInput};

    #[test]
    fn test_plain_text_is_conversational() {
        let parsed = ChatCommandParser::default()
            .parse("What schemes exist for EV owners?")
            .unwrap();
        assert_eq!(
            parsed,
            ChatInput::Conversational("What schemes exist for EV owners?".to_string())
        );
    }

    #[test]
    fn test_predict_prefix_is_case_insensitive() {
        let parsed = ChatCommandParser::default()
            .parse(r#"PREDICT:   {"income": 60000, "fuel_type": "Electric"}  "#)
            .unwrap();
        match parsed {
            ChatInput::Command(command) => {
                assert_eq!(command.inputs.income, NumericInput::Number(60000.0));
                assert_eq!(command.inputs.fuel_type, FuelType::Electric);
            }
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_must_lead() {
        let parsed = ChatCommandParser::default()
            .parse("please predict: {}")
            .unwrap();
        assert!(matches!(parsed, ChatInput::Conversational(_)));
    }

    #[test]
    fn test_malformed_payload_yields_hint() {
        let err = ChatCommandParser::default()
            .parse("predict: not-json")
            .unwrap_err();
        match err {
            ClientError::CommandParse { hint, .. } => assert_eq!(hint, COMMAND_HINT),
            other => panic!("expected command parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_hint_payload_is_itself_a_valid_command() {
        let example = COMMAND_HINT.trim_start_matches("Invalid format. Try: ");
        let parsed = ChatCommandParser::default().parse(example).unwrap();
        assert!(matches!(parsed, ChatInput::Command(_)));
    }

    #[test]
    fn test_commands_disabled() {
        let parser = ChatCommandParser::new(Capabilities {
            ocr_uploads: true,
            chat_commands: false,
        });
        let parsed = parser.parse("predict: not-json").unwrap();
        assert_eq!(
            parsed,
            ChatInput::Conversational("predict: not-json".to_string())
        );
    }
}
