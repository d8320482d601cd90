use clap::{Parser, Subcommand};
use ecocred_client::core::form_state::FormField;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "ecocred",
    version,
    about = "Loan eligibility decisions with explanations and scheme recommendations"
)]
pub struct Cli {
    /// Prediction server address (overrides ECOCRED_API_URL)
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// Print results as JSON instead of text
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit the manual form (defaults apply to fields not set)
    Predict {
        /// Field assignment, e.g. --set income=45000 --set fuel_type=Electric
        #[arg(short = 's', long = "set", value_parser = parse_assignment)]
        set: Vec<(FormField, String)>,
    },
    /// Upload documents for OCR-based prediction
    Ocr {
        /// Vehicle registration certificate image
        #[arg(long = "rc-image")]
        rc_image: Option<PathBuf>,

        /// Electricity bill image
        #[arg(long = "bill-image")]
        bill_image: Option<PathBuf>,
    },
    /// Talk to the loan assistant (interactive unless --message is given)
    Chat {
        /// Send a single message and exit
        #[arg(short = 'm', long = "message")]
        message: Option<String>,
    },
}

fn parse_assignment(raw: &str) -> Result<(FormField, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", raw))?;
    Ok((field.parse()?, value.to_string()))
}
