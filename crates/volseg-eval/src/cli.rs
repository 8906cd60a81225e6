use clap::Parser;

use crate::config::{ConfigError, EvaluationConfig};
use crate::dataset::DatasetIdentity;
use crate::error::EvalError;

#[derive(Parser, Debug)]
#[command(
    name = "volseg-eval",
    version,
    about = "Evaluate a slice-context segmentation model on 3D volumes"
)]
pub struct EvalArgs {
    /// JSON object merged onto the default configuration.
    #[arg(long, default_value = "{}")]
    pub config: String,
    #[arg(long)]
    pub batch_size: Option<usize>,
    #[arg(long)]
    pub threshold: Option<f64>,
    /// Datasets to evaluate, in order.
    #[arg(long, value_delimiter = ',', default_value = "RIDER,DUKE")]
    pub datasets: Vec<String>,
}

impl EvalArgs {
    /// Configuration from `--config`, with explicit flags taking precedence.
    pub fn to_config(&self) -> Result<EvaluationConfig, ConfigError> {
        let mut config = EvaluationConfig::from_json_override(&self.config)?;
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn dataset_identities(&self) -> Result<Vec<DatasetIdentity>, EvalError> {
        self.datasets
            .iter()
            .map(|tag| DatasetIdentity::parse(tag))
            .collect()
    }
}

pub fn parse_eval_args() -> EvalArgs {
    EvalArgs::parse()
}
