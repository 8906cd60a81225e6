use crate::dataset::DatasetIdentity;

#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    #[error("Volume has no slices")]
    EmptyVolume,
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
    #[error("Cannot fill a slot of {slot} channels from {actual} input channels")]
    ChannelMismatch { slot: usize, actual: usize },
    #[error("Predictor failed on the batch starting at slice {start}: {source}")]
    PredictorFailure {
        start: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("Prediction shape {predicted:?} does not match label shape {label:?}")]
    ShapeMismatch {
        predicted: [usize; 4],
        label: [usize; 4],
    },
    #[error("Label must have exactly one channel, got {0}")]
    LabelChannels(usize),
    #[error("Unknown dataset identity '{0}'")]
    UnknownDatasetIdentity(String),
    #[error("Prediction has {available} channels, foreground channel {channel} is out of range")]
    MissingForegroundChannel { channel: usize, available: usize },
    #[error("Tensor data conversion failed: {0}")]
    Data(String),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

/// Pipeline stage a volume was in when it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Preparation,
    Inference,
    Reassembly,
    Evaluation,
}

/// An [`EvalError`] tagged with enough context to diagnose it without re-running.
#[derive(thiserror::Error, Debug)]
#[error("Volume '{volume}' ({dataset}) failed during {stage}: {source}")]
pub struct VolumeError {
    pub volume: String,
    pub dataset: DatasetIdentity,
    pub stage: Stage,
    #[source]
    pub source: EvalError,
}

impl VolumeError {
    pub fn new(
        volume: impl Into<String>,
        dataset: DatasetIdentity,
        stage: Stage,
        source: EvalError,
    ) -> Self {
        Self {
            volume: volume.into(),
            dataset,
            stage,
            source,
        }
    }
}
