use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::volume::Volume;

/// Source collection a volume belongs to.
///
/// The identity decides both which channels are fed to the predictor and which
/// metric family scores the prediction.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum DatasetIdentity {
    Rider,
    Duke,
}

/// Metric family a dataset is scored with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EvaluationRegime {
    /// Voxel overlap over the whole volume: Dice, IoU and sensitivity.
    Overlap,
    /// Per-slice foreground presence: accuracy, precision, recall and F1.
    PresenceAbsence,
}

/// Which input channels survive before they are tiled into the predictor's slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelPolicy {
    FirstOnly,
    All,
}

impl DatasetIdentity {
    /// Parses a dataset tag, rejecting anything that is not a known collection.
    pub fn parse(tag: &str) -> Result<Self, EvalError> {
        tag.trim()
            .parse()
            .map_err(|_| EvalError::UnknownDatasetIdentity(tag.to_string()))
    }

    pub fn regime(self) -> EvaluationRegime {
        match self {
            DatasetIdentity::Rider => EvaluationRegime::Overlap,
            DatasetIdentity::Duke => EvaluationRegime::PresenceAbsence,
        }
    }

    pub fn channel_policy(self) -> ChannelPolicy {
        match self {
            DatasetIdentity::Rider => ChannelPolicy::FirstOnly,
            DatasetIdentity::Duke => ChannelPolicy::All,
        }
    }

    /// Selects this dataset's channels and tiles them until they fill `slot` channels.
    ///
    /// Tiling repeats the whole selected block, so `[a, b]` into a slot of 4 becomes `[a, b, a, b]`.
    pub fn prepare_channels<B: Backend>(
        self,
        volume: &Volume<B>,
        slot: usize,
    ) -> Result<Volume<B>, EvalError> {
        let available = volume.channels();
        if available == 0 {
            return Err(EvalError::ChannelMismatch {
                slot,
                actual: available,
            });
        }

        let selected = match self.channel_policy() {
            ChannelPolicy::FirstOnly => volume.tensor().clone().narrow(1, 0, 1),
            ChannelPolicy::All => volume.tensor().clone(),
        };

        let channels = selected.dims()[1];
        if slot == 0 || slot % channels != 0 {
            return Err(EvalError::ChannelMismatch {
                slot,
                actual: channels,
            });
        }

        let tiled = match slot / channels {
            1 => selected,
            times => selected.repeat_dim(1, times),
        };
        Volume::new(tiled)
    }
}
