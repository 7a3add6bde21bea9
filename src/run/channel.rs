use serde::{Deserialize, Serialize};

use crate::fallback::NestedLookup;

/// Storage type of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// One-dimensional integer series
    Int,
    /// One-dimensional floating point series
    Float,
    /// Multi-dimensional data (spectra, images); not tabular
    Array,
}

/// Values of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelData {
    /// Integer time series
    Int(Vec<i64>),
    /// Floating point time series
    Float(Vec<f64>),
    /// One row per timepoint, each row a spectrum or flattened image
    Array(Vec<Vec<f64>>),
}

impl ChannelData {
    /// Number of timepoints
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Array(v) => v.len(),
        }
    }

    /// Whether the channel holds no timepoints
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage type
    pub fn kind(&self) -> ChannelKind {
        match self {
            Self::Int(_) => ChannelKind::Int,
            Self::Float(_) => ChannelKind::Float,
            Self::Array(_) => ChannelKind::Array,
        }
    }

    /// First reading as a float (baseline channels hold one reading)
    pub fn first_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => v.first().map(|&x| x as f64),
            Self::Float(v) => v.first().copied(),
            Self::Array(v) => v.first().and_then(|row| row.first().copied()),
        }
    }

    /// Approximate size in bytes of the stored values
    pub fn nbytes(&self) -> usize {
        match self {
            Self::Int(v) => v.len() * std::mem::size_of::<i64>(),
            Self::Float(v) => v.len() * std::mem::size_of::<f64>(),
            Self::Array(v) => v.iter().map(|row| row.len() * std::mem::size_of::<f64>()).sum(),
        }
    }
}

/// A named numeric channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel name as recorded by the acquisition system
    pub name: String,
    /// Channel values
    pub data: ChannelData,
}

impl Channel {
    /// Integer channel
    pub fn int(name: impl Into<String>, data: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            data: ChannelData::Int(data),
        }
    }

    /// Floating point channel
    pub fn float(name: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ChannelData::Float(data),
        }
    }

    /// Multi-dimensional channel
    pub fn array(name: impl Into<String>, data: Vec<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ChannelData::Array(data),
        }
    }

    /// Storage type
    pub fn kind(&self) -> ChannelKind {
        self.data.kind()
    }

    /// First reading as a float
    pub fn first_f64(&self) -> Option<f64> {
        self.data.first_f64()
    }
}

// Channels are leaves of a stream lookup.
impl NestedLookup for Channel {
    type Item = Channel;

    fn get_key(&self, _key: &str) -> Option<&Channel> {
        None
    }
}
