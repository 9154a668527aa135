use crate::math::BBox;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier the external tracker assigns to a physical object.
pub type TrackId = u64;

/// Class label carried by detections and inherited by tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionClass {
    EmptySpot,
    Car,
    Occupied,
    /// Any label the engine does not reconcile; such tracks are skipped.
    #[serde(other)]
    Unknown,
}

impl DetectionClass {
    pub fn from_label(label: &str) -> Self {
        match label {
            "empty_spot" => Self::EmptySpot,
            "car" => Self::Car,
            "occupied" => Self::Occupied,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EmptySpot => "empty_spot",
            Self::Car => "car",
            Self::Occupied => "occupied",
            Self::Unknown => "unknown",
        }
    }
}

/// Single detector output, valid for one frame only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BBox,
    pub confidence: f32,
    pub class: DetectionClass,
}

impl Detection {
    pub fn new(bbox: BBox, confidence: f32, class: DetectionClass) -> Self {
        Self {
            bbox,
            confidence,
            class,
        }
    }
}

/// The three independent detector outputs for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSet {
    pub empty_spots: Vec<Detection>,
    pub cars: Vec<Detection>,
    pub occupied: Vec<Detection>,
}

impl DetectionSet {
    pub fn len(&self) -> usize {
        self.empty_spots.len() + self.cars.len() + self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union of all classes in tracker input order: spots, cars, occupied.
    pub fn into_all(self) -> Vec<Detection> {
        let mut all = self.empty_spots;
        all.extend(self.cars);
        all.extend(self.occupied);
        all
    }
}

/// Tracker output; the engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub bbox: BBox,
    pub class: DetectionClass,
    pub confidence: Option<f32>,
    pub confirmed: bool,
}

impl Track {
    pub fn confidence_or(&self, default: f32) -> f32 {
        self.confidence.unwrap_or(default)
    }
}

/// Identity of a parking spot tracked across frames.
///
/// `Natural` spots inherit a tracker id. `Synthetic` spots are created for
/// occupied evidence that matched no known spot and render as `direct_<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpotId {
    Natural(TrackId),
    Synthetic(TrackId),
}

impl SpotId {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic(_))
    }

    pub fn track_id(&self) -> TrackId {
        match self {
            Self::Natural(id) | Self::Synthetic(id) => *id,
        }
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Natural(id) => write!(f, "{}", id),
            Self::Synthetic(id) => write!(f, "direct_{}", id),
        }
    }
}

impl FromStr for SpotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (raw, synthetic) = match s.strip_prefix("direct_") {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let id = raw
            .parse::<TrackId>()
            .map_err(|err| format!("invalid spot id {:?}: {}", s, err))?;
        Ok(if synthetic {
            Self::Synthetic(id)
        } else {
            Self::Natural(id)
        })
    }
}

impl Serialize for SpotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SpotId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
