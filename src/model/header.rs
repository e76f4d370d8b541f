//! Model metadata carried alongside the layer stack

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Earth geometry flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EarthType {
    #[default]
    #[serde(rename = "FLAT EARTH")]
    Flat,
    #[serde(rename = "SPHERICAL EARTH")]
    Spherical,
}

/// Boundary dimensionality flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryType {
    #[default]
    #[serde(rename = "1-D")]
    OneD,
    #[serde(rename = "2-D")]
    TwoD,
    #[serde(rename = "3-D")]
    ThreeD,
}

/// Nature of the velocity within a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VelocityType {
    #[default]
    #[serde(rename = "CONSTANT VELOCITY")]
    Constant,
    #[serde(rename = "VARIABLE VELOCITY")]
    Variable,
}

macro_rules! text_flag {
    ($type:ty, $what:expr, { $($variant:path => $text:literal),+ $(,)? }) => {
        impl $type {
            /// Text used in model files
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($variant => $text,)+
                }
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $type {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(ModelError::Parse {
                        line: 0,
                        reason: format!("unknown {} '{}'", $what, other),
                    }),
                }
            }
        }
    };
}

text_flag!(EarthType, "earth type", {
    EarthType::Flat => "FLAT EARTH",
    EarthType::Spherical => "SPHERICAL EARTH",
});

text_flag!(BoundaryType, "boundary type", {
    BoundaryType::OneD => "1-D",
    BoundaryType::TwoD => "2-D",
    BoundaryType::ThreeD => "3-D",
});

text_flag!(VelocityType, "velocity type", {
    VelocityType::Constant => "CONSTANT VELOCITY",
    VelocityType::Variable => "VARIABLE VELOCITY",
});

/// Model file header (everything except the layers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHeader {
    /// Format version string, e.g. `MODEL.01`
    pub version: String,
    pub name: String,
    /// Unit system, `KGS` for km, km/s and g/cm^3
    pub unit: String,
    pub earth: EarthType,
    pub boundary: BoundaryType,
    pub velocity: VelocityType,
}

impl Default for ModelHeader {
    fn default() -> Self {
        ModelHeader {
            version: "MODEL.01".to_string(),
            name: "TEST MODEL".to_string(),
            unit: "KGS".to_string(),
            earth: EarthType::default(),
            boundary: BoundaryType::default(),
            velocity: VelocityType::default(),
        }
    }
}

impl ModelHeader {
    pub fn named(name: &str) -> Self {
        ModelHeader {
            name: name.to_string(),
            ..ModelHeader::default()
        }
    }
}
