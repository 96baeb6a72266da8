//! Shared types and enums used across SARMAP.
//! Includes `Polarization`, `InstrumentMode` and the display parameters
//! (`VisParams`) applied to rendered overlays.
use serde::{Deserialize, Serialize};

/// Sentinel-1 transmit/receive polarisation, also the name of the GRD band it selects.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Polarization {
    #[serde(rename = "VV")]
    Vv,
    #[serde(rename = "VH")]
    Vh,
    #[serde(rename = "HH")]
    Hh,
    #[serde(rename = "HV")]
    Hv,
}

impl Polarization {
    /// Band name in the `COPERNICUS/S1_GRD` collection.
    pub fn band(&self) -> &'static str {
        match self {
            Polarization::Vv => "VV",
            Polarization::Vh => "VH",
            Polarization::Hh => "HH",
            Polarization::Hv => "HV",
        }
    }
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.band())
    }
}

impl std::str::FromStr for Polarization {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VV" => Ok(Polarization::Vv),
            "VH" => Ok(Polarization::Vh),
            "HH" => Ok(Polarization::Hh),
            "HV" => Ok(Polarization::Hv),
            _ => Err(crate::Error::InvalidArgument {
                arg: "polarisation",
                value: s.to_string(),
            }),
        }
    }
}

/// Sentinel-1 acquisition mode. Composites are built from Interferometric
/// Wide swath scenes only.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum InstrumentMode {
    IW,
}

impl std::fmt::Display for InstrumentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentMode::IW => write!(f, "IW"),
        }
    }
}

/// Stretch (and optional palette) used when Earth Engine renders an overlay.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
}

impl VisParams {
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            palette: None,
        }
    }

    /// Backscatter stretch in dB. VH returns are weaker than co-polarised ones,
    /// so the stretch reaches lower.
    pub fn for_polarization(polarization: Polarization) -> Self {
        match polarization {
            Polarization::Vh => Self::range(-27.0, 0.0),
            _ => Self::range(-15.0, 0.0),
        }
    }

    /// Binary mask display: unchanged pixels black, changed pixels red.
    pub fn change_mask() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            palette: Some(vec!["000000".to_string(), "ff0000".to_string()]),
        }
    }
}
