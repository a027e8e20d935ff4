//! Observation schema shared by the reward shaper and the policy router

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{Result, SpiderError};

/// Key of the planar x component of the robot-to-target vector
pub const TARGET_VEC_X: &str = "spider_target_vecx";
/// Key of the planar z component of the robot-to-target vector
pub const TARGET_VEC_Z: &str = "spider_target_vecz";
/// Key of the signed heading error, in degrees
pub const OFFSET_ANGLE: &str = "offset_angle";

/// One tick of robot state as seen by the controller
///
/// Produced by the perception side each tick and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub spider_target_vecx: f64,
    pub spider_target_vecz: f64,
    /// Signed heading error in degrees, robot frame
    pub offset_angle: f64,
    /// Any further numeric fields the producer supplied
    #[serde(flatten)]
    pub extra: BTreeMap<String, f64>,
}

impl Observation {
    pub fn new(spider_target_vecx: f64, spider_target_vecz: f64, offset_angle: f64) -> Self {
        Self {
            spider_target_vecx,
            spider_target_vecz,
            offset_angle,
            extra: BTreeMap::new(),
        }
    }

    /// Build an observation from a key/value mapping.
    ///
    /// Missing required keys are reported, never defaulted.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self> {
        let field = |key: &'static str| {
            map.get(key)
                .copied()
                .ok_or(SpiderError::MissingObservationField(key))
        };

        let extra = map
            .iter()
            .filter(|(k, _)| !is_required(k))
            .map(|(k, v)| (k.clone(), *v))
            .collect();

        Ok(Self {
            spider_target_vecx: field(TARGET_VEC_X)?,
            spider_target_vecz: field(TARGET_VEC_Z)?,
            offset_angle: field(OFFSET_ANGLE)?,
            extra,
        })
    }

    /// Build an observation from a JSON object.
    ///
    /// Non-numeric values for the required keys are an error; non-numeric
    /// extra fields are skipped.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| SpiderError::InvalidObservationField {
            field: "<root>".to_string(),
        })?;

        let field = |key: &'static str| -> Result<f64> {
            let raw = object
                .get(key)
                .ok_or(SpiderError::MissingObservationField(key))?;
            raw.as_f64().ok_or_else(|| SpiderError::InvalidObservationField {
                field: key.to_string(),
            })
        };

        let extra = object
            .iter()
            .filter(|(k, _)| !is_required(k))
            .filter_map(|(k, v)| v.as_f64().map(|v| (k.clone(), v)))
            .collect();

        Ok(Self {
            spider_target_vecx: field(TARGET_VEC_X)?,
            spider_target_vecz: field(TARGET_VEC_Z)?,
            offset_angle: field(OFFSET_ANGLE)?,
            extra,
        })
    }

    /// Parse an observation from JSON text
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        Self::from_json(&value)
    }

    /// Squared planar distance to the target
    pub fn squared_target_distance(&self) -> f64 {
        self.spider_target_vecz.powi(2) + self.spider_target_vecx.powi(2)
    }

    /// Look up an extra field by name
    pub fn extra(&self, key: &str) -> Option<f64> {
        self.extra.get(key).copied()
    }
}

fn is_required(key: &str) -> bool {
    matches!(key, TARGET_VEC_X | TARGET_VEC_Z | OFFSET_ANGLE)
}
