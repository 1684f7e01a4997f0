use foundation::math::MAX_DECIMALS;
use layers::LayerSelection;
use serde::{Deserialize, Serialize};

use crate::error::InspectorError;

/// Construction-time settings, usually read from JSON.
///
/// Every field is optional in the JSON form; missing fields take the defaults
/// below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectorOptions {
    /// Only inspect these layers.
    pub names: Option<Vec<String>>,
    /// Only inspect layers that are currently shown.
    pub visible_only: bool,
    /// Decimal places for pixel values and the point label.
    pub decimals: u32,
    /// Activate the inspector as soon as it is built.
    pub opened: bool,
    pub expand_point: bool,
    pub expand_pixels: bool,
    pub expand_objects: bool,
}

impl Default for InspectorOptions {
    fn default() -> Self {
        Self {
            names: None,
            visible_only: true,
            decimals: 2,
            opened: true,
            expand_point: false,
            expand_pixels: true,
            expand_objects: false,
        }
    }
}

impl InspectorOptions {
    pub fn from_json_str(json: &str) -> Result<Self, InspectorError> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| InspectorError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), InspectorError> {
        if self.decimals > MAX_DECIMALS {
            return Err(InspectorError::InvalidOptions(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }
        Ok(())
    }

    pub fn selection(&self) -> LayerSelection {
        LayerSelection {
            names: self.names.clone(),
            visible_only: self.visible_only,
        }
    }
}
