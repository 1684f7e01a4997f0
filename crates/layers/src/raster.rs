use std::collections::BTreeMap;
use std::fmt;

use foundation::math::{LatLon, format_float, ground_resolution, round_decimals};
use tracing::debug;

use crate::layer::{LayerEntry, LayerSource};
use crate::query::{EarthEngine, LayerOutcome, LayerSkip, ResultSet, SkipReason};
use crate::registry::{LayerRegistry, LayerSelection};

/// One band value at the clicked pixel.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
    /// Anything else the backend returned, kept as compact JSON.
    Other(String),
}

impl PixelValue {
    /// Converts a raw backend value, rounding floats to `decimals` places.
    pub fn from_json(value: &serde_json::Value, decimals: u32) -> Self {
        match value {
            serde_json::Value::Null => PixelValue::Null,
            serde_json::Value::Bool(b) => PixelValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PixelValue::Integer(i)
                } else if let Some(f) = n.as_f64()
                    && n.is_f64()
                {
                    PixelValue::Float(round_decimals(f, decimals))
                } else {
                    // u64 beyond i64::MAX
                    PixelValue::Other(n.to_string())
                }
            }
            serde_json::Value::String(s) => PixelValue::Text(s.clone()),
            other => PixelValue::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PixelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelValue::Integer(i) => write!(f, "{i}"),
            PixelValue::Float(v) => f.write_str(&format_float(*v)),
            PixelValue::Text(s) => f.write_str(s),
            PixelValue::Bool(b) => write!(f, "{b}"),
            PixelValue::Null => f.write_str("null"),
            PixelValue::Other(s) => f.write_str(s),
        }
    }
}

/// Band values of one layer at the click, keyed (and so sorted) by band name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelSample {
    pub bands: BTreeMap<String, PixelValue>,
}

impl PixelSample {
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// "1 band" or "N bands".
    pub fn band_count_label(&self) -> String {
        match self.bands.len() {
            1 => "1 band".to_string(),
            n => format!("{n} bands"),
        }
    }
}

/// Samples raster layers at a clicked point.
///
/// Failure contract:
/// - A layer whose query fails, or that has no data at the point, is recorded as
///   a `LayerSkip` and the remaining layers are still queried.
/// - Vector layers are skipped as `NotApplicable`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointQueryEngine {
    pub selection: LayerSelection,
    pub decimals: u32,
}

impl PointQueryEngine {
    pub fn new(selection: LayerSelection, decimals: u32) -> Self {
        Self {
            selection,
            decimals,
        }
    }

    pub fn query<B: EarthEngine>(
        &self,
        backend: &B,
        layers: &LayerRegistry<B::Object>,
        coord: LatLon,
        zoom: u8,
    ) -> ResultSet<PixelSample> {
        let scale_m = ground_resolution(coord.lat, zoom);
        let results = layers
            .select(&self.selection)
            .into_iter()
            .map(|entry| {
                self.sample_layer(backend, entry, coord, scale_m)
                    .map(|value| LayerOutcome {
                        layer: entry.name().to_string(),
                        kind: entry.kind(),
                        value,
                    })
                    .map_err(|reason| {
                        debug!(layer = entry.name(), %reason, "pixel query skipped layer");
                        LayerSkip {
                            layer: entry.name().to_string(),
                            reason,
                        }
                    })
            })
            .collect();
        ResultSet::new(results)
    }

    fn sample_layer<B: EarthEngine>(
        &self,
        backend: &B,
        entry: &LayerEntry<B::Object>,
        coord: LatLon,
        scale_m: f64,
    ) -> Result<PixelSample, SkipReason> {
        let mosaic;
        let image = match entry.source() {
            LayerSource::RasterSingle(image) => image,
            LayerSource::RasterCollection(collection) => {
                mosaic = backend.mosaic(collection)?;
                &mosaic
            }
            LayerSource::VectorCollection(_) => {
                return Err(SkipReason::NotApplicable(entry.kind()));
            }
        };

        let raw = backend.reduce_first(image, coord, scale_m)?;
        if raw.is_empty() {
            return Err(SkipReason::NoData);
        }

        let bands = raw
            .iter()
            .map(|(band, value)| (band.clone(), PixelValue::from_json(value, self.decimals)))
            .collect();
        Ok(PixelSample { bands })
    }
}
