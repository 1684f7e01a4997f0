use std::collections::BTreeMap;
use std::fmt;

use foundation::bounds::GeoBounds;
use foundation::math::LatLon;
use thiserror::Error;

use crate::layer::LayerKind;

/// Band name to raw value, as the backend reports a "first" reduction.
pub type BandValues = BTreeMap<String, serde_json::Value>;

/// Region a vector collection is filtered against.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Region {
    Point(LatLon),
    BBox(GeoBounds),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    LinearRing,
    Polygon,
    MultiPolygon,
    GeometryCollection,
    Other(String),
}

impl GeometryType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Point" => GeometryType::Point,
            "MultiPoint" => GeometryType::MultiPoint,
            "LineString" => GeometryType::LineString,
            "MultiLineString" => GeometryType::MultiLineString,
            "LinearRing" => GeometryType::LinearRing,
            "Polygon" => GeometryType::Polygon,
            "MultiPolygon" => GeometryType::MultiPolygon,
            "GeometryCollection" => GeometryType::GeometryCollection,
            other => GeometryType::Other(other.to_string()),
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, GeometryType::Point)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("backend request failed: {0}")]
    Backend(String),
    #[error("object does not support this query")]
    Unsupported,
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// Geospatial backend the inspector queries.
///
/// Every call may block on the network. Failures are reported per call and the
/// engines confine them to the layer being queried.
pub trait EarthEngine {
    type Object;
    type Feature;

    /// Composite an image collection into one image, first available pixel wins.
    fn mosaic(&self, collection: &Self::Object) -> Result<Self::Object, QueryError>;

    /// Sample `image` at `point` with a "first value" reducer at `scale_m` meters per pixel.
    fn reduce_first(
        &self,
        image: &Self::Object,
        point: LatLon,
        scale_m: f64,
    ) -> Result<BandValues, QueryError>;

    /// Geometry type of the collection's first feature, `None` for an empty collection.
    fn first_geometry_type(
        &self,
        collection: &Self::Object,
    ) -> Result<Option<GeometryType>, QueryError>;

    /// First feature of `collection` (backend default order) that falls within `region`.
    fn filter_bounds_first(
        &self,
        collection: &Self::Object,
        region: &Region,
    ) -> Result<Option<Self::Feature>, QueryError>;

    /// Full description of one feature (type, id, geometry, properties).
    fn feature_info(&self, feature: &Self::Feature) -> Result<serde_json::Value, QueryError>;
}

/// Why a layer contributed nothing to a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The query does not apply to this kind of layer.
    NotApplicable(LayerKind),
    /// The reduction returned no bands at the point.
    NoData,
    /// No feature fell within the click region.
    NoMatch,
    Failed(QueryError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotApplicable(kind) => write!(f, "not applicable to {}", kind.type_name()),
            SkipReason::NoData => write!(f, "no data at point"),
            SkipReason::NoMatch => write!(f, "no feature at point"),
            SkipReason::Failed(e) => write!(f, "query failed: {e}"),
        }
    }
}

impl From<QueryError> for SkipReason {
    fn from(e: QueryError) -> Self {
        SkipReason::Failed(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerOutcome<T> {
    pub layer: String,
    pub kind: LayerKind,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSkip {
    pub layer: String,
    pub reason: SkipReason,
}

pub type LayerResult<T> = Result<LayerOutcome<T>, LayerSkip>;

/// Per-layer results of one query, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet<T> {
    results: Vec<LayerResult<T>>,
}

impl<T> Default for ResultSet<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

impl<T> ResultSet<T> {
    pub fn new(results: Vec<LayerResult<T>>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[LayerResult<T>] {
        &self.results
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &LayerOutcome<T>> + '_ {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &LayerSkip> + '_ {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn outcome(&self, layer: &str) -> Option<&LayerOutcome<T>> {
        self.outcomes().find(|o| o.layer == layer)
    }

    /// `true` when at least one layer produced a value.
    pub fn has_outcomes(&self) -> bool {
        self.outcomes().next().is_some()
    }
}
