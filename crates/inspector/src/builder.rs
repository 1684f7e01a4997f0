use foundation::math::{LatLon, format_float, ground_resolution};
use layers::raster::PixelSample;
use layers::vector::FeatureInfo;
use layers::{LayerOutcome, ResultSet};

use crate::state::{Category, InspectorState};
use crate::tree::{CATEGORY_TOGGLE_ICONS, DisplayNode, DisplayTree, Icon};

/// Assembles query results into the three-branch display tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResultTreeBuilder {
    pub decimals: u32,
}

impl ResultTreeBuilder {
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    /// Expand flags are read from `state` now; later toggles do not touch the result.
    pub fn build(
        &self,
        coord: LatLon,
        zoom: u8,
        pixels: &ResultSet<PixelSample>,
        objects: &ResultSet<FeatureInfo>,
        state: &InspectorState,
    ) -> DisplayTree {
        DisplayTree {
            point: self.point_node(coord, zoom, state.expanded(Category::Point)),
            pixels: self.pixels_node(pixels, state.expanded(Category::Pixels)),
            objects: self.objects_node(objects, state.expanded(Category::Objects)),
        }
    }

    pub fn point_node(&self, coord: LatLon, zoom: u8, expanded: bool) -> DisplayNode {
        let scale = ground_resolution(coord.lat, zoom);
        let d = self.decimals as usize;
        let label = format!(
            "Point ({:.d$}, {:.d$}) at {}m/px",
            coord.lon,
            coord.lat,
            scale.trunc() as i64
        );
        let children = vec![
            DisplayNode::leaf(format!("Longitude: {}", format_float(coord.lon)), Icon::File),
            DisplayNode::leaf(format!("Latitude: {}", format_float(coord.lat)), Icon::File),
            DisplayNode::leaf(format!("Zoom Level: {zoom}"), Icon::File),
            DisplayNode::leaf(
                format!("Scale (approx. m/px): {}", format_float(scale)),
                Icon::File,
            ),
        ];
        category_node(label, Icon::Archive, expanded, children)
    }

    pub fn pixels_node(
        &self,
        pixels: &ResultSet<PixelSample>,
        expanded: bool,
    ) -> Option<DisplayNode> {
        let children: Vec<DisplayNode> = pixels
            .outcomes()
            .filter(|o| !o.value.is_empty())
            .map(|o| pixel_layer_node(o, expanded))
            .collect();
        if children.is_empty() {
            return None;
        }
        Some(category_node(
            Category::Pixels.label(),
            Icon::Archive,
            expanded,
            children,
        ))
    }

    pub fn objects_node(
        &self,
        objects: &ResultSet<FeatureInfo>,
        expanded: bool,
    ) -> Option<DisplayNode> {
        let children: Vec<DisplayNode> = objects
            .outcomes()
            .map(|o| {
                DisplayNode::branch(
                    o.layer.clone(),
                    Icon::Folder,
                    expanded,
                    property_children(&o.value.info, expanded),
                )
            })
            .collect();
        if children.is_empty() {
            return None;
        }
        Some(category_node(
            Category::Objects.label(),
            Icon::Archive,
            expanded,
            children,
        ))
    }
}

fn category_node(
    label: impl Into<String>,
    icon: Icon,
    expanded: bool,
    children: Vec<DisplayNode>,
) -> DisplayNode {
    DisplayNode::branch(label, icon, expanded, children).with_toggle_icons(CATEGORY_TOGGLE_ICONS)
}

fn pixel_layer_node(outcome: &LayerOutcome<PixelSample>, expanded: bool) -> DisplayNode {
    let label = format!(
        "{}: {} ({})",
        outcome.layer,
        outcome.kind.type_name(),
        outcome.value.band_count_label()
    );
    let children = outcome
        .value
        .bands
        .iter()
        .map(|(band, value)| DisplayNode::leaf(format!("{band}: {value}"), Icon::File))
        .collect();
    DisplayNode::branch(label, Icon::Folder, expanded, children)
}

/// Children for a feature description: one node per top-level entry.
fn property_children(info: &serde_json::Value, expanded: bool) -> Vec<DisplayNode> {
    match info {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, value)| property_node(key, value, expanded))
            .collect(),
        other => vec![DisplayNode::leaf(scalar_text(other), Icon::File)],
    }
}

pub fn property_node(key: &str, value: &serde_json::Value, expanded: bool) -> DisplayNode {
    match value {
        serde_json::Value::Object(map) => DisplayNode::branch(
            format!("{key}: Object ({})", count_label(map.len(), "property", "properties")),
            Icon::Folder,
            expanded,
            map.iter()
                .map(|(k, v)| property_node(k, v, expanded))
                .collect(),
        ),
        serde_json::Value::Array(items) => DisplayNode::branch(
            format!("{key}: List ({})", count_label(items.len(), "element", "elements")),
            Icon::Folder,
            expanded,
            items
                .iter()
                .enumerate()
                .map(|(i, v)| property_node(&i.to_string(), v, expanded))
                .collect(),
        ),
        scalar => DisplayNode::leaf(format!("{key}: {}", scalar_text(scalar)), Icon::File),
    }
}

fn count_label(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("1 {singular}")
    } else {
        format!("{n} {plural}")
    }
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(format_float)
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}
