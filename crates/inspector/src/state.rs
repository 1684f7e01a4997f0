use serde::Serialize;

use crate::options::InspectorOptions;

/// The three top-level branches of a result tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Point,
    Pixels,
    Objects,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Point => "Point",
            Category::Pixels => "Pixels",
            Category::Objects => "Objects",
        }
    }
}

/// User-adjustable inspector settings.
///
/// Read on every click; changing a flag only affects the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorState {
    pub visible_only: bool,
    pub decimals: u32,
    pub expand_point: bool,
    pub expand_pixels: bool,
    pub expand_objects: bool,
    pub enabled: bool,
}

impl InspectorState {
    pub fn expanded(&self, category: Category) -> bool {
        match category {
            Category::Point => self.expand_point,
            Category::Pixels => self.expand_pixels,
            Category::Objects => self.expand_objects,
        }
    }

    pub fn set_expanded(&mut self, category: Category, expanded: bool) {
        match category {
            Category::Point => self.expand_point = expanded,
            Category::Pixels => self.expand_pixels = expanded,
            Category::Objects => self.expand_objects = expanded,
        }
    }
}

impl From<&InspectorOptions> for InspectorState {
    fn from(options: &InspectorOptions) -> Self {
        Self {
            visible_only: options.visible_only,
            decimals: options.decimals,
            expand_point: options.expand_point,
            expand_pixels: options.expand_pixels,
            expand_objects: options.expand_objects,
            enabled: false,
        }
    }
}
