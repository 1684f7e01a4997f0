use std::fmt;

use serde::Serialize;

use crate::state::Category;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Archive,
    Folder,
    File,
}

/// Icons shown on a collapsible node's toggle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleIcons {
    pub open: &'static str,
    pub close: &'static str,
}

pub const CATEGORY_TOGGLE_ICONS: ToggleIcons = ToggleIcons {
    open: "plus-square",
    close: "minus-square",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNode {
    pub label: String,
    pub icon: Icon,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_icons: Option<ToggleIcons>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn leaf(label: impl Into<String>, icon: Icon) -> Self {
        Self {
            label: label.into(),
            icon,
            expanded: false,
            toggle_icons: None,
            children: Vec::new(),
        }
    }

    pub fn branch(
        label: impl Into<String>,
        icon: Icon,
        expanded: bool,
        children: Vec<DisplayNode>,
    ) -> Self {
        Self {
            label: label.into(),
            icon,
            expanded,
            toggle_icons: None,
            children,
        }
    }

    pub fn with_toggle_icons(mut self, icons: ToggleIcons) -> Self {
        self.toggle_icons = Some(icons);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, label: &str) -> Option<&DisplayNode> {
        self.children.iter().find(|c| c.label == label)
    }

    pub fn child_labels(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.label.as_str()).collect()
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let marker = if self.is_leaf() {
            "-"
        } else if self.expanded {
            "v"
        } else {
            ">"
        };
        writeln!(f, "{:indent$}{marker} {}", "", self.label, indent = depth * 2)?;
        if self.expanded {
            for child in &self.children {
                child.write_outline(f, depth + 1)?;
            }
        }
        Ok(())
    }
}

/// A rendered inspector result.
///
/// Branch contract:
/// - `point` is always present.
/// - `pixels` and `objects` are present only when they have at least one child.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTree {
    pub point: DisplayNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels: Option<DisplayNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<DisplayNode>,
}

impl DisplayTree {
    pub fn branch(&self, category: Category) -> Option<&DisplayNode> {
        match category {
            Category::Point => Some(&self.point),
            Category::Pixels => self.pixels.as_ref(),
            Category::Objects => self.objects.as_ref(),
        }
    }

    /// Top-level nodes in display order.
    pub fn nodes(&self) -> impl Iterator<Item = &DisplayNode> + '_ {
        std::iter::once(&self.point)
            .chain(self.pixels.as_ref())
            .chain(self.objects.as_ref())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Indented outline; collapsed branches hide their children.
impl fmt::Display for DisplayTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes() {
            node.write_outline(f, 0)?;
        }
        Ok(())
    }
}
