use tracing::debug;

use crate::error::InspectorError;

/// Icon of the tool that opens the inspector.
pub const INSPECTOR_TOOL_ICON: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolItem {
    pub icon: String,
    pub tooltip: String,
    /// Unselect the item as soon as its selection has been reported.
    pub reset: bool,
    pub selected: bool,
}

impl ToolItem {
    pub fn new(icon: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            tooltip: tooltip.into(),
            reset: true,
            selected: false,
        }
    }

    /// Item that stays selected until something unselects it.
    pub fn sticky(mut self) -> Self {
        self.reset = false;
        self
    }
}

/// Selection change reported to whoever owns the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEvent {
    pub icon: String,
    pub selected: bool,
}

/// Grid of toggle tools; at most one is selected at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolbar {
    items: Vec<ToolItem>,
}

impl Toolbar {
    pub fn new(items: Vec<ToolItem>) -> Result<Self, InspectorError> {
        if items.is_empty() {
            return Err(InspectorError::EmptyToolbar);
        }
        Ok(Self { items })
    }

    /// The map's stock tools: the inspector toggle and a help link.
    pub fn with_default_tools() -> Self {
        Self {
            items: vec![
                ToolItem::new(INSPECTOR_TOOL_ICON, "Inspector").sticky(),
                ToolItem::new("question", "Get help"),
            ],
        }
    }

    pub fn items(&self) -> &[ToolItem] {
        &self.items
    }

    pub fn item(&self, icon: &str) -> Option<&ToolItem> {
        self.items.iter().find(|i| i.icon == icon)
    }

    pub fn selected(&self) -> Option<&ToolItem> {
        self.items.iter().find(|i| i.selected)
    }

    /// Flips the item with `icon`, as a click on its toggle button does.
    ///
    /// Selecting unselects every other item; clicking a selected item unselects it.
    /// Returns the event to hand to the tool, or `None` for an unknown icon.
    pub fn toggle(&mut self, icon: &str) -> Option<ToolEvent> {
        let idx = self.items.iter().position(|i| i.icon == icon)?;
        let selected = !self.items[idx].selected;
        if selected {
            for (i, item) in self.items.iter_mut().enumerate() {
                item.selected = i == idx;
            }
        }
        let item = &mut self.items[idx];
        item.selected = selected && !item.reset;
        debug!(icon, selected, reset = item.reset, "toolbar item toggled");
        Some(ToolEvent {
            icon: icon.to_string(),
            selected,
        })
    }

    /// Sets one item's selection without touching the others.
    ///
    /// Returns `true` if an item with `icon` exists.
    pub fn set_item_selected(&mut self, icon: &str, selected: bool) -> bool {
        let mut found = false;
        for item in self.items.iter_mut().filter(|i| i.icon == icon) {
            item.selected = selected;
            found = true;
        }
        found
    }

    pub fn reset(&mut self) {
        for item in &mut self.items {
            item.selected = false;
        }
    }
}
