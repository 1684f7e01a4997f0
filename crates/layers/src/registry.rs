use thiserror::Error;
use tracing::warn;

use crate::layer::LayerEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("layer already registered: {0}")]
    DuplicateLayer(String),
}

/// Which registered layers a query looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSelection {
    /// Restrict to these layer names. Unknown names are ignored.
    pub names: Option<Vec<String>>,
    /// Skip layers whose style is hidden.
    pub visible_only: bool,
}

impl LayerSelection {
    pub fn all() -> Self {
        Self {
            names: None,
            visible_only: false,
        }
    }

    pub fn visible() -> Self {
        Self {
            names: None,
            visible_only: true,
        }
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn allows<O>(&self, entry: &LayerEntry<O>) -> bool {
        if self.visible_only && !entry.visible() {
            return false;
        }
        match &self.names {
            Some(names) => names.iter().any(|n| n == entry.name()),
            None => true,
        }
    }
}

/// Layers keyed by unique name, iterated in insertion order.
///
/// Ordering contract:
/// - `iter` and `select` yield entries in the order they were first added.
/// - `upsert` on an existing name replaces the entry in place.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRegistry<O> {
    entries: Vec<LayerEntry<O>>,
}

impl<O> Default for LayerRegistry<O> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<O> LayerRegistry<O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, entry: LayerEntry<O>) -> Result<(), RegistryError> {
        if self.position(entry.name()).is_some() {
            return Err(RegistryError::DuplicateLayer(entry.name().to_string()));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Inserts `entry`, replacing any layer with the same name.
    ///
    /// Returns the replaced entry.
    pub fn upsert(&mut self, entry: LayerEntry<O>) -> Option<LayerEntry<O>> {
        match self.position(entry.name()) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx], entry)),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<LayerEntry<O>> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&LayerEntry<O>> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut LayerEntry<O>> {
        self.entries.iter_mut().find(|e| e.name() == name)
    }

    /// Returns `true` if the layer exists.
    pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        let Some(entry) = self.get_mut(name) else {
            return false;
        };
        entry.style.visible = visible;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerEntry<O>> + '_ {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name())
    }

    /// Entries allowed by `selection`, in registry order.
    pub fn select<'a>(&'a self, selection: &LayerSelection) -> Vec<&'a LayerEntry<O>> {
        if let Some(names) = &selection.names {
            for name in names {
                if self.position(name).is_none() {
                    warn!(layer = %name, "inspector layer filter names an unknown layer");
                }
            }
        }
        self.entries.iter().filter(|e| selection.allows(e)).collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name() == name)
    }
}
