#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LayerStyle {
    pub visible: bool,
}

impl LayerStyle {
    pub const fn new(visible: bool) -> Self {
        Self { visible }
    }

    pub const fn hidden() -> Self {
        Self::new(false)
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self::new(true)
    }
}
