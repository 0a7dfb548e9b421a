use crate::data::ProvinceId;
use crate::format::population_label;

pub const TITLE: &str = "Indonesian Province Population";
pub const IDLE_PROMPT: &str = "Hover over a province";

/// What the info box shows for a hovered province
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    pub id: ProvinceId,
    pub name: String,
    /// `None` when the dataset has no record for this boundary
    pub population: Option<u64>,
}

/// The single hover info box. Whoever calls `update` last wins.
#[derive(Debug, Default)]
pub struct InfoPanel {
    current: Option<HoverInfo>,
}

impl InfoPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, info: Option<HoverInfo>) {
        self.current = info;
    }

    pub fn current(&self) -> Option<&HoverInfo> {
        self.current.as_ref()
    }

    /// Body lines below the title
    pub fn lines(&self) -> Vec<String> {
        match &self.current {
            Some(info) => vec![info.name.clone(), population_label(info.population)],
            None => vec![IDLE_PROMPT.to_string()],
        }
    }
}
