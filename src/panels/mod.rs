mod info;
mod legend;
mod list;
mod years;

pub use info::{HoverInfo, InfoPanel, IDLE_PROMPT, TITLE as INFO_TITLE};
pub use legend::{Legend, LegendEntry};
pub use list::{ListRow, ProvinceList};
pub use years::YearSelector;
