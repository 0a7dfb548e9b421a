use crate::classify::{color_for, ColorBand};
use crate::format::format_population;

/// Lower edge of every legend row
pub const GRADES: [u64; 8] = [
    0,
    500_000,
    1_000_000,
    2_000_000,
    5_000_000,
    10_000_000,
    20_000_000,
    40_000_000,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub band: ColorBand,
    pub label: String,
}

/// Static colour key, built once at startup
#[derive(Debug, Clone)]
pub struct Legend {
    entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn new() -> Self {
        let entries = GRADES
            .iter()
            .enumerate()
            .map(|(i, &grade)| {
                let label = match GRADES.get(i + 1) {
                    Some(&next) => format!(
                        "{}–{}",
                        format_population(grade),
                        format_population(next)
                    ),
                    None => format!("{}+", format_population(grade)),
                };
                LegendEntry {
                    band: color_for(grade + 1),
                    label,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    /// Widest label, for sizing the box
    pub fn label_width(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.label.chars().count())
            .max()
            .unwrap_or(0)
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::new()
    }
}
