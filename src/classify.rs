use ratatui::style::Color;

/// Lower bounds (exclusive) of bands 2..=8, ascending.
pub const THRESHOLDS: [u64; 7] = [
    500_000,
    1_000_000,
    2_000_000,
    5_000_000,
    10_000_000,
    20_000_000,
    40_000_000,
];

/// One of the eight fixed population buckets, lightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorBand {
    Band1,
    Band2,
    Band3,
    Band4,
    Band5,
    Band6,
    Band7,
    Band8,
}

impl ColorBand {
    pub const ALL: [ColorBand; 8] = [
        ColorBand::Band1,
        ColorBand::Band2,
        ColorBand::Band3,
        ColorBand::Band4,
        ColorBand::Band5,
        ColorBand::Band6,
        ColorBand::Band7,
        ColorBand::Band8,
    ];

    /// 1-based band number
    pub fn index(self) -> usize {
        self as usize + 1
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ColorBand::Band1 => (0xb3, 0xe5, 0xfc),
            ColorBand::Band2 => (0x4f, 0xc3, 0xf7),
            ColorBand::Band3 => (0x21, 0x96, 0xf3),
            ColorBand::Band4 => (0x3f, 0x51, 0xb5),
            ColorBand::Band5 => (0x67, 0x3a, 0xb7),
            ColorBand::Band6 => (0xef, 0x53, 0x50),
            ColorBand::Band7 => (0xe5, 0x39, 0x35),
            ColorBand::Band8 => (0xb7, 0x1c, 0x1c),
        }
    }

    pub fn color(self) -> Color {
        let (r, g, b) = self.rgb();
        Color::Rgb(r, g, b)
    }
}

/// Map a population count to its band. Thresholds are strict: exactly
/// 500 000 is still band 1.
pub fn color_for(population: u64) -> ColorBand {
    let above = THRESHOLDS.iter().filter(|&&t| population > t).count();
    ColorBand::ALL[above]
}
