/// Braille Unicode canvas used for province outlines.
/// Each terminal cell holds a 2x4 dot grid; patterns live at U+2800..U+28FF.
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>,
    /// Pen that last touched each cell
    pens: Vec<u8>,
    pen: u8,
}

impl BrailleCanvas {
    /// Create a canvas of `width` x `height` characters
    /// (`width*2` x `height*4` dots)
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
            pens: vec![0u8; width * height],
            pen: 0,
        }
    }

    /// Select the pen recorded for subsequently set pixels
    pub fn set_pen(&mut self, pen: u8) {
        self.pen = pen;
    }

    /// Pen of the last pixel set in a cell
    pub fn pen_at(&self, cx: usize, cy: usize) -> u8 {
        if cx >= self.width || cy >= self.height {
            return 0;
        }
        self.pens[cy * self.width + cx]
    }

    /// Dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        let idx = cy * self.width + cx;
        self.cells[idx] |= bit;
        self.pens[idx] = self.pen;
    }

    /// Set a pixel using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Glyph for one character cell, `None` when no dot is set
    pub fn glyph(&self, cx: usize, cy: usize) -> Option<char> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        match self.cells[cy * self.width + cx] {
            0 => None,
            bits => char::from_u32(0x2800 + bits as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.glyph(0, 0), Some('⠁'));
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.glyph(0, 0), Some('⣿'));
    }

    #[test]
    fn test_diagonal_rows() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(0, 0);
        canvas.set_pixel(1, 1);
        canvas.set_pixel(2, 2);
        canvas.set_pixel(3, 3);
        assert_eq!(canvas.glyph(0, 0), Some('⠑'));
        assert_eq!(canvas.glyph(1, 0), Some('⢄'));
    }

    #[test]
    fn test_empty_cells_have_no_glyph() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel(3, 7);
        assert_eq!(canvas.glyph(0, 0), None);
        assert_eq!(canvas.glyph(1, 1), Some('⢀'));
        assert_eq!(canvas.glyph(5, 5), None);
    }

    #[test]
    fn test_last_pen_wins_per_cell() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pen(1);
        canvas.set_pixel(0, 0);
        canvas.set_pixel(2, 0);
        canvas.set_pen(2);
        canvas.set_pixel(1, 1);
        assert_eq!(canvas.pen_at(0, 0), 2);
        assert_eq!(canvas.pen_at(1, 0), 1);
        assert_eq!(canvas.glyph(0, 0), Some('⠑'));
    }
}
