use crate::braille::BrailleCanvas;

/// Pixels on then off in a dashed outline
const DASH: u32 = 3;

/// Walk a line with Bresenham's algorithm, calling `plot` for every pixel
fn bresenham(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        plot(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a solid one-pixel line
fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    bresenham(x0, y0, x1, y1, |x, y| canvas.set_pixel_signed(x, y));
}

/// Draw a thicker line (emphasized outlines)
pub fn draw_thick_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line(canvas, x0, y0, x1, y1);
    draw_line(canvas, x0 + 1, y0, x1 + 1, y1);
    draw_line(canvas, x0, y0 + 1, x1, y1 + 1);
}

/// Draw a dashed line. `phase` carries the dash position across the
/// segments of one ring so the pattern does not restart at every vertex.
pub fn draw_dashed_line(
    canvas: &mut BrailleCanvas,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    phase: &mut u32,
) {
    bresenham(x0, y0, x1, y1, |x, y| {
        if (*phase / DASH) % 2 == 0 {
            canvas.set_pixel_signed(x, y);
        }
        *phase = phase.wrapping_add(1);
    });
}
