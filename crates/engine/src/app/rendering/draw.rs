//! Bounds-checked RGBA primitives over a `pixels` frame buffer.

#[derive(Debug, Clone, Copy)]
pub(crate) struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub(crate) fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

pub(crate) fn write_pixel(frame: &mut [u8], canvas: Canvas, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= canvas.width as i32 || y >= canvas.height as i32 {
        return;
    }
    let Some(offset) = (y as usize)
        .checked_mul(canvas.width as usize)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
    else {
        return;
    };
    let Some(dst) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    if color[3] == 255 {
        dst.copy_from_slice(&color);
        return;
    }
    let alpha = color[3] as u16;
    for channel in 0..3 {
        let blended = (color[channel] as u16 * alpha + dst[channel] as u16 * (255 - alpha)) / 255;
        dst[channel] = blended as u8;
    }
    dst[3] = 255;
}

pub(crate) fn fill_rect(
    frame: &mut [u8],
    canvas: Canvas,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: [u8; 4],
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = x.saturating_add(rect_width).min(canvas.width as i32);
    let end_y = y.saturating_add(rect_height).min(canvas.height as i32);
    for py in start_y..end_y {
        for px in start_x..end_x {
            write_pixel(frame, canvas, px, py, color);
        }
    }
}

pub(crate) fn rect_outline(
    frame: &mut [u8],
    canvas: Canvas,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: [u8; 4],
) {
    if rect_width <= 1 || rect_height <= 1 {
        return;
    }
    fill_rect(frame, canvas, x, y, rect_width, 1, color);
    fill_rect(frame, canvas, x, y + rect_height - 1, rect_width, 1, color);
    fill_rect(frame, canvas, x, y, 1, rect_height, color);
    fill_rect(frame, canvas, x + rect_width - 1, y, 1, rect_height, color);
}

pub(crate) fn fill_disc(
    frame: &mut [u8],
    canvas: Canvas,
    center_x: i32,
    center_y: i32,
    radius: i32,
    color: [u8; 4],
) {
    if radius <= 0 {
        return;
    }
    let radius_sq = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius_sq {
                write_pixel(frame, canvas, center_x + dx, center_y + dy, color);
            }
        }
    }
}

pub(crate) fn ring(
    frame: &mut [u8],
    canvas: Canvas,
    center_x: i32,
    center_y: i32,
    radius: i32,
    thickness: i32,
    color: [u8; 4],
) {
    let inner = (radius - thickness).max(0);
    let (outer_sq, inner_sq) = (radius * radius, inner * inner);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= outer_sq && dist_sq > inner_sq {
                write_pixel(frame, canvas, center_x + dx, center_y + dy, color);
            }
        }
    }
}
