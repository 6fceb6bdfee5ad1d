use image::RgbaImage;

use crate::packing::Rect;

/// Bounding box of all pixels with a non-zero alpha, or `None` if there are none
pub fn opaque_bounds(image: &RgbaImage) -> Option<Rect> {
    let (width, height) = image.dimensions();

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] != 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Copy the pixels inside `rect` into a new buffer of the rect's size.
///
/// `rect` must lie within the image.
pub fn crop(image: &RgbaImage, rect: Rect) -> RgbaImage {
    let src_width = image.width() as usize;
    let src = image.as_raw();
    let row_bytes = rect.width as usize * 4;

    let mut cropped = RgbaImage::new(rect.width, rect.height);
    for (dst_y, row) in cropped.chunks_exact_mut(row_bytes).enumerate() {
        let start = ((rect.y as usize + dst_y) * src_width + rect.x as usize) * 4;
        row.copy_from_slice(&src[start..start + row_bytes]);
    }

    cropped
}
