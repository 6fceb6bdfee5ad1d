use super::pixels::{crop, opaque_bounds};
use super::{SourceImage, TrimInfo, TrimResult, TrimmedSprite};

/// Trim transparent borders from an image.
///
/// Takes the source by value: an image that is already tight is moved into
/// the result untouched, anything else is cropped into a fresh buffer.
pub fn trim(source: SourceImage) -> TrimResult {
    let SourceImage { name, image } = source;
    let (width, height) = image.dimensions();

    let Some(bounds) = opaque_bounds(&image) else {
        return TrimResult::Empty {
            name,
            width,
            height,
        };
    };

    let trim_info = TrimInfo {
        left: bounds.x,
        right: width - bounds.right(),
        top: bounds.y,
        bottom: height - bounds.bottom(),
        source_width: width,
        source_height: height,
    };

    let image = if trim_info.was_trimmed() {
        crop(&image, bounds)
    } else {
        image
    };

    TrimResult::Content(TrimmedSprite {
        name,
        image,
        trim_info,
    })
}
