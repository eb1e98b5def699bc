use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

/// ROI rotation for an EXIF orientation tag. Mirrored and unknown tags map to 0.
pub fn orientation_degrees_from_tag(tag: u32) -> i32 {
    match tag {
        3 => 180,
        6 => 270,
        8 => 90,
        _ => 0,
    }
}

/// Orientation of the JPEG at `path` in degrees, or 0 when it cannot be read.
pub fn read_orientation_degrees(path: &Path) -> i32 {
    let tag = File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|file| {
            exif::Reader::new()
                .read_from_container(&mut BufReader::new(file))
                .map_err(|e| e.to_string())
        })
        .map(|exif| {
            exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        });

    match tag {
        Ok(Some(tag)) => orientation_degrees_from_tag(tag),
        Ok(None) => 0,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No readable EXIF orientation");
            0
        }
    }
}
