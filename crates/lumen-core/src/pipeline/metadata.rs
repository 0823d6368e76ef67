//! EXIF orientation lookup for descriptor probing.

use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads the few EXIF fields the thumbnail engine needs.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// EXIF orientation (1-8) of an image file.
    ///
    /// Returns `None` if the file has no EXIF data, the tag is missing or the
    /// value is out of range.
    pub fn orientation(path: &Path) -> Option<u8> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        let exif = Reader::new().read_from_container(&mut reader).ok()?;

        Self::get_u32(&exif, Tag::Orientation)
            .filter(|o| (1..=8).contains(o))
            .map(|o| o as u8)
    }

    /// Get a u32 field from EXIF data.
    fn get_u32(exif: &exif::Exif, tag: Tag) -> Option<u32> {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Short(v) => v.first().map(|&x| x as u32),
                Value::Long(v) => v.first().copied(),
                _ => None,
            })
    }
}
