//! In-place editing of raw EXIF blobs.
//!
//! The pipeline keeps a photo's EXIF but has to change two things before
//! writing it back out:
//!
//! - **Orientation** (IFD0 tag 0x0112) is reset to 1 once the pixels have
//!   been rotated, or viewers would rotate them a second time.
//! - **Embedded thumbnail** (IFD1) is unlinked. It shows the uncropped frame
//!   and would easily push the blob past the 64 KiB APP1 limit.
//!
//! The blob is a little TIFF file: byte-order mark, magic 42, offset of
//! IFD0, then 12-byte directory entries. Only IFD0 and IFD1 are visited.
//! Malformed blobs are left untouched.

/// Prefix that marks an APP1 segment as EXIF.
pub const EXIF_HEADER: &[u8] = b"Exif\0\0";

const TAG_ORIENTATION: u16 = 0x0112;
const TAG_THUMBNAIL_OFFSET: u16 = 0x0201;
const TAG_THUMBNAIL_LENGTH: u16 = 0x0202;
const TYPE_SHORT: u16 = 3;

/// Drop a leading `Exif\0\0` if present.
pub fn strip_header(blob: &[u8]) -> &[u8] {
    blob.strip_prefix(EXIF_HEADER).unwrap_or(blob)
}

/// Byte-order aware view over a TIFF-structured blob.
struct Tiff<'a> {
    data: &'a mut Vec<u8>,
    big_endian: bool,
}

impl<'a> Tiff<'a> {
    fn open(data: &'a mut Vec<u8>) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        let big_endian = match &data[0..2] {
            b"MM" => true,
            b"II" => false,
            _ => return None,
        };
        let tiff = Self { data, big_endian };
        (tiff.read_u16(2)? == 42).then_some(tiff)
    }

    fn read_u16(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset + 2)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    }

    fn read_u32(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset + 4)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    fn write_u16(&mut self, offset: usize, value: u16) -> Option<()> {
        let bytes = if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.data.get_mut(offset..offset + 2)?.copy_from_slice(&bytes);
        Some(())
    }

    fn write_u32(&mut self, offset: usize, value: u32) -> Option<()> {
        let bytes = if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.data.get_mut(offset..offset + 4)?.copy_from_slice(&bytes);
        Some(())
    }

    fn ifd0(&self) -> Option<usize> {
        Some(self.read_u32(4)? as usize)
    }

    fn entry_count(&self, ifd: usize) -> Option<usize> {
        Some(self.read_u16(ifd)? as usize)
    }

    /// Offset of the directory entry for `tag`, if present.
    fn find_entry(&self, ifd: usize, tag: u16) -> Option<usize> {
        let count = self.entry_count(ifd)?;
        (0..count)
            .map(|i| ifd + 2 + i * 12)
            .find(|&entry| self.read_u16(entry) == Some(tag))
    }

    /// Position of the "next IFD" pointer that follows a directory.
    fn next_pointer(&self, ifd: usize) -> Option<usize> {
        let pos = ifd + 2 + self.entry_count(ifd)? * 12;
        (pos + 4 <= self.data.len()).then_some(pos)
    }
}

/// Set the orientation tag to 1 ("top-left").
///
/// Returns `true` if a tag was found and rewritten.
pub fn reset_orientation(blob: &mut Vec<u8>) -> bool {
    Tiff::open(blob)
        .and_then(|mut tiff| rewrite_orientation(&mut tiff))
        .is_some()
}

fn rewrite_orientation(tiff: &mut Tiff<'_>) -> Option<()> {
    let entry = tiff.find_entry(tiff.ifd0()?, TAG_ORIENTATION)?;
    if tiff.read_u16(entry + 2)? != TYPE_SHORT {
        return None;
    }
    // SHORT values are stored left-justified in the 4-byte value field
    tiff.write_u16(entry + 8, 1)
}

/// Unlink IFD1 and, when its JPEG thumbnail is the tail of the blob,
/// truncate the thumbnail bytes away.
///
/// Returns `true` if an IFD1 was present.
pub fn strip_thumbnail(blob: &mut Vec<u8>) -> bool {
    let Some(mut tiff) = Tiff::open(blob) else {
        return false;
    };
    let Some(pointer) = tiff.ifd0().and_then(|ifd| tiff.next_pointer(ifd)) else {
        return false;
    };
    let ifd1 = match tiff.read_u32(pointer) {
        Some(0) | None => return false,
        Some(offset) => offset as usize,
    };

    let thumbnail = thumbnail_span(&tiff, ifd1);

    if tiff.write_u32(pointer, 0).is_none() {
        return false;
    }

    if let Some((start, end)) = thumbnail {
        if start > ifd1 && start < blob.len() && end >= blob.len() {
            blob.truncate(start);
        }
    }
    true
}

/// Byte range of the JPEG thumbnail referenced by IFD1.
fn thumbnail_span(tiff: &Tiff<'_>, ifd1: usize) -> Option<(usize, usize)> {
    let offset_entry = tiff.find_entry(ifd1, TAG_THUMBNAIL_OFFSET)?;
    let length_entry = tiff.find_entry(ifd1, TAG_THUMBNAIL_LENGTH)?;
    let start = tiff.read_u32(offset_entry + 8)? as usize;
    let len = tiff.read_u32(length_entry + 8)? as usize;
    Some((start, start + len))
}

/// Apply the output policy to a decoded EXIF blob.
///
/// Returns the cleaned TIFF payload (without the `Exif\0\0` header), or
/// `None` if the blob is not valid TIFF.
pub fn clean(blob: &[u8]) -> Option<Vec<u8>> {
    let mut data = strip_header(blob).to_vec();
    Tiff::open(&mut data)?;
    reset_orientation(&mut data);
    strip_thumbnail(&mut data);
    Some(data)
}

/// Orientation value stored in IFD0, if any.
pub fn read_orientation(blob: &[u8]) -> Option<u16> {
    let mut data = strip_header(blob).to_vec();
    let tiff = Tiff::open(&mut data)?;
    let entry = tiff.find_entry(tiff.ifd0()?, TAG_ORIENTATION)?;
    tiff.read_u16(entry + 8)
}
