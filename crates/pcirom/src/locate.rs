use crate::layout::{RomHeader, IMAGE_BLOCK_SIZE};

/// Finds the next expansion ROM header at or after `search_offset`.
///
/// Candidates are tried every 512 bytes starting at `search_offset` itself, which need not be
/// aligned. Returns `None` once a full header no longer fits in `rom`.
pub fn locate_header(rom: &[u8], search_offset: usize) -> Option<RomHeader<'_>> {
    let mut offset = search_offset;
    loop {
        let header = RomHeader::at(rom, offset)?;
        if header.has_signature() {
            return Some(header);
        }
        offset = offset.checked_add(IMAGE_BLOCK_SIZE)?;
    }
}
