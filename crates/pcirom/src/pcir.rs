use crate::error::PcirError;
use crate::image::ImageCode;
use crate::layout::{PcirView, RomHeader, IMAGE_BLOCK_SIZE, PCIR_SIGNATURE};

/// Locates and validates the PCI Data Structure owned by `header`.
///
/// The PCIR offset must be non-zero and DWORD aligned, the whole structure must fit inside
/// `rom`, and it must carry the `PCIR` signature. No PCIR field is read before all of that holds.
pub fn validate_pcir<'a>(rom: &'a [u8], header: &RomHeader<'_>) -> Result<PcirView<'a>, PcirError> {
    let pcir_offset = header.pcir_offset();
    if pcir_offset == 0 {
        return Err(PcirError::ZeroOffset);
    }
    if pcir_offset & 3 != 0 {
        return Err(PcirError::Misaligned { pcir_offset });
    }

    let pcir_start = header.offset().saturating_add(usize::from(pcir_offset));
    let pcir = PcirView::at(rom, pcir_start).ok_or(PcirError::Truncated {
        pcir_start,
        rom_len: rom.len(),
    })?;

    let found = pcir.signature();
    if found != PCIR_SIGNATURE {
        return Err(PcirError::BadSignature { found });
    }

    Ok(pcir)
}

/// Length of an image in bytes.
///
/// Some legacy cards under-report `ImageLength` in the PCIR while the legacy header's own size
/// byte is right, so PC-AT images use the larger of the two.
pub fn resolve_image_length(pcir: &PcirView<'_>, code: &ImageCode) -> usize {
    let blocks = match code {
        ImageCode::PcAt(legacy) => pcir.image_length().max(u16::from(legacy.size512)),
        ImageCode::Efi(_) | ImageCode::Unknown { .. } => pcir.image_length(),
    };
    usize::from(blocks) * IMAGE_BLOCK_SIZE
}
