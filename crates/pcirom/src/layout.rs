//! Byte layout of the PCI expansion ROM header and the PCI Data Structure (PCIR).
//!
//! All multi-byte fields are little-endian. Offsets are relative to the start of the structure
//! they belong to.
//!
//! The views in this module borrow a fixed-size window of the ROM. Constructing a view is the
//! only place a bounds check happens; field accessors index into the fixed-size array and can
//! never read outside it.

/// ROM images are sized and padded in units of 512 bytes.
pub const IMAGE_BLOCK_SIZE: usize = 512;

/// `0x55, 0xAA` read as a little-endian `u16`.
pub const ROM_HEADER_SIGNATURE: u16 = 0xAA55;

/// Size of the generic expansion ROM header (`PCI_EXPANSION_ROM_HEADER`).
pub const ROM_HEADER_LEN: usize = 0x1A;

pub const ROM_HEADER_SIGNATURE_OFFSET: usize = 0x00;
pub const ROM_HEADER_PCIR_OFFSET: usize = 0x18;

/// Legacy (PC-AT) header: image size in 512-byte units.
pub const LEGACY_SIZE512_OFFSET: usize = 0x02;

/// EFI header: PE subsystem of the embedded driver.
pub const EFI_SUBSYSTEM_OFFSET: usize = 0x08;
/// EFI header: PE machine type of the embedded driver.
pub const EFI_MACHINE_TYPE_OFFSET: usize = 0x0A;

pub const PCIR_SIGNATURE: [u8; 4] = *b"PCIR";

/// Size of the PCI 2.2 data structure. Later revisions append fields after `0x18`; none of them
/// are needed to walk the chain.
pub const PCIR_LEN: usize = 0x18;

pub const PCIR_SIGNATURE_OFFSET: usize = 0x00;
pub const PCIR_VENDOR_ID_OFFSET: usize = 0x04;
pub const PCIR_DEVICE_ID_OFFSET: usize = 0x06;
pub const PCIR_STRUCTURE_LENGTH_OFFSET: usize = 0x0A;
pub const PCIR_REVISION_OFFSET: usize = 0x0C;
pub const PCIR_CLASS_CODE_OFFSET: usize = 0x0D;
pub const PCIR_IMAGE_LENGTH_OFFSET: usize = 0x10;
pub const PCIR_CODE_REVISION_OFFSET: usize = 0x12;
pub const PCIR_CODE_TYPE_OFFSET: usize = 0x14;
pub const PCIR_INDICATOR_OFFSET: usize = 0x15;

pub const CODE_TYPE_PCAT: u8 = 0x00;
pub const CODE_TYPE_EFI: u8 = 0x03;

/// Indicator bit 7: this is the last image in the ROM.
pub const INDICATOR_LAST_IMAGE: u8 = 0x80;

fn window<const N: usize>(rom: &[u8], offset: usize) -> Option<&[u8; N]> {
    let end = offset.checked_add(N)?;
    rom.get(offset..end)?.try_into().ok()
}

fn le_u16<const N: usize>(bytes: &[u8; N], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

/// A bounds-checked view of an expansion ROM header.
#[derive(Debug, Clone, Copy)]
pub struct RomHeader<'a> {
    offset: usize,
    bytes: &'a [u8; ROM_HEADER_LEN],
}

impl<'a> RomHeader<'a> {
    /// Returns `None` when a full header does not fit at `offset`.
    pub fn at(rom: &'a [u8], offset: usize) -> Option<Self> {
        let bytes = window::<ROM_HEADER_LEN>(rom, offset)?;
        Some(Self { offset, bytes })
    }

    /// Offset of this header from the start of the ROM.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn signature(&self) -> u16 {
        le_u16(self.bytes, ROM_HEADER_SIGNATURE_OFFSET)
    }

    pub fn has_signature(&self) -> bool {
        self.signature() == ROM_HEADER_SIGNATURE
    }

    pub fn pcir_offset(&self) -> u16 {
        le_u16(self.bytes, ROM_HEADER_PCIR_OFFSET)
    }

    /// Only meaningful when the PCIR code type is PC-AT.
    pub fn legacy_size512(&self) -> u8 {
        self.bytes[LEGACY_SIZE512_OFFSET]
    }

    /// Only meaningful when the PCIR code type is EFI.
    pub fn efi_subsystem(&self) -> u16 {
        le_u16(self.bytes, EFI_SUBSYSTEM_OFFSET)
    }

    /// Only meaningful when the PCIR code type is EFI.
    pub fn efi_machine_type(&self) -> u16 {
        le_u16(self.bytes, EFI_MACHINE_TYPE_OFFSET)
    }
}

/// A bounds-checked view of a PCI Data Structure. The signature is not checked here.
#[derive(Debug, Clone, Copy)]
pub struct PcirView<'a> {
    bytes: &'a [u8; PCIR_LEN],
}

impl<'a> PcirView<'a> {
    /// Returns `None` when a full PCIR does not fit at `offset`.
    pub fn at(rom: &'a [u8], offset: usize) -> Option<Self> {
        let bytes = window::<PCIR_LEN>(rom, offset)?;
        Some(Self { bytes })
    }

    pub fn signature(&self) -> [u8; 4] {
        let s = PCIR_SIGNATURE_OFFSET;
        [
            self.bytes[s],
            self.bytes[s + 1],
            self.bytes[s + 2],
            self.bytes[s + 3],
        ]
    }

    pub fn vendor_id(&self) -> u16 {
        le_u16(self.bytes, PCIR_VENDOR_ID_OFFSET)
    }

    pub fn device_id(&self) -> u16 {
        le_u16(self.bytes, PCIR_DEVICE_ID_OFFSET)
    }

    pub fn structure_length(&self) -> u16 {
        le_u16(self.bytes, PCIR_STRUCTURE_LENGTH_OFFSET)
    }

    pub fn revision(&self) -> u8 {
        self.bytes[PCIR_REVISION_OFFSET]
    }

    /// 24-bit class code: programming interface, sub-class, base class (low to high byte).
    pub fn class_code(&self) -> u32 {
        let c = PCIR_CLASS_CODE_OFFSET;
        u32::from_le_bytes([self.bytes[c], self.bytes[c + 1], self.bytes[c + 2], 0])
    }

    /// Image length in 512-byte units.
    pub fn image_length(&self) -> u16 {
        le_u16(self.bytes, PCIR_IMAGE_LENGTH_OFFSET)
    }

    pub fn code_revision(&self) -> u16 {
        le_u16(self.bytes, PCIR_CODE_REVISION_OFFSET)
    }

    pub fn code_type(&self) -> u8 {
        self.bytes[PCIR_CODE_TYPE_OFFSET]
    }

    pub fn indicator(&self) -> u8 {
        self.bytes[PCIR_INDICATOR_OFFSET]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_view_requires_full_header() {
        let rom = vec![0u8; ROM_HEADER_LEN];
        assert!(RomHeader::at(&rom, 0).is_some());
        assert!(RomHeader::at(&rom, 1).is_none());
        assert!(RomHeader::at(&rom[..ROM_HEADER_LEN - 1], 0).is_none());
        assert!(RomHeader::at(&rom, usize::MAX).is_none());
    }

    #[test]
    fn header_fields_are_little_endian() {
        let mut rom = vec![0u8; 0x40];
        rom[0] = 0x55;
        rom[1] = 0xAA;
        rom[LEGACY_SIZE512_OFFSET] = 0x7f;
        rom[EFI_SUBSYSTEM_OFFSET..EFI_SUBSYSTEM_OFFSET + 2].copy_from_slice(&0x000Bu16.to_le_bytes());
        rom[EFI_MACHINE_TYPE_OFFSET..EFI_MACHINE_TYPE_OFFSET + 2]
            .copy_from_slice(&0x8664u16.to_le_bytes());
        rom[ROM_HEADER_PCIR_OFFSET..ROM_HEADER_PCIR_OFFSET + 2]
            .copy_from_slice(&0x001Cu16.to_le_bytes());

        let header = RomHeader::at(&rom, 0).unwrap();
        assert!(header.has_signature());
        assert_eq!(header.legacy_size512(), 0x7f);
        assert_eq!(header.efi_subsystem(), 0x000B);
        assert_eq!(header.efi_machine_type(), 0x8664);
        assert_eq!(header.pcir_offset(), 0x1C);
    }

    #[test]
    fn pcir_class_code_is_24_bits() {
        let mut rom = vec![0u8; PCIR_LEN];
        rom[PCIR_CLASS_CODE_OFFSET..PCIR_CLASS_CODE_OFFSET + 3].copy_from_slice(&[0x00, 0x00, 0x03]);
        let pcir = PcirView::at(&rom, 0).unwrap();
        assert_eq!(pcir.class_code(), 0x03_0000);
    }
}
