use crate::layout::{RomHeader, CODE_TYPE_EFI, CODE_TYPE_PCAT};

/// Coarse classification of the PCIR `CodeType` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeType {
    /// x86 PC-AT compatible BIOS image (code type `0x00`).
    PcAt,
    /// EFI image (code type `0x03`).
    Efi,
    Unknown,
}

impl CodeType {
    pub const fn from_raw(code_type: u8) -> Self {
        match code_type {
            CODE_TYPE_PCAT => Self::PcAt,
            CODE_TYPE_EFI => Self::Efi,
            _ => Self::Unknown,
        }
    }
}

/// Fields of the legacy ROM header that only exist for PC-AT images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyExtension {
    /// Image size in 512-byte units as recorded by the legacy header itself.
    pub size512: u8,
}

/// Fields of the EFI ROM header. Surfaced for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EfiExtension {
    pub machine_type: u16,
    pub subsystem: u16,
}

/// Code-type specific view of an image's ROM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCode {
    PcAt(LegacyExtension),
    Efi(EfiExtension),
    Unknown { code_type: u8 },
}

impl ImageCode {
    pub(crate) fn read(header: &RomHeader<'_>, code_type: u8) -> Self {
        match CodeType::from_raw(code_type) {
            CodeType::PcAt => Self::PcAt(LegacyExtension {
                size512: header.legacy_size512(),
            }),
            CodeType::Efi => Self::Efi(EfiExtension {
                machine_type: header.efi_machine_type(),
                subsystem: header.efi_subsystem(),
            }),
            CodeType::Unknown => Self::Unknown { code_type },
        }
    }

    pub fn code_type(&self) -> CodeType {
        match self {
            Self::PcAt(_) => CodeType::PcAt,
            Self::Efi(_) => CodeType::Efi,
            Self::Unknown { .. } => CodeType::Unknown,
        }
    }

    /// The raw PCIR code type byte.
    pub fn raw(&self) -> u8 {
        match self {
            Self::PcAt(_) => CODE_TYPE_PCAT,
            Self::Efi(_) => CODE_TYPE_EFI,
            Self::Unknown { code_type } => *code_type,
        }
    }
}

/// One image found in a ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Offset of the image's ROM header from the start of the ROM.
    pub offset: usize,
    /// Resolved image length in bytes. Zero only for a last image.
    pub length_bytes: usize,
    pub code: ImageCode,
    /// Raw PCIR `ImageLength`, in 512-byte units.
    pub pcir_image_length: u16,
    pub vendor_id: u16,
    pub device_id: u16,
    pub class_code: u32,
    pub pcir_revision: u8,
    /// PCIR structure length as recorded in the PCIR.
    pub pcir_length: u16,
    pub code_revision: u16,
    /// Indicator bit 7 was set.
    pub last_image: bool,
}

impl ImageDescriptor {
    pub fn code_type(&self) -> CodeType {
        self.code.code_type()
    }

    pub fn machine_type(&self) -> Option<u16> {
        match self.code {
            ImageCode::Efi(efi) => Some(efi.machine_type),
            _ => None,
        }
    }

    pub fn subsystem(&self) -> Option<u16> {
        match self.code {
            ImageCode::Efi(efi) => Some(efi.subsystem),
            _ => None,
        }
    }

    /// One past the last byte this image claims. May lie beyond the end of the ROM.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length_bytes)
    }
}
