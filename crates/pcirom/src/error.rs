use thiserror::Error;

/// Why a PCI Data Structure was rejected.
///
/// Any of these ends the walk: once the PCIR of an image cannot be trusted there is no safe way
/// to find where the next image starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PcirError {
    #[error("PCIR offset is zero")]
    ZeroOffset,

    #[error("PCIR offset {pcir_offset:#x} is not DWORD aligned")]
    Misaligned { pcir_offset: u16 },

    #[error("PCIR at {pcir_start:#x} does not fit in a {rom_len:#x} byte ROM")]
    Truncated { pcir_start: usize, rom_len: usize },

    #[error("bad PCIR signature {found:02x?}")]
    BadSignature { found: [u8; 4] },

    #[error("image length is zero but another image is said to follow")]
    ZeroLength,
}
