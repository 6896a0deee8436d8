use std::path::PathBuf;

use pcirom::layout::IMAGE_BLOCK_SIZE;
use thiserror::Error;

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/bus/pci/devices";

// The expansion ROM BAR decodes at most 16 MiB.
pub const DEFAULT_MAX_ROM_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max ROM size must be a non-zero multiple of 512 bytes (got {0})")]
    InvalidMaxRomBytes(usize),

    #[error("sysfs root must not be empty")]
    EmptySysfsRoot,
}

/// Settings for acquiring a ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one subdirectory per PCI function, named `ssss:bb:dd.f`.
    pub sysfs_root: PathBuf,
    /// Upper bound on the number of ROM bytes read.
    pub max_rom_bytes: usize,
    /// Write `1`/`0` to the sysfs `rom` attribute around the read.
    pub enable_rom: bool,
    /// Read ROMs larger than `max_rom_bytes` anyway.
    pub force: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            max_rom_bytes: DEFAULT_MAX_ROM_BYTES,
            enable_rom: true,
            force: false,
        }
    }
}

impl Config {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_rom_bytes == 0 || self.max_rom_bytes % IMAGE_BLOCK_SIZE != 0 {
            return Err(ConfigError::InvalidMaxRomBytes(self.max_rom_bytes));
        }
        if self.sysfs_root.as_os_str().is_empty() {
            return Err(ConfigError::EmptySysfsRoot);
        }
        Ok(self)
    }
}
