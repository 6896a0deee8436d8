//! Getting ROM bytes into memory, from a dump file or from the Linux sysfs `rom` attribute.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::sbdf::Sbdf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RomSource {
    File(PathBuf),
    Device(Sbdf),
}

impl fmt::Display for RomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Device(sbdf) => write!(f, "PCI {sbdf}"),
        }
    }
}

/// Reads the ROM described by `source`.
///
/// A device without a `rom` attribute yields an empty buffer, which the walker reports as
/// "no ROM".
pub fn read_rom(source: &RomSource, config: &Config) -> Result<Vec<u8>> {
    match source {
        RomSource::File(path) => read_limited(path, config),
        RomSource::Device(sbdf) => read_device_rom(*sbdf, config),
    }
}

/// `<sysfs_root>/<ssss:bb:dd.f>`
pub fn sysfs_device_dir(config: &Config, sbdf: Sbdf) -> PathBuf {
    config.sysfs_root.join(sbdf.to_string())
}

fn read_device_rom(sbdf: Sbdf, config: &Config) -> Result<Vec<u8>> {
    let dir = sysfs_device_dir(config, sbdf);
    if !dir.is_dir() {
        bail!(
            "SBDF {sbdf} not found under {}",
            config.sysfs_root.display()
        );
    }

    let rom_path = dir.join("rom");
    if !rom_path.exists() {
        tracing::info!(%sbdf, "device has no ROM attribute");
        return Ok(Vec::new());
    }
    if !config.enable_rom {
        return read_limited(&rom_path, config);
    }

    // The kernel only exposes ROM contents while the attribute is enabled.
    set_rom_enabled(&rom_path, true)?;
    let result = read_limited(&rom_path, config);
    if let Err(err) = set_rom_enabled(&rom_path, false) {
        tracing::warn!(path = %rom_path.display(), "failed to disable ROM: {err:#}");
    }
    result
}

fn set_rom_enabled(path: &Path, enabled: bool) -> Result<()> {
    tracing::debug!(path = %path.display(), enabled, "toggling ROM attribute");
    let value: &[u8] = if enabled { b"1" } else { b"0" };
    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .with_context(|| format!("open {} for writing", path.display()))?;
    file.write_all(value)
        .with_context(|| format!("write {} to {}", enabled as u8, path.display()))
}

fn read_limited(path: &Path, config: &Config) -> Result<Vec<u8>> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;

    let mut data = Vec::new();
    let read = if config.force {
        file.read_to_end(&mut data)
    } else {
        // One byte past the limit is enough to tell an oversized ROM apart.
        let limit = (config.max_rom_bytes as u64).saturating_add(1);
        Read::by_ref(&mut file).take(limit).read_to_end(&mut data)
    };
    read.with_context(|| format!("read {}", path.display()))?;

    if !config.force && data.len() > config.max_rom_bytes {
        bail!(
            "{} is larger than {} bytes (use --force to read it anyway)",
            path.display(),
            config.max_rom_bytes
        );
    }

    tracing::debug!(path = %path.display(), bytes = data.len(), "read ROM");
    Ok(data)
}
