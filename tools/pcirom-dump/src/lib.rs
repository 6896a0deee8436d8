#![forbid(unsafe_code)]

//! Listing the images inside a PCI expansion ROM.
//!
//! The ROM is read either from a dump file or from a PCI function's sysfs `rom` attribute, walked
//! with [`pcirom::walk`], and rendered as text or JSON.

pub mod config;
pub mod render;
pub mod sbdf;
pub mod source;

pub use config::{Config, ConfigError, DEFAULT_MAX_ROM_BYTES, DEFAULT_SYSFS_ROOT};
pub use render::{render_json, render_text, RenderOptions};
pub use sbdf::{Sbdf, SbdfParseError};
pub use source::{read_rom, RomSource};
