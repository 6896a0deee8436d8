#![forbid(unsafe_code)]

//! Structural walker for PCI expansion ROMs.
//!
//! An expansion ROM is a chain of images, each starting with a `0x55 0xAA` header that points at
//! a PCI Data Structure (`PCIR`) describing the image's code type, length and whether another
//! image follows. This crate walks that chain over a borrowed byte slice and reports where each
//! image lives, without executing or decoding any of the embedded code.
//!
//! The walk is a pure function of the input bytes: it never reads outside the slice, never
//! logs, and always terminates with a [`StopReason`].
//!
//! ```
//! let rom = [0u8; 0];
//! let walk = pcirom::walk(&rom);
//! assert!(walk.images.is_empty());
//! assert_eq!(walk.stop, pcirom::StopReason::Empty);
//! ```

mod error;
mod image;
pub mod layout;
mod locate;
mod pcir;
mod walk;

pub use crate::error::PcirError;
pub use crate::image::{CodeType, EfiExtension, ImageCode, ImageDescriptor, LegacyExtension};
pub use crate::layout::{PcirView, RomHeader};
pub use crate::locate::locate_header;
pub use crate::pcir::{resolve_image_length, validate_pcir};
pub use crate::walk::{walk, RomWalk, RomWalker, StopReason};
