use core::iter::FusedIterator;

use crate::error::PcirError;
use crate::image::{ImageCode, ImageDescriptor};
use crate::layout::INDICATOR_LAST_IMAGE;
use crate::locate::locate_header;
use crate::pcir::{resolve_image_length, validate_pcir};

/// Why a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last described image had the last-image indicator set.
    LastImage,
    /// No further header fits in the ROM, starting the search at `offset`.
    OutOfBounds { offset: usize },
    /// The image header at `header_offset` has an unusable PCI Data Structure.
    InvalidPcir {
        header_offset: usize,
        error: PcirError,
    },
    /// The ROM is zero bytes long.
    Empty,
}

impl StopReason {
    /// `true` when the chain ended the way a well-formed ROM ends.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::LastImage | Self::Empty)
    }
}

/// Eagerly collected result of walking a ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomWalk {
    pub images: Vec<ImageDescriptor>,
    pub stop: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning(usize),
    Terminated(StopReason),
}

enum Step {
    Image(ImageDescriptor),
    Stop(StopReason),
}

/// Lazy walk over the image chain of an expansion ROM.
///
/// Yields one [`ImageDescriptor`] per image in ascending offset order. Once the iterator returns
/// `None`, [`RomWalker::stop_reason`] reports why. A new walker over the same bytes replays the
/// same sequence.
#[derive(Debug, Clone)]
pub struct RomWalker<'a> {
    rom: &'a [u8],
    state: State,
}

impl<'a> RomWalker<'a> {
    pub fn new(rom: &'a [u8]) -> Self {
        let state = if rom.is_empty() {
            State::Terminated(StopReason::Empty)
        } else {
            State::Scanning(0)
        };
        Self { rom, state }
    }

    /// `None` while the walk can still yield images.
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.state {
            State::Scanning(_) => None,
            State::Terminated(reason) => Some(reason),
        }
    }

    /// Runs the walk to completion.
    pub fn finish(mut self) -> RomWalk {
        let mut images = Vec::new();
        loop {
            match self.step() {
                Step::Image(image) => images.push(image),
                Step::Stop(stop) => return RomWalk { images, stop },
            }
        }
    }

    fn step(&mut self) -> Step {
        let offset = match self.state {
            State::Scanning(offset) => offset,
            State::Terminated(reason) => return Step::Stop(reason),
        };

        match describe(self.rom, offset) {
            Ok(image) => {
                self.state = advance(self.rom.len(), &image);
                Step::Image(image)
            }
            Err(reason) => {
                self.state = State::Terminated(reason);
                Step::Stop(reason)
            }
        }
    }
}

impl Iterator for RomWalker<'_> {
    type Item = ImageDescriptor;

    fn next(&mut self) -> Option<ImageDescriptor> {
        match self.step() {
            Step::Image(image) => Some(image),
            Step::Stop(_) => None,
        }
    }
}

impl FusedIterator for RomWalker<'_> {}

/// Walks every image in `rom`.
pub fn walk(rom: &[u8]) -> RomWalk {
    RomWalker::new(rom).finish()
}

fn describe(rom: &[u8], search_offset: usize) -> Result<ImageDescriptor, StopReason> {
    let header = locate_header(rom, search_offset).ok_or(StopReason::OutOfBounds {
        offset: search_offset,
    })?;
    let invalid = |error: PcirError| StopReason::InvalidPcir {
        header_offset: header.offset(),
        error,
    };

    let pcir = validate_pcir(rom, &header).map_err(invalid)?;
    let code = ImageCode::read(&header, pcir.code_type());
    let length_bytes = resolve_image_length(&pcir, &code);
    let last_image = pcir.indicator() & INDICATOR_LAST_IMAGE != 0;
    // A zero-length image with a successor would make the next search start on this same header.
    if length_bytes == 0 && !last_image {
        return Err(invalid(PcirError::ZeroLength));
    }

    Ok(ImageDescriptor {
        offset: header.offset(),
        length_bytes,
        code,
        pcir_image_length: pcir.image_length(),
        vendor_id: pcir.vendor_id(),
        device_id: pcir.device_id(),
        class_code: pcir.class_code(),
        pcir_revision: pcir.revision(),
        pcir_length: pcir.structure_length(),
        code_revision: pcir.code_revision(),
        last_image,
    })
}

fn advance(rom_len: usize, image: &ImageDescriptor) -> State {
    if image.last_image {
        return State::Terminated(StopReason::LastImage);
    }
    match image.offset.checked_add(image.length_bytes) {
        Some(next) if next < rom_len => State::Scanning(next),
        next => State::Terminated(StopReason::OutOfBounds {
            offset: next.unwrap_or(usize::MAX),
        }),
    }
}
