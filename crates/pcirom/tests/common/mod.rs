#![allow(dead_code)]

//! Helpers for assembling synthetic expansion ROMs.

pub const BLOCK: usize = 512;
pub const DEFAULT_PCIR_OFFSET: u16 = 0x1C;

pub const CODE_TYPE_PCAT: u8 = 0x00;
pub const CODE_TYPE_EFI: u8 = 0x03;

pub const MACHINE_X64: u16 = 0x8664;
pub const SUBSYSTEM_BOOT_SERVICE_DRIVER: u16 = 0x0B;

#[derive(Debug, Clone)]
pub struct Image {
    pub code_type: u8,
    /// PCIR `ImageLength`.
    pub blocks: u16,
    /// Legacy header size byte (PC-AT images only).
    pub size512: u8,
    pub indicator: u8,
    pub pcir_offset: u16,
    pub machine_type: u16,
    pub subsystem: u16,
    pub vendor_id: u16,
    pub device_id: u16,
}

impl Image {
    pub fn efi(blocks: u16) -> Self {
        Self {
            code_type: CODE_TYPE_EFI,
            blocks,
            size512: 0,
            indicator: 0,
            pcir_offset: DEFAULT_PCIR_OFFSET,
            machine_type: MACHINE_X64,
            subsystem: SUBSYSTEM_BOOT_SERVICE_DRIVER,
            vendor_id: 0x8086,
            device_id: 0x1533,
        }
    }

    pub fn legacy(blocks: u16, size512: u8) -> Self {
        Self {
            code_type: CODE_TYPE_PCAT,
            size512,
            ..Self::efi(blocks)
        }
    }

    pub fn with_code_type(mut self, code_type: u8) -> Self {
        self.code_type = code_type;
        self
    }

    pub fn with_pcir_offset(mut self, pcir_offset: u16) -> Self {
        self.pcir_offset = pcir_offset;
        self
    }

    pub fn last(mut self) -> Self {
        self.indicator = 0x80;
        self
    }

    /// Bytes this image occupies when laid out in a chain.
    pub fn span(&self) -> usize {
        let blocks = if self.code_type == CODE_TYPE_PCAT {
            self.blocks.max(u16::from(self.size512))
        } else {
            self.blocks
        };
        usize::from(blocks) * BLOCK
    }

    /// Writes the header and PCIR at `at`. The PCIR is skipped if it would not fit.
    pub fn write(&self, rom: &mut [u8], at: usize) {
        rom[at] = 0x55;
        rom[at + 1] = 0xAA;
        if self.code_type == CODE_TYPE_PCAT {
            rom[at + 2] = self.size512;
            // `jmp rel16` to the init entry point, as real option ROMs have.
            rom[at + 3] = 0xE9;
            rom[at + 4] = 0x40;
            rom[at + 5] = 0x00;
        } else {
            put_u16(rom, at + 2, self.blocks);
            put_u32(rom, at + 4, 0x0EF1);
            put_u16(rom, at + 8, self.subsystem);
            put_u16(rom, at + 0x0A, self.machine_type);
        }
        put_u16(rom, at + 0x18, self.pcir_offset);

        let p = at + usize::from(self.pcir_offset);
        if self.pcir_offset == 0 || p + 0x18 > rom.len() {
            return;
        }
        rom[p..p + 4].copy_from_slice(b"PCIR");
        put_u16(rom, p + 0x04, self.vendor_id);
        put_u16(rom, p + 0x06, self.device_id);
        put_u16(rom, p + 0x0A, 0x18);
        rom[p + 0x0C] = 0; // revision
        rom[p + 0x0D..p + 0x10].copy_from_slice(&[0x00, 0x00, 0x02]);
        put_u16(rom, p + 0x10, self.blocks);
        put_u16(rom, p + 0x12, 1);
        rom[p + 0x14] = self.code_type;
        rom[p + 0x15] = self.indicator;
    }
}

/// Lays `images` out back to back starting at offset 0.
pub fn chain(images: &[Image]) -> Vec<u8> {
    let len = images.iter().map(Image::span).sum::<usize>();
    let mut rom = vec![0u8; len];
    let mut at = 0;
    for image in images {
        image.write(&mut rom, at);
        at += image.span();
    }
    rom
}

pub fn put_u16(buf: &mut [u8], offset: usize, val: u16) {
    buf[offset..offset + 2].copy_from_slice(&val.to_le_bytes());
}

pub fn put_u32(buf: &mut [u8], offset: usize, val: u32) {
    buf[offset..offset + 4].copy_from_slice(&val.to_le_bytes());
}
