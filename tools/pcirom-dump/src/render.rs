//! Human-readable and JSON reports for a walked ROM.

use std::fmt;

use pcirom::{CodeType, ImageCode, ImageDescriptor, RomWalk, StopReason};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Also print PCIR identification fields.
    pub verbose: bool,
}

pub fn code_type_label(code_type: CodeType) -> &'static str {
    match code_type {
        CodeType::Efi => "EFI",
        CodeType::PcAt => "BIOS",
        CodeType::Unknown => "Unknown",
    }
}

/// PE machine types seen in EFI option ROMs.
pub fn machine_type_name(machine_type: u16) -> Option<&'static str> {
    Some(match machine_type {
        0x014C => "IA32",
        0x0200 => "Itanium",
        0x0EBC => "EBC",
        0x8664 => "X64",
        0x01C2 => "ARM",
        0xAA64 => "AArch64",
        0x5064 => "RISC-V 64",
        _ => return None,
    })
}

pub fn stop_reason_text(stop: &StopReason) -> String {
    match stop {
        StopReason::LastImage => "last image reached".to_string(),
        StopReason::Empty => "no ROM".to_string(),
        StopReason::OutOfBounds { offset } => {
            format!("no further image header at or after +{offset:#x}")
        }
        StopReason::InvalidPcir {
            header_offset,
            error,
        } => format!("invalid PCI data structure for image at +{header_offset:#x}: {error}"),
    }
}

/// Renders the walk as text: a size banner, then one line per image plus EFI details.
pub fn render_text(rom_len: usize, walk: &RomWalk, opts: RenderOptions) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = write_text(&mut out, rom_len, walk, opts);
    out
}

fn write_text(
    out: &mut impl fmt::Write,
    rom_len: usize,
    walk: &RomWalk,
    opts: RenderOptions,
) -> fmt::Result {
    if rom_len == 0 {
        return writeln!(out, "No ROM");
    }

    writeln!(out, "ROM 0x{rom_len:08x} bytes")?;
    writeln!(out, "--------------------")?;
    for image in &walk.images {
        write_image(out, image, opts)?;
    }

    match walk.stop {
        StopReason::LastImage | StopReason::Empty => Ok(()),
        ref stop => writeln!(out, "stopped: {}", stop_reason_text(stop)),
    }
}

fn write_image(
    out: &mut impl fmt::Write,
    image: &ImageDescriptor,
    opts: RenderOptions,
) -> fmt::Result {
    writeln!(
        out,
        "+{:#x}: {} image ({:#x} bytes)",
        image.offset,
        code_type_label(image.code_type()),
        image.length_bytes
    )?;

    if opts.verbose {
        writeln!(
            out,
            "  Vendor/Device: {:04x}:{:04x}",
            image.vendor_id, image.device_id
        )?;
        writeln!(out, "  Class Code:   {:06x}", image.class_code)?;
        writeln!(out, "  PCIR Revision: {}", image.pcir_revision)?;
        writeln!(out, "  PCIR Length:   {:#x}", image.pcir_length)?;
    }

    if let (Some(machine_type), Some(subsystem)) = (image.machine_type(), image.subsystem()) {
        match machine_type_name(machine_type) {
            Some(name) if opts.verbose => {
                writeln!(out, "  Machine Type: {machine_type:#x} ({name})")?;
            }
            _ => writeln!(out, "  Machine Type: {machine_type:#x}")?,
        }
        writeln!(out, "  Subsystem:    {subsystem:#x}")?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport {
    rom_size: usize,
    images: Vec<JsonImage>,
    stop: JsonStop,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonImage {
    offset: usize,
    code_type: &'static str,
    raw_code_type: u8,
    length_bytes: usize,
    pcir_image_length: u16,
    vendor_id: u16,
    device_id: u16,
    class_code: u32,
    pcir_revision: u8,
    pcir_length: u16,
    code_revision: u16,
    last_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    legacy_size512: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    machine_type: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subsystem: Option<u16>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonStop {
    reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl From<&ImageDescriptor> for JsonImage {
    fn from(image: &ImageDescriptor) -> Self {
        let legacy_size512 = match image.code {
            ImageCode::PcAt(legacy) => Some(legacy.size512),
            _ => None,
        };
        Self {
            offset: image.offset,
            code_type: code_type_label(image.code_type()),
            raw_code_type: image.code.raw(),
            length_bytes: image.length_bytes,
            pcir_image_length: image.pcir_image_length,
            vendor_id: image.vendor_id,
            device_id: image.device_id,
            class_code: image.class_code,
            pcir_revision: image.pcir_revision,
            pcir_length: image.pcir_length,
            code_revision: image.code_revision,
            last_image: image.last_image,
            legacy_size512,
            machine_type: image.machine_type(),
            subsystem: image.subsystem(),
        }
    }
}

fn json_stop(stop: &StopReason) -> JsonStop {
    match stop {
        StopReason::LastImage => JsonStop {
            reason: "ok",
            offset: None,
            detail: None,
        },
        StopReason::Empty => JsonStop {
            reason: "empty",
            offset: None,
            detail: None,
        },
        StopReason::OutOfBounds { offset } => JsonStop {
            reason: "outOfBounds",
            offset: Some(*offset),
            detail: None,
        },
        StopReason::InvalidPcir {
            header_offset,
            error,
        } => JsonStop {
            reason: "invalidPcir",
            offset: Some(*header_offset),
            detail: Some(error.to_string()),
        },
    }
}

pub fn render_json(rom_len: usize, walk: &RomWalk) -> serde_json::Result<String> {
    let report = JsonReport {
        rom_size: rom_len,
        images: walk.images.iter().map(JsonImage::from).collect(),
        stop: json_stop(&walk.stop),
    };
    let mut out = serde_json::to_string_pretty(&report)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcirom::{EfiExtension, LegacyExtension, PcirError};

    fn image(
        offset: usize,
        length_bytes: usize,
        code: ImageCode,
        last_image: bool,
    ) -> ImageDescriptor {
        ImageDescriptor {
            offset,
            length_bytes,
            code,
            pcir_image_length: (length_bytes / 512) as u16,
            vendor_id: 0x10de,
            device_id: 0x1c82,
            class_code: 0x03_0000,
            pcir_revision: 3,
            pcir_length: 0x1C,
            code_revision: 1,
            last_image,
        }
    }

    fn sample_walk() -> RomWalk {
        RomWalk {
            images: vec![
                image(0, 0xE000, ImageCode::PcAt(LegacyExtension { size512: 0x70 }), false),
                image(
                    0xE000,
                    0x2000,
                    ImageCode::Efi(EfiExtension {
                        machine_type: 0x8664,
                        subsystem: 0x0B,
                    }),
                    true,
                ),
            ],
            stop: StopReason::LastImage,
        }
    }

    #[test]
    fn empty_rom_prints_no_rom() {
        let walk = pcirom::walk(&[]);
        assert_eq!(render_text(0, &walk, RenderOptions::default()), "No ROM\n");
    }

    #[test]
    fn text_lists_images_and_efi_details() {
        let text = render_text(0x10000, &sample_walk(), RenderOptions::default());
        assert_eq!(
            text,
            "ROM 0x00010000 bytes\n\
             --------------------\n\
             +0x0: BIOS image (0xe000 bytes)\n\
             +0xe000: EFI image (0x2000 bytes)\n\
             \x20 Machine Type: 0x8664\n\
             \x20 Subsystem:    0xb\n"
        );
    }

    #[test]
    fn verbose_text_adds_identification() {
        let text = render_text(0x10000, &sample_walk(), RenderOptions { verbose: true });
        assert!(text.contains("  Vendor/Device: 10de:1c82\n"));
        assert!(text.contains("  Class Code:   030000\n"));
        assert!(text.contains("  PCIR Revision: 3\n"));
        assert!(text.contains("  PCIR Length:   0x1c\n"));
        assert!(text.contains("  Machine Type: 0x8664 (X64)\n"));
    }

    #[test]
    fn default_text_omits_pcir_details() {
        let text = render_text(0x10000, &sample_walk(), RenderOptions::default());
        assert!(!text.contains("PCIR Revision"));
        assert!(!text.contains("PCIR Length"));
    }

    #[test]
    fn abnormal_stop_is_reported() {
        let walk = RomWalk {
            images: Vec::new(),
            stop: StopReason::InvalidPcir {
                header_offset: 0,
                error: PcirError::Misaligned { pcir_offset: 0x1e },
            },
        };
        let text = render_text(512, &walk, RenderOptions::default());
        assert!(text.ends_with(
            "stopped: invalid PCI data structure for image at +0x0: PCIR offset 0x1e is not DWORD aligned\n"
        ));
    }

    #[test]
    fn json_report_shape() {
        let json = render_json(0x10000, &sample_walk()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["romSize"], 0x10000);
        assert_eq!(value["stop"]["reason"], "ok");
        assert_eq!(value["images"][0]["codeType"], "BIOS");
        assert_eq!(value["images"][0]["legacySize512"], 0x70);
        assert!(value["images"][0].get("machineType").is_none());
        assert_eq!(value["images"][1]["codeType"], "EFI");
        assert_eq!(value["images"][1]["machineType"], 0x8664);
        assert_eq!(value["images"][1]["lastImage"], true);
        assert_eq!(value["images"][1]["pcirRevision"], 3);
        assert_eq!(value["images"][1]["pcirLength"], 0x1C);
    }
}
