#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcirom_dump::{
    read_rom, render_json, render_text, Config, RenderOptions, RomSource, Sbdf,
    DEFAULT_MAX_ROM_BYTES, DEFAULT_SYSFS_ROOT,
};

#[derive(Debug, Parser)]
#[command(name = "pcirom-dump")]
#[command(about = "List the images inside a PCI expansion ROM without executing them")]
struct Cli {
    /// PCI segment, bus, device and function, each in hex (e.g. `0 3 0 0`).
    #[arg(
        value_names = ["SEG", "BUS", "DEV", "FUNC"],
        num_args = 4,
        conflicts_with_all = ["device", "file"]
    )]
    sbdf: Vec<String>,

    /// PCI function as `SSSS:BB:DD.F` or `BB:DD.F`.
    #[arg(long, value_name = "SBDF", conflicts_with = "file")]
    device: Option<Sbdf>,

    /// Read the ROM from a dump file instead of a PCI device.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Directory containing one entry per PCI function.
    #[arg(long, value_name = "DIR", env = "PCIROM_SYSFS_ROOT", default_value = DEFAULT_SYSFS_ROOT)]
    sysfs_root: PathBuf,

    /// Refuse ROMs larger than this many bytes (multiple of 512).
    #[arg(long, value_name = "BYTES", env = "PCIROM_MAX_ROM_BYTES", default_value_t = DEFAULT_MAX_ROM_BYTES)]
    max_rom_bytes: usize,

    /// Do not toggle the sysfs `rom` attribute around the read.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_enable: bool,

    /// Read ROMs larger than --max-rom-bytes anyway.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    force: bool,

    /// Print a JSON report instead of text.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    /// Include PCIR identification fields in the text output.
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let config = Config {
            sysfs_root: self.sysfs_root.clone(),
            max_rom_bytes: self.max_rom_bytes,
            enable_rom: !self.no_enable,
            force: self.force,
        };
        Ok(config.validate()?)
    }

    fn source(&self) -> Result<RomSource> {
        if let Some(path) = &self.file {
            return Ok(RomSource::File(path.clone()));
        }
        if let Some(sbdf) = self.device {
            return Ok(RomSource::Device(sbdf));
        }
        if let [seg, bus, dev, func] = self.sbdf.as_slice() {
            let sbdf = Sbdf::from_hex_parts(seg, bus, dev, func)
                .with_context(|| format!("invalid SBDF {seg} {bus} {dev} {func}"))?;
            return Ok(RomSource::Device(sbdf));
        }
        bail!("specify a PCI function (SEG BUS DEV FUNC or --device) or --file")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config()?;
    let source = cli.source()?;

    let rom = read_rom(&source, &config).with_context(|| format!("read ROM from {source}"))?;
    tracing::info!(%source, bytes = rom.len(), "walking ROM");

    let walk = pcirom::walk(&rom);
    if !walk.stop.is_clean() {
        tracing::warn!(
            images = walk.images.len(),
            stop = ?walk.stop,
            "ROM chain ended early"
        );
    }

    let out = if cli.json {
        render_json(rom.len(), &walk).context("serialize JSON report")?
    } else {
        render_text(rom.len(), &walk, RenderOptions { verbose: cli.verbose })
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(out.as_bytes())
        .and_then(|()| stdout.flush())
        .context("write report")?;
    Ok(())
}
