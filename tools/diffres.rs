//! Compares two game resources field by field.

use anyhow::{bail, Context};
use kotor::erf::{ResourceIdentifier, ResourceType};
use kotor::patcher::diff::{diff_gff, diff_tlk, diff_twoda};
use kotor::patcher::PatchLogger;
use kotor::{Talktable, TwoDA};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

/// Reports every difference between two GFF, 2DA or TLK files.
#[derive(Debug, StructOpt)]
#[structopt(name = "Diff Resources")]
struct DiffRes {
    /// The reference file.
    #[structopt(name = "old")]
    old: PathBuf,

    /// The file to compare against the reference.
    #[structopt(name = "new")]
    new: PathBuf,

    /// Also print codec debug output.
    #[structopt(short, long)]
    verbose: bool,
}

fn resource_type(path: &Path) -> anyhow::Result<ResourceType> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} is not a file name", path.display()))?;
    Ok(ResourceIdentifier::from_filename(filename)?.restype)
}

fn main() -> anyhow::Result<()> {
    let cli_input = DiffRes::from_args();

    TermLogger::init(
        if cli_input.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        Default::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let restype = resource_type(&cli_input.old)?;
    if resource_type(&cli_input.new)? != restype {
        bail!("cannot compare resources of different types");
    }

    let mut logger = PatchLogger::new();
    let same = if restype.is_gff() {
        let old = kotor::gff::read_gff(&fs::read(&cli_input.old)?)?;
        let new = kotor::gff::read_gff(&fs::read(&cli_input.new)?)?;
        diff_gff(&old, &new, &mut logger)
    } else if restype == ResourceType::TWODA {
        let old = TwoDA::read_from(File::open(&cli_input.old)?)?;
        let new = TwoDA::read_from(File::open(&cli_input.new)?)?;
        diff_twoda(&old, &new, &mut logger)
    } else if restype == ResourceType::TLK {
        let old = Talktable::read_from(File::open(&cli_input.old)?)?;
        let new = Talktable::read_from(File::open(&cli_input.new)?)?;
        diff_tlk(&old, &new, &mut logger)
    } else {
        bail!("cannot compare {} resources", restype);
    };

    if same {
        println!("The files are identical.");
    } else {
        println!("Found {} differences.", logger.notes().count());
        std::process::exit(1);
    }
    Ok(())
}
