use std::path::PathBuf;

use clap::Parser;

const MAX_LCID: u32 = 0x7FFF_FFFF;

fn lcid_in_range(s: &str) -> Result<u32, String> {
    let value: u32 = s.parse().map_err(|_| format!("{s:?} is not a valid unsigned integer"))?;
    if value > MAX_LCID {
        return Err(format!("{value} exceeds the maximum LCID {MAX_LCID}"));
    }
    Ok(value)
}

/// Compiles `.umc` message catalogs into a `settings.uts` artifact.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Include a single catalog file. May be repeated.
    #[arg(long = "catalog")]
    pub catalogs: Vec<PathBuf>,

    /// Include every `*.umc` file found in this directory. May be repeated.
    #[arg(long = "catalog-dir")]
    pub catalog_dirs: Vec<PathBuf>,

    /// Destination directory for `settings.uts`, created if absent. Repeats
    /// are ignored with a warning; the first occurrence wins.
    #[arg(long = "output-dir", required = true)]
    pub output_dirs: Vec<PathBuf>,

    /// Default LCID written into the settings artifact.
    #[arg(long = "default-lcid", value_parser = lcid_in_range, default_value_t = 0)]
    pub default_lcid: u32,

    /// Preferred LCID written into the settings artifact.
    #[arg(long = "preferred-lcid", value_parser = lcid_in_range, default_value_t = 0)]
    pub preferred_lcid: u32,
}
