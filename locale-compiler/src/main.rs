mod cli;

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use locale_core::umc::peek_lcid;
use locale_core::uts::{encode_uts, InstalledCatalog};

use cli::Args;

fn add_catalog(path: &Path, seen: &mut HashSet<String>, out: &mut Vec<InstalledCatalog>) {
    let ext_ok = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("umc"))
        .unwrap_or(false);
    if !ext_ok {
        log::warn!("skipping {path:?}: not a .umc file");
        return;
    }

    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        log::warn!("skipping {path:?}: file name is not valid UTF-8");
        return;
    };

    if seen.contains(name) {
        log::warn!("skipping duplicate catalog {name:?}");
        return;
    }

    let lcid = match peek_lcid(path) {
        Ok(lcid) => lcid,
        Err(err) => {
            log::warn!("skipping {path:?}: {err:#}");
            return;
        }
    };

    seen.insert(name.to_string());
    out.push(InstalledCatalog {
        name: name.to_string(),
        lcid,
    });
}

/// Picks the destination directory for `settings.uts`. The first `--output-dir`
/// occurrence wins; repeats are ignored with a warning, matching the
/// duplicate policy already used for `--catalog`/`--catalog-dir`.
fn resolve_output_dir(args: &Args) -> &Path {
    if args.output_dirs.len() > 1 {
        log::warn!(
            "--output-dir repeated {} times, using the first ({:?}) and ignoring the rest",
            args.output_dirs.len(),
            args.output_dirs[0],
        );
    }
    &args.output_dirs[0]
}

fn collect_catalogs(args: &Args) -> Vec<InstalledCatalog> {
    let mut seen = HashSet::new();
    let mut catalogs = Vec::new();

    for path in &args.catalogs {
        add_catalog(path, &mut seen, &mut catalogs);
    }

    for dir in &args.catalog_dirs {
        let pattern = dir.join("*.umc");
        match glob::glob(&pattern.to_string_lossy()) {
            Ok(entries) => {
                for entry in entries {
                    match entry {
                        Ok(path) => add_catalog(&path, &mut seen, &mut catalogs),
                        Err(err) => log::warn!("glob error under {dir:?}: {err}"),
                    }
                }
            }
            Err(err) => log::warn!("invalid catalog-dir pattern {dir:?}: {err}"),
        }
    }

    catalogs
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let catalogs = collect_catalogs(&args);

    let output_dir = resolve_output_dir(&args);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {output_dir:?}"))?;
    let output_path = output_dir.join("settings.uts");
    let file = File::create(&output_path)
        .with_context(|| format!("creating {:?}", output_path))?;

    encode_uts(file, args.default_lcid, args.preferred_lcid, &catalogs)
        .with_context(|| format!("writing {:?}", output_path))?;

    log::info!(
        "wrote {} with {} catalog(s)",
        output_path.display(),
        catalogs.len()
    );
    Ok(())
}
