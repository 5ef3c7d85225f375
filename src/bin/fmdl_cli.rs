use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use fmdl_tools_lib::host::JsonHost;
use fmdl_tools_lib::pipeline::{self, ExportOptions, ImportOptions};
use fmdl_tools_lib::presets::presets;
use fmdl_tools_lib::validation::report::Diagnostics;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  fmdl-cli import <file.fmdl> <host.json> [flags]");
    eprintln!("  fmdl-cli export <host.json> <file.fmdl> [flags]");
    eprintln!("  fmdl-cli summary <host.json> [flags]");
    eprintln!("  fmdl-cli inspect <file.fmdl>");
    eprintln!("  fmdl-cli presets");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --no-split            keep meshes whole (over-limit meshes are skipped on export)");
    eprintln!("  --limit <n>           per-part vertex/index limit (default 65535)");
    eprintln!("  --antiblur            enable the anti-blur shader variant (default)");
    eprintln!("  --no-antiblur         disable the anti-blur shader variant");
    eprintln!("  --no-textures         import: skip texture file lookup");
    eprintln!("  --config <file.json>  read options from a JSON file before applying flags");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  fmdl-cli import ./face.fmdl ./face.json");
    eprintln!("  fmdl-cli export ./face.json ./face_out.fmdl --limit 30000 --no-antiblur");
    std::process::exit(1);
}

/// Flags shared by import, export and summary.
#[derive(Debug, Default)]
struct Flags {
    no_split: bool,
    limit: Option<usize>,
    anti_blur: Option<bool>,
    no_textures: bool,
    config: Option<PathBuf>,
}

fn parse_flags(args: &[String]) -> anyhow::Result<Flags> {
    let mut flags = Flags::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--no-split" => flags.no_split = true,
            "--antiblur" => flags.anti_blur = Some(true),
            "--no-antiblur" => flags.anti_blur = Some(false),
            "--no-textures" => flags.no_textures = true,
            "--limit" => {
                let value = args.get(i + 1).ok_or_else(|| anyhow!("--limit requires a value"))?;
                flags.limit = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid --limit '{}'", value))?,
                );
                i += 1;
            }
            "--config" => {
                let value = args.get(i + 1).ok_or_else(|| anyhow!("--config requires a file"))?;
                flags.config = Some(PathBuf::from(value));
                i += 1;
            }
            other => bail!("unknown flag '{}'", other),
        }
        i += 1;
    }
    Ok(flags)
}

fn import_options(flags: &Flags) -> anyhow::Result<ImportOptions> {
    let mut options: ImportOptions = match &flags.config {
        Some(path) => pipeline::load_options(path)?,
        None => ImportOptions::default(),
    };
    if flags.no_split {
        options.split_meshes = false;
    }
    if let Some(limit) = flags.limit {
        options.limit = limit;
    }
    if let Some(anti_blur) = flags.anti_blur {
        options.anti_blur = anti_blur;
    }
    if flags.no_textures {
        options.load_textures = false;
    }
    Ok(options)
}

fn export_options(flags: &Flags) -> anyhow::Result<ExportOptions> {
    let mut options: ExportOptions = match &flags.config {
        Some(path) => pipeline::load_options(path)?,
        None => ExportOptions::default(),
    };
    if flags.no_split {
        options.split_meshes = false;
    }
    if let Some(limit) = flags.limit {
        options.limit = limit;
    }
    if let Some(anti_blur) = flags.anti_blur {
        options.anti_blur = anti_blur;
    }
    Ok(options)
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    eprintln!(
        "  Diagnostics: {} errors, {} warnings, {} info",
        diagnostics.error_count, diagnostics.warning_count, diagnostics.info_count
    );
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let Some(command) = args.get(1) else {
        usage();
    };

    match command.as_str() {
        "import" => {
            if args.len() < 4 {
                usage();
            }
            let fmdl_path = Path::new(&args[2]);
            let options = import_options(&parse_flags(&args[4..])?)?;
            let mut host = JsonHost::new(&args[3]);

            eprintln!("Importing {} ...", fmdl_path.display());
            let report = pipeline::import_file(fmdl_path, &mut host, &options)?;
            eprintln!("Import complete!");
            eprintln!("  Mesh objects: {}", report.mesh_objects);
            eprintln!("  Split meshes: {}", report.split_meshes);
            eprintln!("  Textures found: {}", report.textures_found);
            print_diagnostics(&report.diagnostics);
        }
        "export" => {
            if args.len() < 4 {
                usage();
            }
            let host = JsonHost::new(&args[2]);
            let fmdl_path = Path::new(&args[3]);
            let options = export_options(&parse_flags(&args[4..])?)?;

            eprintln!("Exporting {} ...", fmdl_path.display());
            let report = pipeline::export_file(fmdl_path, &host, &options)?;
            eprintln!("Export complete!");
            eprintln!("  Mesh parts: {}", report.mesh_count);
            eprintln!("  Bytes written: {}", report.bytes.len());
            for rejected in &report.rejected {
                eprintln!("  Skipped: {}", rejected);
            }
            print_diagnostics(&report.diagnostics);
        }
        "summary" => {
            if args.len() < 3 {
                usage();
            }
            let host = JsonHost::new(&args[2]);
            let options = export_options(&parse_flags(&args[3..])?)?;
            print!("{}", pipeline::export_summary(&host, &options)?);
        }
        "inspect" => {
            let Some(path) = args.get(2) else {
                usage();
            };
            let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path))?;
            print!("{}", pipeline::inspect(&bytes)?);
        }
        "presets" => {
            for preset in presets() {
                println!("{:<18} {:<34} {}", preset.id, preset.shader, preset.description);
            }
        }
        _ => usage(),
    }
    Ok(())
}
