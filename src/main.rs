//! `molview` command-line tool: parse a PDB file and print the residue
//! palette the view would assign, as JSON.
//!
//! ```text
//! molview <structure.pdb> [options.toml]
//! molview --schema
//! ```

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use molview::color::ColorMap;
use molview::options::Options;
use molview::structure;
use molview::ViewError;

fn palette_json(pdb_path: &Path, options: &Options) -> Result<String, ViewError> {
    let text = std::fs::read_to_string(pdb_path)?;
    let residues = structure::residue_names(&text);
    log::info!(
        "{}: {} distinct residue names",
        pdb_path.display(),
        residues.len()
    );
    let colors = ColorMap::assign(&residues, &options.palette);
    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "residues": residues,
        "colors": colors,
    }))?)
}

fn run(args: &[String]) -> Result<String, ViewError> {
    match args {
        [flag] if flag == "--schema" => {
            Ok(serde_json::to_string_pretty(&Options::json_schema())?)
        }
        [pdb] => palette_json(Path::new(pdb), &Options::default()),
        [pdb, options] => {
            let options = Options::load(Path::new(options))?;
            palette_json(Path::new(pdb), &options)
        }
        _ => Err(ViewError::Protocol(
            "usage: molview <structure.pdb> [options.toml] | --schema".into(),
        )),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = match run(&args) {
        Ok(output) => output,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{output}") {
        log::error!("failed to write output: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
