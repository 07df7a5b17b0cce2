use crate::command_line::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};

pub const NAME: &str = "encode";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Create fingerprints from a file with one reaction SMILES per line")
        .arg(
            Arg::new("input-file")
                .required(true)
                .long("input-file")
                .short('i')
                .num_args(1),
        )
        .arg(
            Arg::new("output-file")
                .required(true)
                .long("output-file")
                .short('o')
                .num_args(1),
        )
        .arg(
            Arg::new("n-folded-length")
                .required(false)
                .long("n-folded-length")
                .short('d')
                .help("Length / dimensionality of the fingerprint; good values are between 128 and 2048")
                .num_args(1),
        )
        .arg(
            Arg::new("min-radius")
                .required(false)
                .long("min-radius")
                .short('m')
                .help("Minimum substructure radius; 0 includes single atoms")
                .num_args(1),
        )
        .arg(
            Arg::new("radius")
                .required(false)
                .long("radius")
                .short('r')
                .help("Maximum substructure radius")
                .num_args(1),
        )
        .arg(
            Arg::new("no-rings")
                .required(false)
                .long("no-rings")
                .help("Do not extract whole rings as substructures")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mapping")
                .required(false)
                .long("mapping")
                .help("Also export a position-to-fragment mapping to help interpret the fingerprint")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("hydrogens")
                .required(false)
                .long("hydrogens")
                .help("Include hydrogen counts in fragment signatures")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("root")
                .required(false)
                .long("root")
                .help("Root central atoms during substructure generation")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("counts")
                .required(false)
                .long("counts")
                .help("Emit occurrence counts instead of presence bits")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("skip-malformed")
                .required(false)
                .long("skip-malformed")
                .help("Replace unparsable lines with all-zero fingerprints instead of failing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .required(false)
                .long("silent")
                .help("Hide progress output")
                .action(ArgAction::SetTrue),
        )
}

pub fn action(matches: &ArgMatches) -> eyre::Result<()> {
    let input_path = matches
        .get_one::<String>("input-file")
        .ok_or(eyre::eyre!("Failed to extract input path"))?;
    let output_path = matches
        .get_one::<String>("output-file")
        .ok_or(eyre::eyre!("Failed to extract output path"))?;

    let n_folded_length = match matches.get_one::<String>("n-folded-length") {
        Some(raw) => raw.parse::<usize>()?,
        None => 2048,
    };
    let min_radius = match matches.get_one::<String>("min-radius") {
        Some(raw) => raw.parse::<usize>()?,
        None => 0,
    };
    let radius = match matches.get_one::<String>("radius") {
        Some(raw) => raw.parse::<usize>()?,
        None => 3,
    };
    let mapping = matches.get_flag("mapping");

    let config = FingerprintConfig {
        n_folded_length,
        min_radius,
        radius,
        rings: !matches.get_flag("no-rings"),
        include_hydrogens: matches.get_flag("hydrogens"),
        root_central_atom: matches.get_flag("root"),
        return_mapping: mapping,
        report_progress: !matches.get_flag("silent"),
        fold_mode: if matches.get_flag("counts") {
            FoldMode::Counts
        } else {
            FoldMode::Binary
        },
        on_malformed: if matches.get_flag("skip-malformed") {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Fail
        },
    };
    let encoder = ReactionEncoder::new(config)?;

    let file = File::open(input_path)?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    let output = encoder.encode_batch(&lines)?;

    if !output.skipped.is_empty() {
        log::warn!(
            "{} of {} lines were malformed and replaced by zero vectors",
            output.skipped.len(),
            lines.len()
        );
    }

    let writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer(writer, &output.fingerprints)?;
    log::info!(
        "wrote {} fingerprints to {}",
        output.fingerprints.len(),
        output_path
    );

    if mapping {
        let map_path = mapping_path(output_path);
        let writer = BufWriter::new(File::create(&map_path)?);
        serde_json::to_writer(writer, &output.mapping)?;
        log::info!("wrote fragment mapping to {}", map_path);
    }

    Ok(())
}

/// Secondary mapping file name: `out.json` becomes `out.map.json`;
/// extensionless paths gain a `.map` suffix.
pub fn mapping_path(output_path: &str) -> String {
    match output_path.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && !extension.contains('/') => {
            format!("{stem}.map.{extension}")
        }
        _ => format!("{output_path}.map"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_path_inserts_before_extension() {
        assert_eq!(mapping_path("fps.json"), "fps.map.json");
        assert_eq!(mapping_path("out/dir/fps.json"), "out/dir/fps.map.json");
        assert_eq!(mapping_path("fps"), "fps.map");
    }
}
