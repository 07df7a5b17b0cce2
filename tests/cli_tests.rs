use std::fs;

use drfp::command_line::encode;
use tempdir::TempDir;

fn run_encode(args: &[&str]) -> eyre::Result<()> {
    let matches = encode::command().get_matches_from(
        std::iter::once(encode::NAME)
            .chain(args.iter().copied())
            .collect::<Vec<_>>(),
    );
    encode::action(&matches)
}

#[test]
fn encode_writes_fingerprint_file() -> eyre::Result<()> {
    let dir = TempDir::new("drfp-cli")?;
    let input = dir.path().join("reactions.smi");
    let output = dir.path().join("fps.json");
    fs::write(&input, "CC>>CCO\nCCBr.[OH-]>>CCO.[Br-]\n\n")?;

    run_encode(&[
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "-d",
        "64",
        "--silent",
    ])?;

    let fingerprints: Vec<Vec<u32>> = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(fingerprints.len(), 2);
    for fingerprint in &fingerprints {
        assert_eq!(fingerprint.len(), 64);
        assert!(fingerprint.iter().all(|&v| v <= 1));
        assert!(fingerprint.iter().any(|&v| v == 1));
    }
    Ok(())
}

#[test]
fn encode_writes_secondary_mapping_file() -> eyre::Result<()> {
    let dir = TempDir::new("drfp-cli")?;
    let input = dir.path().join("reactions.smi");
    let output = dir.path().join("fps.json");
    fs::write(&input, "CC>>CCO\n")?;

    run_encode(&[
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "-d",
        "32",
        "--mapping",
        "--silent",
    ])?;

    let map_path = dir.path().join("fps.map.json");
    let mapping: serde_json::Value = serde_json::from_str(&fs::read_to_string(&map_path)?)?;
    let object = mapping.as_object().expect("mapping is a JSON object");
    assert!(!object.is_empty());
    for (position, signatures) in object {
        assert!(position.parse::<usize>().unwrap() < 32);
        assert!(!signatures.as_array().unwrap().is_empty());
    }
    Ok(())
}

#[test]
fn encode_fails_on_malformed_line_by_default() -> eyre::Result<()> {
    let dir = TempDir::new("drfp-cli")?;
    let input = dir.path().join("reactions.smi");
    let output = dir.path().join("fps.json");
    fs::write(&input, "CC>>CCO\nnot a reaction\n")?;

    let result = run_encode(&[
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--silent",
    ]);
    assert!(result.is_err());
    Ok(())
}

#[test]
fn encode_skip_malformed_keeps_batch_shape() -> eyre::Result<()> {
    let dir = TempDir::new("drfp-cli")?;
    let input = dir.path().join("reactions.smi");
    let output = dir.path().join("fps.json");
    fs::write(&input, "CC>>CCO\nnot a reaction\nCCBr>>CCI\n")?;

    run_encode(&[
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "-d",
        "32",
        "--skip-malformed",
        "--silent",
    ])?;

    let fingerprints: Vec<Vec<u32>> = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(fingerprints.len(), 3);
    assert!(fingerprints[1].iter().all(|&v| v == 0));
    assert!(fingerprints[2].iter().any(|&v| v == 1));
    Ok(())
}
