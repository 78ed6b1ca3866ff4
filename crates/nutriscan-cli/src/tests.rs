use std::path::PathBuf;

use clap::CommandFactory;

use super::*;

#[test]
fn parses_barcode_command() {
    let cli =
        Cli::try_parse_from(["nutriscan", "barcode", "5000112637922"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Barcode { ref digits } if digits == "5000112637922"
    ));
}

#[test]
fn parses_image_command() {
    let cli = Cli::try_parse_from(["nutriscan", "image", "label.jpg"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Image { ref path } if path == &PathBuf::from("label.jpg")
    ));
}

#[test]
fn parses_decode_command() {
    let cli = Cli::try_parse_from(["nutriscan", "decode", "label.png"]).unwrap();
    assert!(matches!(cli.command, Commands::Decode { .. }));
}

#[test]
fn live_defaults() {
    let cli = Cli::try_parse_from(["nutriscan", "live", "--frames", "captures"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Live {
            ref frames,
            timeout_secs: None,
            continuous: false,
            handoff: None,
            ref output_dir,
        } if frames == &PathBuf::from("captures") && output_dir == &PathBuf::from(".")
    ));
}

#[test]
fn live_with_all_options() {
    let cli = Cli::try_parse_from([
        "nutriscan",
        "live",
        "--frames",
        "captures",
        "--timeout-secs",
        "30",
        "--continuous",
        "--handoff",
        "/tmp/result.json",
        "--output-dir",
        "saved",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Live {
            timeout_secs: Some(30),
            continuous: true,
            handoff: Some(ref h),
            ..
        } if h == &PathBuf::from("/tmp/result.json")
    ));
}

#[test]
fn live_timeout_help_names_the_env_var() {
    let cli = Cli::command();
    let live = cli.find_subcommand("live").expect("live subcommand");
    let timeout = live
        .get_arguments()
        .find(|arg| arg.get_id() == "timeout_secs")
        .expect("timeout argument");
    let help = timeout.get_help().expect("timeout help").to_string();
    assert!(help.contains("NUTRISCAN_SESSION_TIMEOUT_SECS"), "{help}");
}

#[test]
fn live_requires_frames() {
    assert!(Cli::try_parse_from(["nutriscan", "live"]).is_err());
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["nutriscan"]).is_err());
}

#[test]
fn parses_handoff_command() {
    let cli = Cli::try_parse_from(["nutriscan", "handoff", "result.json"]).unwrap();
    assert!(matches!(cli.command, Commands::Handoff { .. }));
}
