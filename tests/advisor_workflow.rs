// Advisor workflow tests
// Settings file -> CLI command -> JSON report, the way an operator drives it.

use chatterkit::cli::{load_config, run, Cli};
use chatterkit::{Config, EnvelopeSettings, MachineLimits, ModalOverride};
use clap::Parser;
use tempfile::TempDir;

fn write_config(dir: &TempDir, config: &Config) -> String {
    let path = dir.path().join("chatterkit.toml");
    config.save_to_file(&path).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_config_machine_profile_drives_envelope() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.machine = MachineLimits::new(12000.0, 15.0, 80.0).with_modal(ModalOverride {
        natural_frequency: Some(800.0),
        damping_ratio: Some(0.03),
        modal_stiffness: Some(2.0e4),
    });
    let path = write_config(&dir, &config);

    let cli = Cli::try_parse_from([
        "chatterkit", "--config", &path, "envelope", "--rpm", "15000", "--feed", "400", "--depth",
        "0.5",
    ])
    .unwrap();
    let loaded = load_config(&cli).unwrap();
    assert_eq!(loaded.machine, config.machine);

    let report = run(&cli.command, &loaded).unwrap();
    assert_eq!(report["rpm_ok"], false);
    assert_eq!(report["overall_ok"], false);
    // Modal data from the profile: stability was checked
    assert!(report["critical_depth"].is_number());
}

#[test]
fn test_cli_flags_override_machine_profile() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &Config::default());

    let cli = Cli::try_parse_from([
        "chatterkit",
        "envelope",
        "--rpm",
        "15000",
        "--feed",
        "200",
        "--depth",
        "0.5",
        "--machine-max-rpm",
        "24000",
        "--config",
        &path,
    ])
    .unwrap();
    let report = run(&cli.command, &load_config(&cli).unwrap()).unwrap();
    assert_eq!(report["rpm_ok"], true);
    assert!(report["critical_depth"].is_null());
}

#[test]
fn test_tuned_settings_reach_analysis() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.stability.depth_limits.ceiling = 20.0;
    config.envelope = EnvelopeSettings {
        lobe_tolerance_rpm: 150.0,
        ..Default::default()
    };
    let path = write_config(&dir, &config);

    // Stiff geometry-derived model saturates at the configured ceiling
    let cli = Cli::try_parse_from([
        "chatterkit", "--config", &path, "analyze", "--rpm", "8000", "--depth", "1",
    ])
    .unwrap();
    let report = run(&cli.command, &load_config(&cli).unwrap()).unwrap();
    let depth = report["critical_depth"].as_f64().unwrap();
    assert!(depth <= 20.0);
    assert_eq!(report["stable"], depth > 1.0);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    let cli = Cli::try_parse_from([
        "chatterkit",
        "--config",
        missing.to_str().unwrap(),
        "analyze",
        "--rpm",
        "8000",
        "--depth",
        "1",
    ])
    .unwrap();
    let err = load_config(&cli).unwrap_err();
    assert!(err.to_string().contains("failed to load config"));
}
