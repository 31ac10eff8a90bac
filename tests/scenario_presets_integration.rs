//! Scenario files and presets, driven through the library and the CLI.

use std::process::Command;

use tariff_sim::config::ScenarioConfig;
use tariff_sim::sim::kpi::MarketReport;

#[derive(Debug)]
struct Report {
    mean_price: f64,
    min_demand_kw: f64,
    broadcasts: f64,
}

#[test]
fn every_preset_builds_and_runs() {
    for name in ScenarioConfig::PRESETS {
        let cfg = ScenarioConfig::from_preset(name).expect("preset should load");
        let mut market = cfg.build_market().expect("preset should build");
        let records = market.run().expect("preset should run");
        assert_eq!(
            records.len(),
            cfg.simulation.ticks_per_day * cfg.simulation.days,
            "preset {name}"
        );

        let report = MarketReport::from_records(&records, market.config().dt_hours);
        assert!(report.mean_demand_kw.is_finite(), "preset {name}");
        assert!(report.mean_price.is_finite(), "preset {name}");
        assert!(report.broadcasts >= 1, "preset {name} should broadcast");
    }
}

#[test]
fn identical_seed_gives_identical_run() {
    let run = |seed: u64| {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.seed = seed;
        cfg.build_market()
            .expect("baseline should build")
            .run()
            .expect("baseline should run")
    };

    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43));
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_markets() {
    let baseline = run_and_parse_report("scenarios/baseline.toml");
    let economy_seven = run_and_parse_report("scenarios/economy_seven.toml");
    let windy = run_and_parse_report("scenarios/windy.toml");

    assert!(
        (baseline.mean_price - economy_seven.mean_price).abs() > 1.0,
        "expected baseline and economy_seven prices to differ: baseline={:.3}, economy_seven={:.3}",
        baseline.mean_price,
        economy_seven.mean_price
    );
    assert!(
        (windy.mean_price - 110.0).abs() < 1e-3,
        "expected the flat tariff to hold: windy={:.3}",
        windy.mean_price
    );
    assert!(
        windy.min_demand_kw < 0.0,
        "expected windy to reach net export: min={:.3}",
        windy.min_demand_kw
    );
    assert!(
        (windy.broadcasts - 1.0).abs() < f64::EPSILON,
        "expected one flat-tariff broadcast, got {}",
        windy.broadcasts
    );
    assert!(baseline.broadcasts >= 2.0);
}

#[test]
fn unknown_preset_exits_with_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_tariff-sim"))
        .args(["--preset", "nonexistent"])
        .output()
        .expect("tariff-sim process should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown preset"), "stderr: {stderr}");
}

fn run_and_parse_report(path: &str) -> Report {
    let output = Command::new(env!("CARGO_BIN_EXE_tariff-sim"))
        .args(["--scenario", path])
        .output()
        .expect("tariff-sim process should run");

    assert!(
        output.status.success(),
        "scenario run failed for {path}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    Report {
        mean_price: parse_metric(&stdout, "Mean price:", "£/MWh"),
        min_demand_kw: parse_metric(&stdout, "Minimum demand:", "kW"),
        broadcasts: parse_metric(&stdout, "Broadcasts sent:", ""),
    }
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing report line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid report format for line `{line}`"));

    let numeric = raw.strip_suffix(unit).unwrap_or(raw).trim();
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from report line `{line}`"))
}
