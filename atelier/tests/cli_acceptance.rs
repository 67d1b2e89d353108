use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    snapshot: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        let snapshot = base.join("snapshot.json");
        fs::copy(fixture_path(), &snapshot).expect("failed to copy snapshot fixture");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
            snapshot,
        }
    }

    fn snapshot_arg(&self) -> String {
        self.snapshot.display().to_string()
    }

    fn write_config(&self, contents: &str) {
        let dir = self.xdg_config.join("atelier");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), contents).expect("failed to write config");
    }
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../atelier-core/tests/fixtures/agency-snapshot.json")
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("atelier"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute atelier: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "atelier {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn items_prints_labels_and_total() {
    let env = CliTestEnv::new();
    let args = ["items", "[2x Post + 1x Carrousel 4p] spring campaign"];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Post 1"), "stdout:\n{stdout}");
    assert!(stdout.contains("Post 2"));
    assert!(stdout.contains("Carrousel 1"));
    assert!(stdout.contains("(4 pages)"));
    assert!(stdout.contains("$160.00"));
    assert!(stdout.contains("Notes: spring campaign"));
}

#[test]
fn items_json_reports_malformed_prefix() {
    let env = CliTestEnv::new();
    let args = ["items", "--json", "[2x Banner] hero"];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("items --json should print JSON");
    assert_eq!(value["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(value["total"].as_f64(), Some(0.0));
    assert_eq!(value["outcome"]["outcome"], "malformed");
}

#[test]
fn items_uses_configured_unit_price() {
    let env = CliTestEnv::new();
    env.write_config("[pricing]\nunit_price = 50.0\n");
    let args = ["items", "[1x Logo]"];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);
    assert!(stdout_of(&output).contains("$50.00"));
}

#[test]
fn report_prints_statuses_and_costs() {
    let env = CliTestEnv::new();
    let snapshot = env.snapshot_arg();
    let args = ["report", "--snapshot", &snapshot, "--month", "2025-03"];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Snapshot v42 - March 2025"), "stdout:\n{stdout}");
    assert!(stdout.contains("Revision requested"));
    assert!(stdout.contains("Maison Lune (c1)"));
    assert!(stdout.contains("Contract: $1,200.00  Net profit: $850.00"));
    assert!(stdout.contains("Unassigned: d-204 (unlabeled)"));
    assert!(stdout.contains("1 revision requested, 1 approved"));
    assert!(stdout.contains(
        "Total contract: $2,000.00  Effective cost: $680.00  Net profit: $1,320.00"
    ));
    assert!(stdout.contains("Data quality: 2 anomalies"));
}

#[test]
fn report_exports_json() {
    let env = CliTestEnv::new();
    let snapshot = env.snapshot_arg();
    let args = [
        "report",
        "--snapshot",
        &snapshot,
        "--month",
        "2025-03",
        "--export",
        "json",
    ];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("report should export JSON");
    assert_eq!(value["snapshot_version"], 42);
    assert_eq!(value["projects"][0]["project_id"], "p1");
    assert_eq!(value["projects"][0]["items"][0]["status"], "approved");
    assert_eq!(value["clients"][0]["design_cost"].as_f64(), Some(40.0));
    assert_eq!(value["quality"]["unlabeled_deliveries"], 1);
}

#[test]
fn report_exports_markdown() {
    let env = CliTestEnv::new();
    let snapshot = env.snapshot_arg();
    let args = [
        "report",
        "--snapshot",
        &snapshot,
        "--month",
        "2025-03",
        "--export",
        "md",
    ];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("# Production report: March 2025"));
    assert!(stdout.contains("| Post 1 | Approved | $40.00 | d-101 | 2025-03-05 |"));
    assert!(stdout.contains("| **Total** | | | | | | $2,000.00 | $1,320.00 | |"));
    assert!(stdout.contains("## Data quality"));
}

#[test]
fn report_fails_on_missing_snapshot() {
    let env = CliTestEnv::new();
    let output = run_bin(&env, &["report", "--snapshot", "/nonexistent/snapshot.json"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load snapshot"), "stderr:\n{stderr}");
}

#[test]
fn report_rejects_invalid_month() {
    let env = CliTestEnv::new();
    let snapshot = env.snapshot_arg();
    let output = run_bin(&env, &["report", "--snapshot", &snapshot, "--month", "2025-13"]);

    assert!(!output.status.success());
}

#[test]
fn watch_recomputes_once_and_stops() {
    let env = CliTestEnv::new();
    let snapshot = env.snapshot_arg();
    let args = [
        "watch",
        "--snapshot",
        &snapshot,
        "--month",
        "2025-03",
        "--poll",
        "10",
        "--max-polls",
        "2",
    ];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = stdout_of(&output);
    assert_eq!(stdout.matches("Snapshot v42").count(), 1, "stdout:\n{stdout}");
    assert!(stdout.contains("2/5 items approved (40%)"));
    assert!(stdout.contains("Watch mode stopped."));

    let log_path = env.xdg_state.join("atelier").join("atelier.log");
    assert!(
        stdout.contains(&format!("Logging to {}", log_path.display())),
        "stdout:\n{stdout}"
    );
}

#[test]
fn logging_writes_to_state_dir() {
    let env = CliTestEnv::new();
    let args = ["items", "[1x Post]"];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let log_dir = env.xdg_state.join("atelier");
    let has_log = fs::read_dir(&log_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.file_name().to_string_lossy().starts_with("atelier.log"))
        })
        .unwrap_or(false);
    assert!(has_log, "expected a log file in {}", log_dir.display());
}
