use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn scratch_garden(name: &str) -> PathBuf {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/garden.toml");
    let target = std::env::temp_dir().join(format!(
        "garden-planner-{name}-{}.toml",
        std::process::id()
    ));
    let _ = fs::copy(&source, &target).expect("copy demo garden");
    target
}

fn run(garden: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_garden-planner"))
        .arg("--garden")
        .arg(garden)
        .args(args)
        .output()
        .expect("failed to launch garden-planner")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn capacity_reports_square_foot_density() {
    let garden = scratch_garden("capacity");

    let output = run(&garden, &["capacity", "2", "--method", "square-foot"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("16 plants per cell"));
    let _ = fs::remove_file(garden);
}

#[test]
fn preview_commit_export_and_reconcile() {
    let garden = scratch_garden("workflow");

    let preview = run(&garden, &["preview", "1", "1", "4", "--date", "2026-04-01"]);
    assert!(preview.status.success());
    let text = stdout(&preview);
    assert!(text.contains("found 4 of 4 cells"));
    let token = text
        .lines()
        .find_map(|line| line.strip_prefix("token: "))
        .expect("preview prints a token")
        .to_owned();

    let commit = run(
        &garden,
        &[
            "commit",
            "--token",
            &token,
            "--variety",
            "Buttercrunch",
            "--plan-item",
            "1",
            "--wave",
            "0",
        ],
    );
    assert!(commit.status.success());
    assert!(stdout(&commit).contains("committed 4 placements"));

    let replay = run(&garden, &["commit", "--token", &token]);
    assert!(!replay.status.success());

    let export = run(&garden, &["export", "1"]);
    assert!(stdout(&export).contains("exported 3 new events"));
    let again = run(&garden, &["export", "1"]);
    assert!(stdout(&again).contains("exported 0 new events"));

    let report = run(&garden, &["reconcile", "1"]);
    assert!(report.status.success());
    let report = stdout(&report);
    assert!(report.contains("placed"));
    assert!(report.contains("realized 10 of 10 declared plants"));

    let _ = fs::remove_file(garden);
}
