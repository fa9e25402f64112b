use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct Project {
    root: PathBuf,
}

impl Project {
    fn new(prefix: &str, config: &str) -> Self {
        let root = unique_temp_dir(prefix);
        fs::create_dir_all(root.join(".deptree")).expect("create .deptree");
        fs::create_dir_all(root.join("graphs")).expect("create graphs dir");
        fs::create_dir_all(root.join("nested").join("deeper")).expect("create nested dir");
        fs::write(root.join(".deptree").join("config.toml"), config).expect("write config");
        fs::write(
            root.join("graphs").join("main.json"),
            r#"{"app": ["lib"], "lib": ["core"]}"#,
        )
        .expect("write main graph");
        fs::write(
            root.join("graphs").join("other.json"),
            r#"{"other": []}"#,
        )
        .expect("write other graph");
        Self { root }
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn deptree_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_deptree"))
}

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos();
    let pid = std::process::id();
    std::env::temp_dir().join(format!("deptree-{prefix}-{pid}-{nanos}"))
}

fn run(current_dir: &Path, args: &[&str], envs: &[(&str, &Path)]) -> Output {
    let mut cmd = Command::new(deptree_bin());
    cmd.current_dir(current_dir)
        .env_remove("DEPTREE_CONFIG")
        .env_remove("DEPTREE_GRAPH")
        .env_remove("DEPTREE_LOG")
        .args(args);
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("run deptree")
}

fn stdout_of(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    assert!(
        output.status.success(),
        "deptree failed\nstdout:\n{stdout}\nstderr:\n{stderr}"
    );
    stdout
}

#[test]
fn graph_file_comes_from_discovered_config() {
    let project = Project::new("config-discovery", "[graph]\nfile = \"graphs/main.json\"\n");
    let cwd = project.root.join("nested").join("deeper");

    let stdout = stdout_of(&run(&cwd, &["tree"], &[]));
    assert_eq!(stdout, "- app\n  - lib\n    - core\n- lib\n  - core\n");
}

#[test]
fn env_graph_overrides_config() {
    let project = Project::new("config-env-graph", "[graph]\nfile = \"graphs/main.json\"\n");
    let other = project.root.join("graphs").join("other.json");

    let stdout = stdout_of(&run(
        &project.root,
        &["resolve"],
        &[("DEPTREE_GRAPH", other.as_path())],
    ));
    assert_eq!(stdout, "other\n");
}

#[test]
fn cli_file_overrides_env_graph() {
    let project = Project::new("config-cli-graph", "[graph]\nfile = \"graphs/main.json\"\n");
    let other = project.root.join("graphs").join("other.json");

    let stdout = stdout_of(&run(
        &project.root,
        &["resolve", "graphs/main.json"],
        &[("DEPTREE_GRAPH", other.as_path())],
    ));
    assert_eq!(stdout, "app\nlib\ncore\nlib\ncore\n");
}

#[test]
fn config_output_format_switches_to_json() {
    let project = Project::new(
        "config-json",
        "[graph]\nfile = \"graphs/main.json\"\n\n[output]\nformat = \"json\"\ncolor = false\n",
    );

    let stdout = stdout_of(&run(&project.root, &["resolve"], &[]));
    let traversal: Vec<String> = serde_json::from_str(&stdout).expect("parse resolve json");
    assert_eq!(traversal, vec!["app", "lib", "core", "lib", "core"]);
}

#[test]
fn explicit_config_from_env_is_used_outside_the_project() {
    let project = Project::new("config-env", "[graph]\nfile = \"graphs/other.json\"\n");
    let config = project.root.join(".deptree").join("config.toml");

    let stdout = stdout_of(&run(
        &std::env::temp_dir(),
        &["resolve"],
        &[("DEPTREE_CONFIG", config.as_path())],
    ));
    assert_eq!(stdout, "other\n");
}

#[test]
fn invalid_config_is_reported() {
    let project = Project::new("config-invalid", "[graph\n");

    let output = run(&project.root, &["resolve"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config error"), "stderr: {stderr}");
}
