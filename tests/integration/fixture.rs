use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;

use grammarlab::persistence::PersistenceManager;
use grammarlab::storage::SqliteStore;
use serde_json::Value;
use tempfile::TempDir;

/// Assert command succeeded
macro_rules! assert_command_success {
    ($output:expr) => {
        assert!(
            $output.success,
            "Command failed with exit code {}\nstdout: {}\nstderr: {}",
            $output.exit_code, $output.stdout, $output.stderr
        );
    };
}

/// Assert stdout contains expected text
macro_rules! assert_stdout_contains {
    ($output:expr, $expected:expr) => {
        assert!(
            $output.stdout.contains($expected),
            "stdout does not contain '{}'\nActual stdout:\n{}",
            $expected,
            $output.stdout
        );
    };
}

/// Isolated store, config file and home directory for one test.
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    test_name: String,
    start_time: Instant,
}

impl TestFixture {
    pub fn new(test_name: &str) -> Self {
        Self::with_backend(test_name, "http://127.0.0.1:9")
    }

    /// Fixture whose config points the backend at `base_url`.
    pub fn with_backend(test_name: &str, base_url: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let db_path = root.join("data/glab.db");
        let config_path = root.join("config.toml");

        let config = format!(
            "[backend]\nbase_url = \"{base_url}\"\ntimeout_secs = 5\n\n[persistence]\nsave_delay_ms = 0\n"
        );
        std::fs::write(&config_path, config).expect("Failed to write config");

        println!("[FIXTURE] Test: {test_name}");
        println!("[FIXTURE] Root: {}", root.display());

        Self {
            temp_dir,
            root,
            db_path,
            config_path,
            test_name: test_name.to_string(),
            start_time: Instant::now(),
        }
    }

    /// Open the fixture store directly, bypassing the CLI.
    pub fn manager(&self) -> Arc<PersistenceManager> {
        let store = SqliteStore::open(&self.db_path).expect("Failed to open store");
        Arc::new(PersistenceManager::new(Arc::new(store)))
    }

    pub fn run_glab(&self, args: &[&str]) -> CommandOutput {
        let start = Instant::now();
        println!("[CMD] glab {}", args.join(" "));

        let output = Command::new(env!("CARGO_BIN_EXE_glab"))
            .args(args)
            .env("HOME", &self.root)
            .env("GLAB_CONFIG", &self.config_path)
            .env("GLAB_STORAGE_PATH", &self.db_path)
            .env("RUST_LOG", "warn")
            .current_dir(&self.root)
            .output()
            .expect("Failed to execute glab");

        let result = CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        println!("[CMD] Exit code: {} ({:?})", result.exit_code, start.elapsed());
        if !result.success {
            println!("[CMD] stderr: {}", result.stderr);
        }
        result
    }

    /// Run with `--json` and parse stdout.
    pub fn run_json(&self, args: &[&str]) -> (CommandOutput, Value) {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.run_glab(&full);
        let json = output.json();
        (output, json)
    }
}

impl Drop for TestFixture {
    fn drop(&mut self) {
        println!(
            "[FIXTURE] {} finished in {:?}",
            self.test_name,
            self.start_time.elapsed()
        );
    }
}

#[derive(Debug)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn json(&self) -> Value {
        serde_json::from_str(self.stdout.trim()).unwrap_or_else(|err| {
            panic!("stdout is not JSON ({err}):\n{}", self.stdout)
        })
    }
}
