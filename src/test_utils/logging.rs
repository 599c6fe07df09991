use std::time::Instant;

/// Brackets a test with start and result lines and routes `tracing` output
/// through the test harness.
pub struct TestLogger {
    name: String,
    started: Instant,
}

impl TestLogger {
    pub fn new(name: &str) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("grammarlab=debug")
            .with_test_writer()
            .try_init();
        println!("[TEST START] {name}");
        Self {
            name: name.to_string(),
            started: Instant::now(),
        }
    }

    pub fn step(&self, what: &str) {
        println!("[{}] {what} (+{:?})", self.name, self.started.elapsed());
    }

    pub fn pass(&self) {
        println!("[TEST PASS] {} in {:?}", self.name, self.started.elapsed());
    }
}
