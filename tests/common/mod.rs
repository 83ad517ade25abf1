#![allow(dead_code)]

pub mod scripted {
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Test double for the three opaque generators: writes scripted content,
    /// counts invocations, and can be flipped into a failing or slow mode
    /// from the test thread while a watch loop holds the other end.
    #[derive(Clone)]
    pub struct ScriptedGenerator {
        calls: Arc<AtomicUsize>,
        content: Arc<Mutex<Vec<u8>>>,
        failing: Arc<AtomicBool>,
        delay_ms: Arc<AtomicU64>,
    }

    impl ScriptedGenerator {
        pub fn new(content: &[u8]) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                content: Arc::new(Mutex::new(content.to_vec())),
                failing: Arc::new(AtomicBool::new(false)),
                delay_ms: Arc::new(AtomicU64::new(0)),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn set_content(&self, content: &[u8]) {
            *self.content.lock().unwrap() = content.to_vec();
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn set_delay_ms(&self, millis: u64) {
            self.delay_ms.store(millis, Ordering::SeqCst);
        }

        /// Closure form usable as any of the three generator traits.
        pub fn writer(
            &self,
        ) -> impl Fn(&Path) -> anyhow::Result<()> + Send + Sync + 'static {
            let calls = self.calls.clone();
            let content = self.content.clone();
            let failing = self.failing.clone();
            let delay_ms = self.delay_ms.clone();
            move |out: &Path| {
                calls.fetch_add(1, Ordering::SeqCst);
                let delay = delay_ms.load(Ordering::SeqCst);
                if delay > 0 {
                    std::thread::sleep(Duration::from_millis(delay));
                }
                if failing.load(Ordering::SeqCst) {
                    anyhow::bail!("scripted generator failure");
                }
                std::fs::write(out, &*content.lock().unwrap())?;
                Ok(())
            }
        }
    }
}

pub mod project {
    use apiforge::{Config, RoutesConfig, SpecConfig, SpecFormat};
    use std::path::PathBuf;

    /// Configuration matching the canonical layout: spec at
    /// `api/openapi.json`, routes at `src/generated/routes.rs`.
    pub fn base_config() -> Config {
        Config {
            spec: Some(SpecConfig {
                output_directory: PathBuf::from("api"),
                spec_file_base_name: "openapi".to_string(),
                format: SpecFormat::Json,
                command: None,
            }),
            routes: Some(RoutesConfig {
                routes_dir: PathBuf::from("src/generated"),
                routes_file_name: "routes.rs".to_string(),
                command: None,
            }),
            ..Config::default()
        }
    }

    /// Poll until `check` passes or `timeout_ms` elapses.
    pub fn wait_for(timeout_ms: u64, mut check: impl FnMut() -> bool) -> bool {
        let deadline = std::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
        while std::time::Instant::now() < deadline {
            if check() {
                return true;
            }
            std::thread::sleep(std::time::Duration::from_millis(25));
        }
        check()
    }
}
