use std::time::Duration;

/// Endpoints and policy knobs for the execution backends.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the Go playground build-and-run API
    pub playground_url: String,

    /// Base URL of the polling submission judge
    pub judge_url: String,

    /// Bearer token for the judge API
    pub judge_token: String,

    /// Judge compiler selector (11 = GCC C)
    pub judge_compiler_id: u32,

    /// Delay between submission status checks
    pub poll_interval: Duration,

    /// Status checks before giving up on the judge
    pub poll_attempts: u32,

    /// Base URL of the synchronous compile service
    pub compile_url: String,

    /// Compiler selector for the synchronous compile service
    pub compiler: String,

    /// Standard option set passed to the compile service
    pub compiler_options: String,

    /// Raw compiler flags (language-standard revision)
    pub compiler_flags: String,

    /// Budget for the one-time embedded interpreter load
    pub interpreter_load_timeout: Duration,

    /// Default timeout applied to every outbound HTTP call
    pub http_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            playground_url: "https://play.golang.org".to_string(),
            judge_url: "https://8ce3ae74.compilers.sphere-engine.com".to_string(),
            judge_token: "demo-token".to_string(),
            judge_compiler_id: 11,
            poll_interval: Duration::from_secs(1),
            poll_attempts: 10,
            compile_url: "https://wandbox.org".to_string(),
            compiler: "gcc-head".to_string(),
            compiler_options: "warning,gnu++1y".to_string(),
            compiler_flags: "-std=c++17".to_string(),
            interpreter_load_timeout: Duration::from_secs(10),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl ServiceConfig {
    pub fn with_playground_url(mut self, url: impl Into<String>) -> Self {
        self.playground_url = url.into();
        self
    }

    pub fn with_judge_url(mut self, url: impl Into<String>) -> Self {
        self.judge_url = url.into();
        self
    }

    pub fn with_compile_url(mut self, url: impl Into<String>) -> Self {
        self.compile_url = url.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_interpreter_load_timeout(mut self, timeout: Duration) -> Self {
        self.interpreter_load_timeout = timeout;
        self
    }
}
