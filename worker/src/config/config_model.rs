#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub housekeeping: Housekeeping,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Housekeeping {
    /// Seconds between two passes.
    pub interval_secs: u64,
    /// Upper bound on orders expired per pass.
    pub batch_size: i64,
}
