pub mod clock;
pub mod graph;
pub mod query;
pub mod rank;
pub mod search;
pub mod track;

/// dimensional analysis types
pub type Stamp = chrono::DateTime<chrono::Utc>;
pub type Delta = chrono::TimeDelta;
pub type AgentId = i64;

// confidence comparator trade-off parameters
const TRADEOFF: f64 = 0.05;
const TRADEOFF_CONFORMITY: f64 = 0.01;
const TRADEOFF_RELIABILITY: f64 = 0.99;

// window granulation parameters
const MAX_WINDOW_MS: i64 = 1_000;
const MIN_WINDOW_MS: i64 = 200;

// search parameters
const MIN_CONFIDENCE: f64 = 0.65;
const MAX_MEMORY: usize = 3;
const STAGE_FLOOR_MS: i64 = 3_000;
const OPTIMIZE_PASSES: usize = 8;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// initialize logging
pub fn init() {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .expect("initialize logger");
}
