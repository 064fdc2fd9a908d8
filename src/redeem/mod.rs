pub mod types;
pub mod classifier;
pub mod extractor;
pub mod token_pool;
pub mod backoff;
pub mod latency;
pub mod transport;
pub mod engine;


pub use types::*;
pub use classifier::classify;
pub use extractor::{CodeExtractor, find_codes};
pub use token_pool::TokenPool;
pub use backoff::BackoffState;
pub use latency::LatencyTracker;
pub use transport::{GiftTransport, HttpTransport, TransportError};
pub use engine::{EngineStatus, RedemptionEngine};
