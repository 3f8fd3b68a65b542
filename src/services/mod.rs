pub mod filename;
pub mod image_service;
pub mod rate_limiter;

pub use filename::{converted_filename, processed_filename};
pub use image_service::ImageService;
pub use rate_limiter::{InMemoryRateLimiter, RateDecision, RateLimitStore};
