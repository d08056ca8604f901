mod allocator;
mod sleep_provider;
mod tokio;

pub use allocator::*;
pub use sleep_provider::*;
pub use self::tokio::*;
