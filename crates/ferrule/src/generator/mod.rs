mod allocator;
mod mutex;
mod status;

pub use allocator::*;
pub use mutex::*;
pub use status::*;
