pub mod lock;
pub mod pretty;
pub mod task;
