pub mod handle;
pub mod mock;
