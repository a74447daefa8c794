pub mod angles;
pub mod approval;
pub mod gateway;
pub mod generate;
pub mod notify;
pub mod scoring;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
