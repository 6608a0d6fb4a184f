mod cancel;
mod load;
mod source;

pub mod platform;
pub mod runner;

pub use cancel::CancelToken;
pub use load::LoadHandle;
pub use platform::{
    HostPlatform, Platform, RunMode, SimPlatform, SystemPlatform, TrackingAlloc, create_platform,
};
pub use source::{CounterSource, ReadError};
