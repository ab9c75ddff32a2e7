pub mod conditions;
pub mod moon;
pub mod poller;

pub use conditions::{derive, derive_on};
pub use moon::MoonPhase;
pub use poller::ProviderHandle;
