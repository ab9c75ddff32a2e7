pub mod conditions;
pub mod provider_state;
pub mod tide;
pub mod weather;

pub use conditions::*;
pub use provider_state::*;
pub use tide::*;
pub use weather::*;
