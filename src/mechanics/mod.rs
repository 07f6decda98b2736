pub mod bounds;
pub mod change;
#[cfg(feature = "model-race")]
pub mod csf;
#[cfg(feature = "model-race")]
pub mod prod;

pub use bounds::*;
pub use change::*;
#[cfg(feature = "model-race")]
pub use csf::*;
#[cfg(feature = "model-race")]
pub use prod::*;
