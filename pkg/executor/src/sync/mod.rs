mod async_mutex;
#[cfg(feature = "std")]
mod eventually;
mod macros;
#[cfg(feature = "std")]
mod rwlock;
#[cfg(feature = "std")]
mod sync_mutex;
#[cfg(feature = "std")]
mod var;

pub use async_mutex::*;
#[cfg(feature = "std")]
pub use eventually::*;
#[cfg(feature = "std")]
pub use rwlock::*;
#[cfg(feature = "std")]
pub use sync_mutex::*;
#[cfg(feature = "std")]
pub use var::*;
