mod broadcast;
mod prober;
mod registry;
mod runtime;
mod startup;
mod state;
mod store;
#[cfg(test)]
pub(crate) mod test_support;

// Re-export a curated surface for consumers of `crate::app`
pub use broadcast::{Broadcaster, SubscriberId, Subscription, Update};
pub use prober::{IcmpProber, Prober};
pub use registry::{HostRegistry, RegistryError};
pub use runtime::{Monitor, SchedulerState, SweepRequest};
pub use store::StateStore;

pub(crate) use startup::start;
pub(crate) use state::AppState;
