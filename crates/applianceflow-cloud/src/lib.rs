//! ApplianceFlow Cloud
//!
//! Provider-neutral machinery for managing appliances (VPC routers, load
//! balancers, databases) whose configuration is one shared settings
//! document, exposed to callers as many independent sub-resources.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            SubResourceController<S, R>          │
//! │     (port forwarding, static NAT, DHCP, ...)    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               AggregateMutator                  │
//! │  lock → read → modify → update → apply → unlock │
//! │  ┌──────────────┐ ┌──────────────┐ ┌─────────┐  │
//! │  │ NamedMutex   │ │ PowerCycle   │ │Composite│  │
//! │  │ Registry     │ │ Controller   │ │   Id    │  │
//! │  └──────────────┘ └──────┬───────┘ └─────────┘  │
//! │                          │ wait_until           │
//! └─────────────────┬────────┴──────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │        trait AggregateStore (per provider)      │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod lock;
pub mod mutation;
pub mod power;
pub mod provider;
pub mod state;
pub mod wait;

// Re-exports
pub use config::PowerConfig;
pub use error::{CloudError, Result, ResultExt};
pub use identity::CompositeId;
pub use lock::{NamedLockGuard, NamedMutexRegistry};
pub use mutation::{AggregateMutator, SubResource, SubResourceController};
pub use power::PowerCycleController;
pub use provider::{Aggregate, AggregateStore, Availability, PowerState};
pub use state::{GlobalState, ResourceDataSink, ResourceState, ResourceStatus, StateManager};
pub use wait::{WaitConfig, wait_until};
