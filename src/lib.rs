pub mod autopilot;
pub mod config;
pub mod constants;
pub mod error;
pub mod outbound;
pub mod policy;
pub mod recovery;
pub mod registry;
pub mod scheduler;
#[cfg(any(test, feature = "sim"))]
pub mod sim_world;
pub mod targeting;
pub mod types;
pub mod world;
