//! Time-driven animation
//!
//! - [`AnimationClock`]: the single time source, advanced by the frame driver
//! - [`Trajectory`]: closed-form sinusoidal paths
//! - [`LightRig`]: lights that follow trajectories

pub mod clock;
pub mod light_rig;
pub mod trajectory;

pub use clock::{AnimationClock, TimeStep};
pub use light_rig::{LightRig, RigLight};
pub use trajectory::{Trajectory, Wave};
