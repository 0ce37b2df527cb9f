pub use cgmath;
pub use config::{RingAttributes, REFERENCE_HISTORY_DEPTH, REFERENCE_VEHICLES};
pub use error::{Error, Result};
pub use frame::{drive, drive_for, Frame, FrameSink, VehicleSample};
pub use guard::{Clamped, CollisionGuard};
pub use history::ReactionDelayBuffer;
pub use stepper::{Decision, TickReport};
pub use util::Interval;
pub use velocity::VelocityModel;
pub use world::{init, WorldState};

mod config;
mod debug;
mod error;
mod frame;
mod guard;
mod history;
pub mod math;
mod stepper;
mod util;
mod velocity;
mod world;
