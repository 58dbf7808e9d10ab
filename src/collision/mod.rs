//! Relativistic two-body collisions along one axis.
//!
//! Elastic collisions conserve total energy and momentum; perfectly inelastic
//! collisions merge both bodies and conserve momentum only.

pub mod error;
pub mod frame;
pub mod particle;
pub mod result;
pub mod root_finder;
pub mod solver;


pub use error::{CollisionError, Divergence, KinematicsError};
pub use particle::{CollisionInput, CollisionMode, Particle, PreCollision};
pub use result::{CollisionResult, ConservationError, ConservationWarning, OutgoingState};
pub use root_finder::{NewtonRaphson, Root, RootFinder, RootFinderError};
pub use solver::CollisionSolver;
