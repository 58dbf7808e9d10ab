pub mod collision;
pub mod config;
pub mod metrics;
pub mod relativity;


pub use collision::{
    CollisionError, CollisionInput, CollisionMode, CollisionResult, CollisionSolver, Particle,
};
pub use config::SolverConfig;
