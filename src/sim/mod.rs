pub mod event;
pub mod input;
pub mod level;
pub mod step;
pub mod world;
