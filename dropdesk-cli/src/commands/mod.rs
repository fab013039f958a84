pub mod session;
pub mod stage;
pub mod tasks;
