pub mod domain;
pub mod executor;
pub mod grid;
pub mod naming;
pub mod planner;
pub mod sweep;
pub mod template;
