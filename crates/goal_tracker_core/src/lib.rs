pub mod domain;
pub mod memory;
pub mod ports;

pub use domain::{
    normalize_milestone_patch, normalize_milestones, parse_status_filter, select_current,
    total_pages, Goal, GoalChanges, GoalListQuery, GoalPage, GoalStatus, NewGoal, Patch,
};
pub use memory::InMemoryGoalRepository;
pub use ports::{GoalRepository, PortError, PortResult};
