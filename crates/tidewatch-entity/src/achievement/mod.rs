//! Achievement catalog entities.

pub mod model;

pub use model::{Achievement, AchievementMetric, Requirement, UserAchievement};
