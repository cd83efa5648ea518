//! Repository implementations for all Tidewatch aggregates.

pub mod achievement;
pub mod alert;
pub mod notification;
pub mod reading;
pub mod report;
pub mod user;

pub use achievement::AchievementRepository;
pub use alert::AlertRepository;
pub use notification::NotificationRepository;
pub use reading::ReadingRepository;
pub use report::ReportRepository;
pub use user::UserRepository;
