//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod alert_repo;
pub mod board_report_repo;
pub mod briefing_repo;
pub mod dashboard_repo;
pub mod demo_repo;
pub mod organization_repo;
pub mod playbook_repo;
pub mod scenario_repo;
pub mod signal_repo;
pub mod task_repo;
pub mod trigger_repo;
pub mod user_repo;
pub mod war_room_repo;

pub use activity_repo::ActivityRepo;
pub use alert_repo::AlertRepo;
pub use board_report_repo::BoardReportRepo;
pub use briefing_repo::BriefingRepo;
pub use dashboard_repo::DashboardRepo;
pub use demo_repo::{DemoRepo, ResetCounts};
pub use organization_repo::OrganizationRepo;
pub use playbook_repo::{PlaybookCategoryRepo, PlaybookDomainRepo, PlaybookRepo};
pub use scenario_repo::ScenarioRepo;
pub use signal_repo::SignalRepo;
pub use task_repo::TaskRepo;
pub use trigger_repo::TriggerRepo;
pub use user_repo::UserRepo;
pub use war_room_repo::WarRoomRepo;
