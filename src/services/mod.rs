//! Business logic services

pub mod auth_service;
pub mod contest_service;
pub mod entry_service;
pub mod judge_service;
pub mod notification;
pub mod package_service;
pub mod payment_service;
pub mod results_service;
pub mod style_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use contest_service::ContestService;
pub use entry_service::EntryService;
pub use judge_service::JudgeService;
pub use notification::{LogNotifier, Notifier};
pub use package_service::PackageService;
pub use payment_service::PaymentService;
pub use results_service::ResultsService;
pub use style_service::StyleService;
pub use user_service::UserService;
