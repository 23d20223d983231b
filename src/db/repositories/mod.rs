//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod contest_repo;
pub mod entry_repo;
pub mod judge_repo;
pub mod package_repo;
pub mod payment_repo;
pub mod score_sheet_repo;
pub mod style_repo;
pub mod user_repo;

pub use contest_repo::ContestRepository;
pub use entry_repo::EntryRepository;
pub use judge_repo::JudgeRepository;
pub use package_repo::PackageRepository;
pub use payment_repo::PaymentRepository;
pub use score_sheet_repo::ScoreSheetRepository;
pub use style_repo::StyleRepository;
pub use user_repo::UserRepository;
