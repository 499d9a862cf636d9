//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod credit_ledger_repo;
pub mod event_repo;
pub mod generation_repo;
pub mod reference_repo;
pub mod topic_preference_repo;
pub mod user_repo;

pub use credit_ledger_repo::CreditLedgerRepo;
pub use event_repo::EventRepo;
pub use generation_repo::GenerationRepo;
pub use reference_repo::ReferenceRepo;
pub use topic_preference_repo::TopicPreferenceRepo;
pub use user_repo::UserRepo;
