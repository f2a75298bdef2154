//! # services
//!
//! Application logic for fruit-health-cloud: the credential store, the
//! access control gate, the moderation workflow and the CRUD services for
//! governance records, the knowledge base and warnings.
//!
//! Every service holds its ports as `Arc<dyn Trait>` and is cheap to share
//! across request handlers.

pub mod access;
pub mod community;
pub mod error;
pub mod governance;
pub mod knowledge;
pub mod notify;
pub mod users;
pub mod warnings;

pub use access::AccessGate;
pub use community::CommunityService;
pub use error::{ServiceError, ServiceResult};
pub use governance::GovernanceService;
pub use knowledge::KnowledgeService;
pub use notify::{BroadcastReport, NotificationDispatcher};
pub use users::{Registration, UserService};
pub use warnings::WarningService;
