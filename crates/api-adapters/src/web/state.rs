use std::sync::Arc;

use services::{AccessGate, CommunityService, GovernanceService, KnowledgeService, UserService, WarningService};

use crate::metrics::Metrics;

/// Shared by every handler. Cloning copies `Arc`s only.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub gate: Arc<AccessGate>,
    pub community: Arc<CommunityService>,
    pub governance: Arc<GovernanceService>,
    pub knowledge: Arc<KnowledgeService>,
    pub warnings: Arc<WarningService>,
    pub metrics: Arc<Metrics>,
}
