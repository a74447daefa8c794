use pressroom_pipeline::approval::Approvals;
use pressroom_pipeline::gateway::Gateway;
use pressroom_pipeline::generate::Orchestrator;
use pressroom_pipeline::notify::Digests;
use pressroom_pipeline::scoring::Scorer;
use pressroom_store::Store;

/// Everything a request handler or the cycle loop can reach.
pub struct AppState {
    pub store: Store,
    pub gateway: Gateway,
    pub scorer: Scorer,
    pub orchestrator: Orchestrator,
    pub approvals: Approvals,
    pub digests: Digests,
}
