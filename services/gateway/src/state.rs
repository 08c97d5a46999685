use auction_engine::{AuctionEngine, QueryService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AuctionEngine>,
    pub query: Arc<QueryService>,
}

impl AppState {
    pub fn new(engine: Arc<AuctionEngine>) -> Self {
        Self {
            query: Arc::new(QueryService::new(Arc::clone(&engine))),
            engine,
        }
    }
}
