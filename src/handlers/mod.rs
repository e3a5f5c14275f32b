pub mod common;
pub mod purchase_orders;

use crate::db::DbPool;
use crate::events::EventSender;
use slog::Logger;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub procurement: Arc<crate::services::procurement::ProcurementService>,
}

impl AppServices {
    /// Build the services container shared by all HTTP handlers.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, base_logger: Logger) -> Self {
        let procurement_logger = base_logger.new(slog::o!("component" => "procurement_service"));

        let procurement = Arc::new(crate::services::procurement::ProcurementService::new(
            db_pool,
            event_sender,
            procurement_logger,
        ));

        Self { procurement }
    }
}
