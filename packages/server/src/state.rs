use std::sync::Arc;

use crate::config::AppConfig;
use crate::evaluator::SignEvaluator;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub evaluator: Arc<dyn SignEvaluator>,
    pub config: AppConfig,
}
