pub mod airtable;

use serde_json::{Map, Value};

use crate::error::AppResult;

/// The tabular persistence seam. Implementations reject records they cannot
/// store with an error carrying enough detail to log.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    async fn insert_record(&self, fields: &Map<String, Value>) -> AppResult<()>;
}
