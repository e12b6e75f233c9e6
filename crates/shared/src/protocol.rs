use serde::{Deserialize, Serialize};

/// Endpoint the documentation page calls whenever the API-key field changes.
pub const GET_OPTIONS_ROUTE: &str = "/api/get-options";

/// Confirms a dataset selection made on the documentation page. Takes the
/// key header and one `dataset` query pair per selected option.
pub const SELECT_DATASETS_ROUTE: &str = "/api/datasets";

pub const HEALTHZ_ROUTE: &str = "/healthz";

/// Request header carrying the key typed into the documentation page.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Parameter name of the multi-select the options are written into.
pub const DATASET_PARAM: &str = "dataset";

/// Ordered option values; the body of a successful `GET_OPTIONS_ROUTE` call is
/// a bare JSON array of strings.
pub type OptionList = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetGrant {
    pub api_key: String,
    pub dataset: String,
}
