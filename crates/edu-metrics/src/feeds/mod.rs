//! Feed ingestion: the one place the crate touches raw, loosely-typed
//! rows.
//!
//! Source feeds disagree on field names for the same concept (`Client ID`
//! vs `ClientID` vs `ID`), mix strings, numbers, and blanks in the same
//! column, and occasionally hand back an HTML permission page where CSV was
//! expected. The adapters here resolve all of that once, producing the
//! canonical records the metrics modules operate on.

pub(crate) mod fields;
pub mod parser;

pub use parser::{
    load_call_center_file, load_leads_file, load_sales_file, load_spend_file,
    parse_call_center_json, parse_leads_csv, parse_sales_json, parse_spend_csv, FeedError,
};
