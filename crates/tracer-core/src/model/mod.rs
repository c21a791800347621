pub mod data_request;
pub mod format;
pub mod status;

pub use data_request::{now_micros, parse_column_list, parse_list, DataRequest, NewDataRequest};
pub use format::OutputFormat;
pub use status::RequestStatus;
