pub mod request_ops;

pub use request_ops::{
    amend_request, amend_request_at, attach_query, create_request, create_request_at,
    RequestAmendment,
};
