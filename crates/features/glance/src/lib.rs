//! OpenStack Glance (image service) endpoint.
//!
//! `openstack-glance:host?username=...&password=...&project=...&operation=...`
mod endpoint;

pub use endpoint::{GlanceEndpoint, OpenstackConfig};

/// URI scheme of the Glance endpoint.
pub const SCHEME: &str = "openstack-glance";

/// Operations understood by the Glance producer.
pub mod operations {
    pub const RESERVE: &str = "reserve";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const UPLOAD: &str = "upload";
    pub const GET: &str = "get";
    pub const GET_ALL: &str = "getAll";
    pub const DELETE: &str = "delete";

    pub const ALL: &[&str] = &[RESERVE, CREATE, UPDATE, UPLOAD, GET, GET_ALL, DELETE];
}
