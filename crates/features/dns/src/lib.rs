//! DNS lookup endpoint: `dns:dnsType` with the query carried in message headers.
mod endpoint;

pub use endpoint::{DnsEndpoint, DnsType};

/// URI scheme of the DNS endpoint.
pub const SCHEME: &str = "dns";

/// Message headers read by the DNS producer.
pub mod headers {
    /// DNS class of the lookup (`IN`, `CH`, ...). Optional; `lookup` and `dig`.
    pub const DNS_CLASS: &str = "dns.class";
    /// Name to look up. Required for `lookup`.
    pub const DNS_NAME: &str = "dns.name";
    /// Domain name. Required for `ip`.
    pub const DNS_DOMAIN: &str = "dns.domain";
    /// Server to query instead of the system resolver. Optional; `dig`.
    pub const DNS_SERVER: &str = "dns.server";
    /// Record type (`A`, `MX`, ...). Optional; `lookup` and `dig`.
    pub const DNS_TYPE: &str = "dns.type";
    /// Search term. Required for `wikipedia`.
    pub const TERM: &str = "term";
}
