//! Meraki Dashboard API v1 bindings
//!
//! Endpoints return raw JSON; resources decode it against their own schema.

pub mod client;
pub mod devices;
pub mod error;
pub mod networks;
pub mod organizations;

pub use client::{Client, ClientConfig};
pub use devices::DevicesApi;
pub use error::ApiError;
pub use networks::NetworksApi;
pub use organizations::OrganizationsApi;

/// Escape one path segment (ids, serials, port numbers)
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_escapes_reserved_characters() {
        assert_eq!(segment("Q234-ABCD-5678"), "Q234-ABCD-5678");
        assert_eq!(segment("L_123/456"), "L_123%2F456");
        assert_eq!(segment("a b"), "a%20b");
    }
}
