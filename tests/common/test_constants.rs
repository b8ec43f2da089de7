//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Placeholder access token accepted by configuration validation.
pub const DUMMY_TOKEN: &str = "dop_v1_0000000000000000000000000000000000000000";

/// Region slug used by fixtures.
pub const REGION: &str = "nyc1";

/// Driver name recorded in persistent volume fixtures.
pub const CSI_DRIVER: &str = "dobs.csi.digitalocean.com";
