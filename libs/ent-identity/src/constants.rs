//! Header names and fallback values shared by every hop.

/// HTTP header carrying the organization ID in multi-tenant mode.
pub const ORG_ID_HEADER: &str = "X-Scope-OrgID";

/// HTTP header carrying the client user ID.
pub const USER_ID_HEADER: &str = "X-Scope-UserID";

/// gRPC metadata key for the canonical identity header (metadata keys are lowercase).
pub const USER_ID_METADATA_KEY: &str = "x-scope-userid";

/// Organization injected in single-tenant mode.
pub const DEFAULT_ORG_ID: &str = "fake";

/// User ID used when no client certificate was presented, and for outbound
/// calls made outside of a request (health checks).
pub const DEFAULT_USER_ID: &str = "fake";
