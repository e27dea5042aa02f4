use crate::constants::{DEFAULT_ORG_ID, DEFAULT_USER_ID};

/// `Identity` is the caller identity resolved for a single request.
///
/// Built by the HTTP identity middleware (or the inbound gRPC interceptor) and
/// carried only in request-scoped extensions. It is never persisted or cached.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Identity {
    /// Organization (tenant) the request is scoped to.
    org_id: String,
    /// Client user ID, propagated on every hop as the canonical identity header.
    user_id: String,
}

impl Identity {
    /// Create a new `Identity` builder
    #[must_use]
    pub fn builder() -> IdentityBuilder {
        IdentityBuilder::default()
    }

    /// Identity used when nothing was resolved, e.g. for health checks.
    #[must_use]
    pub fn fallback() -> Self {
        IdentityBuilder::default().build()
    }

    /// Get the organization ID.
    #[must_use]
    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// Get the client user ID.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Default)]
pub struct IdentityBuilder {
    org_id: Option<String>,
    user_id: Option<String>,
}

impl IdentityBuilder {
    #[must_use]
    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Identity {
        Identity {
            org_id: self.org_id.unwrap_or_else(|| DEFAULT_ORG_ID.to_owned()),
            user_id: self.user_id.unwrap_or_else(|| DEFAULT_USER_ID.to_owned()),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_identity_builder_full() {
        let identity = Identity::builder()
            .org_id("tenant-1")
            .user_id("alice")
            .build();

        assert_eq!(identity.org_id(), "tenant-1");
        assert_eq!(identity.user_id(), "alice");
    }

    #[test]
    fn test_identity_builder_minimal_uses_defaults() {
        let identity = Identity::builder().build();

        assert_eq!(identity.org_id(), DEFAULT_ORG_ID);
        assert_eq!(identity.user_id(), DEFAULT_USER_ID);
    }

    #[test]
    fn test_identity_builder_partial() {
        let identity = Identity::builder().user_id("bob").build();

        assert_eq!(identity.org_id(), DEFAULT_ORG_ID);
        assert_eq!(identity.user_id(), "bob");
    }

    #[test]
    fn test_identity_fallback() {
        assert_eq!(Identity::fallback(), Identity::builder().build());
    }

    #[test]
    fn test_identity_serialize_deserialize() {
        let original = Identity::builder()
            .org_id("tenant-1")
            .user_id("alice")
            .build();

        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: Identity = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized, original);
    }
}
