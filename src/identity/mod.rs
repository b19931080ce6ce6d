/// Admin identity resolution
///
/// Maps the calling session to an admin-user record. Lookups are read-only
/// and nothing is cached between calls; every fault is treated as "no match"
/// so callers can simply skip their side effect.
use crate::store::{AdminUser, Principal, RowStore, Session};
use std::sync::Arc;
use tracing::warn;

/// Outcome of resolving a session to an admin user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No authenticated principal behind the session
    NoPrincipal,
    /// Authenticated, but not an admin
    NoAdminRecord { principal: Principal },
    /// Authenticated admin
    Admin(AdminUser),
}

impl Resolution {
    pub fn admin(&self) -> Option<&AdminUser> {
        match self {
            Resolution::Admin(admin) => Some(admin),
            _ => None,
        }
    }
}

/// Resolves sessions to admin users through the row store
#[derive(Clone)]
pub struct AdminIdentityResolver {
    store: Arc<dyn RowStore>,
}

impl AdminIdentityResolver {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, session: &Session) -> Resolution {
        let principal = match self.store.current_principal(session).await {
            Ok(Some(principal)) => principal,
            Ok(None) => return Resolution::NoPrincipal,
            Err(e) => {
                warn!("Principal lookup failed, treating as unauthenticated: {}", e);
                return Resolution::NoPrincipal;
            }
        };

        match self.store.find_admin_user(&principal.id).await {
            Ok(Some(admin)) => Resolution::Admin(admin),
            Ok(None) => Resolution::NoAdminRecord { principal },
            Err(e) => {
                warn!(
                    "Admin lookup failed for {}, treating as non-admin: {}",
                    principal.id, e
                );
                Resolution::NoAdminRecord { principal }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audit::AuditEntry,
        error::{RecorderError, RecorderResult},
    };
    use async_trait::async_trait;
    use chrono::Utc;

    /// Store whose answers are fixed per test
    struct FixedStore {
        principal: RecorderResult<Option<&'static str>>,
        admin: RecorderResult<Option<&'static str>>,
    }

    fn fault() -> RecorderError {
        RecorderError::Internal("connection reset".to_string())
    }

    #[async_trait]
    impl RowStore for FixedStore {
        async fn current_principal(&self, _: &Session) -> RecorderResult<Option<Principal>> {
            match &self.principal {
                Ok(id) => Ok(id.map(|id| Principal { id: id.to_string() })),
                Err(_) => Err(fault()),
            }
        }

        async fn find_admin_user(&self, principal_id: &str) -> RecorderResult<Option<AdminUser>> {
            match &self.admin {
                Ok(id) => Ok(id.map(|id| AdminUser {
                    id: id.to_string(),
                    user_id: principal_id.to_string(),
                    role: "admin".to_string(),
                    created_at: Utc::now(),
                })),
                Err(_) => Err(fault()),
            }
        }

        async fn insert_audit_entry(&self, _: &AuditEntry) -> RecorderResult<i64> {
            unreachable!("resolver never writes")
        }
    }

    async fn resolve(store: FixedStore) -> Resolution {
        AdminIdentityResolver::new(Arc::new(store))
            .resolve(&Session::new(Some("token".to_string()), None))
            .await
    }

    #[tokio::test]
    async fn test_resolves_admin() {
        let resolution = resolve(FixedStore {
            principal: Ok(Some("u1")),
            admin: Ok(Some("a1")),
        })
        .await;
        assert_eq!(resolution.admin().map(|a| a.id.as_str()), Some("a1"));
    }

    #[tokio::test]
    async fn test_no_principal() {
        let resolution = resolve(FixedStore {
            principal: Ok(None),
            admin: Ok(Some("a1")),
        })
        .await;
        assert_eq!(resolution, Resolution::NoPrincipal);
    }

    #[tokio::test]
    async fn test_no_admin_record() {
        let resolution = resolve(FixedStore {
            principal: Ok(Some("u1")),
            admin: Ok(None),
        })
        .await;
        assert!(matches!(resolution, Resolution::NoAdminRecord { principal } if principal.id == "u1"));
    }

    #[tokio::test]
    async fn test_lookup_faults_are_no_ops() {
        let resolution = resolve(FixedStore {
            principal: Err(fault()),
            admin: Ok(Some("a1")),
        })
        .await;
        assert_eq!(resolution, Resolution::NoPrincipal);

        let resolution = resolve(FixedStore {
            principal: Ok(Some("u1")),
            admin: Err(fault()),
        })
        .await;
        assert!(matches!(resolution, Resolution::NoAdminRecord { .. }));
    }
}
