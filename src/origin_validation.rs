use std::collections::BTreeSet;
use tracing::{debug, warn};

const WILDCARD_ORIGIN: &str = "*";

/// Which cross-origin callers may reach the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OriginPolicy {
    #[default]
    AllowAll,
    AllowList(BTreeSet<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    Allow,
    Deny(String),
}

impl OriginDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, OriginDecision::Allow)
    }
}

impl OriginPolicy {
    /// Parses a comma-separated origin list. An absent or empty list, or one
    /// containing `*`, allows every origin.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return OriginPolicy::AllowAll;
        };

        let origins: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(ToString::to_string)
            .collect();

        if origins.contains(WILDCARD_ORIGIN) {
            if origins.len() > 1 {
                warn!(
                    "CORS config: Wildcard '*' is present in origins list along with other specific origins. Wildcard will take precedence, allowing all origins."
                );
            }
            return OriginPolicy::AllowAll;
        }

        if origins.is_empty() {
            OriginPolicy::AllowAll
        } else {
            OriginPolicy::AllowList(origins)
        }
    }

    /// Requests without an `Origin` header are never cross-origin and always pass.
    pub fn evaluate(&self, origin: Option<&str>) -> OriginDecision {
        let Some(origin) = origin else {
            return OriginDecision::Allow;
        };

        match self {
            OriginPolicy::AllowAll => OriginDecision::Allow,
            OriginPolicy::AllowList(allowed) if allowed.contains(origin) => {
                debug!("Origin {} is in the allowed list", origin);
                OriginDecision::Allow
            }
            OriginPolicy::AllowList(_) => {
                OriginDecision::Deny(format!("Origin {} is not allowed by CORS policy", origin))
            }
        }
    }

    pub fn is_allow_all(&self) -> bool {
        matches!(self, OriginPolicy::AllowAll)
    }
}
