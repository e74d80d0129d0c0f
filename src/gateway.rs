use crate::app::auth::{ChannelSigner, PusherSigner};
use crate::channel::ChannelType;
use crate::error::Error;
use crate::http_handler::AppError;
use crate::options::ConfigState;
use crate::presence::{GuestMemberResolver, MemberContext, MemberResolver};
use crate::protocol::messages::{ChannelAuthRequest, ChannelAuthResponse};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Whether grants can be issued at all.
#[derive(Clone)]
pub enum Readiness {
    Ready(Arc<dyn ChannelSigner>),
    Degraded(Vec<&'static str>),
}

/// Shared, read-only state behind every HTTP handler.
pub struct AuthHandler {
    readiness: Readiness,
    member_resolver: Arc<dyn MemberResolver>,
}

impl AuthHandler {
    pub fn new(readiness: Readiness, member_resolver: Arc<dyn MemberResolver>) -> Self {
        AuthHandler {
            readiness,
            member_resolver,
        }
    }

    /// Wires the production signer and the guest identity resolver.
    pub fn from_config(config: &ConfigState) -> Self {
        let readiness = match config {
            ConfigState::Ready(credentials) => {
                Readiness::Ready(Arc::new(PusherSigner::new(credentials)))
            }
            ConfigState::Degraded(missing) => Readiness::Degraded(missing.clone()),
        };
        Self::new(readiness, Arc::new(GuestMemberResolver))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.readiness, Readiness::Ready(_))
    }

    pub fn signer(&self) -> Result<&dyn ChannelSigner, AppError> {
        match &self.readiness {
            Readiness::Ready(signer) => Ok(signer.as_ref()),
            Readiness::Degraded(missing) => {
                warn!(
                    "Rejecting channel authorization: {}",
                    Error::ConfigurationMissing(missing.clone())
                );
                Err(AppError::ServiceUnavailable)
            }
        }
    }

    pub fn authorize(&self, request: &ChannelAuthRequest) -> Result<ChannelAuthResponse, AppError> {
        let signer = self.signer()?;

        let (Some(socket_id), Some(channel_name)) = (
            non_empty(request.socket_id.as_deref()),
            non_empty(request.channel_name.as_deref()),
        ) else {
            let missing = request.missing_fields();
            warn!(missing = ?missing, "Bad request to channel auth: missing required fields");
            return Err(AppError::MissingFields(missing));
        };

        let channel_type = ChannelType::from_name(channel_name);
        if !channel_type.requires_authentication() {
            warn!(
                "Refusing to sign public channel {} for socket {}",
                channel_name, socket_id
            );
            return Err(AppError::ForbiddenChannel(channel_name.to_string()));
        }

        info!(
            "Authenticating socket {} for channel {}",
            socket_id, channel_name
        );

        let member = if channel_type.is_presence() {
            let context = MemberContext {
                socket_id,
                channel_name,
                user_name: non_empty(request.user_name.as_deref()),
            };
            let member = self.member_resolver.resolve(context).map_err(|e| {
                error!(
                    "Failed to resolve presence member for socket {} on {}: {}",
                    socket_id, channel_name, e
                );
                AppError::SigningFailed
            })?;
            Some(member)
        } else {
            None
        };

        match signer.authorize_channel(socket_id, channel_name, member.as_ref()) {
            Ok(response) => {
                info!(
                    "Successfully authenticated {} for {}",
                    socket_id, channel_name
                );
                Ok(response)
            }
            Err(e) => {
                if e.is_input_rejection() {
                    warn!(
                        "Signer rejected socket {} for channel {}: {}",
                        socket_id, channel_name, e
                    );
                } else {
                    error!(
                        "Error authenticating socket {} for channel {}: {}",
                        socket_id, channel_name, e
                    );
                }
                Err(AppError::SigningFailed)
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::AppCredentials;
    use crate::error::Result;
    use crate::presence::PresenceMember;
    use serde_json::json;

    fn request(socket_id: Option<&str>, channel_name: Option<&str>) -> ChannelAuthRequest {
        ChannelAuthRequest {
            socket_id: socket_id.map(ToString::to_string),
            channel_name: channel_name.map(ToString::to_string),
            user_name: None,
        }
    }

    fn ready_handler() -> AuthHandler {
        AuthHandler::from_config(&ConfigState::Ready(AppCredentials::new(
            "1".to_string(),
            "app-key".to_string(),
            "app-secret".to_string(),
            "mt1".to_string(),
        )))
    }

    struct FixedMemberResolver;

    impl MemberResolver for FixedMemberResolver {
        fn resolve(&self, context: MemberContext<'_>) -> Result<PresenceMember> {
            Ok(PresenceMember {
                user_id: format!("member-{}", context.socket_id),
                user_info: json!({ "name": "Fixed" }),
            })
        }
    }

    struct FailingResolver;

    impl MemberResolver for FailingResolver {
        fn resolve(&self, _context: MemberContext<'_>) -> Result<PresenceMember> {
            Err(Error::InvalidMemberData("directory offline".into()))
        }
    }

    #[test]
    fn test_degraded_rejects_everything() {
        let handler = AuthHandler::from_config(&ConfigState::Degraded(vec!["PUSHER_APP_SECRET"]));
        assert!(!handler.is_ready());

        for req in [
            request(Some("1.1"), Some("private-a")),
            request(None, None),
            request(Some("1.1"), Some("public")),
        ] {
            assert!(matches!(
                handler.authorize(&req),
                Err(AppError::ServiceUnavailable)
            ));
        }
    }

    #[test]
    fn test_missing_fields() {
        let handler = ready_handler();
        match handler.authorize(&request(None, Some("private-chat-1"))) {
            Err(AppError::MissingFields(fields)) => assert_eq!(fields, vec!["socket_id"]),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        match handler.authorize(&request(Some(""), Some(""))) {
            Err(AppError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["socket_id", "channel_name"])
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_public_channel_is_forbidden() {
        let handler = ready_handler();
        assert!(matches!(
            handler.authorize(&request(Some("123.456"), Some("public-news"))),
            Err(AppError::ForbiddenChannel(name)) if name == "public-news"
        ));
    }

    #[test]
    fn test_private_channel_is_signed() {
        let response = ready_handler()
            .authorize(&request(Some("123.456"), Some("private-chat-1")))
            .unwrap();
        assert!(response.auth.starts_with("app-key:"));
        assert!(response.channel_data.is_none());
    }

    #[test]
    fn test_presence_uses_member_resolver() {
        let handler = AuthHandler::new(
            Readiness::Ready(Arc::new(PusherSigner::new(&AppCredentials::new(
                "1".to_string(),
                "app-key".to_string(),
                "app-secret".to_string(),
                "mt1".to_string(),
            )))),
            Arc::new(FixedMemberResolver),
        );

        let response = handler
            .authorize(&request(Some("123.456"), Some("presence-room")))
            .unwrap();
        let member: PresenceMember =
            serde_json::from_str(&response.channel_data.unwrap()).unwrap();
        assert_eq!(member.user_id, "member-123.456");
    }

    #[test]
    fn test_resolver_failure_is_internal_error() {
        let handler = AuthHandler::new(
            Readiness::Ready(Arc::new(PusherSigner::new(&AppCredentials::new(
                "1".to_string(),
                "k".to_string(),
                "s".to_string(),
                "mt1".to_string(),
            )))),
            Arc::new(FailingResolver),
        );
        assert!(matches!(
            handler.authorize(&request(Some("1.1"), Some("presence-room"))),
            Err(AppError::SigningFailed)
        ));
    }

    #[test]
    fn test_signer_rejection_is_internal_error() {
        assert!(matches!(
            ready_handler().authorize(&request(Some("not-a-socket"), Some("private-a"))),
            Err(AppError::SigningFailed)
        ));
    }
}
