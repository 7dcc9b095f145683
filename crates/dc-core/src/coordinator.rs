//! Host-Process Coordination
//!
//! Message shapes exchanged with the extension's background layer, and the
//! dispatcher that answers them. Only the top-level frame takes part.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dom::{Document, HostLink, Panel};
use crate::reconciler::MutationSource;
use crate::session::{FrameRole, Session};

/// Inbound request from the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "camelCase")]
#[ts(export)]
pub enum HostRequest {
    Toggle,
    QueryState,
}

/// Reply to a [`HostRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum HostResponse {
    Toggled {
        success: bool,
    },
    State {
        #[serde(rename = "isActive")]
        is_active: bool,
    },
}

/// Outbound notification to the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "camelCase")]
#[ts(export)]
pub enum HostNotice {
    StateChange { active: bool },
}

/// Answer `request`, or `None` when this frame does not take part.
pub fn dispatch<D, P, H>(session: &mut Session<D, P, H>, request: HostRequest) -> Option<HostResponse>
where
    D: Document + MutationSource,
    P: Panel<D::Node>,
    H: HostLink,
{
    if session.role() != FrameRole::Top {
        return None;
    }
    match request {
        HostRequest::Toggle => {
            session.toggle();
            Some(HostResponse::Toggled { success: true })
        }
        HostRequest::QueryState => Some(HostResponse::State {
            is_active: session.is_active(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::from_value::<HostRequest>(json!({ "action": "toggle" })).unwrap(),
            HostRequest::Toggle
        );
        assert_eq!(
            serde_json::from_value::<HostRequest>(json!({ "action": "queryState" })).unwrap(),
            HostRequest::QueryState
        );
        assert!(serde_json::from_value::<HostRequest>(json!({ "action": "reboot" })).is_err());

        assert_eq!(
            serde_json::to_value(HostResponse::State { is_active: true }).unwrap(),
            json!({ "isActive": true })
        );
        assert_eq!(
            serde_json::to_value(HostResponse::Toggled { success: true }).unwrap(),
            json!({ "success": true })
        );
        assert_eq!(
            serde_json::to_value(HostNotice::StateChange { active: false }).unwrap(),
            json!({ "action": "stateChange", "active": false })
        );
    }

    #[cfg(feature = "html")]
    mod dispatching {
        use super::*;
        use crate::config::RemoverConfig;
        use crate::html::HtmlDocument;
        use crate::testing::RecordingHost;

        fn session(role: FrameRole) -> Session<HtmlDocument, (), RecordingHost> {
            let doc = HtmlDocument::parse("<html><body><p>x</p></body></html>");
            Session::new(doc, (), RecordingHost::default(), role, "example.com", RemoverConfig::default())
        }

        #[test]
        fn test_toggle_and_query() {
            let mut session = session(FrameRole::Top);
            assert_eq!(
                dispatch(&mut session, HostRequest::QueryState),
                Some(HostResponse::State { is_active: false })
            );
            assert_eq!(
                dispatch(&mut session, HostRequest::Toggle),
                Some(HostResponse::Toggled { success: true })
            );
            assert_eq!(
                dispatch(&mut session, HostRequest::QueryState),
                Some(HostResponse::State { is_active: true })
            );
            assert_eq!(
                session.host().notices(),
                vec![HostNotice::StateChange { active: true }]
            );
        }

        #[test]
        fn test_nested_frames_stay_silent() {
            let mut session = session(FrameRole::Nested);
            assert_eq!(dispatch(&mut session, HostRequest::Toggle), None);
            assert_eq!(dispatch(&mut session, HostRequest::QueryState), None);
            assert!(!session.is_active());
        }
    }
}
