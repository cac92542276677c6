use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every NITRO response carries `errorcode`/`message`/`severity` next to
/// the resource array, e.g. `{"errorcode":0,"message":"Done","hanode":[..]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct NitroEnvelope {
    #[serde(default)]
    pub errorcode: i64,
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub resources: Map<String, Value>,
}

/// Login request body: `{"login":{"username":..,"password":..}}`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub login: LoginPayload<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginPayload<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// One entry of the `hanode` resource.
///
/// Only the fields the registry reads are modelled; NITRO returns many
/// more, which serde ignores.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HaNode {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ipaddress: Option<String>,
    /// "Primary", "Secondary", "Claiming", "Force Change" ...
    #[serde(default)]
    pub state: Option<String>,
    /// "UP", "DOWN", "DISABLED" ...
    #[serde(default)]
    pub hastatus: Option<String>,
}

impl HaNode {
    pub fn is_primary(&self) -> bool {
        self.state
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("primary"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn envelope_keeps_resource_arrays() {
        let raw = r#"{"errorcode":0,"message":"Done","severity":"NONE","hanode":[{"id":"0","state":"Primary"}]}"#;
        let env: NitroEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(env.errorcode, 0);
        assert!(env.resources.contains_key("hanode"));
    }

    #[test]
    fn ha_node_state_is_case_insensitive() {
        let node: HaNode = serde_json::from_str(r#"{"id":"0","state":"PRIMARY"}"#).unwrap();
        assert!(node.is_primary());

        let node: HaNode = serde_json::from_str(r#"{"id":"0","state":"Secondary"}"#).unwrap();
        assert!(!node.is_primary());

        let node: HaNode = serde_json::from_str(r#"{"id":"0"}"#).unwrap();
        assert!(!node.is_primary());
    }
}
