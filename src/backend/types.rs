// src/backend/types.rs — Login and branch-selection wire types

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(rename = "Id", alias = "id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
}

/// Branch ids come back as numbers from some backends and strings from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for branch id, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub shop_name: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectBranchRequest<'a> {
    pub shop_name: &'a str,
    pub session_id: &'a str,
    pub branch_id: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session_id: String,
    pub message: String,
    pub branches: Vec<Branch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_accepts_numeric_and_lowercase() {
        let b: Branch = serde_json::from_str(r#"{"Id": 42, "Name": "Main"}"#).unwrap();
        assert_eq!(b.id, "42");
        let b: Branch = serde_json::from_str(r#"{"id": "7", "name": "Harbour"}"#).unwrap();
        assert_eq!(b.id, "7");
        assert_eq!(b.name, "Harbour");
        assert!(serde_json::from_str::<Branch>(r#"{"Id": true, "Name": "x"}"#).is_err());
    }

    #[test]
    fn test_login_response_defaults() {
        let r: LoginResponse = serde_json::from_str(r#"{"message":"bad password"}"#).unwrap();
        assert!(!r.success);
        assert!(r.session_id.is_none());
        assert!(r.branches.is_empty());
    }
}
