//! MCP Tools module
//!
//! Parameter types for the tools exposed by the server. The tool itself is
//! dispatched from `server.rs`.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::invocation::ExecutionRequest;

/// Name of the only tool the server exposes
pub const EXECUTE_SHELL: &str = "execute_shell";

/// Parameters for the execute_shell tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteShellParams {
    /// the IP address of the target machine
    pub machine_ip: String,

    /// the working directory path on remote machine
    pub path: String,

    /// the shell command to execute
    pub shell: String,
}

impl ExecuteShellParams {
    /// JSON schema describing the tool input
    pub fn input_schema() -> serde_json::Map<String, serde_json::Value> {
        let schema = schemars::schema_for!(ExecuteShellParams);
        match serde_json::to_value(schema) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

impl From<ExecuteShellParams> for ExecutionRequest {
    fn from(params: ExecuteShellParams) -> Self {
        ExecutionRequest {
            target: params.machine_ip,
            working_dir: params.path,
            command: params.shell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_shell_params_deserialize() {
        let json = r#"{"machine_ip": "10.0.0.5", "path": "/tmp", "shell": "echo hi"}"#;
        let params: ExecuteShellParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.machine_ip, "10.0.0.5");
        assert_eq!(params.path, "/tmp");
        assert_eq!(params.shell, "echo hi");
    }

    #[test]
    fn test_execute_shell_params_all_required() {
        let json = r#"{"machine_ip": "10.0.0.5", "path": "/tmp"}"#;
        assert!(serde_json::from_str::<ExecuteShellParams>(json).is_err());
    }

    #[test]
    fn test_input_schema() {
        let schema = ExecuteShellParams::input_schema();
        assert_eq!(schema.get("type").and_then(|v| v.as_str()), Some("object"));

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"machine_ip"));
        assert!(required.contains(&"path"));
        assert!(required.contains(&"shell"));

        assert_eq!(
            schema["properties"]["machine_ip"]["description"],
            "the IP address of the target machine"
        );
    }

    #[test]
    fn test_params_into_request() {
        let params = ExecuteShellParams {
            machine_ip: "10.0.0.5".to_string(),
            path: "/srv".to_string(),
            shell: "ls".to_string(),
        };
        let request = ExecutionRequest::from(params);
        assert_eq!(request.target, "10.0.0.5");
        assert_eq!(request.working_dir, "/srv");
        assert_eq!(request.command, "ls");
    }
}
