//! Flow card identifiers and their token payloads.
//!
//! Token structs serialize to the exact shape the automation cards declare;
//! field names are part of the card contract and must not change.

use serde::Serialize;

/// Device card fired when an asynchronous command completes successfully.
pub const ASYNC_COMMAND_SUCCESS: &str = "async_ssh_command_success";
/// Device card fired when an asynchronous command fails.
pub const ASYNC_COMMAND_FAILED: &str = "async_ssh_command_failed";
/// Application-wide card fired on any command failure, sync or async.
pub const GLOBAL_COMMAND_FAILED: &str = "global_ssh_command_failed";

/// Exit code reported to flows when the remote side terminated by signal
/// and no status was available.
pub const NO_EXIT_CODE: i64 = -1;

#[derive(Debug, Clone, Serialize)]
pub struct CommandSuccessTokens {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub signal: String,
    pub code: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandFailureTokens {
    pub command: String,
    pub errormessage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalFailureTokens {
    pub device_name: String,
    pub device_id: String,
    pub host: String,
    pub command: String,
    pub errormessage: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_tokens_keep_contract_field_names() {
        let tokens = CommandSuccessTokens {
            command: "uptime".to_string(),
            stdout: "up 3 days\n".to_string(),
            stderr: String::new(),
            signal: String::new(),
            code: 0,
        };
        let value = serde_json::to_value(&tokens).unwrap();
        assert_eq!(value["command"], "uptime");
        assert_eq!(value["code"], 0);
        assert_eq!(value["signal"], "");
    }

    #[test]
    fn test_global_failure_tokens_carry_device_identity() {
        let tokens = GlobalFailureTokens {
            device_name: "nas".to_string(),
            device_id: "abc123".to_string(),
            host: "10.0.0.4".to_string(),
            command: "reboot".to_string(),
            errormessage: "exit 1".to_string(),
        };
        let value = serde_json::to_value(&tokens).unwrap();
        assert_eq!(value["device_id"], "abc123");
        assert_eq!(value["errormessage"], "exit 1");
    }
}
