//! Integration surface towards the host automation platform: collaborator
//! traits, flow card contracts and settings parsing.

pub mod flow;
pub mod settings;
pub mod traits;

pub use flow::{
    ASYNC_COMMAND_FAILED, ASYNC_COMMAND_SUCCESS, CommandFailureTokens, CommandSuccessTokens,
    GLOBAL_COMMAND_FAILED, GlobalFailureTokens, NO_EXIT_CODE,
};
pub use settings::parse_server_config;
pub use traits::{
    ConnectivitySink, DeviceRef, FlowTrigger, SettingsSource, Translate, format_last_connected,
};
