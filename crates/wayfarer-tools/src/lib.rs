//! # Wayfarer Tools
//!
//! Tool routing and the built-in tools for the Wayfarer dispatcher.
//!
//! - [`registry`]: [`ToolRouter`], mapping `"<name>.<method>"` to tool
//!   instances, with argument validation and the `travel_info` shorthand
//! - [`travel`]: the `travel_info` currency and exchange-rate tool
//! - [`http`]: JSON GET helper for HTTP-backed tools

pub mod http;
pub mod registry;
pub mod travel;

pub use registry::{
    RegisteredMethod, SHORTHAND_METHOD, SHORTHAND_TOOL, ToolRouter, normalize_tool_name,
    validate_arguments,
};
pub use travel::{
    CurrencyInfo, CurrencyService, HttpCurrencyService, TRAVEL_TOOL_NAME, TravelConfig,
    TravelInfo, TravelResult,
};
