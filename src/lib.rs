pub mod args;
pub mod extract;
pub mod gemini_api;
pub mod ledger;
pub mod server;
pub mod sheets_api;
