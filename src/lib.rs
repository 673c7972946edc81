// Library root
// ------------
// The binary (`main.rs`) only parses flags and sets up logging; the update
// flow and everything it talks to live here.
//
// Module responsibilities:
// - `whitelist`: the step-by-step flow and the replacement-list rule.
// - `api`: Cloud SQL Admin API client and its JSON shapes.
// - `token`: access token from the gcloud CLI.
// - `public_ip`: the machine's public address.
// - `config`: `config.json` and the in-memory store used by tests.
// - `prompt`: terminal and scripted prompts.
// - `ui`: spinners and colored output.
// - `cli`: command-line flags and wiring of the real implementations.
pub mod api;
pub mod cli;
pub mod config;
pub mod prompt;
pub mod public_ip;
pub mod token;
pub mod ui;
pub mod whitelist;

#[cfg(test)]
mod test_http;
