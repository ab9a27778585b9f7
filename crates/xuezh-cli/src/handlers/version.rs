use serde_json::json;

use crate::envelope::CommandOutput;

pub fn handle() -> CommandOutput {
    CommandOutput::data(json!({ "version": env!("CARGO_PKG_VERSION") }))
}
