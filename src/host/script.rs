use crate::bridge::HostCommand;
use crate::error::ViewError;

/// Global function a webview page defines to receive host commands.
pub const DISPATCH_FUNCTION: &str = "window.__molview_dispatch";

/// Render `command` as a JavaScript call for a webview's script evaluator.
///
/// The JSON payload is passed as a single-quoted string literal, so
/// backslashes and single quotes are escaped.
pub fn script_call(command: &HostCommand) -> Result<String, ViewError> {
    let json = command.to_json()?;
    let escaped = json.replace('\\', "\\\\").replace('\'', "\\'");
    Ok(format!("{DISPATCH_FUNCTION}('{escaped}')"))
}
