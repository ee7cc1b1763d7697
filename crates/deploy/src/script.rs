//! RouterOS command text used by the REST fallback and the binary API.

use mikroclaw_protocol::DeploymentArtifact;
use mikroclaw_protocol::constants::REMOTE_BINARY_PATH;

/// Quotes `value` as a RouterOS string literal.
///
/// Backslash, double quote and `$` are escaped; control characters use
/// their `\n`, `\r` and `\t` forms so a multi-line JSON document stays a
/// single argument.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// `/tool fetch` invocation that downloads the agent binary on the router.
pub fn fetch_command(artifact: &DeploymentArtifact) -> String {
    format!(
        "/tool fetch url={} dst-path={} mode={}",
        quote(&artifact.binary_url),
        quote(REMOTE_BINARY_PATH),
        artifact.fetch_mode()
    )
}

/// Script that replaces `path` with `content`: remove, recreate, set.
pub fn file_write_script(path: &str, content: &str) -> String {
    let name = quote(path);
    format!(
        "/file remove [find name={name}]; /file add name={name}; \
         /file set [find name={name}] contents={}",
        quote(content)
    )
}
