use std::time::Duration;

/// Installer release tag shown in the banner and `--version`.
pub const INSTALLER_VERSION: &str = "2025.02.25:BETA2";

/// Release asset URL; `{platform}` is replaced with e.g. `linux-x64`.
pub const BINARY_URL_TEMPLATE: &str =
    "https://github.com/mikroclaw/mikroclaw/releases/latest/download/mikroclaw-{platform}";

/// Platform used when none is given.
pub const DEFAULT_PLATFORM: &str = "linux-x64";

// ---------------------------------------------------------------------------
// Candidate ports, in probe order
// ---------------------------------------------------------------------------

/// SSH ports tried during detection.
pub const SSH_PORTS: [u16; 3] = [22, 2222, 8022];

/// REST ports tried during detection. 443 is HTTPS, 80 is plain HTTP.
pub const REST_PORTS: [u16; 2] = [443, 80];

/// Binary API ports tried during detection. 8729 is `api-ssl`, 8728 is `api`.
pub const API_PORTS: [u16; 2] = [8729, 8728];

/// The only REST port served over plain HTTP.
pub const REST_HTTP_PORT: u16 = 80;

/// Binary API port that is wrapped in TLS.
pub const API_TLS_PORT: u16 = 8729;

// ---------------------------------------------------------------------------
// Timeouts
// ---------------------------------------------------------------------------

/// Connect/request timeout for HTTP calls against the router.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a bare TCP reachability probe.
pub const TCP_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound for one `ssh ... ':put "OK"'` probe.
pub const SSH_PROBE_TIMEOUT: Duration = Duration::from_secs(7);

/// `ConnectTimeout` passed to `ssh` during probes (seconds).
pub const SSH_CONNECT_TIMEOUT_SECS: u64 = 5;

/// `ConnectTimeout` passed to `scp` during uploads (seconds).
pub const SCP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Upper bound for binary downloads and SCP uploads.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Remote layout
// ---------------------------------------------------------------------------

/// Where the agent binary lives on the router (RouterOS file name).
pub const REMOTE_BINARY_PATH: &str = "disk1/mikroclaw";

/// Where the agent config lives on the router (RouterOS file name).
pub const REMOTE_CONFIG_PATH: &str = "disk1/mikroclaw.env.json";

/// SCP destination for the binary.
pub const SCP_BINARY_PATH: &str = "/disk1/mikroclaw";

/// SCP destination for the config.
pub const SCP_CONFIG_PATH: &str = "/disk1/mikroclaw.env.json";

/// Local file names inside a scratch directory.
pub const LOCAL_BINARY_NAME: &str = "mikroclaw";
pub const LOCAL_CONFIG_NAME: &str = "mikroclaw.env.json";

// ---------------------------------------------------------------------------
// REST resources
// ---------------------------------------------------------------------------

pub const REST_RESOURCE_PATH: &str = "/rest/system/resource";
pub const REST_FETCH_PATH: &str = "/rest/tool/fetch";
pub const REST_FILE_PATH: &str = "/rest/file";
pub const REST_SCRIPT_RUN_PATH: &str = "/rest/system/script/run";

/// Builds the release URL for a platform suffix.
pub fn binary_url_for(platform: &str) -> String {
    BINARY_URL_TEMPLATE.replace("{platform}", platform)
}
