//! Human-readable progress from orchestrator events.

use mikroclaw_deploy::{DeployEvent, DeployState};
use tokio::sync::mpsc;

/// One progress line for `event`, if it is worth showing.
pub fn describe(event: &DeployEvent) -> Option<String> {
    match event {
        DeployEvent::StateChanged(DeployState::Detecting) => {
            Some("Detecting connection methods".into())
        }
        DeployEvent::StateChanged(DeployState::Preflight) => Some("Checking credentials".into()),
        DeployEvent::StateChanged(DeployState::Deploying) => Some("Deploying MikroClaw".into()),
        DeployEvent::StateChanged(_) => None,
        DeployEvent::MethodsDetected(found) if found.is_empty() => None,
        DeployEvent::MethodsDetected(found) => {
            let list: Vec<String> = found.iter().map(ToString::to_string).collect();
            Some(format!("Available: {}", list.join(", ")))
        }
        DeployEvent::MethodSelected(endpoint) => Some(format!("Using {}", endpoint.label())),
        DeployEvent::AttemptFailed { attempt, endpoint } => {
            Some(format!("Attempt {attempt} via {endpoint} failed"))
        }
    }
}

/// Prints events to stderr until the orchestrator is dropped.
pub async fn print_events(mut events: mpsc::Receiver<DeployEvent>) {
    while let Some(event) = events.recv().await {
        if let Some(line) = describe(&event) {
            eprintln!("⏳ {line}");
        }
    }
}
