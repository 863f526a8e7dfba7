//! `flywheel control` subcommand: the one-shot control client.

use std::error::Error;
use std::time::Duration;

use flywheel_control::{ControlClient, ControlRequest};

/// Issue a single named operation against a running instance and print the
/// JSON response.
pub(crate) async fn control(
    host: String,
    port: u16,
    operation: String,
    args: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let request = ControlRequest::parse(&operation, &args)?;
    let client = ControlClient::new(&host, port);

    let response = client.call(&request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if request == ControlRequest::StartDebugger {
        // Attach the local front-end once the remote hook reports a session,
        // retrying until it does.
        println!("Waiting for debug hook to attach...");
        client.wait_for_debugger(Duration::from_millis(500)).await?;
        println!("Debug hook attached");
    }

    Ok(())
}
