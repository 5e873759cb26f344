use anyhow::Result;

use crate::commands::render;
use crate::monitor::Monitor;

pub fn handle_services_command(monitor: &Monitor, json_output: bool) -> Result<String> {
    render(monitor.services(), json_output)
}

pub fn handle_summary_command(monitor: &Monitor, json_output: bool) -> Result<String> {
    render(&monitor.summary(), json_output)
}
