use anyhow::{Result, anyhow};
use log::{debug, info};
use swipectl::SwipeDirection;

use crate::actions::{Action, UinputSink};
use crate::config::{Profile, binding_key};

/// Perform the action bound to `dir`, if any.
pub fn dispatch_swipe(dir: SwipeDirection, profile: &Profile, sink: &mut UinputSink) -> Result<()> {
    let Some(binding) = profile.binding(dir) else {
        debug!("{}: no binding", dir.event_name());
        return Ok(());
    };
    let action: Action = binding
        .parse()
        .map_err(|e| anyhow!("{} -> '{}': {e}", binding_key(dir), binding))?;
    if matches!(action, Action::Command(_)) && !profile.meta.allow_commands {
        return Err(anyhow!(
            "{} uses cmd: but allow_commands=false",
            binding_key(dir)
        ));
    }
    info!("{} -> {}", dir.event_name(), binding);
    sink.perform(&action)
}
