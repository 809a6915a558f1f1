//! Speed and pause actions.

use std::sync::Arc;

use tracing::info;

use super::{DialogKind, DialogRequest, DomainContext};
use crate::model::action_id::ActionId;
use crate::model::mapping::ActionMapping;

pub fn mappings(ctx: &DomainContext) -> Vec<ActionMapping> {
    let warp = Arc::clone(&ctx.control);
    let pause = Arc::clone(&ctx.control);
    let advance = Arc::clone(&ctx.control);
    let dialogs = Arc::clone(&ctx.dialogs);

    vec![
        ActionMapping::new(ActionId::WarpModeToggle, move |_| {
            info!("Warp mode {}", if warp.toggle_warp() { "on" } else { "off" });
        }),
        ActionMapping::new(ActionId::PauseToggle, move |_| {
            info!("Emulation {}", if pause.toggle_pause() { "paused" } else { "resumed" });
        }),
        // Advancing from a running machine just pauses it first.
        ActionMapping::new(ActionId::AdvanceFrame, move |_| {
            if advance.paused() {
                advance.advance_frame();
            } else {
                advance.set_paused(true);
            }
        }),
        ActionMapping::new(ActionId::SpeedSettings, move |inv| {
            dialogs.open(DialogRequest::new(DialogKind::SpeedSettings, inv));
        })
        .dialog(),
    ]
}
