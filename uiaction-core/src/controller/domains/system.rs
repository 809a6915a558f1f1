//! Machine control: quit, resets, and the general-purpose dialogs.

use std::sync::Arc;

use tracing::info;

use super::{DialogKind, DialogRequest, DomainContext, ResetKind};
use crate::model::action_id::ActionId;
use crate::model::mapping::ActionMapping;

fn plain_dialog(ctx: &DomainContext, action: ActionId, kind: DialogKind) -> ActionMapping {
    let dialogs = Arc::clone(&ctx.dialogs);
    ActionMapping::new(action, move |inv| {
        dialogs.open(DialogRequest::new(kind, inv));
    })
    .dialog()
}

fn reset(ctx: &DomainContext, action: ActionId, kind: ResetKind) -> ActionMapping {
    let control = Arc::clone(&ctx.control);
    ActionMapping::new(action, move |inv| {
        info!("{:?} reset", kind);
        control.reset(kind);
        inv.finish();
    })
    .blocks()
}

pub fn mappings(ctx: &DomainContext) -> Vec<ActionMapping> {
    let control = Arc::clone(&ctx.control);
    let dialogs = Arc::clone(&ctx.dialogs);

    vec![
        ActionMapping::new(ActionId::Quit, move |inv| {
            let control = Arc::clone(&control);
            dialogs.open(
                DialogRequest::new(DialogKind::ConfirmQuit, inv).on_accept(move |_| {
                    info!("Quit confirmed");
                    control.request_quit();
                }),
            );
        })
        .dialog(),
        reset(ctx, ActionId::ResetSoft, ResetKind::Soft),
        reset(ctx, ActionId::ResetHard, ResetKind::Hard),
        plain_dialog(ctx, ActionId::SettingsDialog, DialogKind::Settings),
        plain_dialog(ctx, ActionId::AboutDialog, DialogKind::About),
        plain_dialog(ctx, ActionId::MonitorOpen, DialogKind::Monitor),
    ]
}
