//! Drive actions: attach dialogs, detach, drive reset.

use std::sync::Arc;

use tracing::{info, warn};

use super::{DialogKind, DialogRequest, DomainContext, FIRST_DRIVE_UNIT};
use crate::model::action_id::ActionId;
use crate::model::mapping::ActionMapping;

const ATTACH: [ActionId; 4] = [
    ActionId::DriveAttach8,
    ActionId::DriveAttach9,
    ActionId::DriveAttach10,
    ActionId::DriveAttach11,
];

const RESET: [ActionId; 4] = [
    ActionId::DriveReset8,
    ActionId::DriveReset9,
    ActionId::DriveReset10,
    ActionId::DriveReset11,
];

fn attach_mapping(ctx: &DomainContext, action: ActionId, kind: DialogKind, unit: u8) -> ActionMapping {
    let control = Arc::clone(&ctx.control);
    let dialogs = Arc::clone(&ctx.dialogs);

    ActionMapping::new(action, move |inv| {
        let control = Arc::clone(&control);
        dialogs.open(DialogRequest::new(kind, inv).on_accept(move |image| match image {
            Some(image) => {
                info!("Attaching {} to unit {}", image.display(), unit);
                control.attach_disk(unit, image);
            }
            None => warn!("Attach dialog for unit {} accepted without a file", unit),
        }));
    })
    .dialog()
}

pub fn mappings(ctx: &DomainContext) -> Vec<ActionMapping> {
    let mut mappings = Vec::with_capacity(ATTACH.len() + RESET.len() + 2);

    for (unit, action) in (FIRST_DRIVE_UNIT..).zip(ATTACH) {
        mappings.push(attach_mapping(ctx, action, DialogKind::AttachDisk { unit }, unit));
    }
    mappings.push(attach_mapping(
        ctx,
        ActionId::SmartAttach,
        DialogKind::SmartAttach,
        FIRST_DRIVE_UNIT,
    ));

    let control = Arc::clone(&ctx.control);
    mappings.push(
        ActionMapping::new(ActionId::DriveDetachAll, move |_| {
            info!("Detaching all disk images");
            control.detach_all();
        })
        .uithread(),
    );

    for (unit, action) in (FIRST_DRIVE_UNIT..).zip(RESET) {
        let control = Arc::clone(&ctx.control);
        mappings.push(
            ActionMapping::new(action, move |inv| {
                info!("Resetting drive {}", unit);
                control.reset_drive(unit);
                inv.finish();
            })
            .blocks(),
        );
    }

    mappings
}
