//! Hotkey file actions.

use std::sync::Arc;

use tracing::{info, warn};

use super::{DialogKind, DialogRequest, DomainContext, HotkeySource};
use crate::model::action_id::ActionId;
use crate::model::mapping::ActionMapping;

pub fn mappings(ctx: &DomainContext) -> Vec<ActionMapping> {
    let load_control = Arc::clone(&ctx.control);
    let load_dialogs = Arc::clone(&ctx.dialogs);
    let save_control = Arc::clone(&ctx.control);
    let save_dialogs = Arc::clone(&ctx.dialogs);
    let clear_control = Arc::clone(&ctx.control);
    let default_control = Arc::clone(&ctx.control);

    vec![
        ActionMapping::new(ActionId::HotkeysLoad, move |inv| {
            let control = Arc::clone(&load_control);
            load_dialogs.open(DialogRequest::new(DialogKind::LoadHotkeys, inv).on_accept(
                move |file| match file {
                    Some(file) => {
                        info!("Loading hotkeys from {}", file.display());
                        control.set_hotkeys(HotkeySource::File(file));
                    }
                    None => warn!("No hotkey file selected"),
                },
            ));
        })
        .dialog(),
        ActionMapping::new(ActionId::HotkeysSave, move |inv| {
            let control = Arc::clone(&save_control);
            save_dialogs.open(DialogRequest::new(DialogKind::SaveHotkeys, inv).on_accept(
                move |file| match file {
                    Some(file) => {
                        info!("Saving hotkeys to {}", file.display());
                        control.note_hotkeys_saved(file);
                    }
                    None => warn!("No hotkey file selected"),
                },
            ));
        })
        .dialog(),
        ActionMapping::new(ActionId::HotkeysClear, move |_| {
            clear_control.set_hotkeys(HotkeySource::Empty);
        })
        .uithread(),
        ActionMapping::new(ActionId::HotkeysDefault, move |_| {
            default_control.set_hotkeys(HotkeySource::Default);
        })
        .uithread(),
    ]
}
