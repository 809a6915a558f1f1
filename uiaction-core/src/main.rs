//! src/main.rs
//! Headless frontend driving the action registry from scripted input.
//!
//! An "emulation" thread and a "joystick" thread trigger actions by name, the
//! way hotkeys and joystick mappings would. The UI loop drains the dispatch
//! queue, auto-answers dialogs after a short delay, and runs the stall
//! watchdog. Action names may be given on the command line.

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, anyhow};
use parking_lot::Mutex;
use tokio::signal;
use tracing::{debug, info, warn};

use uiaction_core::{
    ActionId, ActionRegistry, TriggerOutcome,
    config::Config,
    controller::{
        StallWatchdog, UiQueue,
        domains::{
            self, DialogHost, DialogKind, DialogOutcome, DialogRequest, DomainContext,
            EmulatorControl,
        },
    },
    logging::init_logging,
};

const DEFAULT_SCRIPT: &[&str] = &[
    "warp-mode-toggle",
    "drive-attach-8:0",
    "drive-attach-9:0",
    "pause-toggle",
    "pause-toggle",
    "advance-frame",
    "hotkeys-load",
    "reset-soft",
    "quit",
];

const TRIGGER_INTERVAL: Duration = Duration::from_millis(120);
const UI_FRAME: Duration = Duration::from_millis(16);
const DIALOG_DELAY: Duration = Duration::from_millis(200);

/// Dialog host that answers every dialog once it has been open a while.
#[derive(Default)]
struct ScriptedDialogs {
    open: Mutex<Vec<(Instant, DialogRequest)>>,
}

impl ScriptedDialogs {
    fn answer(kind: DialogKind) -> DialogOutcome {
        match kind {
            DialogKind::AttachDisk { unit } => {
                DialogOutcome::Accepted(Some(PathBuf::from(format!("demo-{unit}.d64"))))
            }
            DialogKind::SmartAttach => DialogOutcome::Accepted(Some(PathBuf::from("demo.prg"))),
            DialogKind::LoadHotkeys | DialogKind::SaveHotkeys => {
                DialogOutcome::Accepted(Some(PathBuf::from("demo.vhk")))
            }
            DialogKind::ConfirmQuit => DialogOutcome::Accepted(None),
            _ => DialogOutcome::Cancelled,
        }
    }

    /// Close dialogs that have been open longer than `DIALOG_DELAY`.
    fn pump(&self) {
        let ready: Vec<DialogRequest> = {
            let mut open = self.open.lock();
            let (ready, waiting): (Vec<_>, Vec<_>) = open
                .drain(..)
                .partition(|(opened, _)| opened.elapsed() >= DIALOG_DELAY);
            *open = waiting;
            ready.into_iter().map(|(_, request)| request).collect()
        };

        for request in ready {
            let outcome = Self::answer(request.kind());
            request.close(outcome);
        }
    }

    fn is_idle(&self) -> bool {
        self.open.lock().is_empty()
    }
}

impl DialogHost for ScriptedDialogs {
    fn open(&self, request: DialogRequest) {
        info!("Dialog '{}' opened", request.kind());
        self.open.lock().push((Instant::now(), request));
    }
}

fn log_outcome(source: &str, name: &str, outcome: TriggerOutcome) {
    if outcome.accepted() {
        debug!("[{}] '{}' -> {:?}", source, name, outcome);
    } else {
        info!("[{}] '{}' -> {:?}", source, name, outcome);
    }
}

fn spawn_emulation(
    registry: ActionRegistry,
    script: Vec<String>,
    done: Arc<AtomicBool>,
) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("emulation".into())
        .spawn(move || {
            for name in &script {
                log_outcome("emulation", name, registry.trigger_by_name(name));
                thread::sleep(TRIGGER_INTERVAL);
            }
            done.store(true, Ordering::Release);
        })
        .context("Failed to spawn emulation thread")
}

fn spawn_joystick(registry: ActionRegistry) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("joystick".into())
        .spawn(move || {
            // Fire button mapped to drive reset, hammered faster than it runs.
            for _ in 0..3 {
                let name = ActionId::DriveReset8.name();
                log_outcome("joystick", name, registry.trigger_by_name(name));
                thread::sleep(Duration::from_millis(5));
            }
            let name = ActionId::SettingsDialog.name();
            log_outcome("joystick", name, registry.trigger_by_name(name));
        })
        .context("Failed to spawn joystick thread")
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let (config, load_error) = match Config::load().await {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }
    info!("Starting as {:?}", config.registry.machine);

    let registry = ActionRegistry::new(&config.registry);
    let (queue, sender) = UiQueue::new();
    registry.set_dispatch_function(sender);

    let control = Arc::new(EmulatorControl::new());
    let dialogs = Arc::new(ScriptedDialogs::default());
    let ctx = DomainContext::new(Arc::clone(&control), dialogs.clone());

    let report = domains::register_all(&registry, &ctx, config.registry.machine);
    info!(
        "{} actions registered ({} rejected)",
        report.added,
        report.rejected.len()
    );

    let script: Vec<String> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            DEFAULT_SCRIPT.iter().map(ToString::to_string).collect()
        } else {
            args
        }
    };

    let script_done = Arc::new(AtomicBool::new(false));
    let emulation = spawn_emulation(registry.clone(), script, Arc::clone(&script_done))?;
    let joystick = spawn_joystick(registry.clone())?;

    let mut watchdog = StallWatchdog::new(registry.clone(), config.registry.stall_warning);
    let ui_control = Arc::clone(&control);
    let ui_dialogs = Arc::clone(&dialogs);
    let ui_done = Arc::clone(&script_done);
    let mut ui = tokio::task::spawn_blocking(move || {
        let mut handled = 0usize;
        loop {
            match queue.run_timeout(UI_FRAME) {
                Some(ran) => handled += ran,
                None => break,
            }
            ui_dialogs.pump();
            watchdog.check();

            if ui_control.quit_requested() {
                info!("Quit requested");
                break;
            }
            if ui_done.load(Ordering::Acquire) && ui_dialogs.is_idle() && queue.pending() == 0 {
                info!("Script finished");
                break;
            }
        }
        handled
    });

    let handled = tokio::select! {
        joined = &mut ui => joined.context("UI loop failed")?,
        signal = signal::ctrl_c() => {
            signal.context("Failed to listen for ctrl-c")?;
            info!("Interrupted, asking to quit");
            log_outcome("signal", ActionId::Quit.name(), registry.trigger(ActionId::Quit));
            ui.await.context("UI loop failed")?
        }
    };
    info!("UI thread ran {} handlers", handled);

    emulation
        .join()
        .map_err(|_| anyhow!("emulation thread panicked"))?;
    joystick
        .join()
        .map_err(|_| anyhow!("joystick thread panicked"))?;

    info!(
        "warp={} paused={} frames={} drive8={:?} hotkeys={:?}",
        control.warp(),
        control.paused(),
        control.frames_advanced(),
        control.attached(8),
        control.hotkeys()
    );

    registry.dump();
    registry.shutdown();

    info!("Exited cleanly");
    Ok(())
}
