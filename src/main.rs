//! Application entry point: push-to-talk bridge.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime.
//! 4. Load the registry from `state.json` and spawn the coordinator loop.
//! 5. Open the desktop page storage, seed the shortcut, start polling.
//! 6. Spawn the page agent with the keyboard sink.
//! 7. Spawn the hotkey listener thread.
//! 8. Run the settings window (or wait for Ctrl-C), then tear down.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use eframe::egui;
use ptt_bridge::{
    app::SettingsApp,
    channel::{CoordinatorHandle, PageEvent, PageHandle},
    config::{AppConfig, AppPaths},
    coordinator::{Coordinator, Registry},
    hotkey::{parse_key, HotkeyListener},
    page::{seed_shortcut, FilePageStorage, KeyboardSink, PageAgent},
    store::JsonFileStore,
};

/// The desktop has exactly one page.
const DESKTOP_PAGE: PageHandle = PageHandle::new(1);

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([320.0, 130.0])
        .with_min_inner_size([260.0, 110.0])
        .with_resizable(false);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("PTT bridge starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let paths = AppPaths::new();

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("creating tokio runtime")?;
    let _guard = rt.enter();

    // 4. Coordinator
    let registry = rt.block_on(Registry::init(
        JsonFileStore::new(&paths.state_file),
        config.ptt.default_min_ptt_length_ms,
    ));
    let badge = registry.subscribe_badge();
    let (coordinator, inbox) = CoordinatorHandle::channel();
    let service = rt.spawn(Coordinator::new(registry).run(inbox));

    // 5. Desktop page storage
    let storage = rt
        .block_on(FilePageStorage::open(&paths.page_storage_file))
        .with_context(|| format!("opening {}", paths.page_storage_file.display()))?;
    let storage = Arc::new(storage);
    if let Some(combo) = &config.page.seed_shortcut {
        if let Err(e) = seed_shortcut(storage.as_ref(), combo) {
            log::warn!("Ignoring seed shortcut {combo:?}: {e}");
        }
    }
    let poller = Arc::clone(&storage)
        .spawn_polling(Duration::from_millis(config.page.poll_interval_ms.max(10)));

    // 6. Page agent
    let (agent, page) = PageAgent::new(
        DESKTOP_PAGE,
        coordinator.clone(),
        storage,
        KeyboardSink::new(),
        Duration::from_millis(u64::from(config.ptt.default_min_ptt_length_ms)),
        Duration::from_millis(u64::from(config.ptt.min_gap_ms)),
    );
    let agent_task = rt.spawn(agent.run());

    // 7. Hotkey listener thread
    let trigger_key = parse_key(&config.hotkey.trigger_key).unwrap_or_else(|| {
        log::warn!(
            "Unknown trigger key {:?}; falling back to F9",
            config.hotkey.trigger_key
        );
        rdev::Key::F9
    });
    let _hotkey_listener = HotkeyListener::start(trigger_key, coordinator.clone())
        .context("spawning hotkey listener thread")?;

    // 8. Settings window, or run headless until Ctrl-C
    if config.ui.show_settings_window {
        let (min_ptt_length, events) = rt.block_on(coordinator.open_settings())?;
        let app = SettingsApp::new(
            coordinator.clone(),
            min_ptt_length,
            events,
            badge,
            config.hotkey.trigger_key.clone(),
        );
        eframe::run_native(
            "PTT Bridge",
            native_options(&config),
            Box::new(move |_cc| Ok(Box::new(app))),
        )
        .map_err(|e| anyhow!("settings window failed: {e}"))?;
    } else {
        log::info!("Running without settings window; press Ctrl-C to quit");
        rt.block_on(tokio::signal::ctrl_c())
            .context("waiting for Ctrl-C")?;
    }

    // Teardown: page first so it unregisters, then the coordinator.
    let _ = page.send(PageEvent::Teardown);
    rt.block_on(async {
        match agent_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("Page agent stopped: {e}"),
            Err(e) => log::warn!("Page agent task failed: {e}"),
        }
        let _ = coordinator.shutdown();
        if let Err(e) = service.await {
            log::warn!("Coordinator task failed: {e}");
        }
    });
    poller.abort();

    log::info!("PTT bridge stopped");
    Ok(())
}
