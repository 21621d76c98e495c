//! Settings window: egui/eframe application.
//!
//! [`SettingsApp`] is the settings surface: it shows the broadcast badge and
//! a slider for MinPttLength.  It never touches the store itself; slider
//! changes go to the coordinator, and the value shown follows the
//! coordinator's `ConfigChanged` notices so several surfaces stay in sync.
//!
//! | Element | Source |
//! |---------|--------|
//! | Badge | coordinator badge (`watch` channel) |
//! | Slider | `SettingsEvent::ConfigChanged`, committed on release |
//! | Hotkey hint | `hotkey.trigger_key` from the config |

use std::time::Duration;

use eframe::egui;
use tokio::sync::{mpsc, watch};

use crate::channel::{CoordinatorHandle, SettingsEvent};
use crate::coordinator::BadgeState;

/// Slider bounds, milliseconds.
pub const SLIDER_MIN_MS: u32 = 100;
pub const SLIDER_MAX_MS: u32 = 2000;

/// How often the window wakes up to poll its channels.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct SettingsApp {
    coordinator: CoordinatorHandle,
    events: mpsc::UnboundedReceiver<SettingsEvent>,
    badge: watch::Receiver<BadgeState>,

    /// Value under the slider.
    min_ptt_length: u32,
    /// Last value the coordinator confirmed or was sent.
    committed: u32,

    trigger_key: String,
}

impl SettingsApp {
    /// * `min_ptt_length`, `events`: the reply to
    ///   [`CoordinatorHandle::open_settings`].
    pub fn new(
        coordinator: CoordinatorHandle,
        min_ptt_length: u32,
        events: mpsc::UnboundedReceiver<SettingsEvent>,
        badge: watch::Receiver<BadgeState>,
        trigger_key: String,
    ) -> Self {
        Self {
            coordinator,
            events,
            badge,
            min_ptt_length,
            committed: min_ptt_length,
            trigger_key,
        }
    }

    pub fn min_ptt_length(&self) -> u32 {
        self.min_ptt_length
    }

    /// Drain pending coordinator notices (non-blocking).
    fn poll_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SettingsEvent::ConfigChanged(value) => {
                    self.min_ptt_length = value;
                    self.committed = value;
                }
            }
        }
    }

    /// Send the slider value to the coordinator if it differs from the
    /// last committed one.
    fn commit(&mut self) {
        if self.min_ptt_length == self.committed {
            return;
        }
        match self.coordinator.set_min_ptt_length(self.min_ptt_length) {
            Ok(()) => {
                log::debug!("settings: min PTT length -> {} ms", self.min_ptt_length);
                self.committed = self.min_ptt_length;
            }
            Err(e) => log::warn!("settings: couldn't update min PTT length: {e}"),
        }
    }

    fn draw_badge(&self, ui: &mut egui::Ui) {
        let state = *self.badge.borrow();
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Broadcasting")
                    .color(egui::Color32::from_rgb(180, 180, 180))
                    .size(13.0),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let text = match state {
                    BadgeState::On => state.text(),
                    BadgeState::Off => "off",
                };
                ui.label(
                    egui::RichText::new(text)
                        .color(badge_color(state))
                        .strong()
                        .size(13.0),
                );
            });
        });
    }

    fn draw_slider(&mut self, ui: &mut egui::Ui) {
        ui.label(
            egui::RichText::new("Minimum push-to-talk length")
                .color(egui::Color32::from_rgb(180, 180, 180))
                .size(12.0),
        );
        let response = ui.add(
            egui::Slider::new(&mut self.min_ptt_length, SLIDER_MIN_MS..=SLIDER_MAX_MS)
                .step_by(10.0)
                .suffix(" ms"),
        );
        // Only commit once the user lets go, not on every drag step.
        if response.drag_stopped() || (response.changed() && !response.dragged()) {
            self.commit();
        }
    }

    fn draw_hint(&self, ui: &mut egui::Ui) {
        ui.label(
            egui::RichText::new(format!("Hold {} to talk", self.trigger_key))
                .color(egui::Color32::from_rgb(120, 120, 120))
                .size(11.0),
        );
    }
}

fn badge_color(state: BadgeState) -> egui::Color32 {
    match state {
        BadgeState::On => egui::Color32::from_rgb(80, 200, 120),
        BadgeState::Off => egui::Color32::from_rgb(100, 100, 100),
    }
}

impl eframe::App for SettingsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();
        ctx.request_repaint_after(POLL_INTERVAL);

        let frame = egui::Frame::new()
            .fill(egui::Color32::from_rgba_premultiplied(30, 30, 30, 230))
            .corner_radius(egui::CornerRadius::same(8))
            .inner_margin(egui::Margin::same(10));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            self.draw_badge(ui);
            ui.separator();
            self.draw_slider(ui);
            ui.add_space(4.0);
            self.draw_hint(ui);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.commit();
        log::info!("settings: window closing");
    }
}
