use eframe::egui::Context;

use super::super::ViewModel;

const FPS_SAMPLE_WINDOW: usize = 120;

impl ViewModel {
    pub(in crate::app) fn update_fps_counter(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt);
        self.record_frame_time(dt);
    }

    fn record_frame_time(&mut self, dt: f32) {
        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > FPS_SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    pub(in crate::app) fn fps_display_text(&self) -> Option<String> {
        if self.fps_samples.is_empty() {
            return None;
        }

        let avg = self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32;
        Some(format!(
            "FPS {:.0} | avg {:.1} | {:.1} ms",
            self.fps_current,
            avg,
            1000.0 / self.fps_current.max(f32::EPSILON)
        ))
    }

    pub(in crate::app) fn simulation_status_text(&self) -> String {
        use super::super::physics::{SimulationState, StopReason};

        let simulation = &self.cache.simulation;
        match simulation.state() {
            SimulationState::Running { .. } => format!(
                "running | alpha {:.3} | tick {}",
                simulation.alpha(),
                simulation.ticks()
            ),
            SimulationState::Stopped => match simulation.last_stop() {
                Some(StopReason::Manual) => "stopped".to_owned(),
                Some(StopReason::Budget) => "stopped (time budget)".to_owned(),
                Some(StopReason::Cooled) => "settled".to_owned(),
                None => "idle".to_owned(),
            },
        }
    }
}
