//! Periodic visual effects: idle breathing, redline flash and start-up sweep.
//!
//! Each effect is an async loop over short dashboard steps. A step borrows
//! the dashboard, draws one frame and releases it before sleeping, so the
//! loops interleave freely with the polling loop on the same `LocalSet`.
//! Stopping is cooperative: a loop checks the gauge mode on every step and
//! returns within one step interval of the mode changing.

use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::dashboard::SharedDashboard;
use crate::gauge::FlashFrame;
use crate::render::GaugeRenderer;

/// Delay between idle animation frames.
pub const IDLE_STEP_INTERVAL: Duration = Duration::from_millis(50);

/// Intensity change per idle frame, in percent.
pub const IDLE_STEP_PERCENT: usize = 5;

/// Redline flash cadence; the ring toggles on every tick.
pub const FLASH_INTERVAL: Duration = Duration::from_millis(100);

/// Delay between start-up sweep frames.
pub const SWEEP_STEP_INTERVAL: Duration = Duration::from_millis(20);

/// Level change per sweep frame, in percent.
pub const SWEEP_STEP_PERCENT: usize = 4;

/// Percent values of one triangular ramp: `0, step, .., 100, .., step, 0`.
pub fn triangle_ramp(step: usize) -> impl Iterator<Item = usize> {
    let up = (0..=100).step_by(step);
    let down = (0..=100).rev().step_by(step);
    up.chain(down)
}

/// Breathe the ring in the idle hue until idle episode `episode` ends.
///
/// Returns the number of frames drawn.
pub async fn run_idle_animation<R: GaugeRenderer>(
    dashboard: SharedDashboard<R>,
    episode: u64,
    cancel: CancellationToken,
) -> u64 {
    debug!(episode, "Idle animation started");
    let mut frames = 0u64;

    'breathe: loop {
        for percent in triangle_ramp(IDLE_STEP_PERCENT) {
            if cancel.is_cancelled() {
                break 'breathe;
            }
            let intensity = percent as f32 / 100.0;
            if !dashboard.borrow_mut().idle_step(episode, intensity) {
                break 'breathe;
            }
            frames += 1;
            sleep(IDLE_STEP_INTERVAL).await;
        }
    }

    debug!(episode, frames, "Idle animation stopped");
    frames
}

/// Drive the redline flash forever; a no-op tick outside `Redline`.
pub async fn run_redline_flash<R: GaugeRenderer>(
    dashboard: SharedDashboard<R>,
    cancel: CancellationToken,
) {
    let mut ticker = interval(FLASH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let frame = dashboard.borrow_mut().flash_tick();
        if frame != FlashFrame::Inactive {
            trace!(?frame, "Redline flash");
        }
    }
    debug!("Redline flash loop stopped");
}

/// Sweep the gauge from empty to full and back, `times` times.
pub async fn run_startup_sweep<R: GaugeRenderer>(dashboard: SharedDashboard<R>, times: u32) {
    debug!(times, "Start-up sweep");
    for _ in 0..times {
        for percent in triangle_ramp(SWEEP_STEP_PERCENT) {
            dashboard.borrow_mut().sweep_step(percent as f32 / 100.0);
            sleep(SWEEP_STEP_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GaugeConfig;
    use crate::dashboard::Dashboard;
    use crate::gauge::GaugeMode;
    use crate::registry::RegistryHandle;
    use crate::test_utils::{RecordingRenderer, RenderEvent, dirt_rally_packet, sample_registry};
    use crate::types::{RingFill, Rgb};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tokio::task::LocalSet;
    use tokio::time::Instant;

    fn shared() -> SharedDashboard<RecordingRenderer> {
        Rc::new(RefCell::new(Dashboard::new(
            RegistryHandle::new(sample_registry()),
            GaugeConfig::default(),
            RecordingRenderer::default(),
        )))
    }

    #[test]
    fn ramp_is_triangular() {
        let ramp: Vec<usize> = triangle_ramp(25).collect();
        assert_eq!(ramp, vec![0, 25, 50, 75, 100, 100, 75, 50, 25, 0]);
        assert_eq!(triangle_ramp(IDLE_STEP_PERCENT).count(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_animation_stops_within_one_step_of_telemetry() {
        let dash = shared();
        let entry = dash.borrow_mut().begin_idle();

        let local = LocalSet::new();
        local
            .run_until(async {
                let task = tokio::task::spawn_local(run_idle_animation(
                    Rc::clone(&dash),
                    entry.episode,
                    CancellationToken::new(),
                ));

                sleep(Duration::from_millis(510)).await;
                dash.borrow_mut().handle_packet(&dirt_rally_packet(2.0, 100.0), Instant::now());
                assert_eq!(dash.borrow().mode(), GaugeMode::Active);

                let started = Instant::now();
                let frames = task.await.unwrap();
                assert!(started.elapsed() <= IDLE_STEP_INTERVAL);
                assert_eq!(frames, 11);
            })
            .await;

        let dash = dash.borrow();
        // Ten 5% steps reach half intensity, drawn at half the ring brightness.
        let events = dash.renderer().events();
        assert!(events.contains(&RenderEvent::Ring {
            fill: RingFill::Uniform,
            color: Rgb::new(0, 75, 75),
            brightness: 0.15
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn flash_loop_toggles_only_in_redline() {
        let dash = shared();
        let cancel = CancellationToken::new();

        let local = LocalSet::new();
        local
            .run_until(async {
                let flash = run_redline_flash(Rc::clone(&dash), cancel.clone());
                let task = tokio::task::spawn_local(flash);

                sleep(Duration::from_millis(250)).await;
                assert!(dash.borrow().renderer().events().is_empty());

                dash.borrow_mut().handle_packet(&dirt_rally_packet(4.0, 600.0), Instant::now());
                assert_eq!(dash.borrow().mode(), GaugeMode::Redline);

                sleep(Duration::from_millis(400)).await;
                cancel.cancel();
                task.await.unwrap();
            })
            .await;

        let dash = dash.borrow();
        let rings = dash.renderer().ring_events();
        assert!(rings.len() >= 3);
        assert!(rings.contains(&&RenderEvent::Ring {
            fill: RingFill::Bar { level: 1.0 },
            color: Rgb::RED,
            brightness: 0.3
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_visits_full_scale_and_returns() {
        let dash = shared();
        run_startup_sweep(Rc::clone(&dash), 1).await;

        let dash = dash.borrow();
        let levels: Vec<f32> = dash
            .renderer()
            .ring_events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Ring { fill: RingFill::Bar { level }, .. } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(levels.first(), Some(&0.0));
        assert!(levels.contains(&1.0));
        assert_eq!(levels.last(), Some(&0.0));
        assert_eq!(levels.len(), 52);
    }
}
