#![forbid(unsafe_code)]

//! Spring-backed driver: one damped spring per key.
//!
//! Reversal and retargeting move targets on live springs, so velocity
//! carries through and there is no restart discontinuity. Per-key delays
//! apply to forward runs only; a reversal starts every key immediately, and
//! a retarget does not delay keys that were already moving.

use std::collections::BTreeMap;
use std::time::Duration;

use titlefit_core::animation::{Direction, Spring, SpringParams};

use super::{AnimationDriver, RunId, RunState, Settled};
use crate::spec::{AnimationSpec, Frame, Key};

const DEFAULT_REST_THRESHOLD: f64 = 0.001;

#[derive(Debug, Clone)]
struct KeySpring {
    spring: Spring,
    from: f64,
    to: f64,
    delay: Duration,
}

impl KeySpring {
    fn target(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Forward => self.to,
            Direction::Backward => self.from,
        }
    }
}

/// Per-key endpoints and timing folded from a spec's tracks.
struct KeyPlan {
    from: f64,
    to: f64,
    delay: Duration,
    params: Option<SpringParams>,
}

fn plan(spec: &AnimationSpec) -> BTreeMap<Key, KeyPlan> {
    let mut plans: BTreeMap<Key, KeyPlan> = BTreeMap::new();
    for track in spec.sorted_tracks() {
        plans
            .entry(track.key)
            .and_modify(|p| {
                p.to = track.to;
                p.params = track.spring.or(p.params);
            })
            .or_insert(KeyPlan {
                from: track.from,
                to: track.to,
                delay: track.delay,
                params: track.spring,
            });
    }
    plans
}

/// Drives every key with its own [`Spring`].
#[derive(Debug)]
pub struct SpringDriver {
    params: SpringParams,
    rest_threshold: f64,
    keys: BTreeMap<Key, KeySpring>,
    elapsed: Duration,
    state: RunState,
}

impl SpringDriver {
    /// Create a driver with default spring parameters.
    #[must_use]
    pub fn new(params: SpringParams) -> Self {
        Self {
            params,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            keys: BTreeMap::new(),
            elapsed: Duration::ZERO,
            state: RunState::default(),
        }
    }

    /// Position delta below which a key is at rest (builder pattern).
    #[must_use]
    pub fn rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    fn spring_for(&self, plan: &KeyPlan) -> Spring {
        Spring::new(plan.from, plan.to)
            .with_params(plan.params.unwrap_or(self.params))
            .with_rest_threshold(self.rest_threshold)
    }

    fn start(&mut self, direction: Direction) {
        for key in self.keys.values_mut() {
            let target = key.target(direction);
            key.spring.set_target(target);
        }
        self.elapsed = Duration::ZERO;
        self.state.start(direction);
    }

    /// Time `key` may integrate during a tick that ended at `self.elapsed`.
    fn active_span(&self, key: &KeySpring, dt: Duration) -> Duration {
        if self.state.direction() == Direction::Backward {
            return dt;
        }
        self.elapsed.saturating_sub(key.delay).min(dt)
    }
}

impl AnimationDriver for SpringDriver {
    fn configure(&mut self, spec: AnimationSpec) {
        self.keys = plan(&spec)
            .into_iter()
            .map(|(key, plan)| {
                let spring = self.spring_for(&plan);
                let entry = KeySpring {
                    spring,
                    from: plan.from,
                    to: plan.to,
                    delay: plan.delay,
                };
                (key, entry)
            })
            .collect();
        self.elapsed = Duration::ZERO;
        self.state.idle(Direction::Forward);
    }

    fn play(&mut self) {
        self.start(Direction::Forward);
    }

    fn reverse(&mut self) {
        self.start(Direction::Backward);
    }

    fn cancel(&mut self) {
        let direction = self.state.direction();
        self.state.idle(direction);
    }

    fn retarget(&mut self, spec: AnimationSpec) {
        let mut old = std::mem::take(&mut self.keys);
        let backward = self.state.direction() == Direction::Backward;
        let running = self.state.running();
        let elapsed = self.elapsed;
        self.keys = plan(&spec)
            .into_iter()
            .map(|(key, plan)| {
                let (spring, delay) = match old.remove(&key) {
                    Some(live) => {
                        // A key already in motion keeps moving; its delay is spent.
                        let moving = running && (backward || elapsed > live.delay);
                        let delay = if moving { Duration::ZERO } else { plan.delay };
                        let mut spring = live
                            .spring
                            .with_params(plan.params.unwrap_or(self.params));
                        spring.set_target(plan.to);
                        (spring, delay)
                    }
                    None => (self.spring_for(&plan), plan.delay),
                };
                let entry = KeySpring {
                    spring,
                    from: plan.from,
                    to: plan.to,
                    delay,
                };
                (key, entry)
            })
            .collect();
        self.start(Direction::Forward);
    }

    fn snap(&mut self, direction: Direction) {
        for key in self.keys.values_mut() {
            let target = key.target(direction);
            key.spring.set_target(target);
            key.spring.snap_to(target);
        }
        self.state.idle(direction);
    }

    fn tick(&mut self, dt: Duration) -> Option<Settled> {
        if !self.state.running() {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(dt);

        let spans: Vec<Duration> = self
            .keys
            .values()
            .map(|key| self.active_span(key, dt))
            .collect();
        for (key, span) in self.keys.values_mut().zip(spans) {
            key.spring.advance(span);
        }

        let forward = self.state.direction() == Direction::Forward;
        let done = self
            .keys
            .values()
            .all(|k| k.spring.is_at_rest() && (!forward || self.elapsed > k.delay));
        if done { self.state.finish() } else { None }
    }

    fn current_frame(&self) -> Frame {
        self.keys
            .iter()
            .map(|(key, k)| (*key, k.spring.position()))
            .collect()
    }

    fn is_running(&self) -> bool {
        self.state.running()
    }

    fn direction(&self) -> Direction {
        self.state.direction()
    }

    fn run(&self) -> RunId {
        self.state.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Prop, Track};

    const MS_16: Duration = Duration::from_millis(16);

    fn scale() -> Key {
        Key::decor(Prop::Scale)
    }

    fn rotation() -> Key {
        Key::decor(Prop::Rotation)
    }

    fn spec() -> AnimationSpec {
        AnimationSpec::new()
            .track(Track::new(scale(), 0.0, 1.0))
            .track(Track::new(rotation(), 0.0, 90.0))
    }

    fn run_until_settled(driver: &mut SpringDriver) -> (usize, Settled) {
        for frame in 0..2000 {
            if let Some(settled) = driver.tick(MS_16) {
                return (frame, settled);
            }
        }
        panic!("spring driver did not settle");
    }

    #[test]
    fn configure_starts_at_from() {
        let mut driver = SpringDriver::new(SpringParams::STANDARD);
        driver.configure(spec());
        assert_eq!(driver.current_frame()[&rotation()], 0.0);
        assert!(!driver.is_running());
        assert_eq!(driver.tick(MS_16), None);
    }

    #[test]
    fn play_settles_once_at_targets() {
        let mut driver = SpringDriver::new(SpringParams::STANDARD);
        driver.configure(spec());
        driver.play();
        let run = driver.run();
        let (_, settled) = run_until_settled(&mut driver);
        assert_eq!(settled.run, run);
        assert_eq!(settled.direction, Direction::Forward);
        assert_eq!(driver.current_frame()[&rotation()], 90.0);
        assert_eq!(driver.tick(MS_16), None);
    }

    #[test]
    fn reverse_mid_flight_is_continuous() {
        let mut driver = SpringDriver::new(SpringParams::STANDARD);
        driver.configure(spec());
        driver.play();
        for _ in 0..10 {
            driver.tick(MS_16);
        }
        let before = driver.current_frame()[&rotation()];
        driver.reverse();
        driver.tick(MS_16);
        let after = driver.current_frame()[&rotation()];
        assert!((after - before).abs() < 10.0, "{before} -> {after}");
        let (_, settled) = run_until_settled(&mut driver);
        assert_eq!(settled.direction, Direction::Backward);
        assert_eq!(driver.current_frame()[&rotation()], 0.0);
    }

    #[test]
    fn cancel_suppresses_settle() {
        let mut driver = SpringDriver::new(SpringParams::STANDARD);
        driver.configure(spec());
        driver.play();
        driver.tick(MS_16);
        driver.cancel();
        for _ in 0..500 {
            assert_eq!(driver.tick(MS_16), None);
        }
    }

    #[test]
    fn delay_holds_key() {
        let mut driver = SpringDriver::new(SpringParams::STANDARD);
        driver.configure(
            AnimationSpec::new().track(Track::new(scale(), 0.0, 1.0).delay(Duration::from_millis(100))),
        );
        driver.play();
        for _ in 0..5 {
            driver.tick(MS_16);
        }
        assert_eq!(driver.current_frame()[&scale()], 0.0);
        for _ in 0..5 {
            driver.tick(MS_16);
        }
        assert!(driver.current_frame()[&scale()] > 0.0);
    }

    #[test]
    fn per_key_params_override_default() {
        let mut fast = SpringDriver::new(SpringParams::STANDARD);
        fast.configure(
            AnimationSpec::new().track(Track::new(scale(), 0.0, 1.0).spring(SpringParams::new(400.0, 40.0))),
        );
        fast.play();
        let (fast_frames, _) = run_until_settled(&mut fast);

        let mut slow = SpringDriver::new(SpringParams::STANDARD);
        slow.configure(AnimationSpec::new().track(Track::new(scale(), 0.0, 1.0)));
        slow.play();
        let (slow_frames, _) = run_until_settled(&mut slow);
        assert!(fast_frames < slow_frames);
    }

    #[test]
    fn retarget_keeps_position_and_velocity() {
        let mut driver = SpringDriver::new(SpringParams::STANDARD);
        driver.configure(spec());
        driver.play();
        for _ in 0..8 {
            driver.tick(MS_16);
        }
        let before = driver.current_frame()[&scale()];
        let old_run = driver.run();
        driver.retarget(AnimationSpec::new().track(Track::new(scale(), 0.0, 2.0)));
        assert_ne!(driver.run(), old_run);
        assert_eq!(driver.current_frame()[&scale()], before);
        assert!(!driver.current_frame().contains_key(&rotation()));
        let (_, settled) = run_until_settled(&mut driver);
        assert_eq!(settled.direction, Direction::Forward);
        assert_eq!(driver.current_frame()[&scale()], 2.0);
    }

    #[test]
    fn retarget_does_not_stall_keys_already_moving() {
        let delayed = |key: Key, to: f64| Track::new(key, 0.0, to).delay(Duration::from_millis(100));
        let mut driver = SpringDriver::new(SpringParams::STANDARD);
        driver.configure(AnimationSpec::new().track(delayed(scale(), 1.0)));
        driver.play();
        for _ in 0..10 {
            driver.tick(MS_16);
        }
        let before = driver.current_frame()[&scale()];
        assert!(before > 0.0);

        driver.retarget(
            AnimationSpec::new()
                .track(delayed(scale(), 2.0))
                .track(delayed(rotation(), 90.0)),
        );
        driver.tick(MS_16);
        let frame = driver.current_frame();
        assert_ne!(frame[&scale()], before);
        assert_eq!(frame[&rotation()], 0.0);

        let (_, settled) = run_until_settled(&mut driver);
        assert_eq!(settled.direction, Direction::Forward);
        assert_eq!(driver.current_frame()[&scale()], 2.0);
        assert_eq!(driver.current_frame()[&rotation()], 90.0);
    }

    #[test]
    fn snap_jumps_without_settle() {
        let mut driver = SpringDriver::new(SpringParams::FIRM);
        driver.configure(spec());
        driver.snap(Direction::Forward);
        assert_eq!(driver.current_frame()[&rotation()], 90.0);
        assert_eq!(driver.tick(MS_16), None);
        driver.reverse();
        let (_, settled) = run_until_settled(&mut driver);
        assert_eq!(settled.direction, Direction::Backward);
    }

    #[test]
    fn empty_spec_settles_on_first_tick() {
        let mut driver = SpringDriver::new(SpringParams::STANDARD);
        driver.configure(AnimationSpec::new());
        driver.play();
        assert!(driver.tick(MS_16).is_some());
    }
}
