//! Timeline slider and play loop.
//!
//! The slider runs over a fixed domain (`0..=slider_max`) and maps linearly
//! onto graph time (`0..=max_steps`). Playing advances the slider by a fixed
//! amount per tick; the caller drives ticks from a timer every
//! [`TimelineSettings::play_resolution_ms`].

use log::debug;

use crate::config::TimelineSettings;

#[derive(Clone, Debug)]
pub struct Timeline {
	settings: TimelineSettings,
	range_max: f64,
	current_value: f64,
	playing: bool,
}

impl Timeline {
	pub fn new(max_steps: usize, settings: TimelineSettings) -> Self {
		Self {
			settings,
			range_max: max_steps as f64,
			current_value: 0.0,
			playing: false,
		}
	}

	pub fn settings(&self) -> &TimelineSettings {
		&self.settings
	}

	/// Updates the time range, e.g. after an import made trips longer.
	pub fn set_range(&mut self, max_steps: usize) {
		self.range_max = max_steps as f64;
	}

	pub fn set_play_speed(&mut self, speed: f64) {
		self.settings.play_speed = speed;
	}

	/// Slider position.
	pub fn current_value(&self) -> f64 {
		self.current_value
	}

	pub fn is_playing(&self) -> bool {
		self.playing
	}

	/// Graph time for a slider position.
	pub fn scale(&self, value: f64) -> f64 {
		if self.settings.slider_max <= 0.0 {
			return 0.0;
		}
		value / self.settings.slider_max * self.range_max
	}

	/// Moves the slider by hand and returns the matching graph time.
	pub fn slide(&mut self, value: f64) -> f64 {
		self.current_value = value.clamp(0.0, self.settings.slider_max);
		self.scale(self.current_value)
	}

	/// Slider distance covered by one play tick.
	pub fn step_size(&self) -> f64 {
		self.settings.slider_max / self.settings.play_num_steps * self.settings.play_speed
	}

	/// Starts or pauses playback and returns whether it is now playing.
	/// Starting at the end rewinds to the beginning first.
	pub fn toggle_play(&mut self) -> bool {
		if self.playing {
			self.playing = false;
		} else {
			if self.current_value >= self.settings.slider_max - self.settings.play_speed {
				self.current_value = 0.0;
			}
			self.playing = true;
		}
		debug!("Timeline playing: {}", self.playing);
		self.playing
	}

	pub fn stop(&mut self) {
		self.playing = false;
	}

	/// Advances one tick. Returns the new graph time, or `None` once the end
	/// is passed, at which point playback stops.
	pub fn play_step(&mut self) -> Option<f64> {
		if !self.playing {
			return None;
		}
		let next = self.current_value + self.step_size();
		if next > self.settings.slider_max {
			self.playing = false;
			return None;
		}
		self.current_value = next;
		Some(self.scale(next))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn slider_maps_onto_graph_time() {
		let mut timeline = Timeline::new(4, TimelineSettings::default());
		assert_eq!(timeline.scale(250.0), 2.0);
		assert_eq!(timeline.slide(125.0), 1.0);
		assert_eq!(timeline.slide(900.0), 4.0);
		assert_eq!(timeline.current_value(), 500.0);
	}

	#[test]
	fn playback_runs_to_the_end_and_stops() {
		let mut timeline = Timeline::new(10, TimelineSettings::default());
		assert!(timeline.toggle_play());

		let mut ticks = 0;
		let mut last = 0.0;
		while let Some(time) = timeline.play_step() {
			assert!(time > last);
			last = time;
			ticks += 1;
		}
		assert_eq!(ticks, 500);
		assert_eq!(last, 10.0);
		assert!(!timeline.is_playing());
	}

	#[test]
	fn playing_from_the_end_rewinds() {
		let mut timeline = Timeline::new(3, TimelineSettings::default());
		timeline.slide(500.0);
		timeline.toggle_play();
		assert_eq!(timeline.current_value(), 0.0);
		let time = timeline.play_step().unwrap();
		assert!((time - 0.006).abs() < 1e-12);
	}

	#[test]
	fn speed_scales_each_tick() {
		let mut timeline = Timeline::new(1, TimelineSettings::default());
		timeline.set_play_speed(4.0);
		timeline.toggle_play();
		timeline.play_step();
		assert_eq!(timeline.current_value(), 4.0);
		assert!(!timeline.toggle_play());
		assert_eq!(timeline.play_step(), None);
	}
}
