//! Decorative particle background: drifting dots linked by faint lines,
//! reacting to the pointer. Runs independently of slide state.

use eframe::egui::{self, Color32, Pos2, Rect, Stroke, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::theme::Theme;

#[derive(Debug, Clone)]
pub struct ParticleConfig {
    /// Particle count for a reference area of `density_area` thousand square points.
    pub count: f32,
    pub density_area: f32,
    pub opacity: f32,
    pub opacity_min: f32,
    pub opacity_speed: f32,
    pub size: f32,
    pub size_min: f32,
    pub size_speed: f32,
    pub link_distance: f32,
    pub link_opacity: f32,
    pub link_width: f32,
    pub speed: f32,
    pub grab_distance: f32,
    pub grab_opacity: f32,
    pub push_count: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 80.0,
            density_area: 800.0,
            opacity: 0.3,
            opacity_min: 0.1,
            opacity_speed: 1.0,
            size: 3.0,
            size_min: 0.1,
            size_speed: 2.0,
            link_distance: 150.0,
            link_opacity: 0.2,
            link_width: 1.0,
            speed: 1.0,
            grab_distance: 200.0,
            grab_opacity: 0.5,
            push_count: 4,
        }
    }
}

impl ParticleConfig {
    /// Number of particles for a canvas of the given size.
    pub fn count_for(&self, bounds: Rect) -> usize {
        let area = bounds.width() * bounds.height() / 1000.0;
        (area * self.count / self.density_area).round().max(0.0) as usize
    }
}

#[derive(Debug, Clone)]
struct Particle {
    pos: Pos2,
    vel: Vec2,
    radius: f32,
    radius_max: f32,
    radius_growing: bool,
    opacity: f32,
    opacity_max: f32,
    opacity_growing: bool,
    color: usize,
}

pub struct ParticleField {
    config: ParticleConfig,
    particles: Vec<Particle>,
    bounds: Rect,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(config: ParticleConfig, bounds: Rect) -> Self {
        Self::with_rng(config, bounds, StdRng::from_os_rng())
    }

    #[cfg(test)]
    pub fn seeded(config: ParticleConfig, bounds: Rect, seed: u64) -> Self {
        Self::with_rng(config, bounds, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ParticleConfig, bounds: Rect, rng: StdRng) -> Self {
        let mut field = Self {
            config,
            particles: Vec::new(),
            bounds,
            rng,
        };
        let count = field.config.count_for(bounds);
        for _ in 0..count {
            let pos = field.random_pos();
            field.spawn(pos);
        }
        field
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    fn random_pos(&mut self) -> Pos2 {
        let b = self.bounds;
        egui::pos2(
            b.left() + self.rng.random::<f32>() * b.width(),
            b.top() + self.rng.random::<f32>() * b.height(),
        )
    }

    fn spawn(&mut self, pos: Pos2) {
        let c = &self.config;
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let speed = c.speed * self.rng.random::<f32>();
        let radius_max = self.rng.random::<f32>() * c.size;
        let opacity_max = self.rng.random::<f32>() * c.opacity;
        let particle = Particle {
            pos,
            vel: Vec2::angled(angle) * speed,
            radius: radius_max,
            radius_max,
            radius_growing: false,
            opacity: opacity_max,
            opacity_max,
            opacity_growing: false,
            color: self.rng.random_range(0..3),
        };
        self.particles.push(particle);
    }

    /// Follow a window resize: respawn to match the new area.
    pub fn resize(&mut self, bounds: Rect) {
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        self.particles.clear();
        for _ in 0..self.config.count_for(bounds) {
            let pos = self.random_pos();
            self.spawn(pos);
        }
    }

    /// Add particles at `pos` (click "push").
    pub fn push(&mut self, pos: Pos2) {
        for _ in 0..self.config.push_count {
            self.spawn(pos);
        }
    }

    /// Advance by `dt` seconds. Movement and pulsing are tuned per 60 Hz frame.
    pub fn step(&mut self, dt: f32) {
        let frames = dt * 60.0;
        let c = &self.config;
        let b = self.bounds;
        for p in &mut self.particles {
            p.pos += p.vel * frames;

            // Leaving one edge re-enters on the opposite one
            if p.pos.x - p.radius > b.right() {
                p.pos.x = b.left() - p.radius;
            } else if p.pos.x + p.radius < b.left() {
                p.pos.x = b.right() + p.radius;
            }
            if p.pos.y - p.radius > b.bottom() {
                p.pos.y = b.top() - p.radius;
            } else if p.pos.y + p.radius < b.top() {
                p.pos.y = b.bottom() + p.radius;
            }

            pulse(
                &mut p.opacity,
                &mut p.opacity_growing,
                c.opacity_min,
                p.opacity_max,
                c.opacity_speed / 100.0 * frames,
            );
            pulse(
                &mut p.radius,
                &mut p.radius_growing,
                c.size_min,
                p.radius_max,
                c.size_speed / 100.0 * frames,
            );
        }
    }

    pub fn draw(&self, painter: &egui::Painter, theme: &Theme, pointer: Option<Pos2>) {
        let c = &self.config;
        let palette = theme.particle_palette();

        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let dist = a.pos.distance(b.pos);
                if dist < c.link_distance {
                    let opacity = c.link_opacity * (1.0 - dist / c.link_distance);
                    painter.line_segment(
                        [a.pos, b.pos],
                        Stroke::new(c.link_width, Theme::with_opacity(theme.accent, opacity)),
                    );
                }
            }
        }

        if let Some(pointer) = pointer {
            for p in &self.particles {
                let dist = p.pos.distance(pointer);
                if dist < c.grab_distance {
                    let opacity = c.grab_opacity * (1.0 - dist / c.grab_distance);
                    painter.line_segment(
                        [p.pos, pointer],
                        Stroke::new(c.link_width, Theme::with_opacity(theme.accent, opacity)),
                    );
                }
            }
        }

        for p in &self.particles {
            let color: Color32 = palette[p.color];
            painter.circle_filled(p.pos, p.radius, Theme::with_opacity(color, p.opacity));
        }
    }
}

/// Bounce `value` between `min` and `max` by `step`.
fn pulse(value: &mut f32, growing: &mut bool, min: f32, max: f32, step: f32) {
    if max <= min {
        return;
    }
    if *growing {
        *value += step;
        if *value >= max {
            *value = max;
            *growing = false;
        }
    } else {
        *value -= step;
        if *value <= min {
            *value = min;
            *growing = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(1000.0, 800.0))
    }

    #[test]
    fn test_density_scaled_count() {
        let config = ParticleConfig::default();
        // 800k square points is the reference area
        assert_eq!(config.count_for(bounds()), 80);
        let half = Rect::from_min_size(Pos2::ZERO, egui::vec2(500.0, 800.0));
        assert_eq!(config.count_for(half), 40);
    }

    #[test]
    fn test_field_spawns_inside_bounds() {
        let field = ParticleField::seeded(ParticleConfig::default(), bounds(), 7);
        assert_eq!(field.len(), 80);
        assert!(field.particles.iter().all(|p| bounds().contains(p.pos)));
        assert!(field.particles.iter().all(|p| p.opacity <= 0.3 && p.radius <= 3.0));
    }

    #[test]
    fn test_push_adds_particles() {
        let mut field = ParticleField::seeded(ParticleConfig::default(), bounds(), 1);
        field.push(egui::pos2(10.0, 10.0));
        assert_eq!(field.len(), 84);
    }

    #[test]
    fn test_particles_wrap_around_edges() {
        let mut field = ParticleField::seeded(ParticleConfig::default(), bounds(), 3);
        field.particles.truncate(1);
        let p = &mut field.particles[0];
        p.pos = egui::pos2(999.0, 400.0);
        p.vel = egui::vec2(10.0, 0.0);
        p.radius = 1.0;
        field.step(1.0 / 60.0);
        let p = &field.particles[0];
        assert!(p.pos.x < 0.0, "particle should re-enter from the left, got {:?}", p.pos);
    }

    #[test]
    fn test_resize_respawns() {
        let mut field = ParticleField::seeded(ParticleConfig::default(), bounds(), 5);
        field.resize(Rect::from_min_size(Pos2::ZERO, egui::vec2(500.0, 800.0)));
        assert_eq!(field.len(), 40);
    }

    #[test]
    fn test_pulse_bounces() {
        let mut value = 0.15;
        let mut growing = false;
        pulse(&mut value, &mut growing, 0.1, 0.3, 0.1);
        assert_eq!(value, 0.1);
        assert!(growing);
        pulse(&mut value, &mut growing, 0.1, 0.3, 0.1);
        assert!((value - 0.2).abs() < 1e-6);
    }
}
