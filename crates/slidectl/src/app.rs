use eframe::egui;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::analytics;
use crate::config::{self, Config};
use crate::controller::SlideController;
use crate::deck::{self, DeckEdit, DeckMeta};
use crate::input::{self, Command, SwipeTracker, WheelDebouncer};
use crate::particles::{ParticleConfig, ParticleField};
use crate::preload::ImageCache;
use crate::render::{self, chrome};
use crate::theme::Theme;
use crate::watch::DeckWatcher;

/// Launch settings gathered from the command line.
#[derive(Debug, Default)]
pub struct LaunchOptions {
    pub windowed: bool,
    /// 1-indexed slide to start on.
    pub start_slide: Option<usize>,
    pub animation_delay_ms: Option<u64>,
    pub no_particles: bool,
    pub analytics_log: Option<PathBuf>,
}

struct SlideApp {
    controller: SlideController,
    meta: DeckMeta,
    deck_path: PathBuf,
    theme: Theme,
    images: ImageCache,
    particles_enabled: bool,
    particles: Option<ParticleField>,
    swipe: SwipeTracker,
    wheel: WheelDebouncer,
    watcher: Option<DeckWatcher>,
    reload_pending: bool,
    last_frame: Instant,
    viewport_height: f32,
}

impl SlideApp {
    fn update_particles(&mut self, rect: egui::Rect, dt: f32) {
        if !self.particles_enabled {
            return;
        }
        match self.particles.as_mut() {
            Some(field) => {
                field.resize(rect);
                field.step(dt);
            }
            None => {
                self.particles = Some(ParticleField::new(ParticleConfig::default(), rect));
            }
        }
    }

    /// Pick up deck edits once no transition is running.
    fn poll_reload(&mut self, now: Instant) {
        if self.watcher.as_ref().is_some_and(|w| w.changed()) {
            self.reload_pending = true;
        }
        if !self.reload_pending || self.controller.is_animating() {
            return;
        }
        self.reload_pending = false;

        match deck::load(&self.deck_path) {
            Ok(deck) if deck.slides.is_empty() => {
                tracing::warn!("{} has no slides; keeping the current deck", self.deck_path.display());
            }
            Ok(deck) => {
                self.images.reload(&deck.image_paths());
                match deck::diff(self.controller.slides(), deck.slides) {
                    DeckEdit::Unchanged => {}
                    DeckEdit::Appended(slides) => {
                        for slide in slides {
                            tracing::debug!(title = slide.title().unwrap_or("untitled"), "slide appended");
                            self.controller.add_slide(slide);
                        }
                    }
                    DeckEdit::Removed(index) => self.controller.remove_slide(index, now),
                    DeckEdit::Replaced(slides) => self.controller.replace_slides(slides, now),
                }
                self.meta = deck.meta;
                tracing::info!(slides = self.controller.slide_count(), "deck reloaded");
            }
            Err(e) => tracing::warn!("deck reload failed: {e:#}"),
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        if self.particles_enabled
            || self.images.is_loading()
            || self.controller.is_animating()
            || self.controller.content_settling(now)
        {
            ctx.request_repaint();
            return;
        }
        let wait = [self.controller.next_deadline(now), self.wheel.remaining(now)]
            .into_iter()
            .flatten()
            .min();
        if let Some(wait) = wait {
            ctx.request_repaint_after(wait);
        }
    }
}

impl eframe::App for SlideApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_frame)
            .min(Duration::from_millis(100))
            .as_secs_f32();
        self.last_frame = now;

        self.controller.tick(now);
        let animating = self.controller.is_animating();
        let page_height = self.viewport_height;
        let mut commands: Vec<Command> = Vec::new();

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }

            let fullscreen = i.viewport().fullscreen.unwrap_or(false);
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(!fullscreen));
            }
            if i.key_pressed(egui::Key::Escape) && fullscreen {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(false));
            }

            if !animating {
                commands.extend(
                    input::NAVIGATION_KEYS
                        .iter()
                        .filter(|key| i.key_pressed(**key))
                        .filter_map(|key| input::key_command(*key)),
                );
            }

            for event in &i.events {
                match event {
                    egui::Event::Touch { phase, pos, .. } => match phase {
                        egui::TouchPhase::Start => self.swipe.touch_start(*pos),
                        egui::TouchPhase::End => {
                            commands.extend(self.swipe.touch_end(*pos, animating));
                        }
                        egui::TouchPhase::Cancel => self.swipe.cancel(),
                        egui::TouchPhase::Move => {}
                    },
                    egui::Event::MouseWheel { unit, delta, .. } => {
                        let delta_y = input::wheel_delta_points(*unit, *delta, page_height);
                        self.wheel.wheel(delta_y, now, animating);
                    }
                    _ => {}
                }
            }
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        commands.extend(self.wheel.poll(now));
        for command in commands {
            self.controller.apply(command, now);
        }

        self.poll_reload(now);
        self.images.poll();

        let bg = self.theme.background;
        let pointer = ctx.input(|i| i.pointer.hover_pos());

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);
                self.viewport_height = rect.height();
                let scale = render::compute_scale(rect);

                // Registered first so the navigation widgets sit on top of it
                let background = ui.interact(rect, ui.id().with("background"), egui::Sense::click());

                self.update_particles(rect, dt);
                if let Some(field) = self.particles.as_mut() {
                    if background.clicked() {
                        if let Some(pos) = background.interact_pointer_pos() {
                            field.push(pos);
                        }
                    }
                    field.draw(ui.painter(), &self.theme, pointer);
                }

                render::draw_deck(
                    ui,
                    &self.controller,
                    &self.theme,
                    &mut self.images,
                    rect,
                    now,
                    scale,
                );

                let view = self.controller.view();
                chrome::draw_progress(ui, view, &self.theme, rect, scale);
                chrome::draw_footer(
                    ui,
                    self.meta.footer.as_deref(),
                    self.controller.current_index(),
                    self.controller.slide_count(),
                    &self.theme,
                    rect,
                    scale,
                );
                let clicked = chrome::draw_navigation(ui, view, &self.theme, rect, scale);
                if let Some(command) = clicked.filter(|_| !self.controller.is_animating()) {
                    self.controller.apply(command, now);
                }
            });

        self.schedule_repaint(ctx, now);
    }
}

pub fn run(file: PathBuf, options: LaunchOptions) -> anyhow::Result<()> {
    let deck = deck::load(&file)?;
    if deck.slides.is_empty() {
        anyhow::bail!("No slides found in {}", file.display());
    }

    let config = Config::load_or_default();

    let title = deck.meta.title.clone().unwrap_or_else(|| {
        format!(
            "slidectl \u{2014} {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        )
    });

    let theme_name = deck
        .meta
        .theme
        .as_deref()
        .or(config.theme())
        .unwrap_or("dark");
    let theme = Theme::from_name(theme_name);

    let animation_delay = config::resolve_animation_delay(
        options.animation_delay_ms,
        deck.meta.animation_delay_ms,
        &config,
    );
    let start = options
        .start_slide
        .or(config.start_slide())
        .map(|s| s.saturating_sub(1))
        .unwrap_or(0);
    let particles_enabled = !options.no_particles && config.particles_enabled();
    let analytics_log = options
        .analytics_log
        .clone()
        .or_else(|| config.analytics_log_file().map(PathBuf::from));

    let base_path = file
        .parent()
        .unwrap_or(std::path::Path::new("."))
        .to_path_buf();
    let images = ImageCache::preload(&base_path, &deck.image_paths());

    tracing::info!(
        slides = deck.slides.len(),
        delay_ms = animation_delay.as_millis() as u64,
        "starting presentation"
    );

    let viewport = if options.windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| {
            let now = Instant::now();
            let sink = analytics::build(analytics_log.as_deref());
            let controller =
                SlideController::new(deck.slides, start, animation_delay, Box::new(sink), now)?;

            let repaint_ctx = cc.egui_ctx.clone();
            let watcher = DeckWatcher::register(&file, move || repaint_ctx.request_repaint());

            Ok(Box::new(SlideApp {
                controller,
                meta: deck.meta,
                deck_path: file,
                theme,
                images,
                particles_enabled,
                particles: None,
                swipe: SwipeTracker::default(),
                wheel: WheelDebouncer::default(),
                watcher,
                reload_pending: false,
                last_frame: now,
                viewport_height: 720.0,
            }))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
