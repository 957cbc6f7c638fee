//! Interactive side view of the swaying plants, built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the [`Garden`] plus a draft
//! copy of its parameters, and implements [`eframe::App`] to render the
//! plants and edit the draft through an egui UI.
//!
//! Plants grow along world `+x` from their root and sway in the x–z plane,
//! so the side view draws world `z` horizontally and height above the root
//! (`x - root.x`) vertically. Every plant stands on the same ground line.

use eframe::App;
use glam::{Vec2, Vec3};
use plant_core::{
    config::{self, ParameterSet},
    flower::{FlowerGeometry, GeometryPart},
    garden::Garden,
    segment::SegmentPose,
};
use std::path::PathBuf;

const STEM_COLOR: egui::Color32 = egui::Color32::from_rgb(96, 168, 92);
const PETAL_COLOR: egui::Color32 = egui::Color32::from_rgb(232, 122, 168);
const TRIM_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 244, 170);
const GROUND_COLOR: egui::Color32 = egui::Color32::from_rgb(70, 52, 40);

/// Main application state for the interactive viewer.
///
/// ### Fields
/// - `garden` - The simulation; regrown from `draft` on demand.
/// - `draft` - Parameters being edited in the side panel. They only take
///   effect on "Regenerate".
/// - `error` - Message from the last rejected draft or failed save.
/// - `preset_path` - Where "Save preset" writes the draft.
///
/// - `running` - Whether the wind is animating.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `step_interval` - Target time between wind frames (seconds).
/// - `last_step_time` - Time stamp of the last frame (egui time).
/// - `last_step_dt` - Actual time delta between the last two frames.
pub struct Viewer {
    garden: Garden,
    draft: ParameterSet,
    error: Option<String>,
    preset_path: PathBuf,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer around an already planted garden.
    ///
    /// The camera starts zoomed out far enough to see the default planting
    /// square, with the wind running at roughly 60 frames per second.
    pub fn new(garden: Garden, preset_path: PathBuf) -> Self {
        let draft = *garden.params();
        Self {
            garden,
            draft,
            error: None,
            preset_path,
            running: true,
            zoom: 3.0,
            pan: egui::vec2(0.0, 200.0),
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        }
    }

    /// Hands the draft to the garden and regrows every plant.
    ///
    /// A rejected draft leaves the garden untouched and is reported in the
    /// side panel.
    fn regenerate(&mut self) {
        match self.garden.set_params(self.draft) {
            Ok(()) => {
                self.garden.regenerate();
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(%err, "rejected plant parameters");
                self.error = Some(err.to_string());
            }
        }
    }

    /// Writes the draft to the preset file.
    fn save_preset(&mut self) {
        let result = self
            .draft
            .to_toml_string()
            .and_then(|text| std::fs::write(&self.preset_path, text).map_err(Into::into));
        match result {
            Ok(()) => {
                tracing::info!("saved preset to {}", self.preset_path.display());
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(%err, "failed to save preset");
                self.error = Some(err.to_string());
            }
        }
    }

    /// Advances the wind by a single frame.
    fn step_once(&mut self) {
        self.garden.step();
    }

    /// Projects a world position onto the side-view plane.
    ///
    /// ### Parameters
    /// - `p` - World-space position.
    /// - `ground` - World `x` of the plant's root.
    fn project(p: Vec3, ground: f32) -> Vec2 {
        Vec2::new(p.z, p.x - ground)
    }

    /// Converts a side-view position to screen-space.
    ///
    /// Coordinates are scaled by `zoom`, offset by `pan`, and centered
    /// inside the given `rect`. The y-axis is flipped so that height goes
    /// up on screen.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to the side-view plane.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// Helper to draw a labeled `u32` [`egui::DragValue`].
    fn labeled_drag_u32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut u32,
        range: std::ops::RangeInclusive<u32>,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(1.0));
        });
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(1.0));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, regeneration, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.005..=1.0)
                        .speed(0.005),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Regenerate").clicked() {
                    self.regenerate();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (timing, plant, segment and flower counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let plants = self.garden.plants();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("frame = {}", self.garden.frame()));
                ui.label(format!("flowers = {}", plants.flower_count()));
                ui.label(format!("segments = {}", plants.segment_count()));
                ui.label(format!("plants = {}", plants.len()));
            });
        });
    }

    /// Builds the right-hand panel editing the draft parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.heading("Parameters");

                    ui.separator();
                    ui.label("Planting");
                    let planting = &mut self.draft.planting;
                    Self::labeled_drag_usize(ui, "plants:", &mut planting.count, 1..=config::MAX_PLANTS);
                    Self::labeled_drag_f32(ui, "range:", &mut planting.range, 0.0..=500.0, 1.0);

                    ui.separator();
                    ui.label("Stem");
                    let stem = &mut self.draft.stem;
                    Self::labeled_drag_u32(ui, "min_segments:", &mut stem.min_segments, 1..=config::MAX_STEM_SEGMENTS);
                    Self::labeled_drag_u32(ui, "max_segments:", &mut stem.max_segments, 3..=config::MAX_STEM_SEGMENTS);
                    Self::labeled_drag_f32(ui, "start_len:", &mut stem.start_len, config::STEM_LEN_RANGE, 0.1);
                    Self::labeled_drag_f32(ui, "end_len:", &mut stem.end_len, config::STEM_LEN_RANGE, 0.1);
                    Self::labeled_drag_f32(ui, "start_radius:", &mut stem.start_radius, config::STEM_RADIUS_RANGE, 0.02);
                    Self::labeled_drag_f32(ui, "end_radius:", &mut stem.end_radius, config::STEM_RADIUS_RANGE, 0.02);
                    Self::labeled_drag_f32(ui, "angle:", &mut stem.angle, config::CURVE_RANGE, 0.01);

                    ui.separator();
                    ui.label("Branch");
                    let branch = &mut self.draft.branch;
                    Self::labeled_drag_u32(ui, "max_depth:", &mut branch.max_depth, 0..=config::MAX_BRANCH_DEPTH);
                    Self::labeled_drag_f32(ui, "chance:", &mut branch.chance, 0.0..=1.0, 0.01);
                    Self::labeled_drag_f32(ui, "double_chance:", &mut branch.double_chance, 0.0..=1.0, 0.01);
                    Self::labeled_drag_f32(ui, "start_len:", &mut branch.start_len, config::BRANCH_FACTOR_RANGE, 0.01);
                    Self::labeled_drag_f32(ui, "end_len:", &mut branch.end_len, config::BRANCH_FACTOR_RANGE, 0.01);
                    Self::labeled_drag_f32(ui, "start_radius:", &mut branch.start_radius, config::BRANCH_FACTOR_RANGE, 0.01);
                    Self::labeled_drag_f32(ui, "end_radius:", &mut branch.end_radius, config::BRANCH_FACTOR_RANGE, 0.01);
                    Self::labeled_drag_f32(ui, "start_angle:", &mut branch.start_angle, config::BRANCH_START_ANGLE_RANGE, 0.01);
                    Self::labeled_drag_f32(ui, "angle:", &mut branch.angle, config::CURVE_RANGE, 0.01);

                    ui.separator();
                    ui.label("Flower");
                    let flower = &mut self.draft.flower;
                    Self::labeled_drag_f32(ui, "chance:", &mut flower.chance, 0.0..=1.0, 0.01);
                    Self::labeled_drag_f32(ui, "start_len:", &mut flower.start_len, config::FLOWER_LEN_RANGE, 0.05);
                    Self::labeled_drag_f32(ui, "end_len:", &mut flower.end_len, config::FLOWER_LEN_RANGE, 0.05);
                    Self::labeled_drag_f32(ui, "start_angle:", &mut flower.start_angle, config::FLOWER_ANGLE_RANGE, 0.02);
                    Self::labeled_drag_f32(ui, "end_angle:", &mut flower.end_angle, config::FLOWER_ANGLE_RANGE, 0.02);

                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button("Regenerate").clicked() {
                            self.regenerate();
                        }
                        if ui.button("Reset to default").clicked() {
                            self.draft = ParameterSet::default();
                        }
                    });
                    if ui.button("Save preset").clicked() {
                        self.save_preset();
                    }

                    if let Some(error) = &self.error {
                        ui.colored_label(egui::Color32::LIGHT_RED, error.as_str());
                    }
                });
            });
    }

    /// Draws one segment body as a thick line with a round joint at its base.
    fn draw_segment(&self, painter: &egui::Painter, rect: egui::Rect, pose: &SegmentPose, ground: f32) {
        let dir = Vec3::new(pose.rotation.cos(), 0.0, pose.rotation.sin());
        let tip = pose.position + dir * pose.length;

        let a = self.world_to_screen(Self::project(pose.position, ground), rect);
        let b = self.world_to_screen(Self::project(tip, ground), rect);
        let width = (pose.radius * 2.0 * self.zoom).max(1.0);

        painter.line_segment([a, b], egui::Stroke::new(width, STEM_COLOR));
        painter.circle_filled(a, width * 0.5, STEM_COLOR);

        if let Some(flower) = pose.flower {
            self.draw_flower(painter, rect, pose, tip, ground, flower);
        }
    }

    /// Draws a petal crown fanned out around the segment tip.
    ///
    /// Quads tagged [`GeometryPart::PetalTrim`] get the glow colour.
    fn draw_flower(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        pose: &SegmentPose,
        tip: Vec3,
        ground: f32,
        flower: &FlowerGeometry,
    ) {
        for petal in &flower.petals {
            let angle = pose.rotation + petal.angle;
            let dir = Vec3::new(angle.cos(), 0.0, angle.sin());

            for quad in &petal.quads {
                let from = tip + dir * (flower.offset + quad.bottom);
                let to = tip + dir * (flower.offset + quad.top);
                let color = match quad.part {
                    GeometryPart::Body => PETAL_COLOR,
                    GeometryPart::PetalTrim => TRIM_COLOR,
                };
                let width = ((quad.bottom_half_width + quad.top_half_width) * self.zoom).max(1.0);

                painter.line_segment(
                    [
                        self.world_to_screen(Self::project(from, ground), rect),
                        self.world_to_screen(Self::project(to, ground), rect),
                    ],
                    egui::Stroke::new(width, color),
                );
            }
        }
    }

    /// Builds the central panel where the plants are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Ground line.
            let left = self.screen_to_world(rect.left_center(), rect).x;
            let right = self.screen_to_world(rect.right_center(), rect).x;
            painter.line_segment(
                [
                    self.world_to_screen(Vec2::new(left, 0.0), rect),
                    self.world_to_screen(Vec2::new(right, 0.0), rect),
                ],
                egui::Stroke::new(2.0, GROUND_COLOR),
            );

            let plants = &self.garden.plants().plants;
            for pose in self.garden.poses() {
                let ground = plants[pose.plant].root().position.x;
                self.draw_segment(&painter, rect, &pose, ground);
            }

            // Animate the wind if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
