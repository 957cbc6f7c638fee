//! Petal crowns for flowering segments.
//!
//! Flower size is relative: a segment's radius is normalised against the
//! smallest and largest flower radii seen so far in the current generation
//! ([`RadiusRange`]), and the normalised value picks the petal length and
//! the arc the crown spans. The output is pure geometry parameters; turning
//! them into meshes is the renderer's job.

use crate::{config::FlowerParams, segment::Segment};
use rand::Rng;
use std::f32::consts::TAU;

/// Nominal petal width, also the width of the petal tips.
pub const PETAL_WIDTH: f32 = 0.25;
/// Distance between the segment surface and the petal base, per unit radius.
const GAP_FACTOR: f32 = 0.75;
/// Phase advance between neighbouring petals of one crown, radians.
const PETAL_STRIDE: f32 = 1.6;
/// Relative amplitude of the petal length jitter.
const PETAL_JITTER: f32 = 0.1;
/// Fraction of the petal length covered by the tapering blade.
const BLADE_FRACTION: f32 = 0.85;
/// Upper bound on petal steps per crown.
pub const MAX_PETAL_STEPS: f32 = 256.0;

/// Running (min, max) over the radii of every flower placed so far.
///
/// The range only ever widens; it is replaced, not shrunk, when a new
/// generation starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusRange {
    min: f32,
    max: f32,
}

impl RadiusRange {
    /// Creates a range containing only `radius`.
    pub fn seeded(radius: f32) -> Self {
        Self {
            min: radius,
            max: radius,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Widens the range so that it contains `radius`.
    pub fn include(&mut self, radius: f32) {
        self.min = self.min.min(radius);
        self.max = self.max.max(radius);
    }

    /// Position of `radius` inside the range, `0` at `min` and `1` at `max`.
    ///
    /// A collapsed range (`min == max`) yields `0`.
    pub fn progress(&self, radius: f32) -> f32 {
        let span = self.max - self.min;
        if span > 0.0 {
            (radius - self.min) / span
        } else {
            0.0
        }
    }
}

/// Material routing for a piece of petal geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryPart {
    /// Shares the material of the segment body.
    Body,
    /// The glowing bands across each petal.
    PetalTrim,
}

/// A symmetric trapezoid in the petal's local frame.
///
/// The petal runs along local `+y`; each edge is centred on `x = 0` and
/// spans `-half_width..half_width`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PetalQuad {
    pub bottom_half_width: f32,
    pub bottom: f32,
    pub top_half_width: f32,
    pub top: f32,
    pub part: GeometryPart,
}

/// One petal of a crown.
#[derive(Clone, Debug, PartialEq)]
pub struct Petal {
    /// Fan angle around the segment's sway axis, radians.
    pub angle: f32,
    /// Jittered petal length.
    pub length: f32,
    pub quads: [PetalQuad; 4],
}

/// Everything the renderer needs to build a crown on a segment tip.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowerGeometry {
    /// Normalised radius the crown was sized from.
    pub progress: f32,
    /// Petal length before jitter.
    pub length: f32,
    /// Angle spanned by the fan of petals.
    pub arc_angle: f32,
    pub gap: f32,
    /// Distance from the segment axis to the petal bases.
    pub offset: f32,
    /// Half-width of each petal where it meets the segment.
    pub base_width: f32,
    pub petals: Vec<Petal>,
}

impl FlowerGeometry {
    /// Geometry parts of every quad, in petal order.
    pub fn parts(&self) -> impl Iterator<Item = GeometryPart> + '_ {
        self.petals
            .iter()
            .flat_map(|p| p.quads.iter().map(|q| q.part))
    }
}

/// Returns `a` at `t = 0` and `b` at `t = 1`, exactly.
#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

fn petal_quads(base_width: f32, length: f32) -> [PetalQuad; 4] {
    let w = PETAL_WIDTH;
    let blade = length * BLADE_FRACTION;
    [
        PetalQuad {
            bottom_half_width: base_width,
            bottom: 0.0,
            top_half_width: w * 0.5,
            top: blade,
            part: GeometryPart::Body,
        },
        PetalQuad {
            bottom_half_width: w * 0.5,
            bottom: blade,
            top_half_width: w,
            top: blade + w,
            part: GeometryPart::PetalTrim,
        },
        PetalQuad {
            bottom_half_width: w,
            bottom: blade + w,
            top_half_width: w,
            top: length + w,
            part: GeometryPart::Body,
        },
        PetalQuad {
            bottom_half_width: w,
            bottom: length + w,
            top_half_width: w * 0.5,
            top: length + w + w,
            part: GeometryPart::PetalTrim,
        },
    ]
}

/// Sizes petal crowns from the flower parameters.
#[derive(Clone, Copy, Debug)]
pub struct FlowerPlacer {
    params: FlowerParams,
}

impl FlowerPlacer {
    pub fn new(params: FlowerParams) -> Self {
        Self { params }
    }

    /// Registers `segment` in the radius range and computes its crown.
    ///
    /// ### Parameters
    /// - `segment` - The flowering segment; only its radius is read.
    /// - `radii` - Generation-wide radius range, widened by this call.
    /// - `rng` - Source of the per-flower jitter phase.
    ///
    /// ### Returns
    /// The crown geometry, or `None` when the crown would have no petals.
    pub fn place(
        &self,
        segment: &Segment,
        radii: &mut RadiusRange,
        rng: &mut impl Rng,
    ) -> Option<FlowerGeometry> {
        radii.include(segment.radius);
        let progress = radii.progress(segment.radius);
        let phase = rng.random_range(0.0..TAU);
        self.shape(segment.radius, progress, phase)
    }

    /// Computes a crown for a given radius, normalised radius and jitter
    /// phase. Deterministic.
    pub fn shape(&self, radius: f32, progress: f32, phase: f32) -> Option<FlowerGeometry> {
        let p = &self.params;
        let length = lerp(p.start_len, p.end_len, progress);
        let arc_angle = lerp(p.start_angle, p.end_angle, progress);
        let gap = radius * GAP_FACTOR;

        let arc_fraction = arc_angle / TAU;
        let count = (TAU * (radius + gap + length) * arc_fraction / (PETAL_WIDTH * 3.0)).round();
        if count.is_nan() || count <= 0.0 {
            tracing::trace!(radius, arc_angle, "flower suppressed: no petals fit");
            return None;
        }
        let count = count.min(MAX_PETAL_STEPS);

        let base_width = ((TAU * radius + gap) * arc_fraction / count) * 0.8;
        let step = arc_angle / count;
        let petals = (0..=count as u32)
            .map(|i| {
                let i = i as f32;
                let petal_len = length + (phase + i * PETAL_STRIDE).sin() * (length * PETAL_JITTER);
                Petal {
                    angle: step * i - arc_angle * 0.5,
                    length: petal_len,
                    quads: petal_quads(base_width, petal_len),
                }
            })
            .collect();

        Some(FlowerGeometry {
            progress,
            length,
            arc_angle,
            gap,
            offset: radius + gap,
            base_width,
            petals,
        })
    }
}
