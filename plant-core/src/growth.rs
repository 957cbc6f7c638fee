//! Round-based growth of a single plant.
//!
//! A plant starts as one stem segment and grows for a randomly drawn number
//! of rounds. Each round walks the segments that existed when the round
//! began, newest first, and lets every unfinished one:
//!
//! 1. continue the stem (stems only), possibly sprouting a first-level
//!    branch beside it,
//! 2. fork into one or two deeper branches (branches within `max_depth`),
//! 3. or turn into a flower when it does not fork.
//!
//! A processed segment is finished and never visited again. Segments grown
//! during a round are picked up by the next one, so the depth of the
//! structure is bounded by the round count without any recursion.

use crate::{
    collection::random_in_square,
    config::ParameterSet,
    flower::{FlowerPlacer, RadiusRange},
    segment::{Growth, Lineage, Plant, Segment},
    types::SegmentId,
};
use rand::Rng;

/// Number of consecutive stem segments that curve the same way.
const STEM_RUN: u32 = 3;

/// Per-plant mutable state consulted while growing.
///
/// ### Fields
/// - `stem_countdown` / `stem_positive` - Direction-persistence oscillator
///   for the stem curvature.
/// - `branch_sign` - Current sign of the branch angles; flips at random.
/// - `round` - Index of the round being grown.
/// - `rounds` - Total number of rounds for this plant.
#[derive(Clone, Debug)]
pub struct GrowthContext {
    stem_countdown: u32,
    stem_positive: bool,
    branch_sign: f32,
    round: usize,
    rounds: usize,
}

impl Default for GrowthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GrowthContext {
    pub fn new() -> Self {
        Self {
            stem_countdown: 0,
            stem_positive: true,
            branch_sign: 1.0,
            round: 0,
            rounds: 0,
        }
    }

    /// Returns the signed stem curvature for the next stem segment.
    ///
    /// The direction is re-rolled every [`STEM_RUN`] calls, so the stem
    /// meanders in runs instead of zig-zagging.
    pub fn stem_angle(&mut self, angle: f32, rng: &mut impl Rng) -> f32 {
        self.stem_countdown = self.stem_countdown.saturating_sub(1);
        if self.stem_countdown == 0 {
            self.stem_countdown = STEM_RUN;
            self.stem_positive = rng.random_bool(0.5);
        }

        if self.stem_positive { angle } else { -angle }
    }

    /// Flips the branch angle sign with probability one half.
    pub fn maybe_flip_branch_sign(&mut self, rng: &mut impl Rng) {
        if rng.random_bool(0.5) {
            self.branch_sign = -self.branch_sign;
        }
    }

    #[inline]
    pub fn branch_sign(&self) -> f32 {
        self.branch_sign
    }

    #[inline]
    pub fn is_last_round(&self) -> bool {
        self.round + 1 == self.rounds
    }
}

/// Builds plants from a parameter set.
#[derive(Clone, Copy, Debug)]
pub struct GrowthEngine<'a> {
    params: &'a ParameterSet,
    placer: FlowerPlacer,
}

impl<'a> GrowthEngine<'a> {
    /// `params` is expected to have passed [`ParameterSet::validate`].
    pub fn new(params: &'a ParameterSet) -> Self {
        Self {
            params,
            placer: FlowerPlacer::new(params.flower),
        }
    }

    /// Grows one complete plant.
    ///
    /// ### Parameters
    /// - `rng` - Source of every random decision made for this plant.
    /// - `radii` - Generation-wide flower radius range; widened whenever a
    ///   flower is placed.
    ///
    /// ### Returns
    /// The plant, with every segment finished and every parent stored
    /// before its children.
    pub fn build(&self, rng: &mut impl Rng, radii: &mut RadiusRange) -> Plant {
        let stem = &self.params.stem;
        let mut ctx = GrowthContext::new();

        let root_angle = ctx.stem_angle(stem.angle, rng);
        let position = random_in_square(self.params.planting.range * 0.5, rng);
        let mut plant = Plant::new(Segment::new_root(
            position,
            root_angle,
            stem.start_len,
            stem.start_radius,
        ));

        let lo = stem.min_segments.saturating_sub(1) as f32;
        let hi = (stem.max_segments.saturating_sub(1) as f32).max(lo);
        ctx.rounds = rng.random_range(lo..=hi).round() as usize;

        for round in 0..ctx.rounds {
            ctx.round = round;
            // Segments appended from here on wait for the next round.
            let watermark = plant.len();
            for id in (0..watermark).rev() {
                if plant.segments[id].is_finished {
                    continue;
                }

                ctx.maybe_flip_branch_sign(rng);

                let (is_stem, depth) = (plant.segments[id].is_stem, plant.segments[id].depth);
                if is_stem {
                    self.grow_stem(&mut plant, id, &mut ctx, radii, rng);
                } else if depth <= self.params.branch.max_depth {
                    self.grow_branch(&mut plant, id, &ctx, radii, rng);
                }

                plant.segments[id].is_finished = true;
            }
        }

        // Whatever the last round produced is terminal.
        for segment in &mut plant.segments {
            segment.is_finished = true;
        }

        tracing::trace!(
            rounds = ctx.rounds,
            segments = plant.len(),
            flowers = plant.flower_count(),
            "grew plant"
        );
        plant
    }

    /// Continues the stem from `id` and maybe sprouts a first-level branch.
    fn grow_stem(
        &self,
        plant: &mut Plant,
        id: SegmentId,
        ctx: &mut GrowthContext,
        radii: &mut RadiusRange,
        rng: &mut impl Rng,
    ) {
        let stem = &self.params.stem;
        let branch = &self.params.branch;

        let continuation = Growth {
            angle_inc: ctx.stem_angle(stem.angle, rng),
            len_inc: stem.len_step(),
            radius_inc: stem.radius_step(),
            lineage: Lineage::Stem,
        };
        self.spawn(plant, id, continuation, ctx, radii, rng);

        if branch.max_depth == 0 || !rng.random_bool(f64::from(branch.chance)) {
            return;
        }

        // The branch starts as a scaled copy of the stem segment it leaves.
        let parent = &plant.segments[id];
        let side = Growth {
            angle_inc: branch.start_angle * ctx.branch_sign(),
            len_inc: parent.length * branch.start_len - parent.length,
            radius_inc: parent.radius * branch.start_radius - parent.radius,
            lineage: Lineage::Branch { parent_stem: id },
        };
        self.spawn(plant, id, side, ctx, radii, rng);
    }

    /// Forks the branch segment `id`, or turns it into a flower.
    fn grow_branch(
        &self,
        plant: &mut Plant,
        id: SegmentId,
        ctx: &GrowthContext,
        radii: &mut RadiusRange,
        rng: &mut impl Rng,
    ) {
        let branch = &self.params.branch;
        if branch.max_depth == 0 {
            return;
        }
        let Some(stem_id) = plant.segments[id].parent_stem else {
            return;
        };

        if rng.random_bool(f64::from(branch.chance)) {
            // Interpolate toward the end factors over `max_depth` levels,
            // relative to the stem segment the branch came from.
            let stem = &plant.segments[stem_id];
            let levels = branch.max_depth as f32;
            let len_inc = (branch.end_len - branch.start_len) / levels * stem.length;
            let radius_inc = (branch.end_radius - branch.start_radius) / levels * stem.radius;
            let angle = branch.angle * ctx.branch_sign();
            let lineage = Lineage::Branch {
                parent_stem: stem_id,
            };

            let fork = Growth {
                angle_inc: angle,
                len_inc,
                radius_inc,
                lineage,
            };
            self.spawn(plant, id, fork, ctx, radii, rng);

            if rng.random_bool(f64::from(branch.double_chance)) {
                let mirror = Growth {
                    angle_inc: -angle,
                    len_inc,
                    radius_inc: 0.0,
                    lineage,
                };
                self.spawn(plant, id, mirror, ctx, radii, rng);
            }
        } else if rng.random_bool(f64::from(self.params.flower.chance)) {
            self.bloom(plant, id, radii, rng);
        }
    }

    /// Grows a child of `parent` and resolves whether it flowers.
    fn spawn(
        &self,
        plant: &mut Plant,
        parent: SegmentId,
        growth: Growth,
        ctx: &GrowthContext,
        radii: &mut RadiusRange,
        rng: &mut impl Rng,
    ) -> SegmentId {
        let is_branch = matches!(growth.lineage, Lineage::Branch { .. });
        let flowers = self.is_flower_candidate(plant.segments[parent].depth, is_branch, ctx, rng);

        let id = plant.grow(parent, growth);
        if flowers {
            self.bloom(plant, id, radii, rng);
        }
        id
    }

    /// Branch tips past the depth limit and everything grown in the last
    /// round may flower.
    fn is_flower_candidate(
        &self,
        parent_depth: u32,
        is_branch: bool,
        ctx: &GrowthContext,
        rng: &mut impl Rng,
    ) -> bool {
        let at_tip = is_branch && parent_depth + 1 > self.params.branch.max_depth;
        (at_tip || ctx.is_last_round()) && rng.random_bool(f64::from(self.params.flower.chance))
    }

    fn bloom(
        &self,
        plant: &mut Plant,
        id: SegmentId,
        radii: &mut RadiusRange,
        rng: &mut impl Rng,
    ) {
        let segment = &mut plant.segments[id];
        if segment.is_flower {
            return;
        }
        segment.is_flower = true;
        segment.flower = self.placer.place(segment, radii, rng);
    }
}

/// Grows one plant; shorthand for [`GrowthEngine::build`].
pub fn build_plant(params: &ParameterSet, rng: &mut impl Rng, radii: &mut RadiusRange) -> Plant {
    GrowthEngine::new(params).build(rng, radii)
}
