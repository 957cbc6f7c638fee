/// Identifier for a segment in a [`crate::segment::Plant`].
///
/// This is an index into `Plant::segments`, and is only meaningful within
/// the lifetime of a given `Plant` instance.
pub type SegmentId = usize;

/// Index of a plant inside a [`crate::collection::PlantCollection`].
pub type PlantId = usize;
