/// Inclusive bounds for one arc position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OidRange {
    pub min: u32,
    pub max: u32,
}

impl OidRange {
    /// Create a range accepting `min..=max`.
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range accepting every arc value.
    pub const fn any() -> Self {
        Self::new(0, u32::MAX)
    }

    /// Returns `true` if `arc` lies within the bounds.
    pub const fn contains(&self, arc: u32) -> bool {
        self.min <= arc && arc <= self.max
    }
}

/// Check that `arcs` has at least `ranges.len()` arcs and that each arc at
/// position `i` lies within `ranges[i]`.
///
/// Arcs beyond the last range are not inspected. Callers that need an exact
/// length (table index validation) compare lengths themselves.
pub fn in_range(arcs: &[u32], ranges: &[OidRange]) -> bool {
    if arcs.len() < ranges.len() {
        return false;
    }
    arcs.iter()
        .zip(ranges.iter())
        .all(|(arc, range)| range.contains(*arc))
}
