/// The shape of the ends of a buffered line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndCapStyle {
    /// A half circle centered at the end point.
    #[default]
    Round,
    /// A straight cut at the end point.
    Flat,
    /// A half square centered at the end point.
    Square,
}

/// The shape of the outer corners of a buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JoinStyle {
    /// A circular arc centered at the vertex.
    #[default]
    Round,
    /// The offset segments extended to their intersection, limited by the mitre limit.
    Mitre,
    /// A straight chord between the offset segments.
    Bevel,
}

/// Configures how a buffer is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferParameters {
    quadrant_segments: usize,
    end_cap_style: EndCapStyle,
    join_style: JoinStyle,
    mitre_limit: f64,
    single_sided: bool,
    simplify_factor: f64,
}

impl Default for BufferParameters {
    fn default() -> Self {
        Self {
            quadrant_segments: Self::DEFAULT_QUADRANT_SEGMENTS,
            end_cap_style: EndCapStyle::default(),
            join_style: JoinStyle::default(),
            mitre_limit: Self::DEFAULT_MITRE_LIMIT,
            single_sided: false,
            simplify_factor: Self::DEFAULT_SIMPLIFY_FACTOR,
        }
    }
}

impl BufferParameters {
    pub const DEFAULT_QUADRANT_SEGMENTS: usize = 8;
    pub const DEFAULT_MITRE_LIMIT: f64 = 5.0;
    pub const DEFAULT_SIMPLIFY_FACTOR: f64 = 0.01;

    /// Sets how many segments approximate a quarter circle. Zero is treated as one.
    pub fn with_quadrant_segments(mut self, segments: usize) -> Self {
        self.quadrant_segments = segments.max(1);
        self
    }

    pub fn with_end_cap_style(mut self, style: EndCapStyle) -> Self {
        self.end_cap_style = style;
        self
    }

    pub fn with_join_style(mut self, style: JoinStyle) -> Self {
        self.join_style = style;
        self
    }

    /// Sets how far, as a multiple of the buffer distance, a mitre may extend from its
    /// vertex before being cut.
    pub fn with_mitre_limit(mut self, limit: f64) -> Self {
        self.mitre_limit = limit;
        self
    }

    /// Sets whether lines are buffered on a single side: left for positive distances,
    /// right for negative ones.
    pub fn with_single_sided(mut self, single_sided: bool) -> Self {
        self.single_sided = single_sided;
        self
    }

    /// Sets the fraction of the buffer distance below which concavities of the input are
    /// removed before offsetting. Negative values are treated as zero.
    pub fn with_simplify_factor(mut self, factor: f64) -> Self {
        self.simplify_factor = factor.max(0.0);
        self
    }

    pub fn quadrant_segments(&self) -> usize {
        self.quadrant_segments
    }

    pub fn end_cap_style(&self) -> EndCapStyle {
        self.end_cap_style
    }

    pub fn join_style(&self) -> JoinStyle {
        self.join_style
    }

    pub fn mitre_limit(&self) -> f64 {
        self.mitre_limit
    }

    pub fn is_single_sided(&self) -> bool {
        self.single_sided
    }

    pub fn simplify_factor(&self) -> f64 {
        self.simplify_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods() {
        let params = BufferParameters::default()
            .with_quadrant_segments(0)
            .with_end_cap_style(EndCapStyle::Flat)
            .with_join_style(JoinStyle::Mitre)
            .with_mitre_limit(2.0)
            .with_simplify_factor(-1.0);

        assert_eq!(params.quadrant_segments(), 1);
        assert_eq!(params.end_cap_style(), EndCapStyle::Flat);
        assert_eq!(params.join_style(), JoinStyle::Mitre);
        assert_eq!(params.mitre_limit(), 2.0);
        assert_eq!(params.simplify_factor(), 0.0);
        assert!(!params.is_single_sided());
    }
}
