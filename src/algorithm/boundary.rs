/// Decides whether a line end point is on the boundary of a lineal geometry, given how many
/// line ends share it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundaryNodeRule {
    /// An end point is on the boundary if shared by an odd number of line ends.
    #[default]
    Mod2,
    /// Every end point is on the boundary.
    EndPoint,
    /// An end point is on the boundary if shared by more than one line end.
    MultiValentEndPoint,
    /// An end point is on the boundary if owned by exactly one line end.
    MonoValentEndPoint,
}

impl BoundaryNodeRule {
    /// Returns true if a point shared by the given number of line ends is on the boundary.
    pub fn is_in_boundary(&self, count: usize) -> bool {
        match self {
            Self::Mod2 => count % 2 == 1,
            Self::EndPoint => count > 0,
            Self::MultiValentEndPoint => count > 1,
            Self::MonoValentEndPoint => count == 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules() {
        let counts = [0, 1, 2, 3];
        let cases = [
            (BoundaryNodeRule::Mod2, [false, true, false, true]),
            (BoundaryNodeRule::EndPoint, [false, true, true, true]),
            (BoundaryNodeRule::MultiValentEndPoint, [false, false, true, true]),
            (BoundaryNodeRule::MonoValentEndPoint, [false, true, false, false]),
        ];

        for (rule, want) in cases {
            for (count, want) in counts.iter().zip(want) {
                assert_eq!(rule.is_in_boundary(*count), want, "{rule:?} with {count}");
            }
        }
    }
}
