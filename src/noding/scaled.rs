use crate::{
    error::Result,
    geom::Coordinate,
    noding::{NodedSegmentString, Noder, without_repeated_points},
};

/// Wraps a noder so that it works on coordinates scaled and rounded to an integer grid.
///
/// Input strings are scaled by the scale factor (after subtracting the offset) and
/// rounded; the noded output is mapped back to the original coordinate space. Strings
/// which collapse to a single point once rounded are dropped.
#[derive(Debug, Clone)]
pub struct ScaledNoder<N> {
    noder: N,
    scale: f64,
    offset: Coordinate,
}

impl<N> ScaledNoder<N> {
    pub fn new(noder: N, scale: f64) -> Self {
        Self {
            noder,
            scale,
            offset: Coordinate::new(0., 0.),
        }
    }

    pub fn with_offset(mut self, offset: Coordinate) -> Self {
        self.offset = offset;
        self
    }

    /// Returns true if the scale does not change the input.
    pub fn is_integer_precision(&self) -> bool {
        self.scale == 1.0
    }

    fn scaled(&self, coords: &[Coordinate]) -> Vec<Coordinate> {
        let scaled: Vec<Coordinate> = coords
            .iter()
            .map(|c| {
                Coordinate::new_xyz(
                    ((c.x - self.offset.x) * self.scale).round(),
                    ((c.y - self.offset.y) * self.scale).round(),
                    c.z,
                )
            })
            .collect();
        without_repeated_points(&scaled)
    }

    fn rescale(&self, coord: &mut Coordinate) {
        coord.x = coord.x / self.scale + self.offset.x;
        coord.y = coord.y / self.scale + self.offset.y;
    }
}

impl<D, N> Noder<D> for ScaledNoder<N>
where
    N: Noder<D>,
{
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<D>>) -> Result<Vec<NodedSegmentString<D>>> {
        if self.is_integer_precision() {
            return self.noder.compute_nodes(strings);
        }

        let scaled = strings
            .into_iter()
            .filter_map(|string| {
                let coords = self.scaled(string.coords());
                (coords.len() >= 2).then(|| NodedSegmentString::new(coords, string.into_data()))
            })
            .collect();

        let noded = self.noder.compute_nodes(scaled)?;
        Ok(noded
            .into_iter()
            .map(|string| {
                let mut coords = string.coords().to_vec();
                coords.iter_mut().for_each(|c| self.rescale(c));
                NodedSegmentString::new(coords, string.into_data())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coord,
        geom::PrecisionModel,
        noding::{IntersectionAdder, MCIndexNoder},
    };

    #[test]
    fn nodes_on_the_scaled_grid() {
        let strings = vec![
            NodedSegmentString::new(vec![coord!(0, 0), coord!(1, 1)], 0),
            NodedSegmentString::new(vec![coord!(0, 1), coord!(1, 0.02)], 1),
        ];

        let adder = IntersectionAdder::with_precision(PrecisionModel::fixed(1.0));
        let noder = MCIndexNoder::new(adder);
        let noded = ScaledNoder::new(noder, 10.0).compute_nodes(strings).unwrap();
        assert_eq!(noded.len(), 4);
        for string in &noded {
            for c in string.coords() {
                let (x, y) = (c.x * 10.0, c.y * 10.0);
                assert!((x - x.round()).abs() < 1e-9 && (y - y.round()).abs() < 1e-9, "{c}");
            }
        }
    }
}
