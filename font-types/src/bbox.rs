/// Minimum and maximum extents of a rectangular region.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox<T> {
    /// Minimum extent in the x direction-- the left side of a region.
    pub x_min: T,
    /// Minimum extent in the y direction. In a Y-up coordinate system,
    /// which is used by fonts, this represents the bottom of a region.
    pub y_min: T,
    /// Maximum extent in the x direction-- the right side of a region.
    pub x_max: T,
    /// Maximum extend in the y direction. In a Y-up coordinate system,
    /// which is used by fonts, this represents the top of the
    /// region.
    pub y_max: T,
}

impl<T: Copy + Ord> BoundingBox<T> {
    /// Compute the bounds of a sequence of points, or `None` if it is empty.
    pub fn from_points(points: impl IntoIterator<Item = (T, T)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let init = BoundingBox {
            x_min: x,
            y_min: y,
            x_max: x,
            y_max: y,
        };
        Some(iter.fold(init, |bbox, (x, y)| BoundingBox {
            x_min: bbox.x_min.min(x),
            y_min: bbox.y_min.min(y),
            x_max: bbox.x_max.max(x),
            y_max: bbox.y_max.max(y),
        }))
    }

    /// The smallest box containing both `self` and `other`.
    pub fn union(self, other: BoundingBox<T>) -> Self {
        BoundingBox {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_points() {
        let bbox = BoundingBox::from_points([(0i16, 0), (100, -20), (50, 700)]).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x_min: 0,
                y_min: -20,
                x_max: 100,
                y_max: 700
            }
        );
        assert!(BoundingBox::<i16>::from_points([]).is_none());
    }
}
