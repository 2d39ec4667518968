// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Container bounds aggregation

use super::Section;
use crate::geometry::BoundingBox;

/// Union of the local bounds of every given section.
///
/// A mesh without sections reports [`BoundingBox::zero`].
pub fn recompute_bounds<'a>(sections: impl IntoIterator<Item = &'a Section>) -> BoundingBox {
    let merged = sections
        .into_iter()
        .fold(BoundingBox::empty(), |acc, section| acc.union(&section.local_bounds()));

    if merged.is_empty() {
        BoundingBox::zero()
    } else {
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::VertexBuffer;
    use nalgebra::Point3;

    fn section_at(points: Vec<Point3<f32>>) -> Section {
        Section::new(VertexBuffer::PositionOnly(points), Vec::new(), None)
    }

    #[test]
    fn test_no_sections_is_zero() {
        assert_eq!(recompute_bounds(std::iter::empty()), BoundingBox::zero());
    }

    #[test]
    fn test_union_of_sections() {
        let a = section_at(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)]);
        let b = section_at(vec![Point3::new(-3.0, 2.0, 0.5)]);
        let bounds = recompute_bounds([&a, &b]);
        assert_eq!(bounds.min, Point3::new(-3.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_empty_section_counts_as_origin() {
        let a = section_at(vec![Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0)]);
        let empty = section_at(Vec::new());
        let bounds = recompute_bounds([&a, &empty]);
        assert_eq!(bounds, a.local_bounds().union(&empty.local_bounds()));
        assert_eq!(bounds.min, Point3::origin());
    }
}
