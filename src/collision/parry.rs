// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision cooking with parry3d

use super::{CollisionInput, PhysicsBackend};
use anyhow::Result;
use nalgebra::Point3;
use parry3d::math::{Isometry, Real};
use parry3d::shape::SharedShape;

/// Shapes produced by [`ParryPhysics`]
#[derive(Clone)]
pub struct CollisionShapes {
    /// Per-triangle shape, `None` without complex geometry.
    pub complex: Option<SharedShape>,
    /// Compound of the convex hulls, or the complex shape when used as simple.
    pub simple: Option<SharedShape>,
}

impl CollisionShapes {
    pub fn is_empty(&self) -> bool {
        self.complex.is_none() && self.simple.is_none()
    }
}

/// Cooks collision into parry3d shapes
#[derive(Debug, Clone, Default)]
pub struct ParryPhysics {
    cooked: usize,
}

impl ParryPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cook calls served so far.
    pub fn cook_count(&self) -> usize {
        self.cooked
    }
}

impl PhysicsBackend for ParryPhysics {
    type Handle = CollisionShapes;

    fn cook(&mut self, input: CollisionInput<'_>) -> Result<CollisionShapes> {
        self.cooked += 1;

        let complex = input
            .complex
            .filter(|mesh| !mesh.is_empty())
            .map(|mesh| SharedShape::trimesh(mesh.vertices.clone(), mesh.indices.clone()));

        let simple = if input.use_complex_as_simple {
            complex.clone()
        } else {
            let hulls: Vec<(Isometry<Real>, SharedShape)> = input
                .convex_hulls
                .iter()
                .enumerate()
                .filter_map(|(i, hull)| match cook_hull(&hull.points) {
                    Some(shape) => Some((Isometry::identity(), shape)),
                    None => {
                        log::warn!(
                            "skipping degenerate convex hull {} ({} points)",
                            i,
                            hull.points.len()
                        );
                        None
                    }
                })
                .collect();

            if hulls.is_empty() {
                None
            } else {
                Some(SharedShape::compound(hulls))
            }
        };

        log::debug!(
            "cooked collision: complex={} simple={}",
            complex.is_some(),
            simple.is_some()
        );
        Ok(CollisionShapes { complex, simple })
    }
}

// A solid hull needs at least a tetrahedron.
fn cook_hull(points: &[Point3<Real>]) -> Option<SharedShape> {
    if points.len() < 4 {
        return None;
    }
    SharedShape::convex_hull(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionMesh, CollisionSource, ConvexHull};
    use nalgebra::Point3;

    fn cube_corners() -> Vec<Point3<f32>> {
        let mut points = Vec::new();
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for z in [0.0, 1.0] {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        points
    }

    #[test]
    fn test_cook_trimesh_and_hulls() {
        let mut mesh = CollisionMesh::default();
        mesh.append(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[0, 1, 2, 0, 2, 3],
            CollisionSource::RenderSection(0),
        );
        let hulls = vec![ConvexHull::new(cube_corners())];

        let mut physics = ParryPhysics::new();
        let shapes = physics
            .cook(CollisionInput {
                complex: Some(&mesh),
                convex_hulls: &hulls,
                use_complex_as_simple: false,
            })
            .unwrap();

        let trimesh = shapes.complex.as_ref().unwrap().as_trimesh().unwrap();
        assert_eq!(trimesh.indices().len(), 2);
        let compound = shapes.simple.as_ref().unwrap().as_compound().unwrap();
        assert_eq!(compound.shapes().len(), 1);
        assert_eq!(physics.cook_count(), 1);
    }

    #[test]
    fn test_no_geometry_cooks_nothing() {
        let mut physics = ParryPhysics::new();
        let shapes = physics
            .cook(CollisionInput {
                complex: None,
                convex_hulls: &[],
                use_complex_as_simple: true,
            })
            .unwrap();
        assert!(shapes.is_empty());
    }

    #[test]
    fn test_degenerate_hull_is_skipped() {
        let flat = ConvexHull::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        let mut physics = ParryPhysics::new();
        let shapes = physics
            .cook(CollisionInput {
                complex: None,
                convex_hulls: &[flat],
                use_complex_as_simple: false,
            })
            .unwrap();
        assert!(shapes.simple.is_none());
    }
}
