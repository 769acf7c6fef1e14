//! Group transform chains and world flattening.
//!
//! A model's matrix is the product of every enclosing group's transforms in
//! declaration order, outermost group first, so the last listed transform is
//! the first one applied to the vertices.

use glam::{Mat4, Vec3, Vec4};
use shared::{Group, ModelEntry, TransformOp, World};

use crate::geometry::{CatmullRomLoop, GeometryError, GeometryResult};

/// Matrix of a single transform at `time_secs` since the animation started
pub fn op_matrix(op: &TransformOp, time_secs: f32) -> GeometryResult<Mat4> {
    match op {
        TransformOp::Translate { x, y, z } => Ok(Mat4::from_translation(Vec3::new(*x, *y, *z))),
        TransformOp::Rotate { angle, x, y, z } => {
            let axis = rotation_axis(*x, *y, *z)?;
            Ok(Mat4::from_axis_angle(axis, angle.to_radians()))
        }
        TransformOp::Scale { x, y, z } => Ok(Mat4::from_scale(Vec3::new(*x, *y, *z))),
        TransformOp::AnimatedTranslate {
            time,
            align,
            points,
        } => {
            let period = animation_period(*time)?;
            let path = CatmullRomLoop::new(points.iter().map(|p| Vec3::from_array(*p)).collect())
                .map_err(|e| GeometryError::InvalidTransform(e.to_string()))?;
            let (position, tangent) = path.position_at(time_secs / period);
            let translation = Mat4::from_translation(position);
            if *align {
                Ok(translation * align_x_to(tangent))
            } else {
                Ok(translation)
            }
        }
        TransformOp::AnimatedRotate { time, x, y, z } => {
            let period = animation_period(*time)?;
            let axis = rotation_axis(*x, *y, *z)?;
            let turns = (time_secs / period).rem_euclid(1.0);
            Ok(Mat4::from_axis_angle(axis, turns * std::f32::consts::TAU))
        }
    }
}

/// Product of a transform chain in declaration order
pub fn chain_matrix(ops: &[TransformOp], time_secs: f32) -> GeometryResult<Mat4> {
    ops.iter()
        .try_fold(Mat4::IDENTITY, |acc, op| -> GeometryResult<Mat4> {
            Ok(acc * op_matrix(op, time_secs)?)
        })
}

fn rotation_axis(x: f32, y: f32, z: f32) -> GeometryResult<Vec3> {
    let axis = Vec3::new(x, y, z);
    if !axis.is_finite() || axis.length_squared() < 1e-12 {
        return Err(GeometryError::InvalidTransform(format!(
            "rotation axis ({}, {}, {}) has no direction",
            x, y, z
        )));
    }
    Ok(axis.normalize())
}

fn animation_period(time: f32) -> GeometryResult<f32> {
    if !time.is_finite() || time <= 0.0 {
        return Err(GeometryError::InvalidTransform(format!(
            "animation time must be positive, got {}",
            time
        )));
    }
    Ok(time)
}

/// Rotation taking +X onto `tangent`, keeping +Y as close to up as possible
fn align_x_to(tangent: Vec3) -> Mat4 {
    let x = tangent.normalize_or_zero();
    let z = x.cross(Vec3::Y).normalize_or_zero();
    if x == Vec3::ZERO || z == Vec3::ZERO {
        return Mat4::IDENTITY;
    }
    let y = z.cross(x);
    Mat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), Vec4::W)
}

/// A model together with the transform chain of every group above it
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedModel {
    pub model: ModelEntry,
    pub transforms: Vec<TransformOp>,
}

impl PlacedModel {
    pub fn id(&self) -> &str {
        &self.model.id
    }

    pub fn is_animated(&self) -> bool {
        self.transforms.iter().any(TransformOp::is_animated)
    }

    pub fn matrix_at(&self, time_secs: f32) -> GeometryResult<Mat4> {
        chain_matrix(&self.transforms, time_secs)
    }

    /// World-space control loops of animated translations, for drawing the paths
    pub fn animation_paths(
        &self,
        time_secs: f32,
        samples: usize,
    ) -> GeometryResult<Vec<Vec<Vec3>>> {
        let mut paths = Vec::new();
        for (i, op) in self.transforms.iter().enumerate() {
            if let TransformOp::AnimatedTranslate { points, .. } = op {
                let parent = chain_matrix(&self.transforms[..i], time_secs)?;
                let path =
                    CatmullRomLoop::new(points.iter().map(|p| Vec3::from_array(*p)).collect())
                        .map_err(|e| GeometryError::InvalidTransform(e.to_string()))?;
                paths.push(
                    path.polyline(samples)
                        .into_iter()
                        .map(|p| parent.transform_point3(p))
                        .collect(),
                );
            }
        }
        Ok(paths)
    }
}

/// Depth-first list of every model in the world, in declaration order
pub fn flatten_world(world: &World) -> Vec<PlacedModel> {
    fn visit(group: &Group, inherited: &[TransformOp], out: &mut Vec<PlacedModel>) {
        let mut chain = inherited.to_vec();
        chain.extend(group.transforms.iter().cloned());
        for model in &group.models {
            out.push(PlacedModel {
                model: model.clone(),
                transforms: chain.clone(),
            });
        }
        for child in &group.groups {
            visit(child, &chain, out);
        }
    }

    let mut out = Vec::with_capacity(world.model_count());
    for group in &world.groups {
        visit(group, &[], &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ModelSource;

    fn plane_model(id: &str) -> ModelEntry {
        let mut model = ModelEntry::new(ModelSource::Plane {
            length: 1.0,
            divisions: 1,
        });
        model.id = id.to_string();
        model
    }

    fn square_path() -> Vec<[f32; 3]> {
        vec![
            [1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0],
            [-1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn test_chain_applies_last_op_first() {
        let ops = vec![
            TransformOp::Translate {
                x: 10.0,
                y: 0.0,
                z: 0.0,
            },
            TransformOp::Rotate {
                angle: 90.0,
                x: 0.0,
                y: 1.0,
                z: 0.0,
            },
        ];
        let m = chain_matrix(&ops, 0.0).unwrap();
        // Rotate (1,0,0) about +Y by 90° to (0,0,-1), then translate
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::new(10.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_animated_rotate_quarter_period() {
        let op = TransformOp::AnimatedRotate {
            time: 4.0,
            x: 0.0,
            y: 1.0,
            z: 0.0,
        };
        let p = op_matrix(&op, 1.0).unwrap().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        let full = op_matrix(&op, 4.0).unwrap().transform_point3(Vec3::X);
        assert!((full - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_animated_translate_visits_points() {
        let op = TransformOp::AnimatedTranslate {
            time: 8.0,
            align: false,
            points: square_path(),
        };
        for (i, expected) in square_path().iter().enumerate() {
            let m = op_matrix(&op, i as f32 * 2.0).unwrap();
            let p = m.transform_point3(Vec3::ZERO);
            assert!((p - Vec3::from_array(*expected)).length() < 1e-5);
        }
    }

    #[test]
    fn test_align_points_x_along_tangent() {
        let op = TransformOp::AnimatedTranslate {
            time: 8.0,
            align: true,
            points: square_path(),
        };
        let m = op_matrix(&op, 0.0).unwrap();
        let x_axis = m.transform_vector3(Vec3::X).normalize();
        let (_, tangent) = CatmullRomLoop::new(
            square_path().iter().map(|p| Vec3::from_array(*p)).collect(),
        )
        .unwrap()
        .position_at(0.0);
        assert!((x_axis - tangent.normalize()).length() < 1e-5);
    }

    #[test]
    fn test_invalid_animation_parameters() {
        let op = TransformOp::AnimatedRotate {
            time: 0.0,
            x: 0.0,
            y: 1.0,
            z: 0.0,
        };
        assert!(matches!(
            op_matrix(&op, 1.0),
            Err(GeometryError::InvalidTransform(_))
        ));
        let op = TransformOp::AnimatedTranslate {
            time: 5.0,
            align: false,
            points: vec![[0.0; 3]; 3],
        };
        assert!(op_matrix(&op, 1.0).is_err());
        let op = TransformOp::Rotate {
            angle: 30.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        };
        assert!(op_matrix(&op, 0.0).is_err());
    }

    #[test]
    fn test_flatten_world_inherits_transforms() {
        let world = World {
            camera: Default::default(),
            groups: vec![Group {
                transforms: vec![TransformOp::Translate {
                    x: 1.0,
                    y: 0.0,
                    z: 0.0,
                }],
                models: vec![plane_model("sun")],
                groups: vec![Group {
                    transforms: vec![TransformOp::Scale {
                        x: 2.0,
                        y: 2.0,
                        z: 2.0,
                    }],
                    models: vec![plane_model("earth")],
                    groups: vec![],
                }],
            }],
        };

        let placed = flatten_world(&world);
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].id(), "sun");
        assert_eq!(placed[0].transforms.len(), 1);
        assert_eq!(placed[1].id(), "earth");
        assert_eq!(placed[1].transforms.len(), 2);

        let p = placed[1].matrix_at(0.0).unwrap().transform_point3(Vec3::X);
        assert!((p - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);
        assert!(!placed[1].is_animated());
    }

    #[test]
    fn test_animation_paths_in_parent_space() {
        let placed = PlacedModel {
            model: plane_model("moon"),
            transforms: vec![
                TransformOp::Translate {
                    x: 0.0,
                    y: 5.0,
                    z: 0.0,
                },
                TransformOp::AnimatedTranslate {
                    time: 10.0,
                    align: false,
                    points: square_path(),
                },
            ],
        };
        assert!(placed.is_animated());
        let paths = placed.animation_paths(0.0, 16).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 17);
        assert!(paths[0].iter().all(|p| (p.y - 5.0).abs() < 1e-5));
    }
}
