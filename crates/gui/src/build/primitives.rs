//! Plane, box, cone and sphere generators.
//!
//! All primitives are centred on the origin except the cone, which stands on
//! the XZ plane with its apex on +Y. Triangles wind counter-clockwise seen
//! from outside.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::geometry::{GeometryError, GeometryResult};
use crate::viewport::mesh::MeshData;

fn check_positive(name: &str, value: f32) -> GeometryResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GeometryError::InvalidPrimitive(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_count(name: &str, value: u32, min: u32) -> GeometryResult<()> {
    if value < min {
        return Err(GeometryError::InvalidPrimitive(format!(
            "{} must be at least {}, got {}",
            name, min, value
        )));
    }
    Ok(())
}

/// Subdivided quad `origin + s·u + t·v` for s, t in [0, 1]
fn push_face(mesh: &mut MeshData, origin: Vec3, u: Vec3, v: Vec3, divisions: u32, color: [f32; 3]) {
    let normal = u.cross(v).normalize_or_zero();
    let base = mesh.vertex_count() as u32;
    let row = divisions + 1;

    for j in 0..=divisions {
        for i in 0..=divisions {
            let s = i as f32 / divisions as f32;
            let t = j as f32 / divisions as f32;
            mesh.push_vertex(origin + u * s + v * t, normal, color);
        }
    }

    for j in 0..divisions {
        for i in 0..divisions {
            let i0 = base + j * row + i;
            let i1 = i0 + 1;
            let i2 = i0 + row;
            let i3 = i2 + 1;
            mesh.push_triangle(i0, i1, i3);
            mesh.push_triangle(i0, i3, i2);
        }
    }
}

/// Square plane on XZ facing +Y
pub fn plane(length: f32, divisions: u32, color: [f32; 3]) -> GeometryResult<MeshData> {
    check_positive("length", length)?;
    check_count("divisions", divisions, 1)?;

    let h = length * 0.5;
    let mut mesh = MeshData::default();
    push_face(
        &mut mesh,
        Vec3::new(-h, 0.0, h),
        Vec3::new(length, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -length),
        divisions,
        color,
    );
    Ok(mesh)
}

/// Cube with every face split into `divisions × divisions` cells
pub fn cube(length: f32, divisions: u32, color: [f32; 3]) -> GeometryResult<MeshData> {
    check_positive("length", length)?;
    check_count("divisions", divisions, 1)?;

    let h = length * 0.5;
    let l = length;
    let faces = [
        // +Y
        (Vec3::new(-h, h, h), Vec3::new(l, 0.0, 0.0), Vec3::new(0.0, 0.0, -l)),
        // -Y
        (Vec3::new(-h, -h, -h), Vec3::new(l, 0.0, 0.0), Vec3::new(0.0, 0.0, l)),
        // +X
        (Vec3::new(h, -h, h), Vec3::new(0.0, 0.0, -l), Vec3::new(0.0, l, 0.0)),
        // -X
        (Vec3::new(-h, -h, -h), Vec3::new(0.0, 0.0, l), Vec3::new(0.0, l, 0.0)),
        // +Z
        (Vec3::new(-h, -h, h), Vec3::new(l, 0.0, 0.0), Vec3::new(0.0, l, 0.0)),
        // -Z
        (Vec3::new(h, -h, -h), Vec3::new(-l, 0.0, 0.0), Vec3::new(0.0, l, 0.0)),
    ];

    let mut mesh = MeshData::default();
    for (origin, u, v) in faces {
        push_face(&mut mesh, origin, u, v, divisions, color);
    }
    Ok(mesh)
}

/// Cone standing on y = 0 with its apex at y = `height`
pub fn cone(
    radius: f32,
    height: f32,
    slices: u32,
    stacks: u32,
    color: [f32; 3],
) -> GeometryResult<MeshData> {
    check_positive("radius", radius)?;
    check_positive("height", height)?;
    check_count("slices", slices, 3)?;
    check_count("stacks", stacks, 1)?;

    let mut mesh = MeshData::default();

    // Base disk
    let center = mesh.push_vertex(Vec3::ZERO, Vec3::NEG_Y, color);
    for i in 0..slices {
        let theta = TAU * i as f32 / slices as f32;
        mesh.push_vertex(
            Vec3::new(radius * theta.sin(), 0.0, radius * theta.cos()),
            Vec3::NEG_Y,
            color,
        );
    }
    for i in 0..slices {
        let next = (i + 1) % slices;
        mesh.push_triangle(center, center + 1 + next, center + 1 + i);
    }

    // Side, one ring per stack boundary (seam duplicated)
    let side_base = mesh.vertex_count() as u32;
    let row = slices + 1;
    for j in 0..=stacks {
        let f = j as f32 / stacks as f32;
        let r = radius * (1.0 - f);
        let y = height * f;
        for i in 0..=slices {
            let theta = TAU * i as f32 / slices as f32;
            let (s, c) = theta.sin_cos();
            let normal = Vec3::new(s * height, radius, c * height).normalize();
            mesh.push_vertex(Vec3::new(r * s, y, r * c), normal, color);
        }
    }
    for j in 0..stacks {
        for i in 0..slices {
            let i0 = side_base + j * row + i;
            let i1 = i0 + 1;
            let i2 = i0 + row;
            let i3 = i2 + 1;
            mesh.push_triangle(i0, i1, i3);
            if j + 1 < stacks {
                mesh.push_triangle(i0, i3, i2);
            }
        }
    }

    Ok(mesh)
}

/// UV sphere: `slices` around Y, `stacks` from pole to pole
pub fn sphere(radius: f32, slices: u32, stacks: u32, color: [f32; 3]) -> GeometryResult<MeshData> {
    check_positive("radius", radius)?;
    check_count("slices", slices, 3)?;
    check_count("stacks", stacks, 2)?;

    let mut mesh = MeshData::default();

    for j in 0..=stacks {
        // From the south pole (-π/2) up to the north pole (π/2)
        let phi = -PI * 0.5 + PI * j as f32 / stacks as f32;
        let (sp, cp) = phi.sin_cos();
        for i in 0..=slices {
            let theta = TAU * i as f32 / slices as f32;
            let (st, ct) = theta.sin_cos();
            let n = Vec3::new(cp * st, sp, cp * ct);
            mesh.push_vertex(n * radius, n, color);
        }
    }

    let row = slices + 1;
    for j in 0..stacks {
        for i in 0..slices {
            let i0 = j * row + i;
            let i1 = i0 + 1;
            let i2 = i0 + row;
            let i3 = i2 + 1;
            if j > 0 {
                mesh.push_triangle(i0, i1, i3);
            }
            if j + 1 < stacks {
                mesh.push_triangle(i0, i3, i2);
            }
        }
    }

    Ok(mesh)
}
