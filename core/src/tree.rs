//! Procedural geometry for a single tree: a gently curving trunk, a crown of
//! tapered branches, and double-sided leaf triangles at every branch tip.
//!
//! Everything is built into one [`TreeMesh`] in that order, so the trunk always
//! owns the first `segments * (rings + 1)` vertices.

use std::f32::consts::{FRAC_PI_4, FRAC_PI_8, TAU};

use glam::{EulerRot, Mat4, Quat, Vec3};
use palette::Srgba;
use rand::Rng;

use crate::mesh::{MeshVertex, TreeMesh};
use crate::params::TreeGenerationParameters;
use crate::utils::rgb8;

// Largest per-ring yaw/pitch wobble of the trunk, radians
const TRUNK_WOBBLE: f32 = 0.1;
const BRANCH_LENGTH: f32 = 4.0;
// Branch radius relative to the trunk's base radius
const BRANCH_RADIUS: f32 = 0.4;
const LEAF_LENGTH: f32 = 1.2;
// Height the leaf's upper edge curls above the tip
const LEAF_CURL: f32 = 0.7;

fn bark() -> Srgba {
    rgb8(139, 69, 19)
}

fn foliage() -> Srgba {
    rgb8(34, 139, 34)
}

/// A placed tree with its own mesh.
#[derive(Debug, Clone)]
pub struct TreeInstance {
    pub position: Vec3,
    pub scale: f32,
    pub mesh: TreeMesh,
}

/// What the branch pass needs to know about a finished trunk.
#[derive(Debug, Clone, Copy)]
pub struct Trunk {
    pub segments: usize,
    pub rings: usize,
    pub base_radius: f32,
    pub top_center: Vec3,
    // Growth direction at the top ring
    pub top_up: Vec3,
}

// Local frame of a ring: x = right, y = up (growth direction), z = forward
fn ring_frame(center: Vec3, up: Vec3) -> Mat4 {
    let mut right = up.cross(Vec3::Z).normalize_or_zero();
    if right.length_squared() < 0.01 {
        right = Vec3::X;
    }
    let forward = right.cross(up).normalize();
    Mat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        forward.extend(0.0),
        center.extend(1.0),
    )
}

// Count in `min..max`, upper bound excluded; `min` when the range is empty
fn count_below<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    if max > min { rng.gen_range(min..max) } else { min }
}

// Point on a ring of `radius` at segment `s` of `segments`, in the frame's local space
fn ring_point(s: usize, segments: usize, radius: f32) -> Vec3 {
    let angle = TAU * s as f32 / segments as f32;
    Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
}

/// Extrude the trunk rings from `base` upward.
///
/// Each ring gap becomes a quad strip of `segments * 2` triangles, and the
/// radius shrinks linearly to 30-50% of the base radius at the top.
pub fn build_trunk<R: Rng + ?Sized>(
    mesh: &mut TreeMesh,
    base: Vec3,
    scale: f32,
    params: &TreeGenerationParameters,
    rng: &mut R,
) -> Trunk {
    let segments = rng.gen_range(params.trunk_segments_min..=params.trunk_segments_max);
    let rings = rng.gen_range(params.trunk_rings_min..=params.trunk_rings_max);
    let trunk_height = rng.gen_range(6..12) as f32 * scale;
    let base_radius =
        rng.gen_range(params.trunk_base_radius_min..=params.trunk_base_radius_max) * scale;
    let top_radius = base_radius * (0.3 + 0.2 * rng.r#gen::<f32>());
    let segment_height = trunk_height / rings as f32;

    let mut frames = Vec::with_capacity(rings + 1);
    frames.push(ring_frame(base, Vec3::Y));
    let mut dir = Vec3::Y;
    let mut center = base;
    for _ in 1..=rings {
        let yaw = rng.gen_range(-TRUNK_WOBBLE..=TRUNK_WOBBLE);
        let pitch = rng.gen_range(-TRUNK_WOBBLE..=TRUNK_WOBBLE);
        dir = (Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0) * dir).normalize();
        center += dir * segment_height;
        frames.push(ring_frame(center, dir));
    }

    let start = mesh.vertices.len() as u32;
    for (r, frame) in frames.iter().enumerate() {
        let t = r as f32 / rings as f32;
        let radius = base_radius + (top_radius - base_radius) * t;
        for s in 0..segments {
            let world = frame.transform_point3(ring_point(s, segments, radius));
            mesh.push_vertex(MeshVertex::new(world, bark()));
        }
    }

    let at = |r: usize, s: usize| start + (r * segments + s) as u32;
    for r in 0..rings {
        for s in 0..segments {
            let next = (s + 1) % segments;
            let (i00, i01) = (at(r, s), at(r, next));
            let (i10, i11) = (at(r + 1, s), at(r + 1, next));
            mesh.push_triangle(i00, i01, i10);
            mesh.push_triangle(i01, i11, i10);
        }
    }

    Trunk {
        segments,
        rings,
        base_radius,
        top_center: center,
        top_up: dir,
    }
}

/// Radiate tapered branches from the top of the trunk and return their tips.
///
/// Branches are spread evenly around the trunk with some angular jitter and
/// tilted 45°-67.5° away from the trunk's growth direction.
pub fn build_branches<R: Rng + ?Sized>(
    mesh: &mut TreeMesh,
    trunk: &Trunk,
    scale: f32,
    params: &TreeGenerationParameters,
    rng: &mut R,
) -> Vec<Vec3> {
    let count = count_below(rng, params.branch_count_min, params.branch_count_max);
    let mut tips = Vec::with_capacity(count);
    let radius = trunk.base_radius * BRANCH_RADIUS;
    // Tilt is measured from the trunk top, not from world up
    let align = Quat::from_rotation_arc(Vec3::Y, trunk.top_up);

    for b in 0..count {
        let angle = TAU * b as f32 / count as f32 + rng.r#gen::<f32>();
        let tilt = FRAC_PI_4 + rng.r#gen::<f32>() * FRAC_PI_8;
        let length = BRANCH_LENGTH * scale * (0.8 + rng.r#gen::<f32>() * 0.4);
        let dir = align
            * Vec3::new(
                angle.cos() * tilt.sin(),
                tilt.cos(),
                angle.sin() * tilt.sin(),
            );
        let base = trunk.top_center;
        let tip = base + dir * length;
        tips.push(tip);

        // Base and tip vertices interleaved; the tip ring is half as wide
        let frame = ring_frame(Vec3::ZERO, dir);
        let start = mesh.vertices.len() as u32;
        for s in 0..trunk.segments {
            let offset = frame.transform_vector3(ring_point(s, trunk.segments, radius));
            mesh.push_vertex(MeshVertex::new(base + offset, bark()));
            mesh.push_vertex(MeshVertex::new(tip + offset * 0.5, bark()));
        }
        for s in 0..trunk.segments {
            let b0 = start + (s * 2) as u32;
            let t0 = b0 + 1;
            let b1 = start + ((s + 1) % trunk.segments * 2) as u32;
            let t1 = b1 + 1;
            mesh.push_triangle(b0, b1, t0);
            mesh.push_triangle(b1, t1, t0);
        }
    }
    tips
}

/// Fan leaves out around every branch tip.
///
/// Each leaf is two triangles over separate vertices: the front one and a
/// reversed back one, with opposite authored normals, so it shows from both
/// sides under back-face culling. Authored normals point to the side facing
/// the tip.
pub fn build_leaves<R: Rng + ?Sized>(
    mesh: &mut TreeMesh,
    tips: &[Vec3],
    scale: f32,
    params: &TreeGenerationParameters,
    rng: &mut R,
) {
    for &tip in tips {
        let count = count_below(rng, params.leaf_count_min, params.leaf_count_max);
        for l in 0..count {
            let angle = TAU * l as f32 / count as f32 + rng.r#gen::<f32>();
            let reach = LEAF_LENGTH * scale * (0.7 + rng.r#gen::<f32>() * 0.6);
            let curl = LEAF_CURL * scale;
            let p0 = tip + Vec3::new(angle.cos() * reach, 0.0, angle.sin() * reach);
            let p1 = tip
                + Vec3::new(
                    (angle + 0.2).cos() * reach * 0.7,
                    curl,
                    (angle + 0.2).sin() * reach * 0.7,
                );
            let p2 = tip
                + Vec3::new(
                    (angle - 0.2).cos() * reach * 0.7,
                    curl,
                    (angle - 0.2).sin() * reach * 0.7,
                );

            let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
            let front = [p0, p1, p2].map(|p| {
                mesh.push_vertex(MeshVertex::with_normal(p, normal, foliage()))
            });
            mesh.push_triangle(front[0], front[1], front[2]);
            let back = [p0, p2, p1].map(|p| {
                mesh.push_vertex(MeshVertex::with_normal(p, -normal, foliage()))
            });
            mesh.push_triangle(back[0], back[1], back[2]);
        }
    }
}

/// Generate one complete tree standing at `position`.
///
/// Normals are recomputed over the whole mesh once every part is in place.
/// Leaf normals authored by [`build_leaves`] survive only when
/// `params.preserve_leaf_normals` is set.
pub fn build_tree<R: Rng + ?Sized>(
    position: Vec3,
    params: &TreeGenerationParameters,
    rng: &mut R,
) -> TreeInstance {
    let scale = 1.0 + rng.r#gen::<f32>() * 0.5;
    let mut mesh = TreeMesh::default();

    let trunk = build_trunk(&mut mesh, position, scale, params, rng);
    let tips = build_branches(&mut mesh, &trunk, scale, params, rng);
    let leaf_start = mesh.vertices.len();
    build_leaves(&mut mesh, &tips, scale, params, rng);

    if params.preserve_leaf_normals {
        let authored: Vec<Vec3> = mesh.vertices[leaf_start..].iter().map(|v| v.normal).collect();
        mesh.recompute_normals();
        for (v, n) in mesh.vertices[leaf_start..].iter_mut().zip(authored) {
            v.normal = n;
        }
    } else {
        mesh.recompute_normals();
    }

    TreeInstance {
        position,
        scale,
        mesh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::face_normal;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // Geometric normal a leaf triangle gets from the recompute pass
    fn leaf_face_normal(mesh: &TreeMesh, tri: [usize; 3]) -> Vec3 {
        let [a, b, c] = tri.map(|i| mesh.vertices[i].position);
        face_normal(a, b, c).normalize_or_zero()
    }

    fn fixed_params() -> TreeGenerationParameters {
        TreeGenerationParameters {
            trunk_segments_min: 8,
            trunk_segments_max: 8,
            trunk_rings_min: 4,
            trunk_rings_max: 4,
            branch_count_min: 3,
            branch_count_max: 3,
            leaf_count_min: 2,
            leaf_count_max: 2,
            ..Default::default()
        }
    }

    #[test]
    fn trunk_vertex_and_triangle_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut mesh = TreeMesh::default();
        let trunk = build_trunk(&mut mesh, Vec3::ZERO, 1.0, &fixed_params(), &mut rng);
        assert_eq!((trunk.segments, trunk.rings), (8, 4));
        assert_eq!(mesh.vertices.len(), 8 * (4 + 1));
        assert_eq!(mesh.triangle_count(), 8 * 4 * 2);
    }

    #[test]
    fn trunk_grows_upward_and_tapers() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut mesh = TreeMesh::default();
        let base = Vec3::new(3.0, 10.0, -2.0);
        let trunk = build_trunk(&mut mesh, base, 1.0, &fixed_params(), &mut rng);

        assert!(trunk.top_center.y - base.y >= 5.0);
        assert!(trunk.top_up.y > 0.9);

        let ring_radius = |r: usize| {
            let center: Vec3 = mesh.vertices[r * 8..(r + 1) * 8]
                .iter()
                .map(|v| v.position)
                .sum::<Vec3>()
                / 8.0;
            mesh.vertices[r * 8].position.distance(center)
        };
        let bottom = ring_radius(0);
        let top = ring_radius(4);
        assert_relative_eq!(bottom, trunk.base_radius, epsilon = 1e-4);
        assert!(top < bottom * 0.55 && top > bottom * 0.25);
    }

    #[test]
    fn trunk_sides_face_outward() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut mesh = TreeMesh::default();
        build_trunk(&mut mesh, Vec3::ZERO, 1.0, &fixed_params(), &mut rng);
        mesh.recompute_normals();
        // Bottom ring: the normal should point away from the trunk axis
        for v in &mesh.vertices[..8] {
            let radial = Vec3::new(v.position.x, 0.0, v.position.z).normalize();
            assert!(v.normal.dot(radial) > 0.5);
        }
    }

    #[test]
    fn branches_and_leaves_counts() {
        let params = fixed_params();
        let mut rng = StdRng::seed_from_u64(5);
        let tree = build_tree(Vec3::ZERO, &params, &mut rng);

        let trunk_vertices = 8 * 5;
        let branch_vertices = 3 * 8 * 2;
        let leaf_vertices = 3 * 2 * 6;
        assert_eq!(
            tree.mesh.vertices.len(),
            trunk_vertices + branch_vertices + leaf_vertices
        );
        assert_eq!(tree.mesh.triangle_count(), 64 + 3 * 8 * 2 + 3 * 2 * 2);
        assert!((1.0..=1.5).contains(&tree.scale));
        let n = tree.mesh.vertices.len() as u32;
        assert!(tree.mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn branch_tips_tilt_away_from_trunk() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut mesh = TreeMesh::default();
        let params = fixed_params();
        let trunk = build_trunk(&mut mesh, Vec3::ZERO, 1.0, &params, &mut rng);
        let tips = build_branches(&mut mesh, &trunk, 1.0, &params, &mut rng);
        assert_eq!(tips.len(), 3);
        for tip in tips {
            // Tilt from the trunk direction is within 45°..67.5°
            let cos = (tip - trunk.top_center).normalize().dot(trunk.top_up);
            assert!((0.38..=0.71).contains(&cos), "cos {cos}");
            let len = tip.distance(trunk.top_center);
            assert!((3.2 - 1e-3..=4.8 + 1e-3).contains(&len));
        }
    }

    #[test]
    fn leaf_normals_are_recomputed_by_default() {
        let params = fixed_params();
        let mut rng = StdRng::seed_from_u64(21);
        let tree = build_tree(Vec3::ZERO, &params, &mut rng);
        let leaf_start = 8 * 5 + 3 * 8 * 2;
        let mesh = &tree.mesh;
        let leaf_tris = mesh.triangles().filter(|t| t[0] >= leaf_start);

        for tri in leaf_tris {
            let expected = leaf_face_normal(mesh, tri);
            for i in tri {
                assert_relative_eq!(mesh.vertices[i].normal.x, expected.x, epsilon = 1e-5);
                assert_relative_eq!(mesh.vertices[i].normal.y, expected.y, epsilon = 1e-5);
                assert_relative_eq!(mesh.vertices[i].normal.z, expected.z, epsilon = 1e-5);
            }
        }

        // Front and back copies of a leaf end up facing opposite ways
        let front = mesh.vertices[leaf_start].normal;
        let back = mesh.vertices[leaf_start + 3].normal;
        assert_relative_eq!(front.dot(back), -1.0, epsilon = 1e-5);
    }

    #[test]
    fn authored_leaf_normals_can_be_preserved() {
        let recomputed = build_tree(Vec3::ZERO, &fixed_params(), &mut StdRng::seed_from_u64(4));
        let preserved = build_tree(
            Vec3::ZERO,
            &TreeGenerationParameters {
                preserve_leaf_normals: true,
                ..fixed_params()
            },
            &mut StdRng::seed_from_u64(4),
        );
        let leaf_start = 8 * 5 + 3 * 8 * 2;

        // Same rng stream, same geometry; only the leaf normals differ
        assert_eq!(
            recomputed.mesh.vertices[0].normal,
            preserved.mesh.vertices[0].normal
        );
        let a = recomputed.mesh.vertices[leaf_start].normal;
        let b = preserved.mesh.vertices[leaf_start].normal;
        assert_relative_eq!(a.dot(b), -1.0, epsilon = 1e-5);
    }

    #[test]
    fn branch_and_leaf_counts_exclude_the_upper_bound() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            assert_eq!(count_below(&mut rng, 2, 3), 2);
            assert!((12..24).contains(&count_below(&mut rng, 12, 24)));
        }
        assert_eq!(count_below(&mut rng, 5, 5), 5);

        let params = TreeGenerationParameters {
            branch_count_min: 2,
            branch_count_max: 3,
            leaf_count_min: 1,
            leaf_count_max: 2,
            ..fixed_params()
        };
        let mut mesh = TreeMesh::default();
        let trunk = build_trunk(&mut mesh, Vec3::ZERO, 1.0, &params, &mut rng);
        let tips = build_branches(&mut mesh, &trunk, 1.0, &params, &mut rng);
        assert_eq!(tips.len(), 2);
        let before = mesh.vertices.len();
        build_leaves(&mut mesh, &tips, 1.0, &params, &mut rng);
        assert_eq!(mesh.vertices.len() - before, 2 * 6);
    }

    #[test]
    fn same_seed_same_tree() {
        let a = build_tree(Vec3::ONE, &fixed_params(), &mut StdRng::seed_from_u64(99));
        let b = build_tree(Vec3::ONE, &fixed_params(), &mut StdRng::seed_from_u64(99));
        assert_eq!(a.scale, b.scale);
        assert_eq!(a.mesh.indices, b.mesh.indices);
        for (va, vb) in a.mesh.vertices.iter().zip(&b.mesh.vertices) {
            assert_eq!(va.position, vb.position);
            assert_eq!(va.normal, vb.normal);
        }
    }
}
