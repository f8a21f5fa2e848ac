use crate::tools::calibrate_basis::PointCollector;
use bevy::prelude::*;
use bevy::render::mesh::{PrimitiveTopology, VertexAttributeValues};
use bevy::window::PrimaryWindow;
use constants::calibration::{DEFAULT_EDGE_SNAP_DISTANCE, DEFAULT_VERTEX_SNAP_DISTANCE};
use serde::{Deserialize, Serialize};

/// Geometry feature a pointer hit was snapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapType {
    Vertex,
    Edge,
    Face,
}

/// Where the pointer ray meets model geometry, after snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    pub intersect_point: Vec3,
    pub snap_type: SnapType,
    /// Distance along the pointer ray to the raw hit.
    pub distance: f32,
}

/// Anything that can answer "what is under the pointer right now".
pub trait PickSource {
    fn current_pick(&self) -> Option<SnapResult>;
}

/// Marks a mesh entity as pickable geometry for the snapper.
#[derive(Component, Default)]
pub struct SnapTarget;

/// Pointer snapping state, refreshed on every pointer move.
#[derive(Resource, Debug)]
pub struct Snapper {
    snap: Option<SnapResult>,
    pub vertex_snap_distance: f32,
    pub edge_snap_distance: f32,
}

impl Default for Snapper {
    fn default() -> Self {
        Self {
            snap: None,
            vertex_snap_distance: DEFAULT_VERTEX_SNAP_DISTANCE,
            edge_snap_distance: DEFAULT_EDGE_SNAP_DISTANCE,
        }
    }
}

impl Snapper {
    pub fn is_snapped(&self) -> bool {
        self.snap.is_some()
    }

    pub fn snap_result(&self) -> Option<&SnapResult> {
        self.snap.as_ref()
    }

    /// Overwrite the current snap, used by hosts that pick on their own.
    pub fn set_snap(&mut self, snap: Option<SnapResult>) {
        self.snap = snap;
    }

    pub fn clear(&mut self) {
        self.snap = None;
    }

    /// Cast `ray` against world-space triangles and snap the nearest hit.
    pub fn snap_ray<I>(&mut self, ray: Ray3d, triangles: I) -> Option<SnapResult>
    where
        I: IntoIterator<Item = [Vec3; 3]>,
    {
        let nearest = triangles
            .into_iter()
            .filter_map(|triangle| {
                ray_triangle_intersection(ray.origin, *ray.direction, &triangle)
                    .map(|t| (t, triangle))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));

        self.snap = nearest.map(|(t, triangle)| {
            let hit = ray.origin + *ray.direction * t;
            let (intersect_point, snap_type) = snap_to_triangle(
                hit,
                &triangle,
                self.vertex_snap_distance,
                self.edge_snap_distance,
            );
            SnapResult {
                intersect_point,
                snap_type,
                distance: t,
            }
        });
        self.snap
    }
}

impl PickSource for Snapper {
    fn current_pick(&self) -> Option<SnapResult> {
        self.snap
    }
}

/// Moller-Trumbore ray/triangle test, returns the ray parameter of the hit.
/// Back faces are hit as well since model shells are not always closed.
pub fn ray_triangle_intersection(origin: Vec3, direction: Vec3, triangle: &[Vec3; 3]) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = triangle[1] - triangle[0];
    let edge2 = triangle[2] - triangle[0];
    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None; // Ray parallel to triangle.
    }

    let inv_det = 1.0 / det;
    let s = origin - triangle[0];
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > EPSILON).then_some(t)
}

/// Pull a surface hit onto the nearest vertex, else the nearest edge.
pub fn snap_to_triangle(
    hit: Vec3,
    triangle: &[Vec3; 3],
    vertex_snap_distance: f32,
    edge_snap_distance: f32,
) -> (Vec3, SnapType) {
    let nearest_vertex = triangle
        .iter()
        .copied()
        .min_by(|a, b| a.distance_squared(hit).total_cmp(&b.distance_squared(hit)));
    if let Some(vertex) = nearest_vertex {
        if vertex.distance(hit) <= vertex_snap_distance {
            return (vertex, SnapType::Vertex);
        }
    }

    let nearest_edge_point = (0..3)
        .map(|i| closest_point_on_segment(triangle[i], triangle[(i + 1) % 3], hit))
        .min_by(|a, b| a.distance_squared(hit).total_cmp(&b.distance_squared(hit)));
    if let Some(edge_point) = nearest_edge_point {
        if edge_point.distance(hit) <= edge_snap_distance {
            return (edge_point, SnapType::Edge);
        }
    }

    (hit, SnapType::Face)
}

fn closest_point_on_segment(start: Vec3, end: Vec3, point: Vec3) -> Vec3 {
    let segment = end - start;
    let length_sq = segment.length_squared();
    if length_sq < f32::EPSILON {
        return start;
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    start + segment * t
}

/// World-space triangles of a triangle-list mesh.
pub fn mesh_triangles(mesh: &Mesh, transform: &GlobalTransform) -> Vec<[Vec3; 3]> {
    if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
        return Vec::new();
    }
    let Some(VertexAttributeValues::Float32x3(positions)) =
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
        return Vec::new();
    };

    let world: Vec<Vec3> = positions
        .iter()
        .map(|p| transform.transform_point(Vec3::from_array(*p)))
        .collect();

    let corners: Vec<usize> = match mesh.indices() {
        Some(indices) => indices.iter().collect(),
        None => (0..world.len()).collect(),
    };

    corners
        .chunks_exact(3)
        .filter_map(|c| Some([*world.get(c[0])?, *world.get(c[1])?, *world.get(c[2])?]))
        .collect()
}

/// Pointer-move handler: refresh the snap under the cursor while the
/// calibration tool is collecting.
pub fn update_snapper_system(
    collector: Res<PointCollector>,
    mut snapper: ResMut<Snapper>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    targets: Query<(&Mesh3d, &GlobalTransform), With<SnapTarget>>,
    meshes: Res<Assets<Mesh>>,
) {
    if !collector.is_active() {
        snapper.clear();
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((cam_xform, camera)) = cameras.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        snapper.clear();
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_xform, cursor_pos) else {
        snapper.clear();
        return;
    };

    let triangles = targets.iter().flat_map(|(mesh, xform)| {
        meshes
            .get(&mesh.0)
            .map(|mesh| mesh_triangles(mesh, xform))
            .unwrap_or_default()
    });
    snapper.snap_ray(ray, triangles);
}
