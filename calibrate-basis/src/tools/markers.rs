use crate::settings::CalibrationSettings;
use bevy::math::DVec3;
use bevy::prelude::*;
use constants::render_settings::BASIS_MARKER_COLOURS;

/// Receives on-screen markers for picked points. Calls are fire-and-forget.
pub trait MarkerSink {
    fn render_marker(&mut self, position: DVec3, index: usize);
    fn clear_markers(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerRequest {
    Render { position: DVec3, index: usize },
    ClearAll,
}

/// Marker requests queued by the collector and applied once per frame.
#[derive(Resource, Default, Debug)]
pub struct MarkerQueue {
    requests: Vec<MarkerRequest>,
}

impl MarkerQueue {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn drain(&mut self) -> Vec<MarkerRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl MarkerSink for MarkerQueue {
    fn render_marker(&mut self, position: DVec3, index: usize) {
        self.requests.push(MarkerRequest::Render { position, index });
    }

    fn clear_markers(&mut self) {
        self.requests.push(MarkerRequest::ClearAll);
    }
}

/// Ordinal marker for a picked basis point, 0 is the origin.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasisPointMarker {
    pub index: usize,
}

/// Apply queued requests in order: spawn marker entities, despawn on clear.
pub fn apply_marker_requests(
    mut commands: Commands,
    mut queue: ResMut<MarkerQueue>,
    existing: Query<Entity, With<BasisPointMarker>>,
) {
    if queue.is_empty() {
        return;
    }

    let mut live: Vec<Entity> = existing.iter().collect();
    for request in queue.drain() {
        match request {
            MarkerRequest::Render { position, index } => {
                let entity = commands
                    .spawn((
                        BasisPointMarker { index },
                        Transform::from_translation(position.as_vec3()),
                        Visibility::default(),
                    ))
                    .id();
                live.push(entity);
            }
            MarkerRequest::ClearAll => {
                for entity in live.drain(..) {
                    commands.entity(entity).despawn();
                }
            }
        }
    }
}

/// Give newly spawned markers a coloured sphere matching their ordinal.
pub fn attach_marker_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<CalibrationSettings>,
    new_markers: Query<(Entity, &BasisPointMarker), Added<BasisPointMarker>>,
) {
    for (entity, marker) in &new_markers {
        let colour = BASIS_MARKER_COLOURS[marker.index % BASIS_MARKER_COLOURS.len()];
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Sphere::new(settings.marker_size))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: colour,
                emissive: colour.to_linear(),
                unlit: true,
                ..default()
            })),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_app() -> App {
        let mut app = App::new();
        app.init_resource::<MarkerQueue>()
            .add_systems(Update, apply_marker_requests);
        app
    }

    fn marker_indices(app: &mut App) -> Vec<usize> {
        let mut query = app.world_mut().query::<&BasisPointMarker>();
        let mut indices: Vec<usize> = query.iter(app.world()).map(|m| m.index).collect();
        indices.sort();
        indices
    }

    #[test]
    fn queued_renders_spawn_markers() {
        let mut app = marker_app();
        {
            let mut queue = app.world_mut().resource_mut::<MarkerQueue>();
            queue.render_marker(DVec3::ZERO, 0);
            queue.render_marker(DVec3::new(1.0, 2.0, 3.0), 1);
        }
        app.update();

        assert_eq!(marker_indices(&mut app), vec![0, 1]);
        assert!(app.world().resource::<MarkerQueue>().is_empty());
    }

    #[test]
    fn clear_in_same_frame_removes_fresh_markers() {
        let mut app = marker_app();
        app.world_mut()
            .resource_mut::<MarkerQueue>()
            .render_marker(DVec3::ZERO, 0);
        app.update();

        {
            let mut queue = app.world_mut().resource_mut::<MarkerQueue>();
            queue.render_marker(DVec3::X, 1);
            queue.clear_markers();
            queue.render_marker(DVec3::Y, 0);
        }
        app.update();

        assert_eq!(marker_indices(&mut app), vec![0]);
    }
}
