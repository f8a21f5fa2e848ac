use crate::settings::CalibrationSettings;
use crate::tools::snapping::{SnapType, Snapper};
use bevy::prelude::*;
use constants::render_settings::SNAP_INDICATOR_COLOUR;

#[derive(Component)]
pub struct SnapIndicatorGizmo;

/// Unit sphere; `update_snap_indicator` sizes it from the current settings.
pub fn create_snap_indicator(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(1.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: SNAP_INDICATOR_COLOUR,
            emissive: SNAP_INDICATOR_COLOUR.to_linear(),
            unlit: true,
            ..default()
        })),
        Transform::default(),
        Visibility::Hidden,
        SnapIndicatorGizmo,
    ));
}

fn snap_type_scale(snap_type: SnapType) -> f32 {
    match snap_type {
        SnapType::Vertex => 1.5,
        SnapType::Edge => 1.2,
        SnapType::Face => 1.0,
    }
}

/// Show the indicator at the snapped point; vertex snaps draw it larger.
pub fn update_snap_indicator(
    snapper: Res<Snapper>,
    settings: Res<CalibrationSettings>,
    mut gizmo_query: Query<(&mut Transform, &mut Visibility), With<SnapIndicatorGizmo>>,
) {
    let Ok((mut gizmo_transform, mut gizmo_visibility)) = gizmo_query.single_mut() else {
        return;
    };

    match snapper.snap_result() {
        Some(snap) => {
            gizmo_transform.translation = snap.intersect_point;
            gizmo_transform.scale =
                Vec3::splat(settings.indicator_size * snap_type_scale(snap.snap_type));
            *gizmo_visibility = Visibility::Visible;
        }
        None => *gizmo_visibility = Visibility::Hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::snapping::SnapResult;
    use approx::assert_relative_eq;

    fn indicator_app() -> App {
        let mut app = App::new();
        app.init_resource::<Snapper>()
            .init_resource::<CalibrationSettings>()
            .add_systems(Update, update_snap_indicator);
        app.world_mut().spawn((
            Transform::default(),
            Visibility::Hidden,
            SnapIndicatorGizmo,
        ));
        app
    }

    fn indicator(app: &mut App) -> (Transform, Visibility) {
        let mut query = app
            .world_mut()
            .query_filtered::<(&Transform, &Visibility), With<SnapIndicatorGizmo>>();
        let (transform, visibility) = query.single(app.world()).unwrap();
        (*transform, *visibility)
    }

    #[test]
    fn indicator_follows_settings_loaded_after_startup() {
        let mut app = indicator_app();
        app.world_mut()
            .resource_mut::<Snapper>()
            .set_snap(Some(SnapResult {
                intersect_point: Vec3::new(1.0, 2.0, 3.0),
                snap_type: SnapType::Edge,
                distance: 4.0,
            }));
        app.update();

        let default_size = CalibrationSettings::default().indicator_size;
        let (transform, visibility) = indicator(&mut app);
        assert_eq!(visibility, Visibility::Visible);
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(transform.scale.x, default_size * 1.2);

        app.insert_resource(CalibrationSettings {
            indicator_size: 1.0,
            ..default()
        });
        app.update();

        let (transform, _) = indicator(&mut app);
        assert_relative_eq!(transform.scale.x, 1.2);
        assert_relative_eq!(transform.scale.z, 1.2);
    }

    #[test]
    fn indicator_hides_without_snap() {
        let mut app = indicator_app();
        app.update();
        let (_, visibility) = indicator(&mut app);
        assert_eq!(visibility, Visibility::Hidden);
    }
}
