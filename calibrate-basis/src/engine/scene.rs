use crate::tools::calibrate_basis::BasisCalibratedEvent;
use crate::tools::snapping::SnapTarget;
use bevy::prelude::*;

/// Demo model: a block with a skewed tetrahedron on top, both snappable.
pub fn spawn_demo_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let surface = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.57, 0.62),
        perceptual_roughness: 0.8,
        ..default()
    });

    commands.spawn((
        Name::new("DemoBlock"),
        Mesh3d(meshes.add(Cuboid::new(2.0, 1.0, 1.5))),
        MeshMaterial3d(surface.clone()),
        Transform::from_xyz(0.0, 0.5, 0.0),
        SnapTarget,
    ));

    commands.spawn((
        Name::new("DemoWedge"),
        Mesh3d(meshes.add(Tetrahedron::new(
            Vec3::new(-0.8, 0.0, -0.6),
            Vec3::new(0.9, 0.0, -0.5),
            Vec3::new(-0.4, 0.0, 0.7),
            Vec3::new(0.3, 0.9, 0.1),
        ))),
        MeshMaterial3d(surface),
        Transform::from_xyz(0.0, 1.0, 0.0),
        SnapTarget,
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(3.5, 3.0, 4.5).looking_at(Vec3::new(0.0, 0.8, 0.0), Vec3::Y),
    ));
}

pub fn log_calibrated_basis(mut events: EventReader<BasisCalibratedEvent>) {
    for event in events.read() {
        let basis = &event.basis;
        info!(
            "Basis origin {:?}\n  basis1 {:?}\n  basis2 {:?}\n  basis3 {:?}\n  oblique {:?}",
            basis.origin, basis.basis1, basis.basis2, basis.basis3, basis.oblique_sum
        );
    }
}
