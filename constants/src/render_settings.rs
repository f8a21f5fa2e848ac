use bevy::color::Color;

/// Radius of the sphere drawn for each picked basis point.
pub const BASIS_MARKER_SIZE: f32 = 0.06;

/// Radius of the snap indicator drawn under the pointer.
pub const SNAP_INDICATOR_SIZE: f32 = 0.04;

/// One colour per ordinal marker, first point is the basis origin.
pub const BASIS_MARKER_COLOURS: [Color; 4] = [
    Color::srgb(1.0, 1.0, 1.0),
    Color::srgb(1.0, 0.27, 0.0),
    Color::srgb(0.2, 0.8, 0.2),
    Color::srgb(0.2, 0.4, 1.0),
];

pub const SNAP_INDICATOR_COLOUR: Color = Color::srgb(1.0, 1.0, 0.2);

/// Toolbar button backgrounds.
pub const TOOLBAR_BUTTON_INACTIVE: Color = Color::srgb(0.22, 0.24, 0.28);
pub const TOOLBAR_BUTTON_HOVERED: Color = Color::srgb(0.26, 0.28, 0.32);
pub const TOOLBAR_BUTTON_ACTIVE: Color = Color::srgb(0.0, 0.90, 0.0);
