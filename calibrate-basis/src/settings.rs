use crate::error::CalibrationError;
use crate::tools::snapping::Snapper;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::calibration::{DEFAULT_EDGE_SNAP_DISTANCE, DEFAULT_VERTEX_SNAP_DISTANCE};
use constants::render_settings::{BASIS_MARKER_SIZE, SNAP_INDICATOR_SIZE};
use serde::Deserialize;

const SETTINGS_PATH: &str = "calibrate_basis.settings.json";

/// Runtime-tunable presentation and snapping settings.
///
/// The coplanarity threshold is intentionally absent: it is a fixed constant.
#[derive(Asset, Resource, TypePath, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    pub marker_size: f32,
    pub indicator_size: f32,
    pub vertex_snap_distance: f32,
    pub edge_snap_distance: f32,
    /// Enables the native keyboard shortcut for toggling the tool.
    pub shortcuts_enabled: bool,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            marker_size: BASIS_MARKER_SIZE,
            indicator_size: SNAP_INDICATOR_SIZE,
            vertex_snap_distance: DEFAULT_VERTEX_SNAP_DISTANCE,
            edge_snap_distance: DEFAULT_EDGE_SNAP_DISTANCE,
            shortcuts_enabled: true,
        }
    }
}

impl CalibrationSettings {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let fields = [
            ("marker_size", self.marker_size),
            ("indicator_size", self.indicator_size),
            ("vertex_snap_distance", self.vertex_snap_distance),
            ("edge_snap_distance", self.edge_snap_distance),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CalibrationError::InvalidSetting { name, value });
            }
        }
        Ok(())
    }

    /// Push the snap radii into the snapper.
    pub fn apply_to(&self, snapper: &mut Snapper) {
        snapper.vertex_snap_distance = self.vertex_snap_distance;
        snapper.edge_snap_distance = self.edge_snap_distance;
    }
}

#[derive(Resource, Default)]
struct SettingsLoader {
    handle: Option<Handle<CalibrationSettings>>,
    loaded: bool,
}

/// Loads `calibrate_basis.settings.json` from the asset folder, keeping the
/// defaults when the file is missing or invalid.
pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(JsonAssetPlugin::<CalibrationSettings>::new(&["settings.json"]))
            .init_resource::<SettingsLoader>()
            .add_systems(Update, load_settings_system);
    }
}

fn load_settings_system(
    mut loader: ResMut<SettingsLoader>,
    mut commands: Commands,
    mut snapper: ResMut<Snapper>,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<CalibrationSettings>>,
) {
    if loader.loaded {
        return;
    }

    let Some(handle) = loader.handle.clone() else {
        info!("Loading calibration settings from: {}", SETTINGS_PATH);
        loader.handle = Some(asset_server.load(SETTINGS_PATH));
        return;
    };

    if let Some(bevy::asset::LoadState::Failed(err)) = asset_server.get_load_state(&handle) {
        warn!("Calibration settings unavailable ({}), using defaults", err);
        loader.loaded = true;
        return;
    }

    let Some(settings) = settings_assets.get(&handle) else {
        return;
    };
    loader.loaded = true;

    match settings.validate() {
        Ok(()) => {
            settings.apply_to(&mut snapper);
            commands.insert_resource(settings.clone());
            info!("Calibration settings applied: {:?}", settings);
        }
        Err(err) => error!("Ignoring calibration settings: {}", err),
    }
}
