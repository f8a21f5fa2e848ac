use crate::tools::calibrate_basis::{PointerClickEvent, ToolKeyUpEvent};
use bevy::prelude::*;
use constants::calibration::CANCEL_KEY_CODE;

/// Forward mouse presses to the tools, except presses landing on UI buttons.
pub fn emit_pointer_clicks(
    mouse: Res<ButtonInput<MouseButton>>,
    ui_buttons: Query<&Interaction, With<Button>>,
    mut clicks: EventWriter<PointerClickEvent>,
) {
    if ui_buttons.iter().any(|i| *i != Interaction::None) {
        return;
    }
    for button in mouse.get_just_pressed() {
        clicks.write(PointerClickEvent { button: *button });
    }
}

/// Escape release maps onto the DOM key code the tools understand.
pub fn emit_tool_key_ups(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut key_ups: EventWriter<ToolKeyUpEvent>,
) {
    if keyboard.just_released(KeyCode::Escape) {
        key_ups.write(ToolKeyUpEvent {
            key_code: CANCEL_KEY_CODE,
        });
    }
}
