use crate::tools::tool_manager::{
    ToolManager, ToolSelectionSource, ToolStateChanged, ToolType, ToolbarToggleEvent,
};
use bevy::prelude::*;
use constants::render_settings::{
    TOOLBAR_BUTTON_ACTIVE, TOOLBAR_BUTTON_HOVERED, TOOLBAR_BUTTON_INACTIVE,
};

// Components
#[derive(Component)]
pub struct CoordinatesToolbarGroup;

/// Button toggling the tool it carries.
#[derive(Component)]
pub struct ToolbarButton {
    pub tool_type: ToolType,
}

#[derive(Component)]
pub struct ToolbarTooltip;

// Spawns the coordinates toolbar group with the calibration button
pub fn spawn_toolbar(mut commands: Commands) {
    commands
        .spawn((
            CoordinatesToolbarGroup,
            Name::new("coordinates-toolbar-group"),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                bottom: Val::Px(12.0),
                padding: UiRect::all(Val::Px(4.0)),
                column_gap: Val::Px(8.0),
                display: Display::Flex,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgb(0.10, 0.11, 0.13)),
        ))
        .with_children(|group| {
            group
                .spawn((
                    ToolbarButton {
                        tool_type: ToolType::CalibrateBasis,
                    },
                    Button,
                    Name::new("coordinatesextension-button"),
                    BackgroundColor(TOOLBAR_BUTTON_INACTIVE),
                    BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
                    Node {
                        width: Val::Px(36.0),
                        height: Val::Px(36.0),
                        display: Display::Flex,
                        align_items: AlignItems::Center,
                        justify_content: JustifyContent::Center,
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                ))
                .with_children(|btn| {
                    btn.spawn((
                        Text::new("4P"),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 1.0, 1.0)),
                    ));
                });

            group.spawn((
                ToolbarTooltip,
                Text::new("Calibrate coordinates basis points"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.8)),
                Node {
                    display: Display::None,
                    ..default()
                },
            ));
        });
}

// Button press toggles the tool; hover shows the tooltip
pub fn toolbar_button_interaction(
    mut q: Query<
        (&Interaction, &ToolbarButton, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>),
    >,
    mut tooltip: Query<&mut Node, With<ToolbarTooltip>>,
    tool_manager: Res<ToolManager>,
    mut toggles: EventWriter<ToolbarToggleEvent>,
) {
    for (interaction, button, mut bg) in &mut q {
        let show_tooltip = *interaction != Interaction::None;
        for mut node in &mut tooltip {
            node.display = if show_tooltip {
                Display::Flex
            } else {
                Display::None
            };
        }

        match *interaction {
            Interaction::Pressed => {
                toggles.write(ToolbarToggleEvent {
                    tool_type: button.tool_type,
                    source: ToolSelectionSource::Toolbar,
                });
            }
            Interaction::Hovered => *bg = BackgroundColor(TOOLBAR_BUTTON_HOVERED),
            Interaction::None => {
                *bg = BackgroundColor(button_colour(&tool_manager, button.tool_type));
            }
        }
    }
}

// Keep the button colour in step with tool state changes, including auto-deactivation after a solve
pub fn sync_toolbar_button_state(
    mut state_changes: EventReader<ToolStateChanged>,
    mut q: Query<(&Interaction, &ToolbarButton, &mut BackgroundColor)>,
) {
    for change in state_changes.read() {
        for (interaction, button, mut bg) in &mut q {
            if button.tool_type != change.tool_type || *interaction != Interaction::None {
                continue;
            }
            *bg = BackgroundColor(if change.active {
                TOOLBAR_BUTTON_ACTIVE
            } else {
                TOOLBAR_BUTTON_INACTIVE
            });
        }
    }
}

fn button_colour(tool_manager: &ToolManager, tool_type: ToolType) -> Color {
    if tool_manager.is_tool_active(tool_type) {
        TOOLBAR_BUTTON_ACTIVE
    } else {
        TOOLBAR_BUTTON_INACTIVE
    }
}
