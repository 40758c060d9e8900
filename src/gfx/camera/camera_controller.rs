use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::orbit_controls::OrbitControls;
use crate::gfx::scene::room::RoomGroup;

/// Pointer handling: left-drag spins the room, the wheel zooms the orbit.
///
/// Drag deltas are applied to the room group inside the move event itself,
/// they never wait for the next frame.
pub struct CameraController {
    pub drag_sensitivity: f32,
    is_dragging: bool,
    previous_x: f64,
    cursor_x: f64,
}

impl CameraController {
    pub fn new(drag_sensitivity: f32) -> Self {
        Self {
            drag_sensitivity,
            is_dragging: false,
            previous_x: 0.0,
            cursor_x: 0.0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn pointer_down(&mut self, x: f64) {
        self.is_dragging = true;
        self.previous_x = x;
        self.cursor_x = x;
    }

    pub fn pointer_up(&mut self) {
        self.is_dragging = false;
    }

    pub fn pointer_move(&mut self, x: f64, room: &mut RoomGroup) {
        self.cursor_x = x;
        if !self.is_dragging {
            return;
        }
        let delta_x = x - self.previous_x;
        self.previous_x = x;
        room.rotate_y(delta_x as f32 * self.drag_sensitivity);
    }

    /// Routes the pointer-related window events.
    ///
    /// Returns true when the event was consumed.
    pub fn process_events(
        &mut self,
        event: &WindowEvent,
        room: &mut RoomGroup,
        controls: &mut OrbitControls,
    ) -> bool {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                match state {
                    ElementState::Pressed => self.pointer_down(self.cursor_x),
                    ElementState::Released => self.pointer_up(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_move(position.x, room);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                controls.zoom(notches);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_rotates_room_by_horizontal_delta() {
        let mut controller = CameraController::new(0.01);
        let mut room = RoomGroup::new();

        controller.pointer_down(100.0);
        controller.pointer_move(150.0, &mut room);
        assert!((room.rotation_y() - 0.5).abs() < 1e-6);

        controller.pointer_move(130.0, &mut room);
        assert!((room.rotation_y() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_moves_without_button_are_ignored() {
        let mut controller = CameraController::new(0.01);
        let mut room = RoomGroup::new();

        controller.pointer_move(400.0, &mut room);
        assert_eq!(room.rotation_y(), 0.0);

        controller.pointer_down(400.0);
        controller.pointer_up();
        controller.pointer_move(10.0, &mut room);
        assert_eq!(room.rotation_y(), 0.0);
        assert!(!controller.is_dragging());
    }
}
