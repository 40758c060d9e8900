//! On-screen camera readout and reset control

use imgui::{Condition, Ui};

use crate::{
    gfx::scene::SceneStatistics,
    viewer::{FrameReport, LoadStatus},
};

/// What the user asked for through the HUD this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudResponse {
    pub reset_camera: bool,
}

/// One-line description of the load status
pub fn status_line(status: &LoadStatus) -> String {
    match status {
        LoadStatus::Idle => "No model".to_string(),
        LoadStatus::Loading(fraction) => format!("Loading... {:.0}%", fraction * 100.0),
        LoadStatus::Loaded(name) => format!("Loaded {}", name),
        LoadStatus::Failed(reason) => format!("Error: {}", reason),
    }
}

pub fn draw_hud(
    ui: &Ui,
    report: &FrameReport,
    status: &LoadStatus,
    stats: &SceneStatistics,
) -> HudResponse {
    let mut response = HudResponse::default();

    ui.window("Camera")
        .position([10.0, 10.0], Condition::FirstUseEver)
        .always_auto_resize(true)
        .collapsible(false)
        .build(|| {
            ui.text(&report.position);
            ui.text(&report.rotation);
            ui.separator();

            match status {
                LoadStatus::Loading(fraction) => {
                    imgui::ProgressBar::new(*fraction)
                        .overlay_text(status_line(status))
                        .size([200.0, 0.0])
                        .build(ui);
                }
                LoadStatus::Failed(_) => {
                    ui.text_colored([1.0, 0.35, 0.35, 1.0], status_line(status));
                }
                _ => ui.text(status_line(status)),
            }
            if stats.model_count > 0 {
                ui.text(format!(
                    "{} meshes, {} triangles",
                    stats.mesh_count, stats.total_triangles
                ));
            }

            ui.separator();
            response.reset_camera = ui.button("Reset camera");
        });

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        assert_eq!(status_line(&LoadStatus::Loading(0.426)), "Loading... 43%");
        assert_eq!(
            status_line(&LoadStatus::Loaded("RoomObj".to_string())),
            "Loaded RoomObj"
        );
        assert!(status_line(&LoadStatus::Failed("missing".to_string())).starts_with("Error"));
    }
}
