use cubekin_shared::player::PlayerState;
use glam::{Mat4, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 12.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// The camera sits at the player's eye.
    pub fn follow(&mut self, player: &PlayerState) {
        self.position = player.position;
        self.yaw = player.yaw;
        self.pitch = player.pitch;
    }

    /// Yaw 0 looks down -z, matching the player controller.
    pub fn forward_direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch).normalize_or_zero()
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        let view = Mat4::look_to_rh(self.position, self.forward_direction(), Vec3::Y);
        let projection = Mat4::perspective_rh(
            self.fov,
            self.aspect.max(0.0001),
            self.near.max(0.0001),
            self.far.max(self.near + 0.0001),
        );

        projection * view
    }
}

#[cfg(test)]
mod tests {
    use cubekin_shared::player::{GameMode, PlayerState};
    use glam::Vec3;

    use super::Camera;

    #[test]
    fn follows_player_eye_and_look() {
        let mut player = PlayerState::new(Vec3::new(1.0, 11.8, -2.0), GameMode::Survival);
        player.yaw = 0.7;
        player.pitch = -0.3;

        let mut camera = Camera::default();
        camera.follow(&player);
        assert_eq!(camera.position, player.position);
        assert!((camera.forward_direction() - player.look_direction()).length() < 1e-5);
    }

    #[test]
    fn point_ahead_projects_to_screen_center() {
        let camera = Camera::default();
        let ahead = camera.position + Vec3::new(0.0, 0.0, -10.0);
        let clip = camera.view_projection_matrix() * ahead.extend(1.0);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
