use glam::{Mat3, Vec3};

/// Scene camera pose used to bake deltas from the camera's point of view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraView {
    pub location: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
}

impl CameraView {
    pub fn new(location: Vec3, rotation: Vec3) -> Self {
        Self { location, rotation }
    }

    fn rotation_matrix(&self) -> Mat3 {
        Mat3::from_rotation_z(self.rotation.z)
            * Mat3::from_rotation_y(self.rotation.y)
            * Mat3::from_rotation_x(self.rotation.x)
    }

    /// Moves a world-space point into camera coordinates: translate by the camera location,
    /// rotate by the camera's Euler rotation, then flip depth.
    pub fn to_camera_space(&self, point: Vec3) -> Vec3 {
        flip_depth(self.rotation_matrix() * (point - self.location))
    }

    pub fn points_to_camera_space(&self, points: &mut [Vec3]) {
        let rotation = self.rotation_matrix();
        for point in points {
            *point = flip_depth(rotation * (*point - self.location));
        }
    }
}

fn flip_depth(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, -v.z)
}
