//! Binary wrappers around cgmath types and the Y-up/Z-up axis change.

use binrw::binrw;
use cgmath::{Matrix4, Vector2, Vector3, Vector4};

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
#[brw(little)]
pub struct FmdlVector3(
    #[br(map = |raw: [f32; 3]| Vector3::new(raw[0], raw[1], raw[2]))]
    #[bw(map = |v: &Vector3<f32>| [v.x, v.y, v.z])]
    pub Vector3<f32>,
);

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
#[brw(little)]
pub struct FmdlVector2(
    #[br(map = |raw: [f32; 2]| Vector2::new(raw[0], raw[1]))]
    #[bw(map = |v: &Vector2<f32>| [v.x, v.y])]
    pub Vector2<f32>,
);

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
#[brw(little)]
pub struct FmdlVector4(
    #[br(map = |raw: [f32; 4]| Vector4::new(raw[0], raw[1], raw[2], raw[3]))]
    #[bw(map = |v: &Vector4<f32>| [v.x, v.y, v.z, v.w])]
    pub Vector4<f32>,
);

/// Column-major 4x4 matrix as stored in the bone table.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
#[brw(little)]
pub struct FmdlMatrix44(
    #[br(map = |raw: [f32; 16]| Matrix4::new(
        raw[0], raw[1], raw[2], raw[3],
        raw[4], raw[5], raw[6], raw[7],
        raw[8], raw[9], raw[10], raw[11],
        raw[12], raw[13], raw[14], raw[15]
    ))]
    #[bw(map = |m: &Matrix4<f32>| [
        m.x.x, m.x.y, m.x.z, m.x.w,
        m.y.x, m.y.y, m.y.z, m.y.w,
        m.z.x, m.z.y, m.z.z, m.z.w,
        m.w.x, m.w.y, m.w.z, m.w.w
    ])]
    pub Matrix4<f32>,
);

impl FmdlMatrix44 {
    pub fn from_slice(s: &[f32; 16]) -> Self {
        FmdlMatrix44(Matrix4::new(
            s[0], s[1], s[2], s[3],
            s[4], s[5], s[6], s[7],
            s[8], s[9], s[10], s[11],
            s[12], s[13], s[14], s[15],
        ))
    }

    pub fn to_slice(&self) -> [f32; 16] {
        let m = &self.0;
        [
            m.x.x, m.x.y, m.x.z, m.x.w, m.y.x, m.y.y, m.y.z, m.y.w, m.z.x, m.z.y, m.z.z, m.z.w,
            m.w.x, m.w.y, m.w.z, m.w.w,
        ]
    }

    pub fn translation(&self) -> Vector3<f32> {
        Vector3::new(self.0.w.x, self.0.w.y, self.0.w.z)
    }
}

/// Convert a position/direction from FMDL space (Y-up) to host space (Z-up).
/// Y-up (x, y, z) → Z-up (x, -z, y)
pub fn y_up_to_z_up_vec3(v: Vector3<f32>) -> [f32; 3] {
    [v.x, -v.z, v.y]
}

/// Convert a position/direction from host space (Z-up) to FMDL space (Y-up).
/// Z-up (x, y, z) → Y-up (x, z, -y)
pub fn z_up_to_y_up_vec3(v: [f32; 3]) -> Vector3<f32> {
    Vector3::new(v[0], v[2], -v[1])
}

// B maps FMDL space into host space: (x, y, z) → (x, -z, y).
fn basis_y_up_to_z_up() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, -1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

// B^(-1) = B^T: (x, y, z) → (x, z, -y).
fn basis_z_up_to_y_up() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, -1.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// M_host = B * M * B^(-1)
pub fn y_up_to_z_up_mat4(m: Matrix4<f32>) -> [f32; 16] {
    FmdlMatrix44(basis_y_up_to_z_up() * m * basis_z_up_to_y_up()).to_slice()
}

/// M = B^(-1) * M_host * B
pub fn z_up_to_y_up_mat4(m: [f32; 16]) -> Matrix4<f32> {
    basis_z_up_to_y_up() * FmdlMatrix44::from_slice(&m).0 * basis_y_up_to_z_up()
}
