//! Transform operations authored on prims.
//!
//! Precision follows the usual scene-description conventions: translation is
//! double precision, rotation/scale/orientation are single precision.

use nalgebra::{Matrix4, Quaternion, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quaternion stored as authored: scalar part plus imaginary vector.
/// Never normalized on authoring; callers are trusted to supply unit values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quatf {
    pub real: f32,
    pub imaginary: [f32; 3],
}

impl Quatf {
    pub fn new(real: f32, imaginary: [f32; 3]) -> Self {
        Self { real, imaginary }
    }

    pub fn identity() -> Self {
        Self::new(1.0, [0.0, 0.0, 0.0])
    }

    /// Build from a `[real, i, j, k]` tuple.
    pub fn from_wxyz(q: [f32; 4]) -> Self {
        Self::new(q[0], [q[1], q[2], q[3]])
    }

    pub fn to_wxyz(self) -> [f32; 4] {
        [
            self.real,
            self.imaginary[0],
            self.imaginary[1],
            self.imaginary[2],
        ]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XformOpKind {
    Translate,
    RotateZyx,
    Orient,
    Scale,
}

impl XformOpKind {
    /// Attribute name of the op as it appears in an op order.
    pub fn op_name(self) -> &'static str {
        match self {
            XformOpKind::Translate => "xformOp:translate",
            XformOpKind::RotateZyx => "xformOp:rotateZYX",
            XformOpKind::Orient => "xformOp:orient",
            XformOpKind::Scale => "xformOp:scale",
        }
    }

    #[inline]
    pub fn is_rotation(self) -> bool {
        matches!(self, XformOpKind::RotateZyx | XformOpKind::Orient)
    }
}

impl fmt::Display for XformOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op_name())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "value")]
pub enum XformOp {
    #[serde(rename = "translate")]
    Translate([f64; 3]),

    /// Euler angles in degrees, `[x, y, z]`; the point is rotated about Z, then Y, then X.
    #[serde(rename = "rotateZYX")]
    RotateZyx([f32; 3]),

    #[serde(rename = "orient")]
    Orient(Quatf),

    #[serde(rename = "scale")]
    Scale([f32; 3]),
}

impl XformOp {
    #[inline]
    pub fn kind(&self) -> XformOpKind {
        match self {
            XformOp::Translate(_) => XformOpKind::Translate,
            XformOp::RotateZyx(_) => XformOpKind::RotateZyx,
            XformOp::Orient(_) => XformOpKind::Orient,
            XformOp::Scale(_) => XformOpKind::Scale,
        }
    }

    /// Homogeneous matrix of this single op (column-vector convention).
    pub fn to_matrix(&self) -> Matrix4<f64> {
        match self {
            XformOp::Translate(t) => Matrix4::new_translation(&Vector3::new(t[0], t[1], t[2])),
            XformOp::Scale(s) => Matrix4::new_nonuniform_scaling(&Vector3::new(
                s[0] as f64,
                s[1] as f64,
                s[2] as f64,
            )),
            XformOp::RotateZyx(r) => {
                let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), (r[0] as f64).to_radians());
                let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), (r[1] as f64).to_radians());
                let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), (r[2] as f64).to_radians());
                (rx * ry * rz).to_homogeneous()
            }
            XformOp::Orient(q) => {
                let raw = Quaternion::new(
                    q.real as f64,
                    q.imaginary[0] as f64,
                    q.imaginary[1] as f64,
                    q.imaginary[2] as f64,
                );
                // evaluation only; the authored value stays as given
                if raw.norm() == 0.0 {
                    return Matrix4::identity();
                }
                UnitQuaternion::from_quaternion(raw).to_homogeneous()
            }
        }
    }
}
