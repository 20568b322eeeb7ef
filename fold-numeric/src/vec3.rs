use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::{AddAssign, DivAssign, Index, IndexMut, MulAssign, SubAssign};

use crate::Matrix3x3;

/// A point or displacement in 3D space.
///
/// [`Vec3`] is the unit every coordinate-bearing type in this crate is built from: chain
/// positions, side-chain-centroid positions, helix/sheet template points and rotation axes
/// all come down to a handful of these.
///
/// ```
/// use fold_numeric::Vec3;
/// let a = Vec3::new(3.0, 0.0, 0.0);
/// let b = Vec3::new(0.0, 4.0, 0.0);
/// assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Index<usize> for Vec3 {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of range: {index}"),
        }
    }
}

impl IndexMut<usize> for Vec3 {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vec3 index out of range: {index}"),
        }
    }
}

macro_rules! vec_op {
    ($lhs:expr, $rhs:expr, $OP:tt) => {
        $lhs.x $OP $rhs.x;
        $lhs.y $OP $rhs.y;
        $lhs.z $OP $rhs.z;
    };
}

macro_rules! scalar_op {
    ($lhs:expr, $rhs:expr, $OP:tt) => {
        $lhs.x $OP $rhs;
        $lhs.y $OP $rhs;
        $lhs.z $OP $rhs;
    };
}

impl AddAssign<&Vec3> for Vec3 {
    fn add_assign(&mut self, rhs: &Vec3) { vec_op!(self, rhs, +=); }
}

impl SubAssign<&Vec3> for Vec3 {
    fn sub_assign(&mut self, rhs: &Vec3) { vec_op!(self, rhs, -=); }
}

impl MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, rhs: f64) { scalar_op!(self, rhs, *=); }
}

impl DivAssign<f64> for Vec3 {
    fn div_assign(&mut self, rhs: f64) { scalar_op!(self, rhs, /=); }
}

impl PartialEq for Vec3 {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

impl fmt::Debug for Vec3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3} {:.3} {:.3}]", self.x, self.y, self.z)
    }
}

impl Display for Vec3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} {:.3} {:.3}", self.x, self.y, self.z)
    }
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vec3 { Vec3 { x, y, z } }

    pub fn from_float(value: f64) -> Vec3 { Vec3 { x: value, y: value, z: value } }

    pub fn from_array(v: &[f64; 3]) -> Vec3 { Vec3 { x: v[0], y: v[1], z: v[2] } }

    pub fn set3(&mut self, x: f64, y: f64, z: f64) { self.x = x; self.y = y; self.z = z; }

    pub fn add_s(a: &Vec3, b: &Vec3) -> Vec3 { Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z) }

    pub fn sub_s(a: &Vec3, b: &Vec3) -> Vec3 { Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z) }

    /// Returns the midpoint between two points, used to locate H (the midpoint of the two
    /// flanking Cα positions) in the fake-β geometry.
    pub fn midpoint(a: &Vec3, b: &Vec3) -> Vec3 {
        Vec3::new(0.5 * (a.x + b.x), 0.5 * (a.y + b.y), 0.5 * (a.z + b.z))
    }

    pub fn opposite(&mut self) { self.x = -self.x; self.y = -self.y; self.z = -self.z; }

    pub fn length(&self) -> f64 { self.length_squared().sqrt() }

    pub fn length_squared(&self) -> f64 { self.x * self.x + self.y * self.y + self.z * self.z }

    pub fn normalized(&self) -> Vec3 {
        let mut v = *self;
        let len = v.length();
        if len > 0.0 { v /= len; }
        v
    }

    pub fn normalize(&mut self) {
        let len = self.length();
        if len > 0.0 { *self /= len; }
    }

    pub fn dot(a: &Vec3, b: &Vec3) -> f64 { a.x * b.x + a.y * b.y + a.z * b.z }

    /// Squared distance to another point, the quantity this whole crate's distance
    /// matrices are built from.
    ///
    /// ```
    /// use fold_numeric::Vec3;
    /// let d = Vec3::new(3.0, 0.0, 0.0).distance_square_to(&Vec3::new(0.0, 4.0, 0.0));
    /// assert!((d - 25.0).abs() < 1e-9);
    /// ```
    pub fn distance_square_to(&self, p: &Vec3) -> f64 {
        let dx = self.x - p.x;
        let dy = self.y - p.y;
        let dz = self.z - p.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance_to(&self, p: &Vec3) -> f64 { self.distance_square_to(p).sqrt() }

    pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
        Vec3 {
            x: a.y * b.z - a.z * b.y,
            y: a.z * b.x - a.x * b.z,
            z: a.x * b.y - a.y * b.x,
        }
    }

    pub fn outer(lhs: &Vec3, rhs: &Vec3) -> Matrix3x3 {
        Matrix3x3::from_array([
            lhs.x * rhs.x, lhs.x * rhs.y, lhs.x * rhs.z,
            lhs.y * rhs.x, lhs.y * rhs.y, lhs.y * rhs.z,
            lhs.z * rhs.x, lhs.z * rhs.y, lhs.z * rhs.z,
        ])
    }
}

/// Planar angle (radians) between two vectors anchored at the origin.
pub fn planar_angle2(a: &Vec3, b: &Vec3) -> f64 {
    (Vec3::dot(a, b) / (a.length() * b.length())).acos()
}

/// Planar angle a-b-c, i.e. the angle at vertex `b`.
///
/// ```
/// use fold_numeric::{planar_angle3, Vec3};
/// let a = Vec3::new(1.0, 0.0, 0.0);
/// let b = Vec3::from_float(0.0);
/// let c = Vec3::new(0.0, 1.0, 0.0);
/// assert!((planar_angle3(&a, &b, &c).to_degrees() - 90.0).abs() < 1e-6);
/// ```
pub fn planar_angle3(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    let v1 = Vec3::sub_s(a, b);
    let v2 = Vec3::sub_s(c, b);
    planar_angle2(&v1, &v2)
}

/// Dihedral (torsion) angle of the four points a-b-c-d, in radians, using the standard
/// b1-projection construction. Used by the handedness check of §4.6: helices require
/// a positive i,i+3 torsion, sheets a negative one around adjacent hydrogen-bond partners.
pub fn dihedral_angle4(a: &Vec3, b: &Vec3, c: &Vec3, d: &Vec3) -> f64 {
    let mut b0 = Vec3::sub_s(b, a);
    b0.opposite();
    let mut b1 = Vec3::sub_s(c, b);
    b1.normalize();
    let b2 = Vec3::sub_s(d, c);

    let mut v = b1;
    v *= -Vec3::dot(&b0, &b1);
    v += &b0;

    let mut w = b1;
    w *= -Vec3::dot(&b2, &b1);
    w += &b2;

    let x = Vec3::dot(&v, &w);
    let y = Vec3::dot(&Vec3::cross(&b1, &v), &w);
    y.atan2(x)
}
