use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn scaled(self, factor: Vec2) -> Size {
        Size::new(self.width * factor.x, self.height * factor.y)
    }
}

/// 2x3 affine transform.
///
/// Points are column vectors: `x' = m11*x + m12*y + dx`,
/// `y' = m21*x + m22*y + dy`. `a * b` applies `b` first, then `a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3x2 {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Default for Mat3x2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3x2 {
    pub const IDENTITY: Mat3x2 = Mat3x2 {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub fn translation(offset: Vec2) -> Self {
        Self {
            dx: offset.x,
            dy: offset.y,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `degrees` about `pivot`. Positive angles turn clockwise
    /// on a y-down screen.
    pub fn rotation(degrees: f32, pivot: Vec2) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            m11: cos,
            m12: -sin,
            m21: sin,
            m22: cos,
            dx: pivot.x - cos * pivot.x + sin * pivot.y,
            dy: pivot.y - sin * pivot.x - cos * pivot.y,
        }
    }

    pub fn scale(factor: Vec2, pivot: Vec2) -> Self {
        Self {
            m11: factor.x,
            m12: 0.0,
            m21: 0.0,
            m22: factor.y,
            dx: pivot.x - factor.x * pivot.x,
            dy: pivot.y - factor.y * pivot.y,
        }
    }

    /// Translation x Rotation x Scale: scale and rotate in sprite space,
    /// then move the result to `position`.
    pub fn compose(
        position: Vec2,
        degrees: f32,
        rotation_pivot: Vec2,
        scale: Vec2,
        scale_pivot: Vec2,
    ) -> Self {
        Self::translation(position)
            * Self::rotation(degrees, rotation_pivot)
            * Self::scale(scale, scale_pivot)
    }

    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.m11 * p.x + self.m12 * p.y + self.dx,
            self.m21 * p.x + self.m22 * p.y + self.dy,
        )
    }

    /// Column-major 3x3 layout for a `mat3` uniform.
    pub fn to_cols_array(&self) -> [f32; 9] {
        [
            self.m11, self.m21, 0.0, //
            self.m12, self.m22, 0.0, //
            self.dx, self.dy, 1.0,
        ]
    }
}

impl Mul for Mat3x2 {
    type Output = Mat3x2;

    fn mul(self, rhs: Mat3x2) -> Mat3x2 {
        Mat3x2 {
            m11: self.m11 * rhs.m11 + self.m12 * rhs.m21,
            m12: self.m11 * rhs.m12 + self.m12 * rhs.m22,
            m21: self.m21 * rhs.m11 + self.m22 * rhs.m21,
            m22: self.m21 * rhs.m12 + self.m22 * rhs.m22,
            dx: self.m11 * rhs.dx + self.m12 * rhs.dy + self.dx,
            dy: self.m21 * rhs.dx + self.m22 * rhs.dy + self.dy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(
            (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn rotation_keeps_pivot_fixed() {
        let pivot = Vec2::new(50.0, 100.0);
        let m = Mat3x2::rotation(-45.0, pivot);
        assert_close(m.transform_point(pivot), pivot);
    }

    #[test]
    fn quarter_turn_is_clockwise_on_screen() {
        let m = Mat3x2::rotation(90.0, Vec2::ZERO);
        assert_close(m.transform_point(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn scale_about_pivot() {
        let m = Mat3x2::scale(Vec2::new(0.5, 0.5), Vec2::new(10.0, 10.0));
        assert_close(m.transform_point(Vec2::new(10.0, 10.0)), Vec2::new(10.0, 10.0));
        assert_close(m.transform_point(Vec2::new(20.0, 30.0)), Vec2::new(15.0, 20.0));
    }

    #[test]
    fn product_applies_right_operand_first() {
        let t = Mat3x2::translation(Vec2::new(5.0, 0.0));
        let s = Mat3x2::scale(Vec2::new(2.0, 2.0), Vec2::ZERO);
        assert_close((t * s).transform_point(Vec2::new(1.0, 1.0)), Vec2::new(7.0, 2.0));
        assert_close((s * t).transform_point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0));
    }

    #[test]
    fn compose_translates_outermost() {
        let position = Vec2::new(100.0, 200.0);
        let m = Mat3x2::compose(
            position,
            90.0,
            Vec2::new(10.0, 20.0),
            Vec2::new(0.5, 0.5),
            Vec2::ZERO,
        );
        // Local (20, 40) scales to the pivot (10, 20), which rotation keeps,
        // so only the translation moves it.
        assert_close(m.transform_point(Vec2::new(20.0, 40.0)), Vec2::new(110.0, 220.0));
    }

    #[test]
    fn identity_compose_is_pure_translation() {
        let m = Mat3x2::compose(
            Vec2::new(3.0, 4.0),
            0.0,
            Vec2::new(7.0, 7.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(9.0, 9.0),
        );
        assert_eq!(m, Mat3x2::translation(Vec2::new(3.0, 4.0)));
    }
}
