use super::math::{Mat3x2, Size, Vec2};
use super::surface::{Bitmap, RenderSurface};

#[derive(Debug, Clone)]
pub struct Sprite {
    bitmap: Bitmap,
    position: Vec2,
    rotation: f32,
    rotation_pivot: Vec2,
    scale: Vec2,
    scale_pivot: Vec2,
}

impl Sprite {
    pub fn new(bitmap: Bitmap) -> Self {
        Self {
            bitmap,
            position: Vec2::ZERO,
            rotation: 0.0,
            rotation_pivot: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            scale_pivot: Vec2::ZERO,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    pub fn rotation_pivot(&self) -> Vec2 {
        self.rotation_pivot
    }

    pub fn set_rotation_pivot(&mut self, pivot: Vec2) {
        self.rotation_pivot = pivot;
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    pub fn scale_pivot(&self) -> Vec2 {
        self.scale_pivot
    }

    pub fn set_scale_pivot(&mut self, pivot: Vec2) {
        self.scale_pivot = pivot;
    }

    /// Size of the decoded image, unaffected by scale.
    pub fn bounding_size(&self) -> Size {
        Size::new(self.bitmap.width as f32, self.bitmap.height as f32)
    }

    pub fn effective_size(&self) -> Size {
        self.bounding_size().scaled(self.scale)
    }

    pub fn transform(&self) -> Mat3x2 {
        Mat3x2::compose(
            self.position,
            self.rotation,
            self.rotation_pivot,
            self.scale,
            self.scale_pivot,
        )
    }

    /// Draws with this sprite's transform and puts the surface's previous
    /// transform back afterwards.
    pub fn draw<R: RenderSurface + ?Sized>(&self, surface: &mut R) {
        if self.bitmap.width == 0 || self.bitmap.height == 0 {
            return;
        }

        let previous = surface.transform();
        surface.set_transform(self.transform());
        surface.draw_bitmap(&self.bitmap);
        surface.set_transform(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSurface, SurfaceCall};

    fn bitmap() -> Bitmap {
        Bitmap {
            id: 7,
            width: 120,
            height: 160,
        }
    }

    #[test]
    fn effective_size_follows_scale() {
        let mut sprite = Sprite::new(bitmap());
        assert_eq!(sprite.effective_size(), Size::new(120.0, 160.0));

        sprite.set_scale(Vec2::new(0.5, 0.25));
        assert_eq!(sprite.effective_size(), Size::new(60.0, 40.0));
        assert_eq!(sprite.bounding_size(), Size::new(120.0, 160.0));
    }

    #[test]
    fn draw_installs_and_restores_transform() {
        let mut sprite = Sprite::new(bitmap());
        sprite.set_position(Vec2::new(10.0, 20.0));
        sprite.set_rotation(-45.0);

        let outer = Mat3x2::translation(Vec2::new(1.0, 1.0));
        let mut surface = RecordingSurface::with_transform(outer);
        sprite.draw(&mut surface);

        assert_eq!(
            surface.calls,
            vec![
                SurfaceCall::SetTransform(sprite.transform()),
                SurfaceCall::DrawBitmap(7),
                SurfaceCall::SetTransform(outer),
            ]
        );
        assert_eq!(surface.transform(), outer);
    }

    #[test]
    fn empty_bitmap_draws_nothing() {
        let sprite = Sprite::new(Bitmap {
            id: 1,
            width: 0,
            height: 0,
        });
        let mut surface = RecordingSurface::default();
        sprite.draw(&mut surface);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn transform_maps_origin_to_position_without_rotation() {
        let mut sprite = Sprite::new(bitmap());
        sprite.set_position(Vec2::new(300.0, 400.0));
        sprite.set_scale(Vec2::new(0.5, 0.5));
        let origin = sprite.transform().transform_point(Vec2::ZERO);
        assert_eq!(origin, Vec2::new(300.0, 400.0));
    }
}
