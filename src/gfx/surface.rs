use anyhow::Result;

use super::math::Mat3x2;

/// Opaque handle to an uploaded image plus its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

/// Drawing backend. The sprite only ever installs a transform and blits
/// a bitmap; everything else is frame bookkeeping.
pub trait RenderSurface {
    fn begin_frame(&mut self);
    fn clear(&mut self);
    fn transform(&self) -> Mat3x2;
    fn set_transform(&mut self, transform: Mat3x2);
    fn draw_bitmap(&mut self, bitmap: &Bitmap);
    fn end_frame(&mut self) -> Result<()>;
    /// Pushes out anything still queued, e.g. before the surface is hidden.
    fn flush(&mut self) -> Result<()>;
}
