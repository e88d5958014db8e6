use super::bitmap::Pixels;
use super::gl::create_texture;
use super::math::Mat3x2;
use super::surface::Bitmap;
use anyhow::{anyhow, Result};
use glow::HasContext;
use log::warn;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

/// GLES2 sprite renderer: one textured quad per bitmap draw, positioned by
/// a 2x3 transform uniform in pixel space.
pub struct DrawContext {
    gl: glow::Context,
    program: glow::Program,
    vbo: glow::Buffer,
    textures: Vec<glow::Texture>,
    transform: Mat3x2,
    viewport: [f32; 2],

    u_viewport: Option<glow::UniformLocation>,
    u_transform: Option<glow::UniformLocation>,
    u_texture: Option<glow::UniformLocation>,
    a_pos: Option<u32>,
    a_uv: Option<u32>,
}

impl DrawContext {
    pub fn new(gl: glow::Context, program: glow::Program) -> Result<Self> {
        let vbo = unsafe {
            gl.create_buffer()
                .map_err(|e| anyhow!("Failed to create buffer: {}", e))?
        };

        let (u_viewport, u_transform, u_texture, a_pos, a_uv) = unsafe {
            (
                gl.get_uniform_location(program, "uViewport"),
                gl.get_uniform_location(program, "uTransform"),
                gl.get_uniform_location(program, "uTexture"),
                gl.get_attrib_location(program, "aPos"),
                gl.get_attrib_location(program, "aUV"),
            )
        };

        Ok(Self {
            gl,
            program,
            vbo,
            textures: Vec::new(),
            transform: Mat3x2::IDENTITY,
            viewport: [1.0, 1.0],
            u_viewport,
            u_transform,
            u_texture,
            a_pos,
            a_uv,
        })
    }

    pub fn upload(&mut self, pixels: &Pixels) -> Result<Bitmap> {
        let texture = create_texture(&self.gl, pixels)?;
        self.textures.push(texture);
        Ok(Bitmap {
            id: (self.textures.len() - 1) as u32,
            width: pixels.width,
            height: pixels.height,
        })
    }

    pub fn begin(&mut self, viewport_px: [f32; 2]) {
        self.viewport = viewport_px;
        self.transform = Mat3x2::IDENTITY;

        unsafe {
            self.gl
                .viewport(0, 0, viewport_px[0] as i32, viewport_px[1] as i32);

            // Pixels are premultiplied at decode time.
            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);

            self.gl.use_program(Some(self.program));
            if let Some(loc) = &self.u_viewport {
                self.gl.uniform_2_f32(Some(loc), viewport_px[0], viewport_px[1]);
            }
            if let Some(loc) = &self.u_texture {
                self.gl.uniform_1_i32(Some(loc), 0);
            }
        }
    }

    pub fn clear(&mut self) {
        unsafe {
            self.gl.clear_color(0.0, 0.0, 0.0, 0.0);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    pub fn transform(&self) -> Mat3x2 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Mat3x2) {
        self.transform = transform;
    }

    pub fn draw_bitmap(&mut self, bitmap: &Bitmap) {
        let Some(&texture) = self.textures.get(bitmap.id as usize) else {
            warn!("Unknown bitmap {}", bitmap.id);
            return;
        };

        let (w, h) = (bitmap.width as f32, bitmap.height as f32);
        let vertices = [
            Vertex { pos: [0.0, 0.0], uv: [0.0, 0.0] },
            Vertex { pos: [w, 0.0], uv: [1.0, 0.0] },
            Vertex { pos: [w, h], uv: [1.0, 1.0] },

            Vertex { pos: [0.0, 0.0], uv: [0.0, 0.0] },
            Vertex { pos: [w, h], uv: [1.0, 1.0] },
            Vertex { pos: [0.0, h], uv: [0.0, 1.0] },
        ];

        unsafe {
            if let Some(loc) = &self.u_transform {
                self.gl
                    .uniform_matrix_3_f32_slice(Some(loc), false, &self.transform.to_cols_array());
            }

            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&vertices),
                glow::DYNAMIC_DRAW,
            );

            let stride = std::mem::size_of::<Vertex>() as i32;
            if let Some(a_pos) = self.a_pos {
                self.gl.enable_vertex_attrib_array(a_pos);
                self.gl
                    .vertex_attrib_pointer_f32(a_pos, 2, glow::FLOAT, false, stride, 0);
            }
            if let Some(a_uv) = self.a_uv {
                self.gl.enable_vertex_attrib_array(a_uv);
                self.gl
                    .vertex_attrib_pointer_f32(a_uv, 2, glow::FLOAT, false, stride, 8);
            }

            self.gl.draw_arrays(glow::TRIANGLES, 0, vertices.len() as i32);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    pub fn flush(&mut self) {
        unsafe {
            self.gl.flush();
        }
    }
}

impl Drop for DrawContext {
    fn drop(&mut self) {
        unsafe {
            for texture in self.textures.drain(..) {
                self.gl.delete_texture(texture);
            }
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_program(self.program);
        }
    }
}
