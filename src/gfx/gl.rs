use super::bitmap::Pixels;
use anyhow::{anyhow, bail, Context, Result};
use glow::HasContext;
use std::path::Path;

const VERTEX_SHADER_FILE: &str = "sprite.vert.glsl";
const FRAGMENT_SHADER_FILE: &str = "sprite.frag.glsl";

fn compile(gl: &glow::Context, stage: u32, source: &str, label: &str) -> Result<glow::Shader> {
    unsafe {
        let shader = gl
            .create_shader(stage)
            .map_err(|e| anyhow!("Failed to create {} shader: {}", label, e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            bail!("{} shader failed to compile: {}", label, log);
        }
        Ok(shader)
    }
}

/// Compiles and links a vertex/fragment pair.
pub fn build_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program> {
    let vert = compile(gl, glow::VERTEX_SHADER, vert_src, "vertex")?;
    let frag = match compile(gl, glow::FRAGMENT_SHADER, frag_src, "fragment") {
        Ok(frag) => frag,
        Err(e) => {
            unsafe { gl.delete_shader(vert) };
            return Err(e);
        }
    };

    unsafe {
        let program = gl
            .create_program()
            .map_err(|e| anyhow!("Failed to create program: {}", e))?;
        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);

        let linked = gl.get_program_link_status(program);
        gl.detach_shader(program, vert);
        gl.detach_shader(program, frag);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !linked {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            bail!("Sprite program failed to link: {}", log);
        }
        Ok(program)
    }
}

/// Reads the sprite shaders from `dir` and builds them.
pub fn load_sprite_program(gl: &glow::Context, dir: &Path) -> Result<glow::Program> {
    let vert_path = dir.join(VERTEX_SHADER_FILE);
    let frag_path = dir.join(FRAGMENT_SHADER_FILE);
    let vert_src = std::fs::read_to_string(&vert_path)
        .with_context(|| format!("Reading {}", vert_path.display()))?;
    let frag_src = std::fs::read_to_string(&frag_path)
        .with_context(|| format!("Reading {}", frag_path.display()))?;
    build_program(gl, &vert_src, &frag_src)
}

/// Uploads premultiplied RGBA pixels as a clamped, linearly filtered
/// texture (no mipmaps, so any size works on GLES2).
pub fn create_texture(gl: &glow::Context, pixels: &Pixels) -> Result<glow::Texture> {
    unsafe {
        let texture = gl
            .create_texture()
            .map_err(|e| anyhow!("Failed to create texture: {}", e))?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA as i32,
            pixels.width as i32,
            pixels.height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            Some(&pixels.rgba),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);
        Ok(texture)
    }
}
