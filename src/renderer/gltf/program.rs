use crate::error::RenderError;
use crate::renderer::device::{AttribLocation, ProgramHandle, ShaderCompiler, UniformLocation};

/// The name of the vertex attribute the glTF POSITION data is bound to.
pub const POSITION_ATTRIBUTE: &str = "a_Position";
/// The name of the combined model-view-projection matrix uniform.
pub const MODEL_VIEW_PROJECTION_UNIFORM: &str = "u_ModelViewProjection";

pub const VERTEX_SHADER: &str = r#"#version 300 es
uniform mat4 u_ModelViewProjection;
in vec4 a_Position;
void main() {
    gl_Position = u_ModelViewProjection * vec4(a_Position.xyz, 1.0);
}
"#;
pub const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
out vec4 FRAG_COLOR;
void main() {
    vec3 output_linear_color = vec3(0.1, 0.35, 0.8);

    // The framebuffer is not SRGB, so we transform the linear color to close-enough-to-srgb.
    FRAG_COLOR = vec4(pow(output_linear_color, vec3(1.0 / 2.2)), 1.0);
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderProgram {
    pub program: ProgramHandle,
    pub position_location: AttribLocation,
    pub model_view_projection_location: UniformLocation,
}

/// Compiles the shader program used to render the glTF primitives and looks
/// up its locations. The program is deleted again if a location is missing.
pub fn create_program<G: ShaderCompiler + ?Sized>(gpu: &mut G) -> Result<ShaderProgram, RenderError> {
    let program = gpu.compile_program(VERTEX_SHADER, FRAGMENT_SHADER)?;
    match find_locations(gpu, program) {
        Ok(shader_program) => Ok(shader_program),
        Err(err) => {
            gpu.delete_program(program);
            Err(err)
        }
    }
}

fn find_locations<G: ShaderCompiler + ?Sized>(
    gpu: &mut G,
    program: ProgramHandle,
) -> Result<ShaderProgram, RenderError> {
    let position_location = gpu
        .attribute_location(program, POSITION_ATTRIBUTE)
        .ok_or_else(|| RenderError::MissingLocation {
            kind: "attribute",
            name: POSITION_ATTRIBUTE.to_string(),
        })?;
    let model_view_projection_location = gpu
        .uniform_location(program, MODEL_VIEW_PROJECTION_UNIFORM)
        .ok_or_else(|| RenderError::MissingLocation {
            kind: "uniform",
            name: MODEL_VIEW_PROJECTION_UNIFORM.to_string(),
        })?;
    Ok(ShaderProgram {
        program,
        position_location,
        model_view_projection_location,
    })
}
