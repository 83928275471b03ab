//! FluidBackground component - animated WebGL2 shader behind the page.
//!
//! A single full-screen triangle (generated from `gl_VertexID`, no buffers)
//! shaded with domain-warped fbm noise. Without WebGL2 the canvas simply
//! stays blank.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlProgram, WebGlShader, WebGlUniformLocation};
use yew::prelude::*;

use crate::util::now_ms;

const VERTEX_SHADER: &str = r"#version 300 es
void main() {
    vec2 pos = vec2(float((gl_VertexID << 1) & 2), float(gl_VertexID & 2));
    gl_Position = vec4(pos * 2.0 - 1.0, 0.0, 1.0);
}
";

const FRAGMENT_SHADER: &str = r"#version 300 es
precision highp float;

uniform float u_time;
uniform vec2 u_resolution;
out vec4 out_color;

float hash(vec2 p) {
    return fract(sin(dot(p, vec2(127.1, 311.7))) * 43758.5453);
}

float noise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);
    vec2 u = f * f * (3.0 - 2.0 * f);
    return mix(
        mix(hash(i), hash(i + vec2(1.0, 0.0)), u.x),
        mix(hash(i + vec2(0.0, 1.0)), hash(i + vec2(1.0, 1.0)), u.x),
        u.y
    );
}

float fbm(vec2 p) {
    float value = 0.0;
    float amplitude = 0.5;
    for (int i = 0; i < 5; i++) {
        value += amplitude * noise(p);
        p *= 2.0;
        amplitude *= 0.5;
    }
    return value;
}

void main() {
    vec2 uv = gl_FragCoord.xy / u_resolution.y * 1.5;
    float t = u_time * 0.06;

    vec2 q = vec2(fbm(uv + t), fbm(uv + vec2(5.2, 1.3) - t));
    vec2 r = vec2(
        fbm(uv + 4.0 * q + vec2(1.7, 9.2) + 0.5 * t),
        fbm(uv + 4.0 * q + vec2(8.3, 2.8) - 0.5 * t)
    );
    float f = fbm(uv + 4.0 * r);

    vec3 color = mix(vec3(0.04, 0.02, 0.12), vec3(0.42, 0.10, 0.58), clamp(f * f * 2.0, 0.0, 1.0));
    color = mix(color, vec3(0.10, 0.48, 0.90), clamp(length(q), 0.0, 1.0) * 0.5);
    color = mix(color, vec3(1.00, 0.58, 0.30), clamp(r.x, 0.0, 1.0) * 0.2);
    out_color = vec4(color, 1.0);
}
";

struct FluidRenderer {
    canvas: HtmlCanvasElement,
    gl: GL,
    program: WebGlProgram,
    u_time: Option<WebGlUniformLocation>,
    u_resolution: Option<WebGlUniformLocation>,
}

impl FluidRenderer {
    fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let gl: GL = canvas
            .get_context("webgl2")
            .map_err(|e| format!("{e:?}"))?
            .ok_or("WebGL2 not supported")?
            .dyn_into()
            .map_err(|_| "Context is not WebGL2".to_string())?;

        let vertex = compile_shader(&gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vertex, &fragment)?;

        let u_time = gl.get_uniform_location(&program, "u_time");
        let u_resolution = gl.get_uniform_location(&program, "u_resolution");

        Ok(Self {
            canvas,
            gl,
            program,
            u_time,
            u_resolution,
        })
    }

    /// Matches the drawing buffer to the canvas' CSS size.
    fn fit_to_display(&self) {
        let width = u32::try_from(self.canvas.client_width()).unwrap_or(0);
        let height = u32::try_from(self.canvas.client_height()).unwrap_or(0);
        if width > 0 && height > 0 && (self.canvas.width() != width || self.canvas.height() != height) {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
    }

    fn draw(&self, time_s: f32) {
        self.fit_to_display();
        let width = self.canvas.width();
        let height = self.canvas.height();

        let gl = &self.gl;
        gl.viewport(0, 0, width as i32, height as i32);
        gl.use_program(Some(&self.program));
        gl.uniform1f(self.u_time.as_ref(), time_s);
        gl.uniform2f(self.u_resolution.as_ref(), width as f32, height as f32);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);
    }
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, String> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| "Unable to create shader".to_string())?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        Err(gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "Unknown shader compile error".to_string()))
    }
}

fn link_program(gl: &GL, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram, String> {
    let program = gl
        .create_program()
        .ok_or_else(|| "Unable to create program".to_string())?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        Err(gl
            .get_program_info_log(&program)
            .unwrap_or_else(|| "Unknown program link error".to_string()))
    }
}

#[function_component(FluidBackground)]
pub fn fluid_background() -> Html {
    let canvas_ref = use_node_ref();

    {
        let canvas_ref = canvas_ref.clone();
        use_effect_with((), move |_| {
            let renderer = canvas_ref
                .cast::<HtmlCanvasElement>()
                .ok_or_else(|| "Canvas not mounted".to_string())
                .and_then(FluidRenderer::new);

            let animation_frame_id = Rc::new(Cell::new(None::<i32>));
            let closure: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

            match renderer {
                Ok(renderer) => {
                    let started_at = now_ms();
                    let closure_clone = closure.clone();
                    let frame_id_clone = animation_frame_id.clone();

                    *closure.borrow_mut() = Some(Closure::new(move || {
                        let elapsed_s = ((now_ms() - started_at) / 1000.0) as f32;
                        renderer.draw(elapsed_s);

                        // Request next frame
                        if let Some(window) = web_sys::window() {
                            if let Some(ref closure) = *closure_clone.borrow() {
                                let id = window
                                    .request_animation_frame(closure.as_ref().unchecked_ref())
                                    .ok();
                                frame_id_clone.set(id);
                            }
                        }
                    }));

                    // Start the loop
                    if let Some(window) = web_sys::window() {
                        if let Some(ref closure) = *closure.borrow() {
                            let id = window
                                .request_animation_frame(closure.as_ref().unchecked_ref())
                                .ok();
                            animation_frame_id.set(id);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Fluid background disabled");
                }
            }

            // Cleanup - always return same closure type
            move || {
                if let Some(id) = animation_frame_id.take() {
                    if let Some(window) = web_sys::window() {
                        let _ = window.cancel_animation_frame(id);
                    }
                }
                // Break the reference cycle by clearing the closure
                *closure.borrow_mut() = None;
            }
        });
    }

    html! {
        <canvas class="fluid-background" ref={canvas_ref} />
    }
}
