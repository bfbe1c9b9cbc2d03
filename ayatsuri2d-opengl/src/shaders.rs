pub const MESH_VERT: &str = "#version 330
layout(location = 0) in vec2 pos;
layout(location = 1) in vec2 uv;

uniform mat4 u_mvp;

out vec2 v_uv;

void main() {
	v_uv = uv;
	gl_Position = u_mvp * vec4(pos, 0.0, 1.0);
}
";

pub const MESH_FRAG: &str = "#version 330
in vec2 v_uv;

uniform sampler2D u_albedo;

out vec4 out_color;

void main() {
	// albedo is stored premultiplied; blending is (ONE, ONE_MINUS_SRC_ALPHA)
	out_color = texture(u_albedo, v_uv);
}
";
