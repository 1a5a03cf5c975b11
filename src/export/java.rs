//! Java/GL source emission.
//!
//! Produces a class holding one `TriangleStrip` per exported face, the
//! material constants they reference, and an immediate-mode `display` method.

use super::format::{java_float, put_line};
use crate::error::Result;
use crate::mesher::JavaStrip;
use crate::registry::{MaterialRegistry, DEFAULT_INDEX};
use crate::scene::Scene;
use crate::types::ContainerKind;
use std::fmt::Write;

/// Used when the model has never been saved.
pub const FALLBACK_CLASS_PREFIX: &str = "Model";

const STRIP_CLASS: &str = "    class TriangleStrip {
        TriangleStrip(float [] c, Texture t, float [] p, float [] n, float [] tc) {
            color = c;
            texture = t;
            points = p;
            normals = n;
            texCoords = tc;
        }
        float [] color;
        Texture texture;
        float [] points;
        float [] normals;
        float [] texCoords;
    };
    float [] Color_default = { 0.7f, 0.7f, 0.7f, 1f };
";

const EPILOG: &str = "    public void display(GL gl) {
        for (int i = 0; i < strips.length; i++) {
            TriangleStrip strip = strips[i];
            if (strip.color != null) {
                gl.glMaterialfv(GL.GL_FRONT_AND_BACK, GL.GL_AMBIENT_AND_DIFFUSE, strip.color, 0);
            }
            gl.glBegin(GL.GL_TRIANGLES);
            for (int j = 0; j < strip.points.length; j += 3) {
                gl.glNormal3fv(strip.normals, j);
                gl.glVertex3fv(strip.points, j);
            }
            gl.glEnd();
        }
    }
};
";

const CORNER_INDENT: &str = "                ";

/// Class name for a model base name: first letter upper-cased, the rest
/// lower-cased, suffixed with `Model`.
pub fn class_name(base: &str) -> String {
    let mut chars = base.chars();
    let prefix = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => FALLBACK_CLASS_PREFIX.to_string(),
    };
    format!("{}Model", prefix)
}

/// Incrementally built Java source file.
pub struct JavaDocument {
    out: String,
}

impl JavaDocument {
    /// Start the class and emit the strip type and default color.
    pub fn new(class_name: &str) -> Self {
        let mut out = String::new();
        out.push_str("class ");
        out.push_str(class_name);
        out.push_str(" {\n");
        out.push_str(STRIP_CLASS);
        Self { out }
    }

    /// Color and texture constants for every scene material, in model order.
    ///
    /// Materials sharing a registry entry are emitted once, under the label
    /// of the first. The entry's texture constant comes from the first of
    /// them that binds a texture.
    pub fn materials(
        &mut self,
        scene: &Scene,
        registry: &mut MaterialRegistry<'_>,
        texture_call: &str,
    ) -> Result<()> {
        let mut kept = Vec::new();
        for id in scene.material_ids() {
            let index = registry.resolve(id, scene.material(id)?)?;
            if registry.entry(index).material == Some(id) {
                kept.push((id, index));
            }
        }

        for (id, index) in kept {
            let entry = registry.entry(index);
            let [r, g, b] = scene.material(id)?.rgb();
            writeln!(
                self.out,
                "    float [] Color_{} = {{ {:.4}f, {:.4}f, {:.4}f , 1f}};",
                entry.label, r, g, b
            )?;
            let texture = match entry.textured {
                Some(textured) => scene.material(textured)?.named_texture(),
                None => None,
            };
            if let Some(texture) = texture {
                writeln!(
                    self.out,
                    "    Texture Texture_{} = {}(\"{}\", true, TextureIO.JPG);",
                    entry.label, texture_call, texture.filename
                )?;
            }
        }
        Ok(())
    }

    pub fn open_strips(&mut self) {
        put_line(&mut self.out, "    TriangleStrip [] strips = {");
    }

    /// Comment line marking entry into a group or component.
    pub fn container(&mut self, kind: ContainerKind, name: &str) {
        let label = match kind {
            ContainerKind::Group => "Group",
            ContainerKind::ComponentInstance => "Component instance",
        };
        put_line(&mut self.out, &format!("        // {}: {}", label, name));
    }

    /// One `new TriangleStrip(...)` entry.
    pub fn strip(&mut self, strip: &JavaStrip, registry: &MaterialRegistry<'_>) -> Result<()> {
        let label = &registry.entry(strip.material).label;
        let color = format!("Color_{}", label);
        let texture = if strip.material != DEFAULT_INDEX && strip.textured {
            format!("Texture_{}", label)
        } else {
            "null".to_string()
        };
        writeln!(self.out, "        new TriangleStrip({}, {}, ", color, texture)?;

        self.out.push_str("            new float [] { // points\n");
        for p in &strip.points {
            self.corner(p)?;
        }
        self.out.push_str("            },\n");

        self.out.push_str("            new float [] { // normals\n");
        for n in &strip.normals {
            self.corner(n)?;
        }
        self.out.push_str("            },\n");

        match &strip.tex_coords {
            Some(uvs) if texture != "null" => {
                self.out.push_str("            new float [] { // texcoords\n");
                for uv in uvs {
                    writeln!(
                        self.out,
                        "{}{}f,{}f,",
                        CORNER_INDENT,
                        java_float(uv[0]),
                        java_float(uv[1])
                    )?;
                }
                self.out.push_str("            }),\n");
            }
            _ => self.out.push_str("            null),\n"),
        }
        Ok(())
    }

    fn corner(&mut self, v: &[f64; 3]) -> Result<()> {
        writeln!(
            self.out,
            "{}{}f,{}f,{}f,",
            CORNER_INDENT,
            java_float(v[0]),
            java_float(v[1]),
            java_float(v[2])
        )?;
        Ok(())
    }

    /// Close the strip array and the class.
    pub fn finish(mut self) -> String {
        put_line(&mut self.out, "    };");
        put_line(&mut self.out, EPILOG);
        self.out
    }
}
