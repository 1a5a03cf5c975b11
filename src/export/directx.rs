//! DirectX `.x` ASCII emission.
//!
//! The document is a fixed header with the fallback material, one `Material`
//! block per registry entry, an optional rotation frame, and one `Mesh` block
//! per non-empty mesh buffer.

use super::format::{put_line, shortest_float, uv_entry, vec3_entry};
use crate::error::Result;
use crate::mesher::MeshBuffer;
use crate::registry::MaterialRegistry;
use crate::scene::{Material, Scene};
use crate::types::file_basename;
use std::fmt::Write;

/// Format tag, comment line and fallback material.
pub const HEADER: &str = "xof 0303txt 0032 \n\
// scene-exporter -> DirectX, supports: faces, normals and textures \n\
Material Default_Material{ \n\
1.0;1.0;1.0;1.0;;\n\
3.2;\n\
0.000000;0.000000;0.000000;;\n\
0.000000;0.000000;0.000000;;\n\
} \n";

/// Frame flipping the Y axis, wrapped around all meshes in rotated mode.
pub const ROTATION_FRAME: &str = "Frame {\n FrameTransformMatrix\n    {\n        \
1.000000,0.000000,0.000000,0.000000,\n        \
0.000000,-1.000000,0.000000,0.000000,\n        \
0.000000,0.000000,1.000000,0.000000,\n        \
0.000000,0.000000,0.000000,1.000000;;\n    }\n";

/// Replace every non-alphanumeric character of a mesh name with `_`.
pub fn mesh_name(name: &str) -> String {
    crate::registry::underscore_name(name)
}

/// One `Material` template instance.
///
/// `output_path` only contributes its base name to the texture reference,
/// matching the file the texture writer produced next to the output.
pub fn material_block(label: &str, material: &Material, output_path: &str) -> Result<String> {
    let mut out = String::new();
    let [r, g, b] = material.rgb();
    writeln!(out, "Material {}{{ ", label)?;
    writeln!(
        out,
        "{};{};{};{};;",
        shortest_float(r),
        shortest_float(g),
        shortest_float(b),
        shortest_float(material.alpha)
    )?;
    out.push_str("3.2;\n");
    out.push_str("0.000000;0.000000;0.000000;;\n");
    out.push_str("0.000000;0.000000;0.000000;;\n");
    if let Some(texture) = material.named_texture() {
        writeln!(
            out,
            "   TextureFilename {{ \"{}{}\";   }} ",
            file_basename(output_path),
            file_basename(&texture.filename)
        )?;
    }
    out.push_str("} \n");
    Ok(out)
}

/// Material blocks for every registered entry except the fallback.
///
/// An entry whose first material is untextured borrows the texture of the
/// first aliased material that has one.
pub fn materials_block(
    registry: &MaterialRegistry<'_>,
    scene: &Scene,
    output_path: &str,
) -> Result<String> {
    let mut out = String::new();
    for (_, entry) in registry.materials() {
        let Some(id) = entry.material else {
            continue;
        };
        let mut material = scene.material(id)?.clone();
        if material.named_texture().is_none() {
            if let Some(textured) = entry.textured {
                material.texture = scene.material(textured)?.texture.clone();
            }
        }
        out.push_str(&material_block(&entry.label, &material, output_path)?);
    }
    Ok(out)
}

/// One `Mesh` block, or an empty string for a buffer without vertices.
pub fn mesh_block(
    name: &str,
    buffer: &MeshBuffer,
    registry: &MaterialRegistry<'_>,
) -> Result<String> {
    if buffer.is_empty() {
        return Ok(String::new());
    }

    let vertices: Vec<String> = buffer.vertices.iter().map(|v| vec3_entry(v.position)).collect();
    let faces: Vec<String> = buffer
        .triangles
        .iter()
        .map(|[a, b, c]| format!("3;{},{},{}", a, b, c))
        .collect();
    let slots: Vec<String> = buffer.triangle_materials.iter().map(|s| s.to_string()).collect();
    let materials: Vec<String> = buffer
        .materials
        .iter()
        .map(|&index| format!("{{ {} }}", registry.entry(index).label))
        .collect();
    let tex_coords: Vec<String> = buffer.vertices.iter().map(|v| uv_entry(v.uv)).collect();
    let normals: Vec<String> = buffer.vertices.iter().map(|v| vec3_entry(v.normal)).collect();

    let mut out = String::new();
    writeln!(out, "Mesh {}{{", mesh_name(name))?;
    writeln!(out, " {};", vertices.len())?;
    writeln!(out, " {};", vertices.join(",\n "))?;
    writeln!(out, " {};", faces.len())?;
    writeln!(out, " {};;", faces.join(",\n "))?;

    out.push_str("  MeshMaterialList {\n");
    writeln!(out, "  {};", materials.len())?;
    writeln!(out, "  {};", slots.len())?;
    writeln!(out, "  {};", slots.join(",\n  "))?;
    writeln!(out, "  {}", materials.join("\n  "))?;
    out.push_str("  }\n");

    out.push_str("  MeshTextureCoords {\n");
    writeln!(out, "  {};", tex_coords.len())?;
    writeln!(out, "  {};", tex_coords.join("\n  "))?;
    out.push_str("  }\n");

    out.push_str("  MeshNormals {\n");
    write!(out, "  {};\n  ", normals.len())?;
    writeln!(out, "  {};", normals.join("\n"))?;
    writeln!(out, "  {};", faces.len())?;
    writeln!(out, "  {};;", faces.join(";\n  "))?;
    out.push_str("  }\n");
    out.push_str(" }\n");
    Ok(out)
}

/// Assemble the full document from its already-rendered parts.
pub fn document(materials: &str, meshes: &[String], rotated: bool) -> String {
    let mut out = String::with_capacity(
        HEADER.len() + materials.len() + meshes.iter().map(String::len).sum::<usize>() + 256,
    );
    put_line(&mut out, HEADER);
    put_line(&mut out, materials);
    if rotated {
        put_line(&mut out, ROTATION_FRAME);
    }
    for mesh in meshes {
        put_line(&mut out, mesh);
    }
    if rotated {
        put_line(&mut out, "}");
    }
    out
}
