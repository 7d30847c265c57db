use std::collections::HashMap;

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};

use crate::{
    data_structures::model::{Material, Mesh, Model, ModelVertex},
    loader::{AssetLoadError, LoadEvent},
    resources::{decode_data_uri, fetch_item, resolve_uri, source::AssetSource},
};

/// Fetch and parse a glTF or GLB document into a [`Model`].
///
/// Every external buffer and image the document references is fetched through `source`
/// and reported to `emit` as its own item. The document itself is not reported here;
/// see [`crate::resources::fetch_model`].
pub async fn load_model_gltf<S: AssetSource>(
    source: &S,
    path: &str,
    emit: &mut impl FnMut(LoadEvent),
) -> Result<Model, AssetLoadError> {
    let bytes = source
        .fetch(path)
        .await
        .map_err(|err| AssetLoadError::fetch(path, err))?;
    let gltf = gltf::Gltf::from_slice(&bytes)?;

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| AssetLoadError::Invalid("missing binary chunk".to_string()))?,
            gltf::buffer::Source::Uri(uri) => match decode_data_uri(uri) {
                Some(decoded) => decoded?,
                None => fetch_item(source, &resolve_uri(path, uri), emit).await?,
            },
        };
        if data.len() < buffer.length() {
            return Err(AssetLoadError::Invalid(format!(
                "buffer {} holds {} bytes, expected {}",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        buffer_data.push(data);
    }

    let mut images: HashMap<usize, Option<image::RgbaImage>> = HashMap::new();
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let base_color_texture = match pbr.base_color_texture() {
            Some(info) => {
                let image = info.texture().source();
                if !images.contains_key(&image.index()) {
                    let decoded = load_image(source, path, &image, &buffer_data, emit).await;
                    images.insert(image.index(), decoded);
                }
                images.get(&image.index()).cloned().flatten()
            }
            None => None,
        };
        materials.push(Material {
            name: material
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("material{}", materials.len())),
            base_color_factor: pbr.base_color_factor(),
            base_color_texture,
        });
    }

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| AssetLoadError::Invalid("document has no scene".to_string()))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_meshes(&node, Matrix4::identity(), &buffer_data, &mut meshes)?;
    }
    if meshes.is_empty() {
        log::warn!("{path} contains no triangle meshes");
    }

    Ok(Model::new(
        scene.name().map(str::to_string).or(Some(path.to_string())),
        meshes,
        materials,
    ))
}

/// Decode an image to RGBA8. Failures are logged and the material falls back to its
/// base colour factor.
async fn load_image<S: AssetSource>(
    source: &S,
    path: &str,
    image: &gltf::Image<'_>,
    buffer_data: &[Vec<u8>],
    emit: &mut impl FnMut(LoadEvent),
) -> Option<image::RgbaImage> {
    let (bytes, mime_type) = match image.source() {
        gltf::image::Source::View { view, mime_type } => {
            let buffer = &buffer_data[view.buffer().index()];
            let end = view.offset() + view.length();
            match buffer.get(view.offset()..end) {
                Some(slice) => (slice.to_vec(), Some(mime_type)),
                None => {
                    log::warn!("image {} points outside its buffer", image.index());
                    return None;
                }
            }
        }
        gltf::image::Source::Uri { uri, mime_type } => {
            let bytes = match decode_data_uri(uri) {
                Some(decoded) => decoded,
                None => fetch_item(source, &resolve_uri(path, uri), emit).await,
            };
            match bytes {
                Ok(bytes) => (bytes, mime_type),
                Err(err) => {
                    log::warn!("couldn't load texture {uri}: {err}");
                    return None;
                }
            }
        }
    };

    let decoded = match mime_type.and_then(image::ImageFormat::from_mime_type) {
        Some(format) => image::load_from_memory_with_format(&bytes, format),
        None => image::load_from_memory(&bytes),
    };
    match decoded {
        Ok(decoded) => Some(decoded.to_rgba8()),
        Err(err) => {
            log::warn!("couldn't decode image {}: {err}", image.index());
            None
        }
    }
}

fn collect_meshes(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffer_data: &[Vec<u8>],
    meshes: &mut Vec<Mesh>,
) -> Result<(), AssetLoadError> {
    let transform = parent * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping {:?} primitive {} of mesh {}",
                    primitive.mode(),
                    primitive.index(),
                    mesh.index()
                );
                continue;
            }
            let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| {
                    AssetLoadError::Invalid(format!("mesh {} has no positions", mesh.index()))
                })?
                .collect();
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|tex_coords| tex_coords.into_f32().collect())
                .unwrap_or_default();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            if let Some(bad) = indices.iter().find(|idx| **idx as usize >= positions.len()) {
                return Err(AssetLoadError::Invalid(format!(
                    "mesh {} references vertex {bad} of {}",
                    mesh.index(),
                    positions.len()
                )));
            }
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(normals) => normals.collect(),
                None => compute_normals(&positions, &indices),
            };

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(idx, position)| ModelVertex {
                    position: *position,
                    tex_coords: tex_coords.get(idx).copied().unwrap_or([0.0; 2]),
                    normal: normals.get(idx).copied().unwrap_or([0.0, 1.0, 0.0]),
                })
                .collect();

            meshes.push(Mesh {
                name: format!(
                    "{}#{}",
                    mesh.name().unwrap_or("mesh"),
                    primitive.index()
                ),
                vertices,
                indices,
                material: primitive.material().index(),
                transform,
            });
        }
    }

    for child in node.children() {
        collect_meshes(&child, transform, buffer_data, meshes)?;
    }
    Ok(())
}

/// Area-weighted vertex normals for meshes that ship without them.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|idx| idx as usize);
        let (pa, pb, pc) = (
            Vector3::from(positions[a]),
            Vector3::from(positions[b]),
            Vector3::from(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|normal| {
            if normal.magnitude2() > 0.0 {
                normal.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}
