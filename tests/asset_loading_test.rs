use cgmath::Vector4;
use orbit_viewer::{
    loader::{AssetLoadError, LoadEvent},
    resources::{
        HostAssetSource, decode_data_uri, fetch_model, gltf_model::compute_normals, resolve_uri,
    },
};

use crate::common::test_utils::{
    InMemorySource, collect_events, embedded_triangle_gltf, solid_png, textured_triangle_gltf,
    triangle_bin, triangle_glb, triangle_gltf,
};

mod common;

fn describe(events: &[LoadEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            LoadEvent::ItemStart(url) => format!("start {url}"),
            LoadEvent::ItemEnd(url) => format!("end {url}"),
            LoadEvent::Parsed(_) => "parsed".to_string(),
            LoadEvent::Error(_) => "error".to_string(),
        })
        .collect()
}

fn parsed(events: Vec<LoadEvent>) -> orbit_viewer::data_structures::model::Model {
    events
        .into_iter()
        .find_map(|event| match event {
            LoadEvent::Parsed(model) => Some(model),
            _ => None,
        })
        .expect("no model was parsed")
}

#[test]
fn should_track_external_buffer_as_item() {
    let source = InMemorySource::new()
        .with_file("public/scene.gltf", triangle_gltf("scene.bin"))
        .with_file("public/scene.bin", triangle_bin());

    let events = collect_events(&source, "public/scene.gltf");

    assert_eq!(
        describe(&events),
        vec![
            "start public/scene.gltf",
            "start public/scene.bin",
            "end public/scene.bin",
            "parsed",
            "end public/scene.gltf",
        ]
    );
    assert_eq!(source.fetched(), vec!["public/scene.gltf", "public/scene.bin"]);
}

#[test]
fn should_parse_triangle_with_node_transform_and_material() {
    let source = InMemorySource::new()
        .with_file("public/scene.gltf", triangle_gltf("scene.bin"))
        .with_file("public/scene.bin", triangle_bin());

    let model = parsed(collect_events(&source, "public/scene.gltf"));

    assert_eq!(model.name.as_deref(), Some("TriangleScene"));
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.vertex_count(), 3);
    assert_eq!(model.triangle_count(), 1);

    let mesh = &model.meshes[0];
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
    // no normals in the file: computed from the winding
    for vertex in &mesh.vertices {
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertex.tex_coords, [0.0, 0.0]);
    }
    // the child inherits the root node's translation
    assert_eq!(mesh.transform.w, Vector4::new(1.0, 2.0, 3.0, 1.0));

    let material = model.material(mesh).expect("material");
    assert_eq!(material.name, "red");
    assert_eq!(material.base_color_factor, [0.8, 0.2, 0.2, 1.0]);
    assert!(material.base_color_texture.is_none());
}

#[test]
fn should_decode_data_uri_without_counting_it() {
    let source = InMemorySource::new().with_file("scene.gltf", embedded_triangle_gltf());

    let events = collect_events(&source, "scene.gltf");

    assert_eq!(
        describe(&events),
        vec!["start scene.gltf", "parsed", "end scene.gltf"]
    );
    assert_eq!(parsed(events).vertex_count(), 3);
}

#[test]
fn should_read_glb_binary_chunk() {
    let source = InMemorySource::new().with_file("model.glb", triangle_glb());

    let events = collect_events(&source, "model.glb");

    assert_eq!(
        describe(&events),
        vec!["start model.glb", "parsed", "end model.glb"]
    );
    let model = parsed(events);
    assert_eq!(model.meshes[0].indices, vec![0, 1, 2]);
}

#[test]
fn should_report_missing_buffer_as_fetch_error() {
    let source = InMemorySource::new().with_file("public/scene.gltf", triangle_gltf("scene.bin"));

    let events = collect_events(&source, "public/scene.gltf");

    assert_eq!(
        describe(&events),
        vec![
            "start public/scene.gltf",
            "start public/scene.bin",
            "end public/scene.bin",
            "error",
            "end public/scene.gltf",
        ]
    );
    let error = events
        .into_iter()
        .find_map(|event| match event {
            LoadEvent::Error(err) => Some(err),
            _ => None,
        })
        .unwrap();
    match error {
        AssetLoadError::Fetch { url, .. } => assert_eq!(url, "public/scene.bin"),
        other => panic!("expected a fetch error, got {other:?}"),
    }
}

#[test]
fn should_report_missing_document_as_fetch_error() {
    let source = InMemorySource::new();
    let events = collect_events(&source, "public/scene.gltf");
    assert_eq!(
        describe(&events),
        vec!["start public/scene.gltf", "error", "end public/scene.gltf"]
    );
}

#[test]
fn should_report_malformed_document_as_parse_error() {
    let source = InMemorySource::new().with_file("scene.gltf", b"{ not json".to_vec());
    let events = collect_events(&source, "scene.gltf");
    assert!(events.iter().any(|event| matches!(
        event,
        LoadEvent::Error(AssetLoadError::Parse(_))
    )));
}

#[test]
fn should_load_base_color_texture() {
    let source = InMemorySource::new()
        .with_file("assets/scene.gltf", textured_triangle_gltf("scene.bin", "textures/red.png"))
        .with_file("assets/scene.bin", triangle_bin())
        .with_file("assets/textures/red.png", solid_png([255, 0, 0, 255]));

    let events = collect_events(&source, "assets/scene.gltf");

    assert_eq!(
        describe(&events),
        vec![
            "start assets/scene.gltf",
            "start assets/scene.bin",
            "end assets/scene.bin",
            "start assets/textures/red.png",
            "end assets/textures/red.png",
            "parsed",
            "end assets/scene.gltf",
        ]
    );
    let model = parsed(events);
    let texture = model.materials[0]
        .base_color_texture
        .as_ref()
        .expect("texture");
    assert_eq!(texture.dimensions(), (2, 2));
    assert_eq!(texture.get_pixel(0, 0).0, [255, 0, 0, 255]);
}

#[test]
fn should_keep_loading_when_texture_is_missing() {
    let source = InMemorySource::new()
        .with_file("scene.gltf", textured_triangle_gltf("scene.bin", "gone.png"))
        .with_file("scene.bin", triangle_bin());

    let events = collect_events(&source, "scene.gltf");

    assert!(!events.iter().any(|event| matches!(event, LoadEvent::Error(_))));
    let model = parsed(events);
    assert!(model.materials[0].base_color_texture.is_none());
}

#[test]
fn should_resolve_uris_against_the_document() {
    assert_eq!(resolve_uri("public/scene.gltf", "scene.bin"), "public/scene.bin");
    assert_eq!(
        resolve_uri("public/models/a.gltf", "tex/b.png"),
        "public/models/tex/b.png"
    );
    assert_eq!(resolve_uri("scene.gltf", "scene.bin"), "scene.bin");
    assert_eq!(
        resolve_uri("public/scene.gltf", "https://example.com/a.bin"),
        "https://example.com/a.bin"
    );
}

#[test]
fn should_decode_only_base64_data_uris() {
    assert!(decode_data_uri("scene.bin").is_none());
    assert_eq!(
        decode_data_uri("data:application/octet-stream;base64,AAEC")
            .unwrap()
            .unwrap(),
        vec![0, 1, 2]
    );
    assert!(matches!(
        decode_data_uri("data:text/plain,hello"),
        Some(Err(AssetLoadError::Invalid(_)))
    ));
}

#[test]
fn should_compute_unit_normals() {
    let positions = [[0.0, 0.0, 0.0], [0.0, 0.0, 2.0], [2.0, 0.0, 0.0], [5.0, 5.0, 5.0]];
    let normals = compute_normals(&positions, &[0, 1, 2]);
    for normal in &normals[..3] {
        assert_eq!(*normal, [0.0, 1.0, 0.0]);
    }
    // unreferenced vertices fall back to up
    assert_eq!(normals[3], [0.0, 1.0, 0.0]);
}

#[tokio::test]
async fn should_load_the_bundled_scene_from_disk() {
    let source = HostAssetSource::with_root(env!("CARGO_MANIFEST_DIR"));
    let mut events = Vec::new();
    fetch_model(&source, "public/scene.gltf", |event| events.push(event)).await;

    assert_eq!(
        describe(&events),
        vec!["start public/scene.gltf", "parsed", "end public/scene.gltf"]
    );
    let model = parsed(events);
    assert_eq!(model.name.as_deref(), Some("Cube"));
    assert_eq!(model.vertex_count(), 24);
    assert_eq!(model.triangle_count(), 12);
    // normals come from the file, one per face
    assert_eq!(model.meshes[0].vertices[0].normal, [1.0, 0.0, 0.0]);
}
