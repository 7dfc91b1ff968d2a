mod util;
use mesh_annotate::prelude::*;
use util::*;

const FACE: ElementType = ElementType::Face;
const EDGE: ElementType = ElementType::Edge;

#[test]
fn faces_bucket_by_top_visible_layer_and_selection() {
    let (mut settings, ids) = settings_with_layers(FACE, 2);
    let mut mesh = InMemoryMesh::grid(2, 1);
    {
        let mut engine = SyncEngine::new(&mut settings, &mut mesh);
        engine.assign(FACE, ids[0], &Targets::Indices(vec![0, 1])).unwrap();
        engine.assign(FACE, ids[1], &Targets::Indices(vec![0])).unwrap();
    }
    settings.catalog_mut(FACE).set_visible(1, false).unwrap();
    select(&mut mesh, FACE, &[1]);

    let batches = OverlayBatchBuilder::new(&settings, &mesh).build_type(FACE);
    assert_eq!(batches.len(), 2);
    let (plain, picked) = (&batches[0], &batches[1]);
    assert_eq!((plain.layer, plain.selected, plain.elements.clone()), (ids[0], false, vec![0]));
    assert_eq!((picked.layer, picked.selected, picked.elements.clone()), (ids[0], true, vec![1]));
    assert_eq!(plain.primitive, PrimitiveKind::Triangles);
    // one quad = two fan triangles
    assert_eq!(plain.vertices.len(), 6);
    assert_eq!(plain.as_bytes().len(), 6 * 12);
    // default opacity halves the alpha
    assert_eq!(plain.color, [0.2, 0.4, 0.6, 0.5]);
}

#[test]
fn faces_are_pushed_along_their_normal() {
    let (mut settings, ids) = settings_with_layers(FACE, 1);
    let mut mesh = InMemoryMesh::grid(1, 1);
    SyncEngine::new(&mut settings, &mut mesh)
        .assign(FACE, ids[0], &Targets::Indices(vec![0]))
        .unwrap();
    let frame = OverlayBatchBuilder::new(&settings, &mesh).build();
    assert_eq!(frame.batches.len(), 1);
    assert!(
        frame.batches[0]
            .vertices
            .iter()
            .all(|v| v.position[2] == settings.overlay.face_offset)
    );
}

#[test]
fn edges_are_trimmed_symmetrically() {
    let (mut settings, ids) = settings_with_layers(EDGE, 1);
    settings.overlay.edge_trim = 0.25;
    settings.overlay.face_offset = 0.0;
    let mut mesh = InMemoryMesh::polyline(3, false);
    SyncEngine::new(&mut settings, &mut mesh)
        .assign(EDGE, ids[0], &Targets::Indices(vec![0]))
        .unwrap();

    let batches = OverlayBatchBuilder::new(&settings, &mesh).build_type(EDGE);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].primitive, PrimitiveKind::Lines);
    let ends: Vec<[f32; 3]> = batches[0].vertices.iter().map(|v| v.position).collect();
    assert_eq!(ends, vec![[0.25, 0.0, 0.0], [0.75, 0.0, 0.0]]);
}

#[test]
fn solo_mode_draws_only_a_visible_active_layer() {
    let (mut settings, ids) = settings_with_layers(FACE, 2);
    let mut mesh = InMemoryMesh::grid(2, 1);
    {
        let mut engine = SyncEngine::new(&mut settings, &mut mesh);
        engine.assign(FACE, ids[0], &Targets::Indices(vec![0])).unwrap();
        engine.assign(FACE, ids[1], &Targets::Indices(vec![1])).unwrap();
    }
    settings.overlay.solo_active = true;
    settings.catalog_mut(FACE).set_active(0).unwrap();
    let batches = OverlayBatchBuilder::new(&settings, &mesh).build_type(FACE);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].elements, vec![0]);

    settings.catalog_mut(FACE).set_visible(0, false).unwrap();
    assert!(OverlayBatchBuilder::new(&settings, &mesh).build_type(FACE).is_empty());
}

#[test]
fn cache_only_elements_are_still_drawn() {
    let (settings, ids) = settings_with_layers(FACE, 1);
    let mut mesh = InMemoryMesh::grid(2, 1);
    // written by an earlier session step that never reached the blob
    mesh.set_cache_top(FACE, 1, ids[0].as_cache_top());
    let batches = OverlayBatchBuilder::new(&settings, &mesh).build_type(FACE);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].elements, vec![1]);
}

#[test]
fn frame_orders_types_and_carries_settings() {
    let mut settings = AnnotationSettings::new();
    let v = settings.catalog_mut(ElementType::Vert).create(None, None, 9).unwrap();
    let f = settings.catalog_mut(FACE).create(None, None, 9).unwrap();
    settings.overlay.point_size = 4.0;
    let mut mesh = InMemoryMesh::grid(1, 1);
    {
        let mut engine = SyncEngine::new(&mut settings, &mut mesh);
        engine.assign(FACE, f, &Targets::Indices(vec![0])).unwrap();
        engine
            .assign(ElementType::Vert, v, &Targets::Indices(vec![0, 2]))
            .unwrap();
    }
    let frame = OverlayBatchBuilder::new(&settings, &mesh).build();
    let types: Vec<ElementType> = frame.batches.iter().map(|b| b.element_type).collect();
    assert_eq!(types, vec![ElementType::Vert, FACE]);
    assert_eq!(frame.batches[0].vertices.len(), 2);
    assert_eq!(frame.point_size, 4.0);
    assert!(!frame.show_backfaces);
}
