mod util;
use mesh_annotate::data::element_cache::{CACHE_STACK_CAPACITY, TRUNCATED_MARKER};
use mesh_annotate::prelude::*;
use util::*;

const FACE: ElementType = ElementType::Face;

#[test]
fn assigning_twice_equals_assigning_once() {
    let (mut settings, ids) = settings_with_layers(FACE, 2);
    let mut mesh = InMemoryMesh::grid(3, 3);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(FACE, ids[1], &Targets::Indices(vec![0, 4])).unwrap();
    engine.assign(FACE, ids[0], &Targets::Indices(vec![4])).unwrap();
    let once = engine.settings().blob(FACE).to_string();
    engine.assign(FACE, ids[0], &Targets::Indices(vec![4])).unwrap();
    assert_eq!(engine.settings().blob(FACE), once);
    assert_eq!(engine.stack_for(FACE, 4), vec![ids[0], ids[1]]);
}

#[test]
fn top_clear_removes_highest_only() {
    let (mut settings, ids) = settings_with_layers(FACE, 3);
    let mut mesh = InMemoryMesh::grid(2, 2);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    for &id in ids.iter().rev() {
        engine.assign(FACE, id, &Targets::Indices(vec![1])).unwrap();
    }
    assert_eq!(engine.stack_for(FACE, 1), ids);

    let changed = engine
        .clear(FACE, LayerFilter::Any, &Targets::Indices(vec![1]), ClearMode::Top)
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(engine.stack_for(FACE, 1), vec![ids[0], ids[1]]);
}

#[test]
fn top_clear_of_specific_layer_skips_where_not_top() {
    let (mut settings, ids) = settings_with_layers(FACE, 2);
    let mut mesh = InMemoryMesh::grid(2, 2);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(FACE, ids[0], &Targets::Indices(vec![0, 1])).unwrap();
    engine.assign(FACE, ids[1], &Targets::Indices(vec![1])).unwrap();

    let changed = engine
        .clear(FACE, LayerFilter::Only(ids[0]), &Targets::Indices(vec![0, 1]), ClearMode::Top)
        .unwrap();
    assert_eq!(changed, 1);
    assert!(engine.stack_for(FACE, 0).is_empty());
    assert_eq!(engine.stack_for(FACE, 1), ids);
}

#[test]
fn clear_on_selection_removes_one_layer() {
    let (mut settings, ids) = settings_with_layers(FACE, 2);
    let mut mesh = InMemoryMesh::grid(2, 2);
    select(&mut mesh, FACE, &[2, 3]);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(FACE, ids[0], &Targets::Selection).unwrap();
    engine.assign(FACE, ids[1], &Targets::Indices(vec![3])).unwrap();

    engine
        .clear(FACE, LayerFilter::Only(ids[0]), &Targets::Selection, ClearMode::All)
        .unwrap();
    assert_eq!(engine.settings().blob(FACE), r#"{"3":[2]}"#);
}

#[test]
fn removing_a_layer_cascades_into_every_stack() {
    let (mut settings, ids) = settings_with_layers(FACE, 3);
    let mut mesh = InMemoryMesh::grid(3, 1);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(FACE, ids[1], &Targets::Indices(vec![0, 1, 2])).unwrap();
    engine.assign(FACE, ids[2], &Targets::Indices(vec![0])).unwrap();

    let removed = engine.remove_layer(FACE, 1).unwrap();
    assert_eq!(removed.id(), ids[1]);
    assert_eq!(engine.count_for_layer(FACE, ids[1]), 0);
    assert_eq!(engine.settings().blob(FACE), r#"{"0":[3]}"#);
    assert_eq!(engine.mesh().cache_top(FACE, 1), -1);
    assert!(engine.mesh().cache_stack(FACE, 1).is_empty());
}

#[test]
fn reorder_rewrites_every_stack_in_new_order() {
    let (mut settings, ids) = settings_with_layers(FACE, 3);
    let mut mesh = InMemoryMesh::grid(2, 1);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    for &id in &ids {
        engine.assign(FACE, id, &Targets::Indices(vec![0])).unwrap();
    }
    engine.assign(FACE, ids[0], &Targets::Indices(vec![1])).unwrap();
    engine.assign(FACE, ids[2], &Targets::Indices(vec![1])).unwrap();

    assert!(engine.move_layer(FACE, 0, MoveDirection::Down).unwrap());
    assert!(engine.move_layer(FACE, 1, MoveDirection::Down).unwrap());
    // catalog is now [L1, L2, L0]
    assert_eq!(engine.stack_for(FACE, 0), vec![ids[1], ids[2], ids[0]]);
    assert_eq!(engine.stack_for(FACE, 1), vec![ids[2], ids[0]]);
    assert_eq!(engine.mesh().cache_top(FACE, 1), ids[0].as_cache_top());
    assert!(!engine.move_layer(FACE, 2, MoveDirection::Down).unwrap());
}

#[test]
fn stale_indices_are_pruned_without_error() {
    let (mut settings, ids) = settings_with_layers(FACE, 1);
    settings.set_blob(FACE, r#"{"3": [1], "50": [1]}"#);
    let mut mesh = InMemoryMesh::grid(5, 2);
    assert_eq!(mesh.element_count(FACE), 10);

    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(FACE, ids[0], &Targets::Indices(vec![4])).unwrap();
    assert_eq!(engine.settings().blob(FACE), r#"{"3":[1],"4":[1]}"#);
}

#[test]
fn resync_repairs_without_mutating() {
    let (mut settings, _) = settings_with_layers(FACE, 1);
    settings.set_blob(FACE, "{'1': [1, 1, 7], '99': [1]}");
    let mut mesh = InMemoryMesh::grid(2, 2);
    SyncEngine::new(&mut settings, &mut mesh).resync(FACE);
    assert_eq!(settings.blob(FACE), r#"{"1":[1]}"#);
    assert_eq!(mesh.cache_top(FACE, 1), 1);
}

#[test]
fn malformed_blob_degrades_to_empty() {
    let (mut settings, ids) = settings_with_layers(FACE, 1);
    settings.set_blob(FACE, "{not a mapping");
    let mut mesh = InMemoryMesh::grid(2, 2);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(FACE, ids[0], &Targets::Indices(vec![0])).unwrap();
    assert_eq!(engine.settings().blob(FACE), r#"{"0":[1]}"#);
}

#[test]
fn failed_operations_leave_state_untouched() {
    let (mut settings, ids) = settings_with_layers(FACE, 1);
    let mut mesh = InMemoryMesh::grid(2, 2);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(FACE, ids[0], &Targets::Indices(vec![0])).unwrap();
    let blob = engine.settings().blob(FACE).to_string();

    let ghost = lid(42);
    assert_eq!(
        engine.assign(FACE, ghost, &Targets::Indices(vec![1])),
        Err(MeshAnnotateError::UnknownLayer { element_type: FACE, id: ghost })
    );
    assert_eq!(
        engine.clear(FACE, LayerFilter::Any, &Targets::Indices(vec![17]), ClearMode::All),
        Err(MeshAnnotateError::EmptyTarget(FACE))
    );
    assert!(matches!(
        engine.remove_layer(FACE, 3),
        Err(MeshAnnotateError::LayerIndexOutOfRange { index: 3, len: 1, .. })
    ));
    assert_eq!(engine.settings().blob(FACE), blob);
    assert_eq!(engine.mesh().redraw_count(), 1);
}

#[test]
fn create_and_assign_rolls_back_on_empty_selection() {
    let (mut settings, _) = settings_with_layers(FACE, 2);
    let mut mesh = InMemoryMesh::grid(2, 2);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    assert!(
        engine
            .create_layer_and_assign(FACE, None, None, &Targets::Selection)
            .is_err()
    );
    assert_eq!(engine.settings().catalog(FACE).len(), 2);

    select(&mut mesh, FACE, &[0]);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    let (id, n) = engine
        .create_layer_and_assign(FACE, None, None, &Targets::Selection)
        .unwrap();
    assert_eq!((id.get(), n), (3, 1));
    assert_eq!(engine.settings().catalog(FACE).active().unwrap().name, "Face Layer 3");
}

#[test]
fn oversized_stack_survives_cache_truncation() {
    let (mut settings, ids) = settings_with_layers(FACE, 30);
    let mut mesh = InMemoryMesh::grid(2, 1);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    for &id in &ids {
        engine.assign(FACE, id, &Targets::Indices(vec![0])).unwrap();
    }
    let cached = engine.mesh().cache_stack(FACE, 0);
    assert!(cached.len() <= CACHE_STACK_CAPACITY);
    assert_eq!(cached[0], TRUNCATED_MARKER);
    assert_eq!(engine.mesh().cache_top(FACE, 0), 30);

    // a later operation reads the truncated cache but keeps every id
    engine.assign(FACE, ids[0], &Targets::Indices(vec![1])).unwrap();
    assert_eq!(engine.stack_for(FACE, 0), ids);
}

#[test]
fn live_cache_edits_take_precedence_over_blob() {
    let (mut settings, ids) = settings_with_layers(FACE, 2);
    let mut mesh = InMemoryMesh::grid(2, 1);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(FACE, ids[0], &Targets::Indices(vec![0])).unwrap();

    // the host edited the cache directly during the session
    mesh.set_cache_stack(FACE, 0, bytes::Bytes::from_static(b"2"));
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(FACE, ids[0], &Targets::Indices(vec![1])).unwrap();
    assert_eq!(engine.settings().blob(FACE), r#"{"0":[2],"1":[1]}"#);
}

#[test]
fn select_layer_elements_can_extend() {
    let (mut settings, ids) = settings_with_layers(ElementType::Vert, 1);
    let mut mesh = InMemoryMesh::polyline(5, false);
    select(&mut mesh, ElementType::Vert, &[4]);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine
        .assign(ElementType::Vert, ids[0], &Targets::Indices(vec![0, 2]))
        .unwrap();
    assert_eq!(engine.select_layer_elements(ElementType::Vert, ids[0], true).unwrap(), 2);
    assert_eq!(mesh.selected(ElementType::Vert), vec![0, 2, 4]);
}

#[test]
fn clear_layer_and_seams() {
    let (mut settings, ids) = settings_with_layers(ElementType::Edge, 2);
    let mut mesh = InMemoryMesh::polyline(6, false);
    mesh.set_seam(4, true);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine
        .assign(ElementType::Edge, ids[0], &Targets::Indices(vec![0, 1]))
        .unwrap();
    engine
        .assign(ElementType::Edge, ids[1], &Targets::Indices(vec![1, 2]))
        .unwrap();

    assert_eq!(engine.mark_seams(ids[1], true).unwrap(), 2);
    assert_eq!(engine.clear_layer(ElementType::Edge, ids[0]).unwrap(), 2);
    assert_eq!(engine.indices_for_layer(ElementType::Edge, ids[1]), vec![1, 2]);
    assert_eq!(engine.count_for_layer(ElementType::Edge, ids[0]), 0);

    let seams: Vec<bool> = (0..5).map(|e| mesh.is_seam(e)).collect();
    assert_eq!(seams, vec![false, true, true, false, false]);
}

#[test]
fn element_types_are_independent() {
    let mut settings = AnnotationSettings::new();
    let v = settings.catalog_mut(ElementType::Vert).create(None, None, 1).unwrap();
    let f = settings.catalog_mut(FACE).create(None, None, 1).unwrap();
    assert_eq!(v, f);
    let mut mesh = InMemoryMesh::grid(1, 1);
    let mut engine = SyncEngine::new(&mut settings, &mut mesh);
    engine.assign(ElementType::Vert, v, &Targets::Indices(vec![3])).unwrap();
    assert_eq!(engine.settings().blob(FACE), "");
    assert_eq!(engine.mesh().cache_top(FACE, 0), -1);
    assert_eq!(engine.settings().catalog(ElementType::Vert).layers()[0].name, "Vertex Layer 1");
}
