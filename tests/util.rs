#![allow(dead_code)]
use mesh_annotate::prelude::*;

pub fn lid(raw: u32) -> LayerId {
    LayerId::new(raw).unwrap()
}

/// Settings with `n` layers of type `ty`, named `L0..`, fixed colors.
pub fn settings_with_layers(ty: ElementType, n: usize) -> (AnnotationSettings, Vec<LayerId>) {
    let mut settings = AnnotationSettings::new();
    let ids = (0..n)
        .map(|i| {
            settings
                .catalog_mut(ty)
                .create(Some(&format!("L{i}")), Some([0.2, 0.4, 0.6, 1.0]), 0)
                .unwrap()
        })
        .collect();
    (settings, ids)
}

/// Mark `indices` selected (additively).
pub fn select(mesh: &mut InMemoryMesh, ty: ElementType, indices: &[usize]) {
    for &i in indices {
        mesh.set_selected(ty, i, true);
    }
}

/// Two disjoint open chains of `n` vertices each; the second starts at `n`.
pub fn two_chains(n: usize) -> InMemoryMesh {
    let positions = (0..2 * n)
        .map(|i| [(i % n) as f32, (i / n) as f32 * 5.0, 0.0])
        .collect();
    let wires: Vec<[usize; 2]> = (0..2)
        .flat_map(|c| (1..n).map(move |i| [c * n + i - 1, c * n + i]))
        .collect();
    InMemoryMesh::new(positions, &wires, Vec::new()).unwrap()
}

/// `n`×`n` grid (numbered as [`InMemoryMesh::grid`]) plus one wire edge from
/// `vert` to an extra vertex above it, which makes `vert` a 5-edge pole.
pub fn grid_with_spike(n: usize, vert: usize) -> InMemoryMesh {
    let stride = n + 1;
    let mut positions: Vec<[f32; 3]> = (0..=n)
        .flat_map(|y| (0..=n).map(move |x| [x as f32, y as f32, 0.0]))
        .collect();
    let [x, y, _] = positions[vert];
    positions.push([x, y, 1.0]);
    let faces = (0..n)
        .flat_map(|row| {
            (0..n).map(move |col| {
                let v = row * stride + col;
                vec![v, v + 1, v + 1 + stride, v + stride]
            })
        })
        .collect();
    let spike = positions.len() - 1;
    InMemoryMesh::new(positions, &[[vert, spike]], faces).unwrap()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
