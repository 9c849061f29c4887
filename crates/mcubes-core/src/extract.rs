//! The plane-cache extractor: drives cell iteration, keeps two z-planes
//! resident, and pushes vertices/triangles into a [`MeshSink`].

use glam::Vec3;

use crate::classify::{classify, is_empty_case};
use crate::interpolate::interpolate_edge;
use crate::mesh::{BufferedMeshSink, Mesh, MeshSink, Triangle};
use crate::tables::{CORNER_OFFSETS, EDGE_ENDPOINTS, EDGE_MASK, TRI_TABLE};
use crate::volume::Volume;

const SENTINEL: u32 = u32::MAX;

/// A single resident z-slice: a flattened `ny * nx` plane of samples.
struct Plane {
    data: Vec<f32>,
    nx: u32,
}

impl Plane {
    fn new(nx: u32, ny: u32) -> Self {
        Self {
            data: vec![0.0; nx as usize * ny as usize],
            nx,
        }
    }

    fn load_from(&mut self, volume: &Volume, z: u32) {
        for y in 0..volume.ny {
            for x in 0..volume.nx {
                self.data[(y * self.nx + x) as usize] = volume.get(x, y, z);
            }
        }
    }

    fn sample(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.nx + x) as usize]
    }
}

/// Extracts the isosurface `{ p : volume(p) == iso }` from `volume` as an
/// indexed triangle mesh, using a double-buffered plane cache so only two
/// z-slices are resident at a time.
///
/// This is a pure, synchronous function of its inputs: it never blocks on
/// I/O and has no recoverable error path. Dimensions smaller than 2 on any
/// axis yield an empty mesh.
#[must_use]
pub fn extract(volume: &Volume, iso: f32) -> Mesh {
    let mut sink = BufferedMeshSink::new();
    extract_into(volume, iso, &mut sink);
    let mesh: Mesh = sink.into();
    log::info!(
        "extracted mesh from {}x{}x{} volume at iso={iso}: {} vertices, {} triangles",
        volume.nx,
        volume.ny,
        volume.nz,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    mesh
}

/// Same as [`extract`] but drives an arbitrary [`MeshSink`] rather than
/// allocating a fresh buffered one, so the caller can stream output instead of
/// batching it.
pub fn extract_into(volume: &Volume, iso: f32, sink: &mut impl MeshSink) {
    let (nx, ny, nz) = (volume.nx, volume.ny, volume.nz);
    if nx < 2 || ny < 2 || nz < 2 {
        log::debug!("volume {nx}x{ny}x{nz} has a dimension below 2, emitting empty mesh");
        return;
    }

    let mut planes = [Plane::new(nx, ny), Plane::new(nx, ny)];
    planes[0].load_from(volume, 0);

    // local_index[e] for the edges of the *current* cell, recomputed per cell.
    let mut local_index = [SENTINEL; 12];

    for z in 0..nz - 1 {
        let next_parity = (z + 1) % 2;
        planes[next_parity as usize].load_from(volume, z + 1);
        let (bottom, top) = (&planes[(z % 2) as usize], &planes[next_parity as usize]);

        for y in 0..ny - 1 {
            for x in 0..nx - 1 {
                process_cell(x, y, z, bottom, top, iso, &mut local_index, sink);
            }
        }
    }

    log::debug!(
        "extraction complete: {} vertices emitted",
        sink.vertex_count()
    );
}

#[allow(clippy::too_many_arguments)]
fn process_cell(
    x: u32,
    y: u32,
    z: u32,
    bottom: &Plane,
    top: &Plane,
    iso: f32,
    local_index: &mut [u32; 12],
    sink: &mut impl MeshSink,
) {
    let v = [
        bottom.sample(x, y),
        bottom.sample(x + 1, y),
        bottom.sample(x + 1, y + 1),
        bottom.sample(x, y + 1),
        top.sample(x, y),
        top.sample(x + 1, y),
        top.sample(x + 1, y + 1),
        top.sample(x, y + 1),
    ];

    let case = classify(&v, iso);
    if is_empty_case(case) {
        return;
    }
    let mask = EDGE_MASK[case as usize];
    if mask == 0 {
        return;
    }

    local_index.fill(SENTINEL);
    for e in 0..12u16 {
        if mask & (1 << e) == 0 {
            continue;
        }
        let (a, b) = EDGE_ENDPOINTS[e as usize];
        let (ax, ay, az) = CORNER_OFFSETS[a as usize];
        let (bx, by, bz) = CORNER_OFFSETS[b as usize];
        let origin = Vec3::new(x as f32, y as f32, z as f32);
        let pa = origin + Vec3::new(ax as f32, ay as f32, az as f32);
        let pb = origin + Vec3::new(bx as f32, by as f32, bz as f32);
        let vertex = interpolate_edge(pa, v[a as usize], pb, v[b as usize], iso);
        let idx = sink.push_vertex(vertex);
        local_index[e as usize] = idx;
    }

    let tris = &TRI_TABLE[case as usize];
    let mut i = 0;
    while i < 16 && tris[i] != -1 {
        let ea = tris[i] as usize;
        let eb = tris[i + 1] as usize;
        let ec = tris[i + 2] as usize;
        let (ia, ib, ic) = (local_index[ea], local_index[eb], local_index[ec]);
        if ia != SENTINEL && ib != SENTINEL && ic != SENTINEL {
            sink.push_triangle(Triangle::new(ia, ib, ic));
        }
        i += 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume_from_fn(nx: u32, ny: u32, nz: u32, f: impl Fn(u32, u32, u32) -> f32) -> Volume {
        let mut data = vec![0.0; (nx * ny * nz) as usize];
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    data[(z * ny * nx + y * nx + x) as usize] = f(x, y, z);
                }
            }
        }
        Volume { nx, ny, nz, data }
    }

    #[test]
    fn s1_empty_sphere() {
        let vol = volume_from_fn(4, 4, 4, |_, _, _| 0.0);
        let mesh = extract(&vol, 0.5);
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn s2_single_positive_corner() {
        let mut data = vec![0.0; 8];
        data[0] = 1.0; // (0,0,0)
        let vol = Volume {
            nx: 2,
            ny: 2,
            nz: 2,
            data,
        };
        let mesh = extract(&vol, 0.5);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn s3_axis_aligned_plane() {
        let vol = volume_from_fn(3, 3, 3, |_, _, z| z as f32 - 1.0);
        let mesh = extract(&vol, 0.5);
        for v in &mesh.vertices {
            assert!(v.z >= 0.5 - 1e-4 && v.z <= 1.5 + 1e-4);
        }
        assert_eq!(mesh.triangle_count(), 2 * (3 - 1) * (3 - 1));
    }

    #[test]
    fn tiny_dimensions_yield_empty_mesh() {
        let vol = Volume {
            nx: 1,
            ny: 5,
            nz: 5,
            data: vec![1.0; 25],
        };
        let mesh = extract(&vol, 0.5);
        assert!(mesh.is_empty());
    }

    #[test]
    fn invariant_all_indices_in_range_and_distinct() {
        let vol = volume_from_fn(6, 6, 6, |x, y, z| {
            let (x, y, z) = (x as f32 - 2.5, y as f32 - 2.5, z as f32 - 2.5);
            (x * x + y * y + z * z).sqrt() - 2.0
        });
        let mesh = extract(&vol, 0.0);
        assert!(!mesh.is_empty());
        for t in &mesh.triangles {
            assert!((t.a as usize) < mesh.vertex_count());
            assert!((t.b as usize) < mesh.vertex_count());
            assert!((t.c as usize) < mesh.vertex_count());
            assert_ne!(t.a, t.b);
            assert_ne!(t.b, t.c);
            assert_ne!(t.a, t.c);
        }
    }

    #[test]
    fn sign_flip_symmetry_preserves_vertex_and_triangle_counts() {
        let iso = 0.0;
        let vol = volume_from_fn(8, 8, 8, |x, y, z| {
            let (x, y, z) = (x as f32 - 3.5, y as f32 - 3.5, z as f32 - 3.5);
            (x * x + y * y + z * z).sqrt() - 2.5
        });
        let flipped = volume_from_fn(8, 8, 8, |x, y, z| 2.0 * iso - vol.get(x, y, z));
        let mesh_a = extract(&vol, iso);
        let mesh_b = extract(&flipped, iso);
        assert_eq!(mesh_a.vertex_count(), mesh_b.vertex_count());
        assert_eq!(mesh_a.triangle_count(), mesh_b.triangle_count());
    }

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32, // each case extracts a full small volume, keep CI fast
            .. ProptestConfig::default()
        })]

        // Invariant 4: every triangle index is in range and the three
        // vertices of a triangle are always distinct, for arbitrary radii
        // and isovalues over a fixed-size sphere field.
        #[test]
        fn indices_stay_in_range_and_distinct_for_arbitrary_sphere(
            radius in 1.0f32..3.5,
            iso in -0.5f32..0.5,
        ) {
            let vol = volume_from_fn(8, 8, 8, |x, y, z| {
                let (x, y, z) = (x as f32 - 3.5, y as f32 - 3.5, z as f32 - 3.5);
                (x * x + y * y + z * z).sqrt() - radius
            });
            let mesh = extract(&vol, iso);
            for t in &mesh.triangles {
                prop_assert!((t.a as usize) < mesh.vertex_count());
                prop_assert!((t.b as usize) < mesh.vertex_count());
                prop_assert!((t.c as usize) < mesh.vertex_count());
                prop_assert_ne!(t.a, t.b);
                prop_assert_ne!(t.b, t.c);
                prop_assert_ne!(t.a, t.c);
            }
        }

        // Invariant 1: a volume with no variation relative to iso (every
        // sample strictly above it) always yields an empty mesh, regardless
        // of dimensions.
        #[test]
        fn empty_volume_yields_empty_mesh_for_arbitrary_dims(
            nx in 2u32..6,
            ny in 2u32..6,
            nz in 2u32..6,
            iso in -10.0f32..10.0,
        ) {
            let vol = volume_from_fn(nx, ny, nz, |_, _, _| iso + 1.0);
            let mesh = extract(&vol, iso);
            prop_assert!(mesh.is_empty());
        }
    }
}
