//! Import-time post-processing steps.

use super::ImportedMesh;

/// Fan-triangulates every polygon with more than three corners.
///
/// Degenerate faces (fewer than three corners) are dropped.
pub fn triangulate(mesh: &mut ImportedMesh) {
    let mut triangles = Vec::with_capacity(mesh.triangle_count());
    for face in &mesh.faces {
        if face.len() < 3 {
            continue;
        }
        for i in 1..face.len() - 1 {
            triangles.push(vec![face[0], face[i], face[i + 1]]);
        }
    }
    mesh.faces = triangles;
}

/// Accumulates per-vertex tangents from triangle UV gradients.
///
/// Leaves `tangents` empty when the mesh has no UVs parallel to its positions.
/// Non-triangle faces are ignored, so triangulate first.
pub fn compute_tangents(mesh: &mut ImportedMesh) {
    if mesh.positions.is_empty() || mesh.uvs.len() != mesh.positions.len() {
        mesh.tangents.clear();
        return;
    }

    let mut tangents = vec![[0.0f32; 3]; mesh.positions.len()];
    for face in mesh.faces.iter().filter(|f| f.len() == 3) {
        let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
        if i0 >= tangents.len() || i1 >= tangents.len() || i2 >= tangents.len() {
            continue;
        }

        let (p0, p1, p2) = (mesh.positions[i0], mesh.positions[i1], mesh.positions[i2]);
        let (t0, t1, t2) = (mesh.uvs[i0], mesh.uvs[i1], mesh.uvs[i2]);

        let e1 = sub3(p1, p0);
        let e2 = sub3(p2, p0);
        let (du1, dv1) = (t1[0] - t0[0], t1[1] - t0[1]);
        let (du2, dv2) = (t2[0] - t0[0], t2[1] - t0[1]);

        let det = du1 * dv2 - du2 * dv1;
        if det.abs() < 1e-12 {
            continue;
        }
        let r = 1.0 / det;
        let tangent = [
            (e1[0] * dv2 - e2[0] * dv1) * r,
            (e1[1] * dv2 - e2[1] * dv1) * r,
            (e1[2] * dv2 - e2[2] * dv1) * r,
        ];

        for &i in &[i0, i1, i2] {
            for axis in 0..3 {
                tangents[i][axis] += tangent[axis];
            }
        }
    }

    for t in &mut tangents {
        let len = (t[0] * t[0] + t[1] * t[1] + t[2] * t[2]).sqrt();
        if len > 1e-10 {
            *t = [t[0] / len, t[1] / len, t[2] / len];
        }
    }
    mesh.tangents = tangents;
}

fn sub3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}
