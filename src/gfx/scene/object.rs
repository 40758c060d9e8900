use std::ops::Range;

use cgmath::*;
use wgpu::{util::DeviceExt, Device};

use super::vertex::Vertex3D;
use crate::{config::ImportConfig, gfx::resources::material::Material};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand(&mut self, point: [f32; 3]) {
        self.min.x = self.min.x.min(point[0]);
        self.min.y = self.min.y.min(point[1]);
        self.min.z = self.min.z.min(point[2]);
        self.max.x = self.max.x.max(point[0]);
        self.max.y = self.max.y.max(point[1]);
        self.max.z = self.max.z.max(point[2]);
    }

    pub fn union(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.expand(other.min.into());
        self.expand(other.max.into());
    }

    pub fn center(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zero();
        }
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zero();
        }
        self.max - self.min
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f32 {
        self.size().magnitude()
    }
}

// GPU resources of one mesh: geometry plus its material uniform
pub struct MeshGpuResources {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub material_buffer: wgpu::Buffer,
    pub material_bind_group: wgpu::BindGroup,
}

pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub gpu_resources: Option<MeshGpuResources>,
}

impl Mesh {
    /// Builds a mesh from flat position/normal arrays as produced by `tobj`.
    ///
    /// Normals are computed from the faces when `normals` doesn't match the
    /// positions one to one.
    pub fn new(name: &str, positions: &[f32], normals: &[f32], indices: Vec<u32>) -> Self {
        let computed;
        let normals: &[f32] = if !normals.is_empty() && normals.len() == positions.len() {
            normals
        } else {
            computed = Self::calculate_face_normals(positions, &indices);
            &computed
        };

        let vertices = positions
            .chunks_exact(3)
            .zip(normals.chunks_exact(3))
            .map(|(p, n)| Vertex3D {
                position: [p[0], p[1], p[2]],
                normal: [n[0], n[1], n[2]],
                color: [1.0, 1.0, 1.0],
            })
            .collect();

        Self {
            name: name.to_string(),
            vertices,
            indices,
            material: Material::default(),
            cast_shadow: false,
            receive_shadow: false,
            gpu_resources: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    /// Installs one RGB color per vertex.
    ///
    /// Colors beyond the vertex count are ignored; vertices without a color
    /// keep theirs.
    pub fn set_vertex_colors(&mut self, colors: &[[f32; 3]]) {
        for (vertex, color) in self.vertices.iter_mut().zip(colors) {
            vertex.color = *color;
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for vertex in &self.vertices {
            bounds.expand(vertex.position);
        }
        bounds
    }

    /// Face normals for meshes that come without normals.
    ///
    /// Shared vertices get the average of their faces; unshared corners end
    /// up flat shaded.
    pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let vertex_count = positions.len() / 3;
        let mut accumulated = vec![Vector3::<f32>::zero(); vertex_count];
        let position = |i: usize| {
            Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2])
        };

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }
            let v0 = position(i0);
            let face_normal = (position(i1) - v0).cross(position(i2) - v0);
            for index in [i0, i1, i2] {
                accumulated[index] += face_normal;
            }
        }

        let mut normals = Vec::with_capacity(positions.len());
        for normal in accumulated {
            let normal = if normal.magnitude2() > 0.0 {
                normal.normalize()
            } else {
                Vector3::unit_y()
            };
            normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
        }
        normals
    }

    pub fn init_gpu_resources(&mut self, device: &Device, material_layout: &wgpu::BindGroupLayout) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut material = self.material.uniform();
        material.receive_shadow = if self.receive_shadow { 1.0 } else { 0.0 };
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", self.name)),
            contents: bytemuck::bytes_of(&material),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(MeshGpuResources {
            vertex_buffer,
            index_buffer,
            material_buffer,
            material_bind_group,
        });
    }
}

// Per-model transform uniform
pub struct ModelGpuResources {
    pub transform_buffer: wgpu::Buffer,
    pub transform_bind_group: wgpu::BindGroup,
}

/// A loaded model: its meshes plus the import normalization transform
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    /// Translation applied before `scale`
    pub offset: Vector3<f32>,
    pub scale: f32,
    pub gpu_resources: Option<ModelGpuResources>,
}

impl Model {
    pub fn new(name: &str, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.to_string(),
            meshes,
            offset: Vector3::zero(),
            scale: 1.0,
            gpu_resources: None,
        }
    }

    /// Bounds of the untransformed geometry
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for mesh in &self.meshes {
            bounds.union(&mesh.bounding_box());
        }
        bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    /// Moves the bounding box center to the origin and shrinks models whose
    /// diagonal is longer than the import threshold.
    pub fn normalize(&mut self, import: &ImportConfig) {
        let bounds = self.bounding_box();
        if bounds.is_empty() {
            return;
        }
        self.offset = -bounds.center();
        self.scale = if bounds.diagonal() > import.oversize_threshold {
            import.oversize_scale
        } else {
            1.0
        };
    }

    /// Local transform: recenter first, then scale
    pub fn local_transform(&self) -> Matrix4<f32> {
        Matrix4::from_scale(self.scale) * Matrix4::from_translation(self.offset)
    }

    pub fn needs_upload(&self) -> bool {
        self.gpu_resources.is_none()
            || self.meshes.iter().any(|mesh| mesh.gpu_resources.is_none())
    }

    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        transform_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
    ) {
        for mesh in self.meshes.iter_mut() {
            mesh.init_gpu_resources(device, material_layout);
        }

        let transform_data: [[f32; 4]; 4] = self.local_transform().into();
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Transform Buffer", self.name)),
            contents: bytemuck::cast_slice(&transform_data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout: transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(ModelGpuResources {
            transform_buffer,
            transform_bind_group,
        });

        log::debug!(
            "Uploaded model '{}' ({} meshes, {} vertices)",
            self.name,
            self.meshes.len(),
            self.vertex_count()
        );
    }

    /// Writes `parent * local_transform` to the transform uniform
    pub fn update_transform(&self, queue: &wgpu::Queue, parent: Matrix4<f32>) {
        if let Some(gpu_resources) = &self.gpu_resources {
            let world: [[f32; 4]; 4] = (parent * self.local_transform()).into();
            queue.write_buffer(
                &gpu_resources.transform_buffer,
                0,
                bytemuck::cast_slice(&world),
            );
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("meshes", &self.meshes.len())
            .field("offset", &self.offset)
            .field("scale", &self.scale)
            .finish()
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    /// Binds the model transform at `transform_slot`, and each mesh material
    /// at `material_slot` when given.
    fn draw_model(&mut self, model: &'a Model, transform_slot: u32, material_slot: Option<u32>);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let Some(gpu) = &mesh.gpu_resources else {
            return; // Skip drawing if not uploaded
        };

        self.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        self.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count(), 0, instances);
    }

    fn draw_model(&mut self, model: &'b Model, transform_slot: u32, material_slot: Option<u32>) {
        let Some(model_gpu) = &model.gpu_resources else {
            return;
        };
        self.set_bind_group(transform_slot, &model_gpu.transform_bind_group, &[]);

        for mesh in &model.meshes {
            match (material_slot, &mesh.gpu_resources) {
                (Some(slot), Some(mesh_gpu)) => {
                    self.set_bind_group(slot, &mesh_gpu.material_bind_group, &[]);
                }
                // Shadow pass only draws casters
                (None, _) if !mesh.cast_shadow => continue,
                _ => {}
            }
            self.draw_mesh(mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_mesh(half_extent: f32, center: [f32; 3]) -> Mesh {
        let [cx, cy, cz] = center;
        let h = half_extent;
        let positions = vec![
            cx - h, cy - h, cz - h, //
            cx + h, cy - h, cz - h, //
            cx + h, cy + h, cz - h, //
            cx - h, cy + h, cz + h,
        ];
        Mesh::new("box", &positions, &[], vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = Mesh::new("tri", &positions, &[], vec![0, 1, 2]);
        for vertex in mesh.vertices() {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_bounding_box_spans_all_meshes() {
        let model = Model::new(
            "pair",
            vec![box_mesh(1.0, [0.0, 0.0, 0.0]), box_mesh(1.0, [10.0, 0.0, 0.0])],
        );
        let bounds = model.bounding_box();
        assert_eq!(bounds.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vector3::new(11.0, 1.0, 1.0));
        assert_eq!(bounds.center(), Vector3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_normalize_recenters_small_model() {
        let mut model = Model::new("small", vec![box_mesh(10.0, [3.0, 4.0, 5.0])]);
        let import = ImportConfig::default();
        model.normalize(&import);

        assert_eq!(model.scale, 1.0);
        assert_eq!(model.offset, Vector3::new(-3.0, -4.0, -5.0));
        let moved = model.local_transform().transform_point(Point3::new(3.0, 4.0, 5.0));
        assert!(moved.to_vec().magnitude() < 1e-5);
    }

    #[test]
    fn test_normalize_scales_oversized_model() {
        // Diagonal of a cube with side s is s * sqrt(3)
        let side = 150.0 / 3f32.sqrt();
        let mut model = Model::new("huge", vec![box_mesh(side / 2.0, [40.0, 0.0, 0.0])]);
        model.normalize(&ImportConfig::default());
        assert_eq!(model.scale, 0.1);

        // Center still lands on the origin after scaling
        let moved = model.local_transform().transform_point(Point3::new(40.0, 0.0, 0.0));
        assert!(moved.to_vec().magnitude() < 1e-4);

        let side = 50.0 / 3f32.sqrt();
        let mut model = Model::new("fine", vec![box_mesh(side / 2.0, [0.0, 0.0, 0.0])]);
        model.normalize(&ImportConfig::default());
        assert_eq!(model.scale, 1.0);
    }

    #[test]
    fn test_empty_model_is_left_alone() {
        let mut model = Model::new("empty", Vec::new());
        model.normalize(&ImportConfig::default());
        assert_eq!(model.offset, Vector3::zero());
        assert_eq!(model.scale, 1.0);
        assert!(model.bounding_box().is_empty());
    }
}
