//! Asynchronous OBJ loading
//!
//! [`ModelLoader::load`] reads and parses the file on a worker thread and
//! streams [`LoadEvent`]s back: zero or more `Progress` updates followed by
//! exactly one `Loaded` or `Failed`. The worker never touches the scene; the
//! event loop applies the outcome when it drains the [`LoadHandle`].

use std::{
    fs::File,
    io::{BufReader, Cursor, Read},
    path::{Path, PathBuf},
    pin::Pin,
    task::{Context, Poll},
    thread,
};

use futures::{
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
    Stream,
};

use crate::{
    error::{LoadError, LoadResult},
    gfx::scene::object::{Mesh, Model},
};

const READ_CHUNK: usize = 64 * 1024;

/// One observable step of a load
#[derive(Debug)]
pub enum LoadEvent {
    /// Fraction of the file read so far, 0.0..=1.0
    Progress(f32),
    Loaded(Model),
    Failed(LoadError),
}

/// Receiving end of a running load
pub struct LoadHandle {
    path: PathBuf,
    receiver: UnboundedReceiver<LoadEvent>,
    finished: bool,
}

impl LoadHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the next event without blocking.
    ///
    /// A worker that goes away without a final outcome is reported as
    /// [`LoadError::Interrupted`].
    pub fn poll_event(&mut self) -> Option<LoadEvent> {
        if self.finished {
            return None;
        }
        match self.receiver.try_next() {
            Ok(Some(event)) => Some(self.observe(event)),
            Ok(None) => {
                self.finished = true;
                Some(LoadEvent::Failed(LoadError::Interrupted {
                    path: self.path.clone(),
                }))
            }
            Err(_) => None,
        }
    }

    fn observe(&mut self, event: LoadEvent) -> LoadEvent {
        if matches!(event, LoadEvent::Loaded(_) | LoadEvent::Failed(_)) {
            self.finished = true;
        }
        event
    }
}

impl Stream for LoadHandle {
    type Item = LoadEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match Pin::new(&mut self.receiver).poll_next(cx) {
            Poll::Ready(Some(event)) => Poll::Ready(Some(self.observe(event))),
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(Some(LoadEvent::Failed(LoadError::Interrupted {
                    path: self.path.clone(),
                })))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

pub struct ModelLoader;

impl ModelLoader {
    /// Starts loading `path` in the background.
    pub fn load(path: impl Into<PathBuf>) -> LoadHandle {
        let path = path.into();
        let (sender, receiver) = mpsc::unbounded();

        let worker_path = path.clone();
        let spawned = thread::Builder::new()
            .name("model-loader".to_string())
            .spawn(move || {
                let outcome = match Self::load_with_progress(&worker_path, &sender) {
                    Ok(model) => LoadEvent::Loaded(model),
                    Err(error) => LoadEvent::Failed(error),
                };
                // The handle may already be gone; nobody is left to tell
                let _ = sender.unbounded_send(outcome);
            });

        if let Err(error) = spawned {
            log::error!("Could not start loader thread: {}", error);
        }

        LoadHandle {
            path,
            receiver,
            finished: false,
        }
    }

    fn load_with_progress(path: &Path, sender: &UnboundedSender<LoadEvent>) -> LoadResult<Model> {
        let bytes = read_file(path, |fraction| {
            let _ = sender.unbounded_send(LoadEvent::Progress(fraction));
        })?;
        parse_obj(path, &bytes)
    }
}

fn read_file(path: &Path, mut on_progress: impl FnMut(f32)) -> LoadResult<Vec<u8>> {
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    let total = file.metadata().map_err(io_error)?.len();
    let mut reader = BufReader::new(file);

    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let read = reader.read(&mut chunk).map_err(io_error)?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
        if total > 0 {
            on_progress((bytes.len() as f64 / total as f64).min(1.0) as f32);
        }
    }
    if total == 0 {
        on_progress(1.0);
    }
    Ok(bytes)
}

fn parse_obj(path: &Path, bytes: &[u8]) -> LoadResult<Model> {
    let mut reader = Cursor::new(bytes);
    // Materials are replaced by the painter, so MTL files are never read
    let (models, _materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )
    .map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let meshes = models
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let name = if m.name.is_empty() {
                format!("mesh_{}", i)
            } else {
                m.name.clone()
            };
            let (positions, normals) = expand_corners(&m.mesh);
            let indices = (0..(positions.len() / 3) as u32).collect();
            Mesh::new(&name, &positions, &normals, indices)
        })
        .collect();

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());

    Ok(Model::new(&name, meshes))
}

/// Gives every triangle corner its own vertex, in index order.
///
/// Shared vertices are split, so per-vertex data (gradient colors, computed
/// normals) is never blended across faces.
fn expand_corners(mesh: &tobj::Mesh) -> (Vec<f32>, Vec<f32>) {
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let mut positions = Vec::with_capacity(mesh.indices.len() * 3);
    let mut normals = Vec::with_capacity(if has_normals { mesh.indices.len() * 3 } else { 0 });

    for &index in &mesh.indices {
        let start = index as usize * 3;
        let Some(position) = mesh.positions.get(start..start + 3) else {
            continue;
        };
        positions.extend_from_slice(position);
        if has_normals {
            normals.extend_from_slice(&mesh.normals[start..start + 3]);
        }
    }
    (positions, normals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{executor::block_on, StreamExt};
    use std::io::Write;

    const QUAD: &str = "\
o floor
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
f 1 2 3 4
";

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("roomwalk-{}-{}.obj", name, std::process::id()));
        let mut file = File::create(&path).expect("create temp obj");
        file.write_all(contents.as_bytes()).expect("write temp obj");
        path
    }

    #[test]
    fn test_parse_quad_is_triangulated() {
        let model = parse_obj(Path::new("quad.obj"), QUAD.as_bytes()).expect("parse");
        assert_eq!(model.name, "quad");
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.meshes[0].name, "floor");
        assert_eq!(model.meshes[0].vertex_count(), 6);
        assert_eq!(model.meshes[0].index_count(), 6);
    }

    #[test]
    fn test_corners_are_not_shared() {
        let mut model = parse_obj(Path::new("quad.obj"), QUAD.as_bytes()).expect("parse");
        crate::gfx::scene::painter::paint_model(&mut model);

        let colors: Vec<[f32; 3]> = model.meshes[0].vertices().iter().map(|v| v.color).collect();
        let expected: Vec<[f32; 3]> = (0..6)
            .map(|i| crate::gfx::scene::painter::gradient_color(i, 6))
            .collect();
        assert_eq!(colors, expected);
    }

    #[test]
    fn test_missing_normals_are_flat_per_face() {
        // Two faces folded along the x axis
        let folded = "v 0 0 0\nv 1 0 0\nv 1 0 1\nv 1 1 -1\nf 1 2 3\nf 1 4 2\n";
        let model = parse_obj(Path::new("folded.obj"), folded.as_bytes()).expect("parse");
        let vertices = model.meshes[0].vertices();
        assert_eq!(vertices.len(), 6);
        for face in vertices.chunks_exact(3) {
            assert!(face.iter().all(|v| v.normal == face[0].normal));
        }
        assert_ne!(vertices[0].normal, vertices[3].normal);
    }

    #[test]
    fn test_obj_normals_follow_their_corners() {
        let lit = "v 0 0 0\nv 1 0 0\nv 0 0 1\nvn 0 1 0\nf 1//1 3//1 2//1\n";
        let model = parse_obj(Path::new("lit.obj"), lit.as_bytes()).expect("parse");
        assert!(model.meshes[0].vertices().iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_load_streams_progress_then_model() {
        let path = write_temp("stream", QUAD);
        let events: Vec<LoadEvent> = block_on(ModelLoader::load(&path).collect());
        let _ = std::fs::remove_file(&path);

        let (last, rest) = events.split_last().expect("at least one event");
        assert!(matches!(last, LoadEvent::Loaded(model) if model.vertex_count() == 6));
        assert!(!rest.is_empty());
        for event in rest {
            assert!(matches!(event, LoadEvent::Progress(f) if (0.0..=1.0).contains(f)));
        }
        assert!(matches!(rest.last(), Some(LoadEvent::Progress(f)) if *f == 1.0));
    }

    #[test]
    fn test_missing_file_fails_without_panicking() {
        let path = std::env::temp_dir().join("roomwalk-definitely-missing.obj");
        let events: Vec<LoadEvent> = block_on(ModelLoader::load(&path).collect());
        assert_eq!(events.len(), 1);
        match &events[0] {
            LoadEvent::Failed(error @ LoadError::Io { .. }) => assert_eq!(error.path(), path.as_path()),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
