//! Scene manifest loading and vehicle setup

mod scene;

pub use scene::{MeshBounds, SceneCamera, SceneManifest, SceneTransform, SetupError};
