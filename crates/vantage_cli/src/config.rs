//! Vantage configuration file handling
//!
//! `vantage.toml` holds the view controller settings plus a list of static
//! frames used to resolve frame ids in trajectories:
//!
//! ```toml
//! [view]
//! target_frame = "base_link"
//! default_transition_time = 1.0
//!
//! [frames.base_link]
//! position = [1.0, 0.0, 0.0]
//! rpy = [0.0, 0.0, 1.5708]
//! ```

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use vantage_camera::{StaticFrameGraph, ViewControllerConfig};
use vantage_core::{Quat, RigidTransform, Vec3};

/// Contents of `vantage.toml`
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub view: ViewControllerConfig,
    /// Static frames by name, each given in the fixed frame
    #[serde(default)]
    pub frames: FxHashMap<String, StaticFrame>,
}

/// A static frame: translation plus roll/pitch/yaw in radians
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct StaticFrame {
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub rpy: [f32; 3],
}

impl StaticFrame {
    pub fn transform(&self) -> RigidTransform {
        let [roll, pitch, yaw] = self.rpy;
        RigidTransform::new(Vec3::from(self.position), Quat::from_rpy(roll, pitch, yaw))
    }
}

impl CliConfig {
    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

        let config: CliConfig =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    pub fn frame_graph(&self) -> StaticFrameGraph {
        let mut graph = StaticFrameGraph::new();
        for (name, frame) in &self.frames {
            graph.insert(name.clone(), frame.transform());
        }
        graph
    }
}
