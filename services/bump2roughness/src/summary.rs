//! Run summary printed with `--summary-json`.

use roughness_engine::{OutputReport, Renderer};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub renderer: Renderer,
    pub unit_size: f32,
    pub maps: usize,
    pub outputs: Vec<OutputReport>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use texture_io::OutputMode;

    #[test]
    fn test_summary_json_shape() {
        let summary = RunSummary {
            run_id: Uuid::nil(),
            renderer: Renderer::RenderMan,
            unit_size: 1.0,
            maps: 2,
            outputs: vec![OutputReport {
                name: "specular".into(),
                output: PathBuf::from("rough"),
                mode: OutputMode::IndividualLevels,
                resolution: 4,
                level_count: 3,
                maps: 2,
                files: vec![PathBuf::from("rough_0.png")],
                elapsed_ms: 5,
            }],
            elapsed_ms: 7,
        };

        let value: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(value["run_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(value["renderer"], "renderman");
        assert_eq!(value["outputs"][0]["mode"], "individual_levels");
        assert_eq!(value["outputs"][0]["files"][0], "rough_0.png");
    }
}
