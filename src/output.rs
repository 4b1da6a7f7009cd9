//! Result types and the downloadable files derived from them.

use crate::chain::ChainStep;
use crate::error::Idea2AppError;
use crate::pipeline::fields::FieldSet;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Suggested filename for the refined description.
pub const REFINED_DESCRIPTION_FILE: &str = "refined_app_description.txt";
/// Suggested filename for the UI design narrative.
pub const UI_DESIGN_FILE: &str = "ui_design_description.txt";
/// Suggested filename for the Flutter skeleton.
pub const FLUTTER_FILE: &str = "app_ui.dart";
/// Suggested filename for the React Native skeleton.
pub const REACT_NATIVE_FILE: &str = "AppComponent.jsx";

/// Every artifact the chain produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainArtifacts {
    pub initial_description: String,
    pub refined_description: String,
    pub ui_design: String,
    pub image_summary: String,
    /// Hosted mockup URL; referenced, never downloaded.
    pub image_url: String,
    pub flutter_code: String,
    pub react_native_code: String,
}

/// Wall-clock time of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepTiming {
    pub step: ChainStep,
    pub duration_ms: u64,
}

/// Timing for a whole chain run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainStats {
    /// Completed steps in completion order.
    pub steps: Vec<StepTiming>,
    pub total_duration_ms: u64,
}

/// What [`crate::chain::run_chain`] returns.
#[derive(Debug, Clone, Serialize)]
pub struct ChainOutput {
    pub artifacts: ChainArtifacts,
    pub stats: ChainStats,
}

/// What the top-level `generate*` functions return.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    pub fields: FieldSet,
    pub artifacts: ChainArtifacts,
    pub stats: ChainStats,
}

/// One plain-text download: suggested filename plus content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Download<'a> {
    pub label: &'static str,
    pub file_name: &'static str,
    pub content: &'a str,
}

impl ChainArtifacts {
    /// The four text downloads, in display order.
    pub fn downloads(&self) -> [Download<'_>; 4] {
        [
            Download {
                label: "Refined Description",
                file_name: REFINED_DESCRIPTION_FILE,
                content: &self.refined_description,
            },
            Download {
                label: "UI Design Description",
                file_name: UI_DESIGN_FILE,
                content: &self.ui_design,
            },
            Download {
                label: "Flutter Code",
                file_name: FLUTTER_FILE,
                content: &self.flutter_code,
            },
            Download {
                label: "React Native Code",
                file_name: REACT_NATIVE_FILE,
                content: &self.react_native_code,
            },
        ]
    }

    /// Write every download into `dir`, creating it if needed.
    ///
    /// Each file is written to a temp file in `dir` and then renamed into
    /// place, so a crash never leaves a half-written download behind.
    pub fn write_downloads(&self, dir: &Path) -> Result<Vec<PathBuf>, Idea2AppError> {
        std::fs::create_dir_all(dir).map_err(|e| Idea2AppError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut written = Vec::with_capacity(4);
        for download in self.downloads() {
            let path = dir.join(download.file_name);
            write_atomic(&path, dir, download.content)?;
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

fn write_atomic(path: &Path, dir: &Path, content: &str) -> Result<(), Idea2AppError> {
    let fail = |source: std::io::Error| Idea2AppError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(content.as_bytes()).map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifacts() -> ChainArtifacts {
        ChainArtifacts {
            initial_description: "initial".into(),
            refined_description: "refined".into(),
            ui_design: "ui".into(),
            image_summary: "summary".into(),
            image_url: "https://img.example/mock.png".into(),
            flutter_code: "void main() {}".into(),
            react_native_code: "export default function App() {}".into(),
        }
    }

    #[test]
    fn download_filenames_are_fixed() {
        let a = artifacts();
        let names: Vec<_> = a.downloads().iter().map(|d| d.file_name).collect();
        assert_eq!(
            names,
            vec![
                "refined_app_description.txt",
                "ui_design_description.txt",
                "app_ui.dart",
                "AppComponent.jsx"
            ]
        );
        assert_eq!(a.downloads()[2].content, "void main() {}");
    }

    #[test]
    fn write_downloads_creates_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let written = artifacts().write_downloads(&out).unwrap();

        assert_eq!(written.len(), 4);
        assert_eq!(
            std::fs::read_to_string(out.join(UI_DESIGN_FILE)).unwrap(),
            "ui"
        );
        assert_eq!(
            std::fs::read_to_string(out.join(REACT_NATIVE_FILE)).unwrap(),
            "export default function App() {}"
        );
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 4);
    }

    #[test]
    fn write_downloads_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FLUTTER_FILE), "old").unwrap();
        artifacts().write_downloads(dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join(FLUTTER_FILE)).unwrap(),
            "void main() {}"
        );
    }
}
