use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::{EditorSnapshot, JobAnalysis};

pub fn save_json<T: Serialize>(data: &T, path: &Path) -> anyhow::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(data)?.as_bytes())?;
    println!("✅ {} written.", path.display());
    Ok(())
}

pub fn save_text(content: &str, path: &Path) -> anyhow::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    println!("✅ {} written.", path.display());
    Ok(())
}

/// Committed view of a job wrapped with export metadata.
pub fn export_envelope(snapshot: &EditorSnapshot) -> serde_json::Value {
    json!({
        "exported_at": Utc::now().to_rfc3339(),
        "job_id": snapshot.job_id,
        "title": snapshot.committed.title,
        "description": snapshot.committed.description,
        "files": snapshot.committed.file_names(),
    })
}

pub fn render_analysis(title: &str, analysis: &JobAnalysis) -> String {
    let mut out = format!("# {title}\n");
    for (heading, items) in analysis.sections() {
        out.push_str(&format!("\n## {heading}\n"));
        if items.is_empty() {
            out.push_str("- N/A\n");
        }
        for item in items {
            out.push_str(&format!("- {item}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileAttachment, JobFields, Mode};

    #[test]
    fn envelope_lists_committed_file_names() {
        let committed = JobFields {
            title: "Backend Engineer".to_string(),
            description: "Go/Rust".to_string(),
            files: vec![FileAttachment::known(1, "resume1.pdf")],
        };
        let snapshot = EditorSnapshot {
            job_id: Some("42".to_string()),
            mode: Mode::Viewing,
            draft: committed.clone(),
            committed,
        };

        let value = export_envelope(&snapshot);
        assert_eq!(value["job_id"], "42");
        assert_eq!(value["files"], json!(["resume1.pdf"]));
        assert!(value["exported_at"].is_string());
    }

    #[test]
    fn analysis_marks_empty_sections() {
        let analysis = JobAnalysis {
            technical_skill: vec!["Rust".to_string(), "SQL".to_string()],
            ..JobAnalysis::default()
        };
        let text = render_analysis("Backend", &analysis);
        assert!(text.starts_with("# Backend\n"));
        assert!(text.contains("## Technical skills\n- Rust\n- SQL\n"));
        assert!(text.contains("## Degree\n- N/A\n"));
    }

    #[test]
    fn writes_files_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        save_json(&json!({"title": "x"}), &path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["title"], "x");
    }
}
