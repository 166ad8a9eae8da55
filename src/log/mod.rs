use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::prompt::PromptPair;
use crate::wire::{GenerateRequest, GenerationResult};

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: PathBuf,
    pub response: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestArtifact<'a> {
    run_id: Uuid,
    request: &'a GenerateRequest,
    system_prompt: &'a str,
    user_prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseArtifact<'a> {
    run_id: Uuid,
    saved_at: DateTime<Utc>,
    model: &'a str,
    result: &'a GenerationResult,
}

fn run_dir(root: &Path, run: Uuid) -> PathBuf {
    root.join(run.to_string())
}

/// Writes `request.json` and `response.json` for one CLI run.
pub fn save_run(
    root: &Path,
    run: Uuid,
    req: &GenerateRequest,
    prompt: &PromptPair,
    model: &str,
    result: &GenerationResult,
) -> anyhow::Result<SavedPaths> {
    let dir = run_dir(root, run);
    fs::create_dir_all(&dir)?;

    let request = dir.join("request.json");
    fs::write(
        &request,
        to_string_pretty(&RequestArtifact {
            run_id: run,
            request: req,
            system_prompt: &prompt.system,
            user_prompt: &prompt.user,
        })?,
    )?;

    let response = dir.join("response.json");
    fs::write(
        &response,
        to_string_pretty(&ResponseArtifact { run_id: run, saved_at: Utc::now(), model, result })?,
    )?;

    tracing::debug!("saved run artifacts in {}", dir.display());
    Ok(SavedPaths { dir, request, response })
}
