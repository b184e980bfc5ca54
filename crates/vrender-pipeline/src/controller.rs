//! The pipeline controller.
//!
//! Stages run strictly forward; the first failure aborts the render and the
//! workspace is torn down exactly once on every exit path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use vrender_media::{
    build_background_track, concat_clips, download_asset, expand_still_image, merge_scene,
    mix_with_background, normalize_audio, normalize_cover, normalize_video, probe_media,
    FfmpegRunner,
};
use vrender_models::{CanonicalProfile, RenderRequest, RequestId};
use vrender_storage::R2Client;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult, TranscodeStage};
use crate::plan::{plan_assets, AssetJob, AssetKind};
use crate::workspace::Workspace;

/// Pipeline stages, in execution order. Transitions are strictly forward;
/// any failure jumps straight to `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Created,
    Fetching,
    Normalizing,
    Composing,
    Concatenating,
    BuildingAudioTrack,
    Mixing,
    Publishing,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Created => "created",
            PipelineStage::Fetching => "fetching",
            PipelineStage::Normalizing => "normalizing",
            PipelineStage::Composing => "composing",
            PipelineStage::Concatenating => "concatenating",
            PipelineStage::BuildingAudioTrack => "building-audio-track",
            PipelineStage::Mixing => "mixing",
            PipelineStage::Publishing => "publishing",
            PipelineStage::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The render pipeline: fetch, normalize, compose, concat, background
/// track, mix, publish.
pub struct RenderPipeline {
    config: PipelineConfig,
    profile: CanonicalProfile,
    runner: FfmpegRunner,
    http: reqwest::Client,
    storage: Arc<R2Client>,
}

impl RenderPipeline {
    /// Create a pipeline bound to a storage sink.
    pub fn new(
        config: PipelineConfig,
        profile: CanonicalProfile,
        storage: Arc<R2Client>,
    ) -> PipelineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| PipelineError::Workspace(std::io::Error::other(e)))?;
        let runner = FfmpegRunner::new(config.ffmpeg_timeout);

        Ok(Self {
            config,
            profile,
            runner,
            http,
            storage,
        })
    }

    /// Render a validated request under a fresh request ID.
    ///
    /// Returns the published artifact's public URL.
    pub async fn render(&self, request: &RenderRequest) -> PipelineResult<String> {
        let request_id = RequestId::new();
        self.render_with_id(request, &request_id).await
    }

    /// Render under an explicit request ID.
    pub async fn render_with_id(
        &self,
        request: &RenderRequest,
        request_id: &RequestId,
    ) -> PipelineResult<String> {
        let workspace = Workspace::create(&self.config.work_root, request_id).await?;
        info!(
            request_id = %request_id,
            stage = %PipelineStage::Created,
            "Workspace allocated at {}",
            workspace.path().display()
        );

        let result = self.run_stages(request, request_id, &workspace).await;

        // Teardown runs exactly once, on success and on abort alike.
        workspace.cleanup().await;

        match &result {
            Ok(url) => info!(
                request_id = %request_id,
                stage = %PipelineStage::Done,
                "Render complete: {}",
                url
            ),
            Err(e) => warn!(
                request_id = %request_id,
                stage = %PipelineStage::Done,
                "Render aborted: {}",
                e
            ),
        }

        result
    }

    async fn run_stages(
        &self,
        request: &RenderRequest,
        request_id: &RequestId,
        workspace: &Workspace,
    ) -> PipelineResult<String> {
        // Fetch + normalize, bounded parallelism, reassembled by plan index.
        info!(
            request_id = %request_id,
            stage = %PipelineStage::Fetching,
            "Preparing {} assets",
            request.asset_count()
        );
        let jobs = plan_assets(request);
        let normalized = self.prepare_assets(workspace, jobs).await?;

        // Per-scene merge of narration audio onto the normalized video.
        info!(request_id = %request_id, stage = %PipelineStage::Composing, "Merging {} scenes", request.scenes.len());
        let cover_offset = usize::from(request.cover.is_some());
        let mut clips: Vec<PathBuf> = Vec::with_capacity(cover_offset + request.scenes.len());

        // The cover bypasses scene composition; it already carries its
        // silent audio track from normalization.
        if cover_offset == 1 {
            clips.push(normalized[0].clone());
        }

        for scene in 0..request.scenes.len() {
            let video = &normalized[cover_offset + scene * 2];
            let audio = &normalized[cover_offset + scene * 2 + 1];
            let clip = workspace.indexed_path("clip", scene, "mp4");
            merge_scene(&self.runner, video, audio, &clip, &self.profile.audio)
                .await
                .map_err(|e| PipelineError::transcode(TranscodeStage::Compose, e))?;
            clips.push(clip);
        }

        // Ordered concatenation: cover first, then scenes in request order.
        info!(request_id = %request_id, stage = %PipelineStage::Concatenating, "Concatenating {} clips", clips.len());
        let merged = workspace.file("merged.mp4");
        concat_clips(
            &self.runner,
            &clips,
            workspace.file("concat.txt"),
            &merged,
        )
        .await
        .map_err(|e| PipelineError::transcode(TranscodeStage::Concat, e))?;

        // One probe resolves both the target duration and the audio state.
        let merged_info = probe_media(&merged, self.config.probe_timeout)
            .await
            .map_err(PipelineError::from_probe)?;
        if merged_info.duration <= 0.0 {
            return Err(PipelineError::DurationProbeFailed(format!(
                "merged video reports no duration: {}",
                merged.display()
            )));
        }

        info!(
            request_id = %request_id,
            stage = %PipelineStage::BuildingAudioTrack,
            "Building background track for {:.3}s",
            merged_info.duration
        );
        let music = normalized
            .last()
            .ok_or_else(|| PipelineError::DurationProbeFailed("no assets prepared".to_string()))?;
        let background = workspace.file("bg_track.m4a");
        build_background_track(
            &self.runner,
            music,
            &background,
            merged_info.duration,
            &self.profile.audio,
        )
        .await
        .map_err(|e| PipelineError::transcode(TranscodeStage::BackgroundTrack, e))?;

        info!(
            request_id = %request_id,
            stage = %PipelineStage::Mixing,
            "Mixing ({:?})",
            merged_info.audio_presence()
        );
        let final_path = workspace.file("final.mp4");
        mix_with_background(
            &self.runner,
            &merged,
            &background,
            &final_path,
            merged_info.audio_presence(),
            &self.profile.audio,
        )
        .await
        .map_err(|e| PipelineError::transcode(TranscodeStage::Mix, e))?;

        info!(request_id = %request_id, stage = %PipelineStage::Publishing, "Publishing final artifact");
        let key = format!("videos/final_{}.mp4", request_id);
        self.storage
            .upload_file(&final_path, &key, "video/mp4")
            .await?;

        Ok(self.storage.public_url(&key))
    }

    /// Fetch and normalize every asset across a bounded worker pool.
    ///
    /// If any task fails, in-flight siblings run to completion but their
    /// results are discarded; the first error aborts the pipeline.
    async fn prepare_assets(
        &self,
        workspace: &Workspace,
        jobs: Vec<AssetJob>,
    ) -> PipelineResult<Vec<PathBuf>> {
        let total = jobs.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_fetch_parallel.max(1)));
        let mut tasks = JoinSet::new();

        for job in jobs {
            let semaphore = Arc::clone(&semaphore);
            let http = self.http.clone();
            let runner = self.runner.clone();
            let profile = self.profile.clone();
            let probe_timeout = self.config.probe_timeout;
            let fetch_path = workspace.indexed_path("fetch", job.index, &job.fetch_ext);
            let norm_path =
                workspace.indexed_path("norm", job.index, job.kind.normalized_ext());

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return (
                            job.index,
                            Err(PipelineError::Workspace(std::io::Error::other(e))),
                        )
                    }
                };
                let result = prepare_asset(
                    &http,
                    &runner,
                    probe_timeout,
                    &profile,
                    &job,
                    &fetch_path,
                    &norm_path,
                )
                .await;
                (job.index, result)
            });
        }

        let mut prepared: Vec<Option<PathBuf>> = vec![None; total];
        let mut first_error: Option<PipelineError> = None;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(path))) => prepared[index] = Some(path),
                Ok((index, Err(e))) => {
                    warn!("Asset {} failed: {}", index, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(PipelineError::Workspace(std::io::Error::other(e)));
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        prepared
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                p.ok_or_else(|| {
                    PipelineError::Workspace(std::io::Error::other(format!(
                        "asset {} produced no result",
                        i
                    )))
                })
            })
            .collect()
    }
}

/// Fetch one asset and rewrite it into the canonical profile.
async fn prepare_asset(
    http: &reqwest::Client,
    runner: &FfmpegRunner,
    probe_timeout: std::time::Duration,
    profile: &CanonicalProfile,
    job: &AssetJob,
    fetch_path: &Path,
    norm_path: &Path,
) -> PipelineResult<PathBuf> {
    download_asset(http, &job.url, fetch_path)
        .await
        .map_err(PipelineError::from_fetch)?;

    match job.kind {
        AssetKind::Cover => {
            // A still-image cover is expanded into a fixed-duration video;
            // either way the cover gains a silent canonical audio track so
            // the concat inputs share one stream layout.
            let info = probe_media(fetch_path, probe_timeout)
                .await
                .map_err(|e| PipelineError::transcode(TranscodeStage::Normalize, e))?;
            if info.is_still_image() {
                expand_still_image(runner, fetch_path, norm_path, &profile.video, &profile.audio)
                    .await
                    .map_err(|e| PipelineError::transcode(TranscodeStage::Normalize, e))?;
            } else {
                normalize_cover(runner, fetch_path, norm_path, &profile.video, &profile.audio)
                    .await
                    .map_err(|e| PipelineError::transcode(TranscodeStage::Normalize, e))?;
            }
        }
        AssetKind::SceneVideo { .. } => {
            normalize_video(runner, fetch_path, norm_path, &profile.video)
                .await
                .map_err(|e| PipelineError::transcode(TranscodeStage::Normalize, e))?;
        }
        AssetKind::SceneAudio { .. } | AssetKind::Music => {
            normalize_audio(runner, fetch_path, norm_path, &profile.audio)
                .await
                .map_err(|e| PipelineError::transcode(TranscodeStage::Normalize, e))?;
        }
    }

    Ok(norm_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vrender_models::RenderRequestBody;
    use vrender_storage::{R2Client, R2Config};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_storage() -> Arc<R2Client> {
        Arc::new(R2Client::new(R2Config {
            endpoint_url: "https://acc.r2.cloudflarestorage.com".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "renders".to_string(),
            region: "auto".to_string(),
            public_base_url: "https://media.example.com".to_string(),
        }))
    }

    fn request_against(base: &str) -> RenderRequest {
        let body: RenderRequestBody = serde_json::from_value(serde_json::json!({
            "input": {
                "scenes": [
                    { "video_url": format!("{base}/v0.mp4"), "audio_url": format!("{base}/a0.wav") }
                ],
                "background_music_url": format!("{base}/bg.mp3"),
            }
        }))
        .unwrap();
        RenderRequest::from_body(body).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_asset_aborts_and_removes_workspace() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let work_root = TempDir::new().unwrap();
        let pipeline = RenderPipeline::new(
            PipelineConfig {
                work_root: work_root.path().to_path_buf(),
                ..PipelineConfig::default()
            },
            CanonicalProfile::default(),
            test_storage(),
        )
        .unwrap();

        let err = pipeline
            .render(&request_against(&server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::AssetUnreachable(_)));

        // The request's workspace must not outlive the call.
        let mut entries = tokio::fs::read_dir(work_root.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stage_order_is_strictly_forward() {
        let stages = [
            PipelineStage::Created,
            PipelineStage::Fetching,
            PipelineStage::Normalizing,
            PipelineStage::Composing,
            PipelineStage::Concatenating,
            PipelineStage::BuildingAudioTrack,
            PipelineStage::Mixing,
            PipelineStage::Publishing,
            PipelineStage::Done,
        ];
        let names: Vec<_> = stages.iter().map(|s| s.as_str()).collect();
        assert_eq!(names.first(), Some(&"created"));
        assert_eq!(names.last(), Some(&"done"));
        // Stage names are unique, so log lines identify stages unambiguously.
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }
}
