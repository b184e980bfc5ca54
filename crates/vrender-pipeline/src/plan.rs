//! Asset plan: the indexed list of fetch+normalize jobs for one request.
//!
//! The plan's index order is what the controller reassembles by, so
//! concurrent completion order can never affect final scene ordering.

use vrender_models::RenderRequest;

/// What role a fetched asset plays in the composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Optional cover clip or still image, always first in the plan.
    Cover,
    /// A scene's video track.
    SceneVideo { scene: usize },
    /// A scene's narration audio track.
    SceneAudio { scene: usize },
    /// Background music, always last in the plan.
    Music,
}

impl AssetKind {
    /// Whether normalization treats this asset as audio.
    pub fn is_audio(&self) -> bool {
        matches!(self, AssetKind::SceneAudio { .. } | AssetKind::Music)
    }

    /// Extension of the normalized output.
    pub fn normalized_ext(&self) -> &'static str {
        if self.is_audio() {
            "m4a"
        } else {
            "mp4"
        }
    }

    /// Extension used for the fetched file when the URL gives no hint.
    fn default_fetch_ext(&self) -> &'static str {
        match self {
            AssetKind::Cover | AssetKind::SceneVideo { .. } => "mp4",
            AssetKind::SceneAudio { .. } => "wav",
            AssetKind::Music => "mp3",
        }
    }
}

/// One fetch+normalize job.
#[derive(Debug, Clone)]
pub struct AssetJob {
    /// Position in the plan; keys every scratch path for this asset.
    pub index: usize,
    pub kind: AssetKind,
    pub url: String,
    /// Extension for the fetched file.
    pub fetch_ext: String,
}

/// Lay out the fetch+normalize jobs for a request in a fixed order:
/// cover (if present), then each scene's video and audio pair in request
/// order, then the background music.
pub fn plan_assets(request: &RenderRequest) -> Vec<AssetJob> {
    let mut jobs = Vec::with_capacity(request.asset_count());

    if let Some(cover) = &request.cover {
        jobs.push(AssetJob {
            index: jobs.len(),
            kind: AssetKind::Cover,
            url: cover.as_str().to_string(),
            fetch_ext: cover
                .extension()
                .unwrap_or_else(|| AssetKind::Cover.default_fetch_ext().to_string()),
        });
    }

    for (scene, s) in request.scenes.iter().enumerate() {
        let video_kind = AssetKind::SceneVideo { scene };
        jobs.push(AssetJob {
            index: jobs.len(),
            kind: video_kind,
            url: s.video.as_str().to_string(),
            fetch_ext: s
                .video
                .extension()
                .unwrap_or_else(|| video_kind.default_fetch_ext().to_string()),
        });

        let audio_kind = AssetKind::SceneAudio { scene };
        jobs.push(AssetJob {
            index: jobs.len(),
            kind: audio_kind,
            url: s.audio.as_str().to_string(),
            fetch_ext: s
                .audio
                .extension()
                .unwrap_or_else(|| audio_kind.default_fetch_ext().to_string()),
        });
    }

    jobs.push(AssetJob {
        index: jobs.len(),
        kind: AssetKind::Music,
        url: request.background_music.as_str().to_string(),
        fetch_ext: request
            .background_music
            .extension()
            .unwrap_or_else(|| AssetKind::Music.default_fetch_ext().to_string()),
    });

    jobs
}
