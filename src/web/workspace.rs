//! Per-session UI state: palette choice, results, overlay, in-flight flag.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tower_sessions::Session;
use tracing::debug;

use super::csrf::generate_token;
use crate::constants::WORKSPACE_IDLE_MINUTES;
use crate::error::LogoError;
use crate::generator::ImageGenerator;
use crate::orchestrator::{GenerationOrchestrator, GenerationRequest};
use crate::palette::PaletteSelector;
use crate::presenter::{Download, ResultPresenter};

const WORKSPACE_ID_KEY: &str = "workspace_id";

/// Last values typed into the form, so re-rendering keeps them. The
/// description goes into the prompt exactly as typed.
#[derive(Clone, Debug, Default)]
pub(crate) struct FormDraft {
    pub(crate) description: String,
    pub(crate) industry: String,
    pub(crate) style: String,
}

impl FormDraft {
    pub(crate) fn new(description: &str, industry: &str, style: &str) -> Self {
        Self {
            description: description.to_string(),
            industry: industry.trim().to_string(),
            style: style.trim().to_string(),
        }
    }
}

/// A file released by a card's second click, fetched once by the next page.
#[derive(Debug)]
struct ReadyDownload {
    position: usize,
    download: Download,
    announced: bool,
}

#[derive(Debug)]
pub(crate) struct Workspace {
    pub(crate) palettes: PaletteSelector,
    pub(crate) presenter: ResultPresenter,
    pub(crate) orchestrator: GenerationOrchestrator,
    pub(crate) draft: FormDraft,
    /// flash flag left by a generation that finished after its request went away
    pub(crate) notice: Option<u16>,
    ready_download: Option<ReadyDownload>,
    last_seen: DateTime<Utc>,
}

impl Workspace {
    fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            palettes: PaletteSelector::default(),
            presenter: ResultPresenter::default(),
            orchestrator: GenerationOrchestrator::new(generator),
            draft: FormDraft::default(),
            notice: None,
            ready_download: None,
            last_seen: Utc::now(),
        }
    }

    /// Hides the previous results, overlay and any unfetched download.
    pub(crate) fn start_generation(&mut self) {
        self.presenter.clear();
        self.notice = None;
        self.ready_download = None;
    }

    pub(crate) fn offer_download(&mut self, position: usize, download: Download) {
        self.ready_download = Some(ReadyDownload {
            position,
            download,
            announced: false,
        });
    }

    /// Position of a prepared download the page has not pointed at yet.
    pub(crate) fn announce_download(&mut self) -> Option<usize> {
        let ready = self
            .ready_download
            .as_mut()
            .filter(|ready| !ready.announced)?;
        ready.announced = true;
        Some(ready.position)
    }

    /// Hands out the prepared file for `position`, once.
    pub(crate) fn take_download(&mut self, position: usize) -> Option<Download> {
        if self
            .ready_download
            .as_ref()
            .is_some_and(|ready| ready.position == position)
        {
            self.ready_download.take().map(|ready| ready.download)
        } else {
            None
        }
    }

    fn touch(&mut self) {
        self.last_seen = Utc::now();
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        !self.orchestrator.is_busy()
            && now - self.last_seen > Duration::minutes(WORKSPACE_IDLE_MINUTES)
    }

    /// The request for the current draft and palette.
    pub(crate) fn request(&self) -> GenerationRequest {
        GenerationRequest {
            description: self.draft.description.clone(),
            industry: self.draft.industry.clone(),
            style: self.draft.style.clone(),
            palette_name: self.palettes.current_selection().to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct WorkspaceStore {
    generator: Arc<dyn ImageGenerator>,
    workspaces: Arc<RwLock<HashMap<String, Arc<Mutex<Workspace>>>>>,
}

impl WorkspaceStore {
    pub(crate) fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            generator,
            workspaces: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Workspace bound to this session, created on first use.
    pub(crate) async fn for_session(
        &self,
        session: &Session,
    ) -> Result<Arc<Mutex<Workspace>>, LogoError> {
        let id = match session.get::<String>(WORKSPACE_ID_KEY).await? {
            Some(id) => id,
            None => {
                let id = generate_token();
                session.insert(WORKSPACE_ID_KEY, id.clone()).await?;
                id
            }
        };

        let workspace = {
            let mut workspaces = self.workspaces.write().await;
            evict_stale(&mut workspaces, Utc::now());
            workspaces
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(Workspace::new(self.generator.clone()))))
                .clone()
        };
        workspace.lock().await.touch();
        Ok(workspace)
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.workspaces.read().await.len()
    }
}

fn evict_stale(workspaces: &mut HashMap<String, Arc<Mutex<Workspace>>>, now: DateTime<Utc>) {
    let before = workspaces.len();
    // a workspace somebody holds right now is in use
    workspaces.retain(|_, workspace| match workspace.try_lock() {
        Ok(workspace) => !workspace.is_stale(now),
        Err(_) => true,
    });
    let evicted = before - workspaces.len();
    if evicted > 0 {
        debug!("Evicted {} idle workspaces", evicted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GenerationSlot, GeneratorError, ImageGenerationSpec};
    use async_trait::async_trait;

    struct NoopGenerator;

    #[async_trait]
    impl ImageGenerator for NoopGenerator {
        async fn generate(
            &self,
            _spec: &ImageGenerationSpec,
        ) -> Result<Vec<GenerationSlot>, GeneratorError> {
            Ok(Vec::new())
        }

        fn model(&self) -> &str {
            "noop"
        }
    }

    #[test]
    fn idle_workspaces_are_evicted() {
        let now = Utc::now();
        let mut fresh = Workspace::new(Arc::new(NoopGenerator));
        fresh.last_seen = now;
        let mut idle = Workspace::new(Arc::new(NoopGenerator));
        idle.last_seen = now - Duration::minutes(WORKSPACE_IDLE_MINUTES + 1);

        let mut workspaces = HashMap::new();
        workspaces.insert("fresh".to_string(), Arc::new(Mutex::new(fresh)));
        workspaces.insert("idle".to_string(), Arc::new(Mutex::new(idle)));

        evict_stale(&mut workspaces, now);
        assert!(workspaces.contains_key("fresh"));
        assert!(!workspaces.contains_key("idle"));
    }

    #[test]
    fn request_uses_draft_and_selected_palette() {
        let mut workspace = Workspace::new(Arc::new(NoopGenerator));
        workspace.draft = FormDraft::new(" eco-friendly coffee shop ", "Food & Beverage", "minimalist");
        workspace.palettes.select("Forest Green").unwrap();

        let request = workspace.request();
        assert_eq!(request.description, " eco-friendly coffee shop ");
        assert_eq!(request.industry, "Food & Beverage");
        assert_eq!(request.palette_name, "Forest Green");
    }

    #[test]
    fn prepared_download_is_announced_and_fetched_once() {
        let mut workspace = Workspace::new(Arc::new(NoopGenerator));
        workspace.offer_download(
            2,
            Download {
                filename: "logo-2.png".into(),
                content_type: "image/png",
                bytes: vec![1, 2, 3],
            },
        );

        assert_eq!(workspace.announce_download(), Some(2));
        assert_eq!(workspace.announce_download(), None);
        assert!(workspace.take_download(1).is_none());
        let download = workspace.take_download(2).unwrap();
        assert_eq!(download.filename, "logo-2.png");
        assert!(workspace.take_download(2).is_none());
    }

    #[test]
    fn new_generation_drops_unfetched_download() {
        let mut workspace = Workspace::new(Arc::new(NoopGenerator));
        workspace.offer_download(
            1,
            Download {
                filename: "logo-1.png".into(),
                content_type: "image/png",
                bytes: vec![1],
            },
        );
        workspace.notice = Some(2);
        workspace.start_generation();
        assert!(workspace.take_download(1).is_none());
        assert!(workspace.notice.is_none());
    }
}
