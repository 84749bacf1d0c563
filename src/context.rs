//! Application Context
//!
//! Owns the caches, the document store, collaborators and persisted
//! settings for one running service. Built once at startup and torn down
//! with [`AppContext::shutdown`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::caches::{ImageCache, OcrCache, TranslationCache};
use crate::collaborators::{
    tesseract_language, with_timeout, BubbleDetector, CompressedImage, DisabledDetector,
    ImageCompressor, OcrEngine, OcrResult, PassthroughCompressor, ProviderChain,
    TesseractEngine, Translation,
};
use crate::config::Config;
use crate::document::{
    DocumentStore, LanguagePair, MangaPage, SharedDocument, TextBox, TextBoxPatch,
    TranslationProject,
};
use crate::error::{AppError, Result};
use crate::history::EditAction;
use crate::persistence::{self, FileStore, KeyValueStore, Settings, PROJECT_KEY, SETTINGS_KEY};
use crate::pipeline::{PageOutcome, PageProcessor, PageResult};

/// Which cache to read through, and the inputs that form its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheRequest {
    Image {
        url: String,
        #[serde(default)]
        quality: Option<u8>,
    },
    Ocr {
        image_url: String,
        #[serde(default)]
        languages: Vec<String>,
    },
    Translation {
        text: String,
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        to: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Image(CompressedImage),
    Ocr(OcrResult),
    Translation(Translation),
}

/// External collaborators the context calls out to.
#[derive(Clone)]
pub struct Collaborators {
    pub ocr_engine: Arc<dyn OcrEngine>,
    pub detector: Arc<dyn BubbleDetector>,
    pub compressor: Arc<dyn ImageCompressor>,
    pub chain: ProviderChain,
}

impl Collaborators {
    /// Tesseract OCR, no bubble detector, local files as images and the
    /// offline dictionary for translation.
    pub fn local(config: &Config) -> Self {
        Self {
            ocr_engine: Arc::new(TesseractEngine::new(config.tesseract_cmd.clone())),
            detector: Arc::new(DisabledDetector),
            compressor: Arc::new(PassthroughCompressor),
            chain: ProviderChain::offline_only(),
        }
    }
}

pub struct AppContext {
    config: Config,
    images: ImageCache,
    ocr: OcrCache,
    translations: TranslationCache,
    document: SharedDocument,
    settings: RwLock<Settings>,
    collaborators: Collaborators,
    store: Arc<dyn KeyValueStore>,
    /// Cleared when an unreadable saved project could not be backed up
    project_writable: AtomicBool,
    /// Same for saved settings
    settings_writable: AtomicBool,
}

impl AppContext {
    pub fn new(config: Config, collaborators: Collaborators, store: Arc<dyn KeyValueStore>) -> Self {
        let settings = Settings::default();
        let project = TranslationProject::new(
            "Untitled",
            LanguagePair::new(&settings.source_language, &settings.target_language),
        );
        Self {
            images: ImageCache::new(config.image_cache()),
            ocr: OcrCache::new(config.ocr_cache()),
            translations: TranslationCache::new(config.translation_cache()),
            document: DocumentStore::new(project, config.max_history_steps).into_shared(),
            settings: RwLock::new(settings),
            collaborators,
            store,
            config,
            project_writable: AtomicBool::new(true),
            settings_writable: AtomicBool::new(true),
        }
    }

    /// Local collaborators with a file store under `DATA_DIR`.
    pub fn from_config(config: Config) -> Self {
        let collaborators = Collaborators::local(&config);
        let store = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::new(config, collaborators, store)
    }

    /// Starts the periodic expiry sweep on every cache.
    pub fn start_sweeps(&mut self) {
        let interval = self.config.sweep_interval();
        self.images.handle_mut().start_sweep(interval);
        self.ocr.handle_mut().start_sweep(interval);
        self.translations.handle_mut().start_sweep(interval);
    }

    /// Restores settings and the saved project, if any.
    ///
    /// A payload that cannot be read is copied to its backup key before
    /// anything overwrites it. If that copy fails, saves to that key stay
    /// off for this run. The first load error is returned either way.
    pub async fn restore(&self) -> Result<()> {
        let mut first_error = None;

        match persistence::load_settings(self.store.as_ref()).await {
            Ok(settings) => *self.settings.write().await = settings,
            Err(err) => {
                self.set_aside(SETTINGS_KEY, &self.settings_writable).await;
                first_error.get_or_insert(err);
            }
        }

        match persistence::load_project(self.store.as_ref()).await {
            Ok(Some(project)) => self.document.write().await.replace_project(project),
            Ok(None) => {}
            Err(err) => {
                self.set_aside(PROJECT_KEY, &self.project_writable).await;
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    async fn set_aside(&self, key: &str, writable: &AtomicBool) {
        if let Err(err) = persistence::back_up_raw(self.store.as_ref(), key).await {
            warn!(key, error = %err, "could not back up unreadable saved state, saving disabled");
            writable.store(false, Ordering::SeqCst);
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> SharedDocument {
        self.document.clone()
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn ocr(&self) -> &OcrCache {
        &self.ocr
    }

    pub fn translations(&self) -> &TranslationCache {
        &self.translations
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn update_settings(&self, settings: Settings) -> Result<Settings> {
        if let Some(msg) = settings.validate() {
            return Err(AppError::InvalidRequest(msg));
        }
        if self.settings_writable.load(Ordering::SeqCst) {
            persistence::save_settings(self.store.as_ref(), &settings).await?;
        } else {
            warn!("settings changed in memory only; saved settings are unreadable");
        }
        *self.settings.write().await = settings.clone();
        Ok(settings)
    }

    fn processor<'a>(&'a self, chain: &'a ProviderChain, settings: &Settings) -> PageProcessor<'a> {
        PageProcessor {
            images: &self.images,
            ocr: &self.ocr,
            translations: &self.translations,
            ocr_engine: self.collaborators.ocr_engine.as_ref(),
            detector: self.collaborators.detector.as_ref(),
            compressor: self.collaborators.compressor.as_ref(),
            chain,
            timeout: self.config.external_timeout(),
            translate: settings.auto_translate,
        }
    }

    fn chain_for(&self, settings: &Settings) -> ProviderChain {
        self.collaborators
            .chain
            .clone()
            .reordered(&settings.provider_order)
    }

    // == Cache Access ==
    /// Reads through the requested cache, computing and storing on a miss.
    pub async fn fetch_cached(&self, request: CacheRequest) -> Result<CachedValue> {
        let settings = self.settings().await;
        let chain = self.chain_for(&settings);
        let timeout = self.config.external_timeout();

        match request {
            CacheRequest::Image { url, quality } => {
                let quality = quality.unwrap_or(settings.image_quality);
                let image = self
                    .processor(&chain, &settings)
                    .compressed_image(&url, quality)
                    .await?;
                Ok(CachedValue::Image(image))
            }
            CacheRequest::Ocr { image_url, languages } => {
                let languages = if languages.is_empty() {
                    vec![tesseract_language(&settings.source_language)]
                } else {
                    languages
                };
                let result = with_timeout(
                    timeout,
                    "ocr",
                    self.ocr.get_or_recognize(
                        self.collaborators.ocr_engine.as_ref(),
                        &image_url,
                        &languages,
                    ),
                )
                .await?;
                Ok(CachedValue::Ocr(result))
            }
            CacheRequest::Translation { text, from, to } => {
                let from = from.unwrap_or(settings.source_language);
                let to = to.unwrap_or(settings.target_language);
                let translation = with_timeout(
                    timeout,
                    "translation",
                    self.translations.get_or_translate(&chain, &text, &from, &to),
                )
                .await?;
                Ok(CachedValue::Translation(translation))
            }
        }
    }

    // == Document Edits ==
    pub async fn language(&self) -> LanguagePair {
        self.document.read().await.project().language()
    }

    pub async fn add_page(&self, page: MangaPage) -> Result<MangaPage> {
        let page = self.document.write().await.add_page(page)?.clone();
        self.persist().await;
        Ok(page)
    }

    pub async fn add_text_box(&self, page_id: Uuid, text_box: TextBox) -> Result<EditAction> {
        let action = self.document.write().await.add_text_box(page_id, text_box)?;
        self.persist().await;
        Ok(action)
    }

    pub async fn delete_text_box(&self, page_id: Uuid, text_box_id: Uuid) -> Result<EditAction> {
        let action = self
            .document
            .write()
            .await
            .delete_text_box(page_id, text_box_id)?;
        self.persist().await;
        Ok(action)
    }

    pub async fn clear_history(&self) {
        self.document.write().await.clear_history();
    }

    pub async fn apply_edit(
        &self,
        page_id: Uuid,
        text_box_id: Uuid,
        patch: TextBoxPatch,
    ) -> Result<EditAction> {
        let action = self
            .document
            .write()
            .await
            .apply_edit(page_id, text_box_id, patch)?;
        self.persist().await;
        Ok(action)
    }

    pub async fn undo(&self) -> Result<Option<EditAction>> {
        let action = self.document.write().await.undo()?;
        if action.is_some() {
            self.persist().await;
        }
        Ok(action)
    }

    pub async fn redo(&self) -> Result<Option<EditAction>> {
        let action = self.document.write().await.redo()?;
        if action.is_some() {
            self.persist().await;
        }
        Ok(action)
    }

    /// Runs the pipeline on a stored page and replaces its boxes with the
    /// result.
    pub async fn process_page(&self, page_id: Uuid) -> Result<PageOutcome> {
        let page = self.document.read().await.page(page_id)?.clone();
        let settings = self.settings().await;
        let chain = self.chain_for(&settings);
        let pair = self.document.read().await.project().language();
        let languages = vec![tesseract_language(&pair.from)];

        let outcome = self
            .processor(&chain, &settings)
            .process_page(&page, &languages, &pair)
            .await?;

        self.document
            .write()
            .await
            .replace_page_boxes(page_id, outcome.boxes.clone())?;
        self.persist().await;
        Ok(outcome)
    }

    /// Runs the pipeline over several stored pages. A page that is missing
    /// or fails is reported in place and the rest still run. Processed pages
    /// get their boxes replaced.
    pub async fn process_pages(&self, page_ids: &[Uuid]) -> Vec<PageResult> {
        let settings = self.settings().await;
        let chain = self.chain_for(&settings);
        let (pair, lookups) = {
            let document = self.document.read().await;
            let lookups: Vec<_> = page_ids
                .iter()
                .map(|&id| document.page(id).cloned().map_err(|err| (id, err)))
                .collect();
            (document.project().language(), lookups)
        };
        let languages = vec![tesseract_language(&pair.from)];

        let pages: Vec<MangaPage> = lookups
            .iter()
            .filter_map(|lookup| lookup.as_ref().ok().cloned())
            .collect();
        let mut outcomes = self
            .processor(&chain, &settings)
            .process_batch(&pages, &languages, &pair)
            .await
            .into_iter();

        let mut results = Vec::with_capacity(page_ids.len());
        let mut changed = false;
        {
            let mut document = self.document.write().await;
            for lookup in lookups {
                let (page_id, processed) = match lookup {
                    Err((page_id, err)) => (page_id, Err(err)),
                    Ok(page) => match outcomes.next() {
                        Some(processed) => (page.id, processed),
                        None => (page.id, Err(AppError::Internal("batch result missing".to_string()))),
                    },
                };
                let result = processed.and_then(|outcome| {
                    document.replace_page_boxes(page_id, outcome.boxes.clone())?;
                    Ok(outcome)
                });
                results.push(match result {
                    Ok(outcome) => {
                        changed = true;
                        PageResult::Processed(outcome)
                    }
                    Err(err) => PageResult::failed(page_id, &err),
                });
            }
        }

        if changed {
            self.persist().await;
        }
        info!(
            pages = results.len(),
            failed = results.iter().filter(|r| matches!(r, PageResult::Failed { .. })).count(),
            "batch processed"
        );
        results
    }

    /// Saves the project. Failures are logged; in-memory state stays
    /// authoritative.
    pub async fn persist(&self) {
        if !self.project_writable.load(Ordering::SeqCst) {
            warn!("not saving project; the saved copy is unreadable and has no backup");
            return;
        }
        let project = self.document.read().await.project().clone();
        if let Err(err) = persistence::save_project(self.store.as_ref(), &project).await {
            warn!(error = %err, "failed to persist project");
        }
    }

    /// Saves the project and destroys every cache.
    pub async fn shutdown(self) {
        self.persist().await;
        self.images.destroy().await;
        self.ocr.destroy().await;
        self.translations.destroy().await;
        info!("caches destroyed");
    }
}
