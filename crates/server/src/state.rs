use std::sync::Arc;

use lectern_core::{
    Config, JobQueue, RecordStore, SanitizedConfig, Storage, StudyContentGenerator,
    TranscriptTranslator,
};

/// Shared application state
pub struct AppState {
    config: Config,
    records: Arc<dyn RecordStore>,
    storage: Arc<Storage>,
    queue: Arc<dyn JobQueue>,
    translator: Option<Arc<TranscriptTranslator>>,
    generator: Option<Arc<StudyContentGenerator>>,
}

impl AppState {
    pub fn new(
        config: Config,
        records: Arc<dyn RecordStore>,
        storage: Arc<Storage>,
        queue: Arc<dyn JobQueue>,
        translator: Option<Arc<TranscriptTranslator>>,
        generator: Option<Arc<StudyContentGenerator>>,
    ) -> Self {
        Self {
            config,
            records,
            storage,
            queue,
            translator,
            generator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn records(&self) -> &dyn RecordStore {
        self.records.as_ref()
    }

    pub fn storage(&self) -> &Storage {
        self.storage.as_ref()
    }

    pub fn queue(&self) -> &dyn JobQueue {
        self.queue.as_ref()
    }

    pub fn translator(&self) -> Option<&Arc<TranscriptTranslator>> {
        self.translator.as_ref()
    }

    pub fn generator(&self) -> Option<&Arc<StudyContentGenerator>> {
        self.generator.as_ref()
    }
}
