use dynbody_core::{
    AppConfig, AppConfigExt, Character, FormId, ModelLoadScheduler, RecordingHost, Session,
};

/// Holds all state for the CLI.
///
/// The session is `None` until a data root that exists has been configured.
pub struct CliContext {
    pub config: AppConfig,
    pub session: Option<Session>,
    pub characters: Vec<Character>,
    pub host: RecordingHost,
    pub scheduler: ModelLoadScheduler,
}

impl CliContext {
    pub fn new() -> Self {
        Self::with_config(AppConfig::load())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let scheduler = ModelLoadScheduler::from_config(&config);
        let mut ctx = Self {
            config,
            session: None,
            characters: Vec::new(),
            host: RecordingHost::new(),
            scheduler,
        };
        if let Err(e) = ctx.reopen() {
            tracing::warn!(error = %e, "No session opened");
        }
        ctx
    }

    /// Rebuild the session from the current config, dropping all selections.
    pub fn reopen(&mut self) -> Result<(), String> {
        self.session = None;
        let session = Session::open(self.config.clone()).map_err(|e| e.to_string())?;
        self.session = Some(session);
        self.scheduler = ModelLoadScheduler::from_config(&self.config);
        Ok(())
    }

    pub fn session_mut(&mut self) -> Result<&mut Session, String> {
        self.session
            .as_mut()
            .ok_or_else(|| "no session: set a data root first".to_string())
    }

    pub fn character(&self, form_id: FormId) -> Result<&Character, String> {
        self.characters
            .iter()
            .find(|c| c.form_id == form_id)
            .ok_or_else(|| format!("no character {form_id:08X} loaded"))
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}
