use medi_config::MediConfig;
use medi_engine::Assistant;

/// Everything a command handler needs.
pub struct AppContext {
    pub assistant: Assistant,
}

impl AppContext {
    pub async fn init(config: MediConfig) -> anyhow::Result<Self> {
        let assistant = Assistant::open(config).await?;
        Ok(Self { assistant })
    }

    pub const fn config(&self) -> &MediConfig {
        self.assistant.config()
    }
}
