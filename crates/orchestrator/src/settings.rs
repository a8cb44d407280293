use anyhow::{anyhow, Context, Result};
use llm::{Client, Provider};
use orchestrator_core::CoreConfig;
use protocol::UserProfile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// `groq` or `ollama`
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub groq_api_key: Option<String>,
    pub ollama_base_url: Option<String>,
    pub temperature: f32,
    /// Optional JSON file overriding the built-in texts and keyword tables.
    pub core_config: Option<PathBuf>,
    /// Emit one `TurnReply` JSON line per turn instead of plain text.
    pub json_output: bool,
    /// Starting profile, `;`-separated in the environment.
    pub conditions: Vec<String>,
    pub medications: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            groq_api_key: None,
            ollama_base_url: None,
            temperature: DEFAULT_TEMPERATURE,
            core_config: None,
            json_output: false,
            conditions: Vec::new(),
            medications: Vec::new(),
        }
    }
}

impl AppSettings {
    /// Read settings from the process environment (call `config::load_dotenv` first).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = get("MEDIVOICE_PROVIDER").unwrap_or_else(|| "ollama".to_string()).to_lowercase();
        let parsed: Provider = provider.parse()?;
        let model = get("MEDIVOICE_MODEL").unwrap_or_else(|| match parsed {
            Provider::Groq => DEFAULT_GROQ_MODEL.to_string(),
            Provider::Ollama => DEFAULT_OLLAMA_MODEL.to_string(),
        });
        let temperature = match get("MEDIVOICE_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .with_context(|| format!("MEDIVOICE_TEMPERATURE is not a number: {}", raw))?,
            None => DEFAULT_TEMPERATURE,
        };
        let json_output = get("MEDIVOICE_JSON")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            provider,
            model,
            groq_api_key: get("GROQ_API_KEY"),
            ollama_base_url: get("OLLAMA_BASE_URL"),
            temperature,
            core_config: get("MEDIVOICE_CORE_CONFIG").map(PathBuf::from),
            json_output,
            conditions: split_list(get("MEDIVOICE_CONDITIONS")),
            medications: split_list(get("MEDIVOICE_MEDICATIONS")),
        })
    }

    pub fn provider(&self) -> Result<Provider> {
        self.provider.parse()
    }

    /// Build the generator client these settings describe.
    pub fn build_client(&self) -> Result<Client> {
        let client = match self.provider()? {
            Provider::Groq => {
                let key = self
                    .groq_api_key
                    .clone()
                    .ok_or_else(|| anyhow!("GROQ_API_KEY must be set when MEDIVOICE_PROVIDER=groq"))?;
                Client::new(Provider::Groq, Some(key), self.model.clone())?
            }
            Provider::Ollama => {
                let client = Client::new(Provider::Ollama, None, self.model.clone())?;
                match &self.ollama_base_url {
                    Some(url) => client.with_base_url(url.clone()),
                    None => client,
                }
            }
        };
        Ok(client.with_temperature(self.temperature))
    }

    pub fn load_core_config(&self) -> Result<CoreConfig> {
        match &self.core_config {
            Some(path) => CoreConfig::from_json_file(path),
            None => Ok(CoreConfig::default()),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::new(self.conditions.clone(), self.medications.clone())
    }
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(';')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
