use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    pub(crate) fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("BOOKLENS_API_KEY").or_else(|| lookup("OPENAI_API_KEY"))
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }

        if let Some(base_url) = lookup("BOOKLENS_BASE_URL")
            && !base_url.is_empty()
        {
            self.provider.base_url = base_url;
        }

        if let Some(model) = lookup("BOOKLENS_MODEL")
            && !model.is_empty()
        {
            self.provider.model = model;
        }

        if let Some(temp_str) = lookup("BOOKLENS_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.provider.temperature = temp;
        }

        if let Some(limit_str) = lookup("BOOKLENS_CONCURRENCY")
            && let Ok(limit) = limit_str.parse::<usize>()
            && limit > 0
        {
            self.pipeline.concurrency = limit;
        }

        if let Some(flag) = lookup("BOOKLENS_MODERATION") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => self.moderation.enabled = true,
                "false" | "0" | "no" => self.moderation.enabled = false,
                _ => {}
            }
        }
    }
}
