use opencode_api::{ModelRef, ProviderInfo};

/// Provider/model catalog plus the client-side model selection.
///
/// Selection is the one piece of state mutated optimistically: the server is
/// told about it, but the local value is authoritative for subsequent sends.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ModelStore {
    providers: Vec<ProviderInfo>,
    selected: Option<ModelRef>,
}

impl ModelStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn providers(&self) -> &[ProviderInfo] {
        &self.providers
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ModelRef> {
        self.selected.as_ref()
    }

    pub fn set_providers(&mut self, providers: Vec<ProviderInfo>) {
        self.providers = providers;
    }

    /// Overwrites the selection unconditionally; selecting the same model
    /// twice is a no-op in effect.
    pub fn set_selected(&mut self, model: ModelRef) {
        self.selected = Some(model);
    }

    /// Context-window size of the selected model, or 0 when the selection,
    /// provider, model, or limit is missing. Callers treat 0 as "unknown"
    /// and must not divide by it.
    #[must_use]
    pub fn context_limit(&self) -> u64 {
        let Some(selected) = &self.selected else {
            return 0;
        };

        self.providers
            .iter()
            .find(|provider| provider.id == selected.provider_id)
            .and_then(|provider| {
                provider
                    .models
                    .iter()
                    .find(|model| model.id == selected.model_id)
            })
            .map(|model| model.limit.context)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencode_api::{ModelInfo, ModelLimit};

    fn catalog() -> Vec<ProviderInfo> {
        vec![ProviderInfo {
            id: "anthropic".to_string(),
            name: None,
            models: vec![ModelInfo {
                id: "fast".to_string(),
                name: Some("Fast".to_string()),
                limit: ModelLimit {
                    context: 200_000,
                    output: 8_192,
                },
            }],
        }]
    }

    #[test]
    fn context_limit_resolves_through_the_catalog() {
        let mut store = ModelStore::new();
        store.set_providers(catalog());
        store.set_selected(ModelRef {
            provider_id: "anthropic".to_string(),
            model_id: "fast".to_string(),
        });

        assert_eq!(store.context_limit(), 200_000);
    }

    #[test]
    fn context_limit_is_zero_when_any_link_is_missing() {
        let mut store = ModelStore::new();
        assert_eq!(store.context_limit(), 0);

        store.set_selected(ModelRef {
            provider_id: "anthropic".to_string(),
            model_id: "fast".to_string(),
        });
        assert_eq!(store.context_limit(), 0);

        store.set_providers(catalog());
        store.set_selected(ModelRef {
            provider_id: "anthropic".to_string(),
            model_id: "unknown".to_string(),
        });
        assert_eq!(store.context_limit(), 0);
    }

    #[test]
    fn reselection_overwrites() {
        let mut store = ModelStore::new();
        store.set_selected(ModelRef {
            provider_id: "a".to_string(),
            model_id: "one".to_string(),
        });
        store.set_selected(ModelRef {
            provider_id: "b".to_string(),
            model_id: "two".to_string(),
        });

        assert_eq!(store.selected().map(|m| m.model_id.as_str()), Some("two"));
    }
}
