use std::collections::HashMap;
use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};
use lazy_static::lazy_static;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use yew::prelude::*;

const LOCALE_KEY: &str = "locale";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Es];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// Name of the language in that language, for the switcher.
    pub fn label(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Español",
        }
    }

    /// Picks a supported locale from a BCP 47 tag such as `es-MX`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let language = tag.split(|c: char| c == '-' || c == '_').next()?.to_ascii_lowercase();
        match language.as_str() {
            "en" => Some(Locale::En),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }

    /// Stored preference first, then the browser language, then English.
    pub fn detect() -> Self {
        if let Ok(stored) = LocalStorage::get::<Locale>(LOCALE_KEY) {
            return stored;
        }
        web_sys::window()
            .and_then(|window| window.navigator().language())
            .and_then(|tag| Locale::from_tag(&tag))
            .unwrap_or_default()
    }

    /// Stores this locale as the user's preference for later visits.
    pub fn persist(self) -> Result<(), StorageError> {
        LocalStorage::set(LOCALE_KEY, self)
    }
}

lazy_static! {
    static ref EN: HashMap<&'static str, &'static str> = HashMap::from([
        ("error.not_found.title", "404"),
        ("error.not_found.message", "Oops! Page not found"),
        ("error.not_found.return_home", "Return to Home"),
        ("creator.plans.title", "Creator plans"),
        ("creator.plans.empty", "No plans are available right now."),
        ("creator.plans.loading", "Loading plans..."),
        ("creator.plans.refreshing", "Refreshing..."),
        ("creator.plans.error", "Could not load plans."),
        ("creator.plans.videos", "videos"),
        ("creator.plans.current", "Current plan"),
        ("creator.status.active", "Creator access is active"),
        ("creator.status.inactive", "You do not have creator access"),
        ("creator.status.signed_out", "Sign in to see your creator status"),
        ("creator.status.trial_ends", "Trial ends"),
        ("common.retry", "Retry"),
        ("common.language", "Language"),
    ]);

    static ref ES: HashMap<&'static str, &'static str> = HashMap::from([
        ("error.not_found.title", "404"),
        ("error.not_found.message", "¡Vaya! Página no encontrada"),
        ("error.not_found.return_home", "Volver al inicio"),
        ("creator.plans.title", "Planes de creador"),
        ("creator.plans.empty", "No hay planes disponibles en este momento."),
        ("creator.plans.loading", "Cargando planes..."),
        ("creator.plans.refreshing", "Actualizando..."),
        ("creator.plans.error", "No se pudieron cargar los planes."),
        ("creator.plans.videos", "videos"),
        ("creator.plans.current", "Plan actual"),
        ("creator.status.active", "El acceso de creador está activo"),
        ("creator.status.inactive", "No tienes acceso de creador"),
        ("creator.status.signed_out", "Inicia sesión para ver tu estado de creador"),
        ("creator.status.trial_ends", "La prueba termina"),
        ("common.retry", "Reintentar"),
        ("common.language", "Idioma"),
    ]);
}

fn catalog(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    match locale {
        Locale::En => &EN,
        Locale::Es => &ES,
    }
}

/// Message lookup for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Translator {
    pub locale: Locale,
}

impl Translator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Localized text for `key`, falling back to English and then to the key itself.
    pub fn t(&self, key: &str) -> String {
        if let Some(text) = catalog(self.locale).get(key) {
            return text.to_string();
        }
        if let Some(text) = catalog(Locale::En).get(key) {
            debug!("No {:?} translation for '{}', using English", self.locale, key);
            return text.to_string();
        }
        warn!("Missing translation key: {}", key);
        key.to_string()
    }
}

/// Active translator plus the callback that switches and persists the locale.
#[derive(Clone, PartialEq)]
pub struct I18nContext {
    pub translator: Translator,
    pub set_locale: Callback<Locale>,
}

#[derive(Properties, PartialEq)]
pub struct I18nProviderProps {
    /// Fixed starting locale; detected from storage and the browser when unset.
    #[prop_or_default]
    pub locale: Option<Locale>,
    pub children: Children,
}

#[function_component(I18nProvider)]
pub fn i18n_provider(props: &I18nProviderProps) -> Html {
    let initial = props.locale;
    let locale = use_state(move || {
        let locale = initial.unwrap_or_else(Locale::detect);
        debug!("Using locale {:?}", locale);
        locale
    });

    let set_locale = {
        let locale = locale.clone();
        Callback::from(move |next: Locale| {
            if let Err(e) = next.persist() {
                warn!("Failed to store locale {}: {}", next.code(), e);
            }
            debug!("Switching locale to {:?}", next);
            locale.set(next);
        })
    };

    let context = I18nContext {
        translator: Translator::new(*locale),
        set_locale,
    };

    html! {
        <ContextProvider<I18nContext> context={context}>
            {props.children.clone()}
        </ContextProvider<I18nContext>>
    }
}

#[hook]
pub fn use_translator() -> Translator {
    use_context::<I18nContext>()
        .map(|context| context.translator)
        .unwrap_or_default()
}

/// Switches the app locale and remembers it; a no-op outside [`I18nProvider`].
#[hook]
pub fn use_set_locale() -> Callback<Locale> {
    use_context::<I18nContext>()
        .map(|context| context.set_locale)
        .unwrap_or_else(Callback::noop)
}
