use log::warn;
use yew::prelude::*;
use yew_router::prelude::*;
use crate::i18n::{use_translator, Translator};
use crate::Route;

/// Records a navigation that matched no route.
pub fn report_unmatched_path(path: &str) {
    warn!("404 Error: User attempted to access non-existent route: {}", path);
}

/// Localized text shown on the not-found page.
#[derive(Debug, Clone, PartialEq)]
pub struct NotFoundCopy {
    pub message: String,
    pub return_home: String,
}

impl NotFoundCopy {
    pub fn new(t: &Translator) -> Self {
        Self {
            message: t.t("error.not_found.message"),
            return_home: t.t("error.not_found.return_home"),
        }
    }
}

#[function_component(NotFound)]
pub fn not_found() -> Html {
    let translator = use_translator();
    let path = use_location()
        .map(|location| location.path().to_string())
        .unwrap_or_default();

    use_effect_with(path, |path| {
        report_unmatched_path(path);
        || ()
    });

    let copy = NotFoundCopy::new(&translator);

    html! {
        <div class="not-found-page">
            <h1>{translator.t("error.not_found.title")}</h1>
            <p>{copy.message}</p>
            <Link<Route> to={Route::Plans} classes="return-home">{copy.return_home}</Link<Route>>
        </div>
    }
}
