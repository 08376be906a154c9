use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, debug};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;
use crate::hooks::ApiProvider;
use crate::i18n::I18nProvider;

pub mod api;
pub mod config;
pub mod hooks;
pub mod i18n;
pub mod session;
pub mod pages {
    pub mod not_found;
    pub mod plans;
}

use pages::{not_found::NotFound, plans::Plans};

#[derive(Clone, Routable, PartialEq, Debug)]
pub enum Route {
    #[at("/")]
    Plans,
    #[not_found]
    #[at("/404")]
    NotFound,
}

#[function_component(App)]
fn app() -> Html {
    debug!("App component rendering");
    html! {
        <I18nProvider>
            <ApiProvider>
                <BrowserRouter>
                    <main class="app-container">
                        <Switch<Route> render={switch} />
                    </main>
                </BrowserRouter>
            </ApiProvider>
        </I18nProvider>
    }
}

fn switch(routes: Route) -> Html {
    debug!("Route switch: {:?}", routes);
    match routes {
        Route::Plans => {
            debug!("Rendering Plans component");
            html! { <Plans /> }
        },
        Route::NotFound => {
            debug!("Rendering 404 Not Found");
            html! { <NotFound /> }
        },
    }
}

/// Id of the element the app mounts into.
pub const APP_ROOT_ID: &str = "app";

fn app_root() -> Option<web_sys::Element> {
    web_sys::window()?.document()?.get_element_by_id(APP_ROOT_ID)
}

#[wasm_bindgen]
pub async fn run_app() -> Result<(), JsValue> {
    let root = app_root().ok_or_else(|| JsValue::from_str("No #app element to mount into"))?;

    // Initialize logging
    wasm_logger::init(wasm_logger::Config::new(log::Level::Debug));
    info!("Logger initialized");

    // Set up panic hook
    console_error_panic_hook::set_once();
    info!("Panic hook set");

    info!("Mounting application");
    yew::Renderer::<App>::with_root(root).render();
    info!("Application mounted");

    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Test runners load the module into a page without the app root
    if app_root().is_none() {
        return Ok(());
    }
    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = run_app().await {
            log::error!("Failed to run app: {:?}", e);
        }
    });
    Ok(())
}
