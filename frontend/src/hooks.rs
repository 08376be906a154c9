use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use gloo::events::EventListener;
use log::{debug, info};
use serde_json::Value;
use shared::{CreatorPlan, CreatorStatus};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use crate::api::cache::{QueryClient, QueryKey, QueryOptions};
use crate::api::creators::{
    creator_plans_key, creator_plans_options, creator_status_key, creator_status_options,
    decode_creator_plans, decode_creator_status, fetch_creator_plans, fetch_creator_status,
};
use crate::api::error::QueryError;
use crate::api::store::{RemoteStore, RestStore};

/// The query cache and remote store every screen reads through.
#[derive(Clone)]
pub struct ApiContext {
    pub client: QueryClient,
    pub store: Rc<dyn RemoteStore>,
}

impl ApiContext {
    pub fn new(store: Rc<dyn RemoteStore>) -> Self {
        Self {
            client: QueryClient::new(),
            store,
        }
    }

    pub fn from_config() -> Self {
        Self::new(Rc::new(RestStore::from_config()))
    }
}

impl PartialEq for ApiContext {
    fn eq(&self, other: &Self) -> bool {
        self.client == other.client && Rc::ptr_eq(&self.store, &other.store)
    }
}

#[derive(Properties, PartialEq)]
pub struct ApiProviderProps {
    pub children: Children,
}

/// Owns the app-wide query cache; it lives exactly as long as this component.
#[function_component(ApiProvider)]
pub fn api_provider(props: &ApiProviderProps) -> Html {
    let context = use_memo((), |_| {
        info!("Creating query client");
        ApiContext::from_config()
    });

    html! {
        <ContextProvider<ApiContext> context={(*context).clone()}>
            {props.children.clone()}
        </ContextProvider<ApiContext>>
    }
}

/// The nearest [`ApiContext`]; without an [`ApiProvider`] above, a private one
/// is built once for this component.
#[hook]
pub fn use_api() -> ApiContext {
    let context = use_context::<ApiContext>();
    let fallback = use_memo(context.is_none(), |missing| {
        missing.then(|| {
            debug!("No ApiProvider above this component, using a private query client");
            ApiContext::from_config()
        })
    });
    match (context, fallback.as_ref()) {
        (Some(context), _) => context,
        (None, Some(fallback)) => fallback.clone(),
        (None, None) => ApiContext::from_config(),
    }
}

/// What a view should show for a query right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryPhase<'a, T> {
    /// Precondition unmet; nothing was requested.
    Idle,
    Loading,
    Success(&'a T),
    Error(&'a QueryError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    /// Latest decoded data, possibly stale while a refresh runs.
    pub data: Option<T>,
    pub error: Option<QueryError>,
    pub is_fetching: bool,
    pub is_enabled: bool,
}

impl<T> QueryState<T> {
    pub fn disabled() -> Self {
        Self {
            data: None,
            error: None,
            is_fetching: false,
            is_enabled: false,
        }
    }

    pub fn phase(&self) -> QueryPhase<'_, T> {
        if !self.is_enabled {
            return QueryPhase::Idle;
        }
        if let Some(error) = &self.error {
            return QueryPhase::Error(error);
        }
        match &self.data {
            Some(data) => QueryPhase::Success(data),
            None => QueryPhase::Loading,
        }
    }
}

pub struct QueryHandle<T> {
    pub state: QueryState<T>,
    /// Marks the entry stale and fetches again.
    pub refetch: Callback<()>,
}

impl<T> QueryHandle<T> {
    pub fn data(&self) -> Option<&T> {
        self.state.data.as_ref()
    }

    pub fn phase(&self) -> QueryPhase<'_, T> {
        self.state.phase()
    }

    /// True while cached data is shown and a refresh is running behind it.
    pub fn is_refreshing(&self) -> bool {
        self.state.is_fetching && self.state.data.is_some()
    }
}

struct Tick(u32);

impl Reducible for Tick {
    type Action = ();

    fn reduce(self: Rc<Self>, _action: ()) -> Rc<Self> {
        Rc::new(Tick(self.0.wrapping_add(1)))
    }
}

/// Runs `run` for `key` whenever the view mounts, the key changes, the window
/// regains focus or `refetch` is called. `None` disables the query.
///
/// Cached data for the key is shown right away; if the view unmounts or the
/// key changes before `run` resolves, its result is ignored here.
#[hook]
pub fn use_query<T, F, Fut>(
    key: Option<QueryKey>,
    options: QueryOptions,
    decode: fn(Value) -> Result<T, QueryError>,
    run: F,
) -> QueryHandle<T>
where
    T: Clone + PartialEq + 'static,
    F: FnOnce(ApiContext) -> Fut + 'static,
    Fut: Future<Output = Result<T, QueryError>> + 'static,
{
    let api = use_api();
    let tick = use_reducer(|| Tick(0));

    let state = {
        let api = api.clone();
        let key = key.clone();
        use_state(move || match &key {
            Some(key) => QueryState {
                data: api.client.peek(key).and_then(|value| decode(value).ok()),
                error: None,
                is_fetching: false,
                is_enabled: true,
            },
            None => QueryState::disabled(),
        })
    };

    {
        let tick = tick.clone();
        use_effect_with((), move |_| {
            let listener = web_sys::window().map(|window| {
                EventListener::new(&window, "focus", move |_| tick.dispatch(()))
            });
            move || drop(listener)
        });
    }

    {
        let api = api.clone();
        let state = state.clone();
        use_effect_with((key.clone(), tick.0), move |(key, _)| {
            let cancelled = Rc::new(Cell::new(false));

            match key.clone() {
                None => state.set(QueryState::disabled()),
                Some(key) => {
                    let cached = api.client.peek(&key).and_then(|value| decode(value).ok());
                    state.set(QueryState {
                        data: cached.clone(),
                        error: None,
                        is_fetching: api.client.is_stale(&key, options),
                        is_enabled: true,
                    });

                    let cancelled = cancelled.clone();
                    spawn_local(async move {
                        let result = run(api).await;
                        if cancelled.get() {
                            debug!("Dropping result for {}: view moved on", key);
                            return;
                        }
                        match result {
                            Ok(data) => state.set(QueryState {
                                data: Some(data),
                                error: None,
                                is_fetching: false,
                                is_enabled: true,
                            }),
                            Err(error) => state.set(QueryState {
                                data: cached,
                                error: Some(error),
                                is_fetching: false,
                                is_enabled: true,
                            }),
                        }
                    });
                }
            }

            move || cancelled.set(true)
        });
    }

    let refetch = {
        let client = api.client.clone();
        let tick = tick.clone();
        Callback::from(move |_| {
            if let Some(key) = &key {
                client.invalidate(key);
            }
            tick.dispatch(());
        })
    };

    QueryHandle {
        state: (*state).clone(),
        refetch,
    }
}

/// Active creator plans, served from cache for five minutes.
#[hook]
pub fn use_creator_plans() -> QueryHandle<Vec<CreatorPlan>> {
    use_query(
        Some(creator_plans_key()),
        creator_plans_options(),
        decode_creator_plans,
        |api: ApiContext| async move { fetch_creator_plans(&api.client, api.store.clone()).await },
    )
}

/// Creator status of the given user, refetched on every mount and focus.
#[hook]
pub fn use_creator_status(user_id: Option<String>) -> QueryHandle<Option<CreatorStatus>> {
    let user_id = user_id.filter(|id| !id.is_empty());
    let key = user_id.as_deref().map(creator_status_key);

    use_query(
        key,
        creator_status_options(),
        decode_creator_status,
        move |api: ApiContext| async move {
            let outcome = fetch_creator_status(&api.client, api.store.clone(), user_id.as_deref()).await?;
            Ok::<_, QueryError>(outcome.ready().flatten())
        },
    )
}
