use shared::{has_creator_access, CreatorPlan, CreatorStatus};
use yew::prelude::*;
use crate::hooks::{use_creator_plans, use_creator_status, QueryPhase};
use crate::i18n::{use_set_locale, use_translator, Locale, Translator};
use crate::session;

#[derive(Properties, PartialEq)]
struct PlanCardProps {
    plan: CreatorPlan,
    is_current: bool,
}

#[function_component(PlanCard)]
fn plan_card(props: &PlanCardProps) -> Html {
    let t = use_translator();
    let plan = &props.plan;

    html! {
        <li class={classes!("plan-card", props.is_current.then_some("plan-card--current"))}>
            <h3>{plan.name.clone()}</h3>
            if let Some(description) = &plan.description {
                <p class="plan-description">{description.clone()}</p>
            }
            <p class="plan-limit">{format!("{} {}", plan.video_limit, t.t("creator.plans.videos"))}</p>
            <p class="plan-price">{plan.formatted_price()}</p>
            if props.is_current {
                <span class="badge">{t.t("creator.plans.current")}</span>
            }
        </li>
    }
}

fn status_banner(t: &Translator, signed_in: bool, status: Option<&CreatorStatus>) -> Html {
    if !signed_in {
        return html! { <p class="creator-status">{t.t("creator.status.signed_out")}</p> };
    }

    if has_creator_access(status) {
        let trial_ends = status
            .and_then(|s| s.trial_ends_at)
            .map(|ends| format!("{}: {}", t.t("creator.status.trial_ends"), ends.format("%B %d, %Y")));
        html! {
            <div class="creator-status creator-status--active">
                <p>{t.t("creator.status.active")}</p>
                if let Some(trial_ends) = trial_ends {
                    <p class="trial-ends">{trial_ends}</p>
                }
            </div>
        }
    } else {
        html! { <p class="creator-status">{t.t("creator.status.inactive")}</p> }
    }
}

#[function_component(LocaleSwitcher)]
fn locale_switcher() -> Html {
    let t = use_translator();
    let set_locale = use_set_locale();

    html! {
        <nav class="locale-switcher" aria-label={t.t("common.language")}>
            { for Locale::ALL.into_iter().map(|locale| {
                let onclick = set_locale.reform(move |_: MouseEvent| locale);
                html! {
                    <button
                        key={locale.code()}
                        lang={locale.code()}
                        disabled={locale == t.locale}
                        {onclick}
                    >
                        {locale.label()}
                    </button>
                }
            }) }
        </nav>
    }
}

#[function_component(Plans)]
pub fn plans() -> Html {
    let t = use_translator();
    let user_id = use_memo((), |_| session::current_user_id());
    let plans = use_creator_plans();
    let status = use_creator_status((*user_id).clone());

    let current_status = status.data().and_then(|s| s.as_ref());
    let on_retry = plans.refetch.reform(|_: MouseEvent| ());

    let catalog = match plans.phase() {
        QueryPhase::Idle | QueryPhase::Loading => html! {
            <p class="loading">{t.t("creator.plans.loading")}</p>
        },
        QueryPhase::Error(_) => html! {
            <div class="error">
                <p>{t.t("creator.plans.error")}</p>
                <button onclick={on_retry}>{t.t("common.retry")}</button>
            </div>
        },
        QueryPhase::Success(list) if list.is_empty() => html! {
            <p class="empty">{t.t("creator.plans.empty")}</p>
        },
        QueryPhase::Success(list) => {
            let current_plan_id = current_status
                .and_then(|s| s.plan(list))
                .map(|plan| plan.id.clone());
            html! {
                <ul class="plan-list">
                    { for list.iter().map(|plan| html! {
                        <PlanCard
                            key={plan.id.clone()}
                            plan={plan.clone()}
                            is_current={current_plan_id.as_deref() == Some(plan.id.as_str())}
                        />
                    }) }
                </ul>
            }
        }
    };

    html! {
        <div class="plans-page">
            <LocaleSwitcher />
            <h1>{t.t("creator.plans.title")}</h1>
            if plans.is_refreshing() {
                <p class="refreshing">{t.t("creator.plans.refreshing")}</p>
            }
            {status_banner(&t, user_id.is_some(), current_status)}
            {catalog}
        </div>
    }
}
