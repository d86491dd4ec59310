use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use gfc_core::{
    export,
    selection::{Selection, SELECTED},
    snapshot::{Event as Screening, Snapshot},
    url::{form_urlencoded, Url},
    url_state::{Location, NavigateOptions},
    view_mode::{ViewMode, ViewState},
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{window, HtmlElement, Window};
use yew::prelude::*;

static RESOURCES: &str = include_str!("../../../data/resources.json");
static EVENTS: &str = include_str!("../../../data/events.json");

/// The address bar and session history of the browser window.
#[derive(Debug, Clone, Copy, Default)]
struct BrowserLocation;

impl BrowserLocation {
    fn window() -> Result<Window> {
        window().ok_or_else(|| anyhow!("no browser window"))
    }

    fn settle(window: &Window, options: NavigateOptions) {
        if !options.no_scroll {
            window.scroll_to_with_x_and_y(0.0, 0.0);
        }
        if !options.keep_focus {
            let focused = window
                .document()
                .and_then(|document| document.active_element())
                .and_then(|element| element.dyn_into::<HtmlElement>().ok());
            if let Some(element) = focused {
                if let Err(err) = element.blur() {
                    log::warn!("could not blur the focused element: {err:?}");
                }
            }
        }
    }
}

impl Location for BrowserLocation {
    fn href(&self) -> String {
        window()
            .and_then(|window| window.location().href().ok())
            .unwrap_or_default()
    }

    fn push(&mut self, url: &Url, options: NavigateOptions) -> Result<()> {
        let window = Self::window()?;
        window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(url.as_str())))
            .map_err(|err| anyhow!("could not navigate to {url}: {err:?}"))?;
        Self::settle(&window, options);
        Ok(())
    }

    fn replace(&mut self, url: &Url, options: NavigateOptions) -> Result<()> {
        let window = Self::window()?;
        window
            .history()
            .and_then(|history| {
                history.replace_state_with_url(&JsValue::NULL, "", Some(url.as_str()))
            })
            .map_err(|err| anyhow!("could not navigate to {url}: {err:?}"))?;
        Self::settle(&window, options);
        Ok(())
    }
}

fn export_url(ids: &[String]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(SELECTED.name(), &ids.join(","))
        .finish();
    format!("/export.ics?{query}")
}

fn screening_item(
    snapshot: &Snapshot,
    screening: &Screening,
    checked: bool,
    on_toggle: &Callback<String>,
) -> Html {
    let id = screening.id.to_string();
    let onchange = {
        let on_toggle = on_toggle.clone();
        let id = id.clone();
        Callback::from(move |_: Event| on_toggle.emit(id.clone()))
    };
    let label = format!(
        "{} {}-{} {} ({})",
        screening.local_start().format("%a %-d %b"),
        screening.local_start().format("%H:%M"),
        screening.local_end().format("%H:%M"),
        snapshot.display_name(screening),
        screening.location(),
    );
    html! {
        <li key={id}>
            <label>
                <input type="checkbox" checked={checked} onchange={onchange} />
                {label}
            </label>
        </li>
    }
}

fn section(
    heading: String,
    screenings: &[&Screening],
    snapshot: &Snapshot,
    selected: &[String],
    on_toggle: &Callback<String>,
) -> Html {
    html! {
        <section>
            <h2>{heading}</h2>
            <ul>
                { for screenings.iter().map(|screening| {
                    let checked = selected.contains(&screening.id.to_string());
                    screening_item(snapshot, screening, checked, on_toggle)
                }) }
            </ul>
        </section>
    }
}

/// One section per film, in snapshot order.
fn timeline(snapshot: &Snapshot, selected: &[String], on_toggle: &Callback<String>) -> Html {
    let mut rows: Vec<(&str, Vec<&Screening>)> = vec![];
    for screening in snapshot.events() {
        let key = screening.primary_resource_id().unwrap_or_default();
        match rows.iter_mut().find(|(row_key, _)| *row_key == key) {
            Some((_, screenings)) => screenings.push(screening),
            None => rows.push((key, vec![screening])),
        }
    }
    html! {
        <>
            { for rows.iter().map(|(_, screenings)| section(
                snapshot.display_name(screenings[0]).to_owned(),
                screenings,
                snapshot,
                selected,
                on_toggle,
            )) }
        </>
    }
}

/// One section per festival day.
fn week(snapshot: &Snapshot, selected: &[String], on_toggle: &Callback<String>) -> Html {
    let mut days: BTreeMap<NaiveDate, Vec<&Screening>> = BTreeMap::new();
    for screening in snapshot.events() {
        days.entry(screening.local_start().date_naive())
            .or_default()
            .push(screening);
    }
    for screenings in days.values_mut() {
        screenings.sort_by_key(|screening| screening.start);
    }
    html! {
        <>
            { for days.iter().map(|(day, screenings)| section(
                day.format("%A %-d %B").to_string(),
                screenings,
                snapshot,
                selected,
                on_toggle,
            )) }
        </>
    }
}

fn list(snapshot: &Snapshot, selected: &[String], on_toggle: &Callback<String>) -> Html {
    let mut screenings: Vec<&Screening> = snapshot.events().iter().collect();
    screenings.sort_by_key(|screening| screening.start);
    section(
        String::from("All screenings"),
        &screenings,
        snapshot,
        selected,
        on_toggle,
    )
}

#[function_component]
pub fn App() -> Html {
    let snapshot_handle = use_memo(|_| Snapshot::from_json(RESOURCES, EVENTS), ());
    let update_handle = use_force_update();
    let snapshot = match &*snapshot_handle {
        Ok(snapshot) => snapshot,
        Err(err) => {
            return html! {
                <main><p>{format!("The schedule could not be loaded: {err}")}</p></main>
            }
        }
    };

    // read fresh on every render, the URL may have changed behind our back
    let selection = Selection::new(BrowserLocation);
    let selected: Vec<String> = selection.ids().into_iter().collect();
    let share_url = selection.share_url();
    let mode = ViewState::new(BrowserLocation).mode();

    let on_toggle = {
        let update_handle = update_handle.clone();
        Callback::from(move |id: String| {
            if let Err(err) = Selection::new(BrowserLocation).toggle(&id) {
                log::error!("could not toggle {id}: {err}");
            }
            update_handle.force_update();
        })
    };
    let view_buttons = ViewMode::ALL.into_iter().map(|view_mode| {
        let update_handle = update_handle.clone();
        let onclick = Callback::from(move |_: MouseEvent| {
            if let Err(err) = ViewState::new(BrowserLocation).set(view_mode) {
                log::error!("could not switch to {view_mode}: {err}");
            }
            update_handle.force_update();
        });
        html! {
            <button onclick={onclick} disabled={view_mode == mode}>{view_mode.as_str()}</button>
        }
    });

    let schedule = match mode {
        ViewMode::Timeline => timeline(snapshot, &selected, &on_toggle),
        ViewMode::Week => week(snapshot, &selected, &on_toggle),
        ViewMode::List => list(snapshot, &selected, &on_toggle),
    };
    let export_link = if selected.is_empty() {
        html! {}
    } else {
        html! {
            <a href={export_url(&selected)} download={export::FILE_NAME}>
                {format!("Export {} screenings to your calendar", selected.len())}
            </a>
        }
    };

    html! {
        <main>
            <nav>{ for view_buttons }</nav>
            {schedule}
            <output>
                <div>
                    <label>{"Share URL"}<br/><input
                        readonly=true
                        value={share_url}
                        style="width:100%"
                    /></label>
                </div>
                {export_link}
            </output>
        </main>
    }
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    wasm_logger::init(wasm_logger::Config::new(log::Level::Trace));
    yew::Renderer::<App>::new().render();
}
