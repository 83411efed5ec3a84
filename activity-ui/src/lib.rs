//! Thành phần giao diện feed hoạt động cho môi trường WebAssembly.

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::rc::Rc;

    use crate::styles;
    use activity_core::{
        ActionsClient, ActivityEvent, FeedConfig, FeedError, FeedSink, FeedState, FeedView,
        Poller, SentenceSegment, TimelineEntry, WAITING_PLACEHOLDER,
    };
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, Window};
    use yew::platform::spawn_local;
    use yew::platform::time::interval;
    use yew::prelude::*;

    #[derive(Clone, Default, PartialEq)]
    struct FeedModel {
        state: FeedState,
    }

    enum FeedAction {
        Replaced(Vec<ActivityEvent>),
        Failed,
    }

    impl Reducible for FeedModel {
        type Action = FeedAction;

        fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
            let mut next = (*self).clone();
            match action {
                FeedAction::Replaced(events) => next.state.replace(events),
                FeedAction::Failed => next.state.mark_failed(),
            }
            Rc::new(next)
        }
    }

    /// Chuyển kết quả polling vào reducer của component.
    struct DispatchSink(UseReducerDispatcher<FeedModel>);

    impl FeedSink for DispatchSink {
        fn replace(&mut self, events: Vec<ActivityEvent>) {
            self.0.dispatch(FeedAction::Replaced(events));
        }

        fn fetch_failed(&mut self, error: &FeedError) {
            console::error_1(&JsValue::from_str(&format!("Connection error: {error}")));
            self.0.dispatch(FeedAction::Failed);
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct ActivityFeedProps {
        #[prop_or_default]
        pub config: FeedConfig,
    }

    #[function_component(ActivityFeed)]
    fn activity_feed(props: &ActivityFeedProps) -> Html {
        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let feed = use_reducer(FeedModel::default);

        {
            let dispatcher = feed.dispatcher();
            use_effect_with(props.config.clone(), move |config| {
                let client = ActionsClient::new(config);
                let ticks = Box::pin(interval(config.poll_interval));
                let (handle, task) = Poller::new(client, DispatchSink(dispatcher), ticks).start();
                spawn_local(task);
                move || drop(handle)
            });
        }

        let interval_secs = props.config.poll_interval.as_secs();

        html! {
            <div class="activity-root">
                <div class="activity-column">
                    <header class="activity-header">
                        <div>
                            <h1>{"Activity"}</h1>
                            <p>{ format!("Updates every {interval_secs} seconds") }</p>
                        </div>
                        <div class="live-badge">
                            <span class="live-dot"></span>
                            <span class="live-label">{"Live"}</span>
                        </div>
                    </header>
                    <div class="activity-timeline" aria-live="polite">
                        {
                            match feed.state.view() {
                                FeedView::Waiting => render_waiting(),
                                FeedView::Timeline(entries) => html! {
                                    for entries.iter().map(render_entry)
                                },
                            }
                        }
                    </div>
                </div>
            </div>
        }
    }

    fn render_waiting() -> Html {
        html! {
            <div class="activity-waiting">
                <p>{ WAITING_PLACEHOLDER }</p>
            </div>
        }
    }

    fn render_entry(entry: &TimelineEntry) -> Html {
        let color = entry.indicator.css_class();

        html! {
            <div key={entry.key.to_string()} class="activity-entry">
                <div class={classes!("activity-indicator", color)} />
                <div class="activity-card">
                    <div class="activity-line">
                        <span class="activity-author">{ format!("@{}", entry.author) }</span>
                        {
                            entry
                                .sentence
                                .as_ref()
                                .map(|sentence| html! {
                                    <span class="activity-sentence">
                                        { for sentence.segments.iter().map(|segment| render_segment(segment, color)) }
                                    </span>
                                })
                                .unwrap_or_default()
                        }
                    </div>
                    <div class="activity-footer">
                        <span class="activity-timestamp">{ entry.timestamp.clone() }</span>
                        <span class="activity-id">{ format!("ID: {}", entry.short_id) }</span>
                    </div>
                </div>
            </div>
        }
    }

    fn render_segment(segment: &SentenceSegment, color: &'static str) -> Html {
        match segment {
            SentenceSegment::Text(text) => html! { { text.clone() } },
            SentenceSegment::Verb(text) => {
                html! { <span class={classes!("sentence-verb", color)}>{ text.clone() }</span> }
            }
            SentenceSegment::Branch(name) => {
                html! { <span class="branch-chip">{ name.clone() }</span> }
            }
        }
    }

    /// Gắn feed vào phần tử theo selector; `api_base` ghi đè URL lúc build.
    #[wasm_bindgen]
    pub fn mount_activity_feed(selector: &str, api_base: Option<String>) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

        let config = match api_base {
            Some(api_base) => FeedConfig::with_api_base(api_base),
            None => FeedConfig::default(),
        };

        yew::Renderer::<ActivityFeed>::with_root_and_props(target, ActivityFeedProps { config })
            .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_activity_feed;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_activity_feed(_: &str, _: Option<String>) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "activity-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}
