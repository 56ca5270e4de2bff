//! Browser history as seen by the resource management state.
//!
//! Navigation goes through the router so that route matching and the
//! reactive location stay current.  Going back is asynchronous in the
//! browser, so the location expected after a `pop` is reported until
//! the matching `popstate` event arrives.

use audcore::location::{
    Location,
    NavigateOptions,
    Navigator,
};
use leptos::logging;
use leptos_router::hooks::use_navigate;
use parking_lot::Mutex;
use send_wrapper::SendWrapper;

type Navigate = Box<dyn Fn(&str, leptos_router::NavigateOptions)>;

pub struct RouterNavigator {
    navigate: SendWrapper<Navigate>,
    window: SendWrapper<web_sys::Window>,
    // locations left through a push made by the application, most recent
    // last; only these may be returned to with `pop`.
    pushed: Mutex<Vec<Location>>,
    pending: Mutex<Option<Location>>,
}

impl RouterNavigator {
    /// Must be called from within the router.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let navigate = use_navigate();
        Some(Self {
            navigate: SendWrapper::new(Box::new(move |target, options| navigate(target, options))),
            window: SendWrapper::new(window),
            pushed: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
        })
    }

    fn window_location(&self) -> Location {
        let location = self.window.location();
        let path = location.pathname().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        Location::parse(&format!("{path}{search}"))
    }

    /// To be called on every `popstate` event.
    pub fn on_popstate(&self) {
        if self.pending.lock().take().is_none() {
            // the user went back by themselves.
            self.pushed.lock().pop();
        }
    }
}

impl Navigator for RouterNavigator {
    fn current_location(&self) -> Location {
        if let Some(location) = self.pending.lock().clone() {
            return location;
        }
        self.window_location()
    }

    fn navigate(&self, target: &str, options: NavigateOptions) {
        let current = self.current_location();
        *self.pending.lock() = None;
        if !options.replace {
            self.pushed.lock().push(current);
        }
        (self.navigate)(target, leptos_router::NavigateOptions {
            replace: options.replace,
            scroll: false,
            ..Default::default()
        });
    }

    fn pop(&self) {
        let Some(previous) = self.pushed.lock().pop() else {
            return;
        };
        *self.pending.lock() = Some(previous);
        match self.window.history() {
            Ok(history) => if let Err(e) = history.back() {
                logging::warn!("unable to go back: {e:?}");
            },
            Err(e) => logging::warn!("history unavailable: {e:?}"),
        }
    }

    fn can_pop(&self) -> bool {
        !self.pushed.lock().is_empty()
    }

    fn previous_location(&self) -> Option<Location> {
        self.pushed.lock().last().cloned()
    }
}
