use audcore::location::{
    Location,
    NavigateOptions,
    Navigator,
};

use crate::error::StateError;
use super::{
    EDIT_PARAM,
    Modal,
    NEW_PARAM,
    PAGE_PARAM,
    ResourceState,
    SEARCH_PARAM,
    link_for,
    modal_from,
    page_from,
};

/// State read from and written to the navigator's current location.
pub struct LocationState<N> {
    navigator: N,
}

impl<N: Navigator> LocationState<N> {
    pub fn new(navigator: N) -> Self {
        Self { navigator }
    }

    fn location(&self) -> Location {
        self.navigator.current_location()
    }

    fn push(&self, location: Location) {
        self.navigator.navigate(&location.to_string(), NavigateOptions::default());
    }

    fn replace(&self, location: Location) {
        self.navigator.navigate(&location.to_string(), NavigateOptions { replace: true });
    }

    // Closing a modal goes back when the previous entry is the list as
    // it is now shown; otherwise (a location opened directly, or the page
    // or search changed while the modal was open) the modal parameters
    // are dropped in place.  Going back is not awaited by the navigator,
    // so nothing may be navigated after a pop.
    fn close(&self) {
        let location = self.location();
        let target = location.without(NEW_PARAM).without(EDIT_PARAM);
        let restores = self.navigator.previous_location()
            .map(|previous| {
                previous.path() == target.path()
                    && modal_from(&previous) == Modal::Closed
                    && page_from(&previous) == page_from(&target)
                    && search_from(&previous) == search_from(&target)
            })
            .unwrap_or(false);
        if restores {
            self.navigator.pop();
        } else {
            log::trace!("closing modal in place at {target}");
            self.replace(target);
        }
    }
}

fn search_from(location: &Location) -> &str {
    location.get(SEARCH_PARAM).unwrap_or_default()
}

impl<N: Navigator> ResourceState for LocationState<N> {
    fn page(&self) -> u32 {
        page_from(&self.location())
    }

    fn set_page(&self, page: u32) {
        let page = page.max(1);
        let location = self.location();
        if page_from(&location) != page {
            self.push(location.with(PAGE_PARAM, page.to_string()));
        }
    }

    fn modal(&self) -> Modal {
        modal_from(&self.location())
    }

    fn set_is_new(&self, value: bool) {
        match (value, self.modal()) {
            (true, Modal::Creating) | (false, Modal::Closed) => (),
            (true, _) => self.push(self.location().without(EDIT_PARAM).with(NEW_PARAM, "1")),
            (false, Modal::Creating) => self.close(),
            (false, Modal::Editing(_)) => (),
        }
    }

    fn set_resource_id(&self, id: Option<&str>) -> Result<(), StateError> {
        match id {
            Some(id) => Err(StateError::ResourceIdNotNull(id.to_string())),
            None => {
                if matches!(self.modal(), Modal::Editing(_)) {
                    self.close();
                }
                Ok(())
            }
        }
    }

    fn resource_link(&self, id: &str) -> String {
        link_for(&self.location(), id)
    }

    fn follow_link(&self, target: &str) {
        self.navigator.navigate(target, NavigateOptions::default());
    }

    fn search(&self) -> String {
        search_from(&self.location()).to_string()
    }

    fn set_search(&self, text: &str) {
        let location = self.location();
        if search_from(&location) == text {
            return;
        }
        self.replace(if text.is_empty() {
            location.without(SEARCH_PARAM)
        } else {
            location.with(SEARCH_PARAM, text)
        });
    }
}

#[cfg(test)]
mod test {
    use audcore::location::{
        MemoryHistory,
        Navigator,
    };
    use std::sync::Arc;

    use super::*;

    #[test]
    fn history_entries() {
        let history = Arc::new(MemoryHistory::new("/repos"));
        let state = LocationState::new(history.clone());

        state.set_page(2);
        state.set_page(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_location().to_string(), "/repos?page=2");

        // search replaces the current entry
        state.set_search("acme corp");
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_location().to_string(), "/repos?page=2&q=acme+corp");

        state.set_is_new(true);
        assert_eq!(history.len(), 3);
        assert_eq!(history.current_location().to_string(), "/repos?page=2&q=acme+corp&new=1");

        // the link is derived from, and does not alter, the location
        assert_eq!(state.resource_link("r 1"), "/repos?page=2&q=acme+corp&edit=r+1");
        assert_eq!(history.len(), 3);

        // closing is a navigation back
        state.set_is_new(false);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_location().to_string(), "/repos?page=2&q=acme+corp");

        state.follow_link(&state.resource_link("r1"));
        assert_eq!(history.len(), 3);
        assert_eq!(state.set_resource_id(None), Ok(()));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn shared_link_closes_in_place() {
        let history = Arc::new(MemoryHistory::new("/users?page=4&edit=u1"));
        let state = LocationState::new(history.clone());
        assert_eq!(state.resource_id().as_deref(), Some("u1"));
        assert_eq!(state.page(), 4);

        assert_eq!(state.set_resource_id(None), Ok(()));
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_location().to_string(), "/users?page=4");
    }

    #[test]
    fn opening_create_while_editing() {
        let history = Arc::new(MemoryHistory::new("/users?edit=u1"));
        let state = LocationState::new(history.clone());
        state.set_is_new(true);
        assert_eq!(state.modal(), Modal::Creating);
        assert_eq!(history.current_location().to_string(), "/users?new=1");

        // going back would land on the edit modal
        state.set_is_new(false);
        assert_eq!(state.modal(), Modal::Closed);
        assert_eq!(history.current_location().to_string(), "/users");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn changes_made_under_modal_survive_closing() {
        let history = Arc::new(MemoryHistory::new("/repos"));
        let state = LocationState::new(history.clone());
        state.set_is_new(true);
        state.set_page(2);
        state.set_search("acme");
        assert_eq!(history.len(), 3);

        state.set_is_new(false);
        assert_eq!(state.modal(), Modal::Closed);
        assert_eq!(state.page(), 2);
        assert_eq!(state.search(), "acme");
        assert_eq!(history.current_location().to_string(), "/repos?page=2&q=acme");
        // closed in place rather than going back
        assert_eq!(history.len(), 3);

        state.follow_link(&state.resource_link("r1"));
        state.set_search("");
        assert_eq!(state.set_resource_id(None), Ok(()));
        assert_eq!(state.search(), "");
        assert_eq!(state.page(), 2);
        assert_eq!(history.current_location().to_string(), "/repos?page=2");
    }
}
