//! Resource management state
//!
//! The navigable state of a list screen: current page, which modal is
//! open and the search text.  Two interchangeable strategies back it;
//! [`LocationState`] keeps everything in the query string of the
//! current location so that links can be shared and the back button
//! closes modals, while [`MemoryState`] keeps it in memory for the
//! lifetime of the screen.  The strategy is selected at construction
//! through [`StateBacking`].

use audcore::location::{
    Location,
    Navigator,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::sync::Arc;

use crate::error::StateError;

mod location;
mod memory;

pub use location::LocationState;
pub use memory::MemoryState;

pub const PAGE_PARAM: &str = "page";
pub const NEW_PARAM: &str = "new";
pub const EDIT_PARAM: &str = "edit";
pub const SEARCH_PARAM: &str = "q";

/// Which modal of a list screen is open; at most one at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    Closed,
    Creating,
    Editing(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StateBacking {
    #[default]
    Url,
    Memory,
}

pub trait ResourceState: Send + Sync {
    fn page(&self) -> u32;
    /// Go to the given page; page 0 is taken as the first page.
    fn set_page(&self, page: u32);
    fn modal(&self) -> Modal;
    /// Open or close the creation modal.
    fn set_is_new(&self, value: bool);
    /// Only `None` is accepted, which closes the edit modal.
    fn set_resource_id(&self, id: Option<&str>) -> Result<(), StateError>;
    /// The navigation target that opens the edit modal for `id`; does
    /// not navigate.
    fn resource_link(&self, id: &str) -> String;
    /// Apply a target produced by `resource_link`.
    fn follow_link(&self, target: &str);
    fn search(&self) -> String;
    /// Replace the search text; the page is left as is.
    fn set_search(&self, text: &str);

    fn is_new(&self) -> bool {
        self.modal() == Modal::Creating
    }

    fn resource_id(&self) -> Option<String> {
        match self.modal() {
            Modal::Editing(id) => Some(id),
            _ => None,
        }
    }
}

/// Construct the state for a screen mounted at the navigator's current
/// location.
pub fn resource_state(
    backing: StateBacking,
    navigator: Arc<dyn Navigator>,
) -> Arc<dyn ResourceState> {
    log::trace!("building {backing:?} resource state");
    match backing {
        StateBacking::Url => Arc::new(LocationState::new(navigator)),
        StateBacking::Memory => Arc::new(MemoryState::new(navigator.current_location())),
    }
}

pub(crate) fn page_from(location: &Location) -> u32 {
    location.get(PAGE_PARAM)
        .and_then(|page| page.parse::<u32>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

pub(crate) fn modal_from(location: &Location) -> Modal {
    match location.get(EDIT_PARAM) {
        Some(id) if !id.is_empty() => Modal::Editing(id.to_string()),
        _ if location.has(NEW_PARAM) => Modal::Creating,
        _ => Modal::Closed,
    }
}

pub(crate) fn link_for(location: &Location, id: &str) -> String {
    location
        .without(NEW_PARAM)
        .with(EDIT_PARAM, id)
        .to_string()
}
