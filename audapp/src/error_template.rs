use crate::error::AppError;
use http::status::StatusCode;
use leptos::{logging::log, prelude::*};

// Displays the errors caught by an error boundary, or the ones handed in
// directly by the router fallback.
#[component]
pub fn ErrorTemplate(
    #[prop(optional)] outside_errors: Option<Errors>,
    #[prop(optional)] errors: Option<ArcRwSignal<Errors>>,
) -> impl IntoView {
    let errors = match outside_errors {
        Some(e) => ArcRwSignal::new(e),
        None => errors.unwrap_or_else(|| ArcRwSignal::new(Errors::default())),
    };
    // Downcast lets us take a type that implements `std::error::Error`;
    // anything that is not an AppError is shown by its message.
    let errors = Memo::new(move |_| {
        errors
            .get_untracked()
            .into_iter()
            .map(|(_, v)| v.downcast_ref::<AppError>()
                .cloned()
                .unwrap_or_else(|| AppError::Message(v.to_string())))
            .collect::<Vec<_>>()
    });
    log!("Errors: {:#?}", &*errors.read_untracked());

    view! {
        {move || {
            errors.get()
                .into_iter()
                .map(|error| {
                    let error_code = error.status_code();
                    let error_string = (error_code == StatusCode::INTERNAL_SERVER_ERROR)
                        .then(|| format!("Error: {error}"));
                    view! {
                        <h1>{error_code.to_string()}</h1>
                        <p>{error_string}</p>
                    }
                })
                .collect_view()
        }}
    }
}
