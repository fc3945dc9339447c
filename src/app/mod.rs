use crate::pages::{
    AppLayout, CelebrationPage, PrivateCharterPage, SportPage, StudyAbroadPage, VoyagePage,
};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Redirect, Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=|| view! { <Redirect path="/celebration" /> } />
                <Route path=path!("celebration") view=|| view! {
                    <AppLayout><CelebrationPage /></AppLayout>
                } />
                <Route path=path!("private-charter") view=|| view! {
                    <AppLayout><PrivateCharterPage /></AppLayout>
                } />
                <Route path=path!("sport") view=|| view! {
                    <AppLayout><SportPage /></AppLayout>
                } />
                <Route path=path!("study-abroad") view=|| view! {
                    <AppLayout><StudyAbroadPage /></AppLayout>
                } />
                <Route path=path!("voyage") view=|| view! {
                    <AppLayout><VoyagePage /></AppLayout>
                } />
            </Routes>
        </Router>
    }
}
